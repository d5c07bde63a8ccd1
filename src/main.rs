use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tango_netlist::{
    ioc::IocFile,
    mcu_xml::McuPackage,
    pcf::Pcf,
    tango,
    verilog::{Assertion, Assertions, VerilogModule},
    Encoding, Netlist,
};
use tracing_subscriber::EnvFilter;

/// Connectivity queries on Tango netlists
#[derive(Parser)]
#[command(name = "tango", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Character set of netlist files
    #[arg(long, value_enum, global = true, default_value_t = EncodingArg::Latin)]
    encoding: EncodingArg,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum EncodingArg {
    Latin,
    Utf8,
}

impl From<EncodingArg> for Encoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Latin => Encoding::Latin,
            EncodingArg::Utf8 => Encoding::Utf8,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the components of a netlist
    Components { netlist: PathBuf },

    /// List the nets of a netlist with their pins
    Nets { netlist: PathBuf },

    /// Show the signal nets connecting two components
    Connections {
        netlist: PathBuf,
        a: String,
        b: String,
    },

    /// Write a pin constraint file for the nets between an FPGA and a peer
    Pcf {
        netlist: PathBuf,

        /// Designator of the FPGA
        #[arg(long)]
        fpga: String,

        /// Designator of the component the FPGA talks to
        #[arg(long)]
        peer: String,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Find the MCU pin a signal is configured on
    McuPin {
        /// STM32CubeMX project file
        #[arg(long)]
        ioc: PathBuf,

        /// STM32CubeMX MCU description, to resolve the package pin number
        #[arg(long)]
        xml: Option<PathBuf>,

        signal: String,

        /// Accept GPIO user labels as well
        #[arg(long)]
        label: bool,
    },

    /// Check assertions on a synthesized Verilog netlist
    Verilog {
        file: PathBuf,

        #[arg(long = "exists")]
        exists: Vec<String>,

        #[arg(long = "constant")]
        constant: Vec<String>,

        #[arg(long = "not-constant")]
        not_constant: Vec<String>,
    },
}

fn fatal(e: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", e);
    std::process::exit(1);
}

fn load(path: &Path, encoding: Encoding) -> Netlist {
    tango::load(path, encoding).unwrap_or_else(|e| fatal(e))
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let encoding = Encoding::from(cli.encoding);

    match cli.command {
        Commands::Components { netlist } => {
            let netlist = load(&netlist, encoding);
            for component in netlist.components() {
                println!(
                    "{}\t{}\t{}",
                    component.designator(),
                    component.footprint(),
                    component.description()
                );
            }
        }
        Commands::Nets { netlist } => {
            let netlist = load(&netlist, encoding);
            for net in netlist.nets() {
                let pins: Vec<_> = net.pins().iter().map(|&p| netlist.pin_display(p)).collect();
                println!("{}: {}", net.label(), pins.join(" "));
            }
        }
        Commands::Connections { netlist, a, b } => {
            let netlist = load(&netlist, encoding);
            for connection in netlist.elaborate_component_connections(&a, &b) {
                println!(
                    "{}: {} <-> {}",
                    netlist.net(connection.net),
                    netlist.pin_display(connection.pin_a),
                    netlist.pin_display(connection.pin_b)
                );
            }
        }
        Commands::Pcf {
            netlist,
            fpga,
            peer,
            output,
        } => {
            let netlist = load(&netlist, encoding);
            let mut pcf = Pcf::new();
            for connection in netlist.elaborate_component_connections(&fpga, &peer) {
                pcf.add_constraint(
                    netlist.net(connection.net).label(),
                    netlist.pin(connection.pin_a).name(),
                );
            }
            match output {
                Some(path) => pcf.save_to_file(path).unwrap_or_else(|e| fatal(e)),
                None => print!("{}", pcf),
            }
        }
        Commands::McuPin {
            ioc,
            xml,
            signal,
            label,
        } => {
            let ioc = IocFile::from_file(ioc, encoding).unwrap_or_else(|e| fatal(e));
            let Some(pin) = ioc.pin_by_signal(&signal, label) else {
                fatal(format!("signal {} is not configured", signal));
            };
            match xml {
                Some(xml) => {
                    let package = McuPackage::from_file(xml, encoding).unwrap_or_else(|e| fatal(e));
                    match package.pin_number(pin) {
                        Some(number) => println!("{}\t{}", pin, number),
                        None => fatal(format!("unable to detect the pin number of {}", pin)),
                    }
                }
                None => println!("{}", pin),
            }
        }
        Commands::Verilog {
            file,
            exists,
            constant,
            not_constant,
        } => {
            let module = VerilogModule::from_file(file, encoding).unwrap_or_else(|e| fatal(e));
            let assertions: Assertions = exists
                .into_iter()
                .map(Assertion::NetExists)
                .chain(constant.into_iter().map(Assertion::NetIsConstant))
                .chain(not_constant.into_iter().map(Assertion::NetIsNotConstant))
                .collect();
            let reports = assertions.apply(&module);
            for report in &reports {
                println!("{}", report);
            }
            if reports.iter().any(|r| !r.outcome.passed) {
                std::process::exit(1);
            }
        }
    }
}
