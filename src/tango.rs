//! Tango netlist format.
//!
//! ```text
//! [
//! U1
//! SOIC8
//! ATtiny85
//! ]
//! (
//! SCK
//! U1,7
//! J1,3
//! )
//! ```
//!
//! Square bracket blocks define components (designator, footprint and
//! description on the first three lines), parenthesis blocks define nets
//! (a label followed by `designator,pin` lines). Blocks may appear in any order.

use std::path::Path;

use crate::{
    encoding::{normalize_line_endings, read_text},
    raw::TangoFile,
    Encoding, Netlist, Result,
};

mod lexer;
mod parser;

/// Read a netlist file into text with `\n` line endings
pub fn read(path: impl AsRef<Path>, encoding: Encoding) -> Result<String> {
    read_text(path, encoding)
}

/// Read and parse a netlist file
pub fn load(path: impl AsRef<Path>, encoding: Encoding) -> Result<Netlist> {
    let path = path.as_ref();
    let _span = tracing::info_span!("load_netlist", path = %path.display()).entered();
    let text = read(path, encoding)?;
    Ok(parse(&text))
}

/// Parse netlist text into a new netlist
pub fn parse(text: &str) -> Netlist {
    let mut netlist = Netlist::new();
    parse_into(&mut netlist, text);
    netlist
}

/// Parse netlist text, appending to `netlist`.
///
/// Components already present are kept and reported as duplicates, nets are
/// always appended.
pub fn parse_into(netlist: &mut Netlist, text: &str) {
    let text = normalize_line_endings(text);
    let file = TangoFile::from(text.as_ref());
    netlist.populate(file);
}

impl<'a> From<&'a str> for TangoFile<'a> {
    fn from(input: &'a str) -> Self {
        parser::Parser::new(input).parse_file()
    }
}
