//! Pin constraint files for Lattice iCE40 projects (`.pcf`).

use std::{fmt, path::Path};

use crate::{Error, Result};

/// A signal placed on a physical pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub pin: String,
    pub signal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pcf {
    constraints: Vec<Constraint>,
}

impl Pcf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn add_constraint(&mut self, signal: impl Into<String>, pin: impl Into<String>) {
        self.constraints.push(Constraint {
            pin: pin.into(),
            signal: signal.into(),
        });
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).map_err(|e| Error::io(path, e))
    }
}

impl fmt::Display for Pcf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for Constraint { pin, signal } in &self.constraints {
            writeln!(f, "set_io {signal} {pin}")?;
        }
        writeln!(f)
    }
}
