//! STM32CubeMX project files (`.ioc`).
//!
//! A `.ioc` file is a list of `key=value` lines, e.g.
//!
//! ```text
//! Mcu.Name=STM32F446R(C-E)Tx
//! PA5.Signal=SPI1_SCK
//! PC13.GPIOParameters=GPIO_Label
//! PC13.GPIO_Label=LED_STATUS
//! ```

use std::path::Path;

use crate::{encoding::read_text, Encoding, Result};

#[derive(Debug, Clone)]
pub struct IocFile {
    lines: Vec<String>,
}

impl IocFile {
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.lines().map(str::to_owned).collect(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        Ok(Self::parse(&read_text(path, encoding)?))
    }

    /// Lines that are neither blank nor comments
    fn entries(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .map(String::as_str)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
    }

    /// Name of the MCU the project configures
    pub fn mcu_name(&self) -> Option<&str> {
        self.entries()
            .find(|line| line.to_uppercase().contains("MCU.NAME="))
            .and_then(|line| line.split('=').nth(1))
    }

    /// Pin carrying `signal`, e.g. `PA5` for `SPI1_SCK`.
    ///
    /// With `accept_label_match` a user label set on a GPIO matches as well.
    /// Lines are scanned in file order and the first hit of either kind wins.
    pub fn pin_by_signal(&self, signal: &str, accept_label_match: bool) -> Option<&str> {
        let signal = signal.to_uppercase();
        let label_key = format!(".GPIO_LABEL={signal}");
        let signal_key = format!(".SIGNAL={signal}");

        let pin = self.entries().find(|line| {
            let upper = line.to_uppercase();
            (accept_label_match && upper.contains(&label_key)) || upper.contains(&signal_key)
        })?;
        pin.split('.').next()
    }
}
