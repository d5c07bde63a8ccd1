//! STM32CubeMX MCU description files.
//!
//! Only the `<Pin Name=".." Position=".."/>` elements below the `<Mcu>` root
//! are of interest, they map pin names to package pin numbers.

use std::{iter::Peekable, path::Path};

use crate::{encoding::read_text, Encoding, Error, Result};

mod lexer;

use lexer::{Token, TokenIter, TokenKind};

/// A `<Pin>` element and its attributes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackagePin {
    pub name: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Clone)]
pub struct McuPackage {
    pins: Vec<PackagePin>,
}

impl McuPackage {
    pub fn parse(input: &str) -> Result<Self> {
        let pins = Parser::new(input).parse_document()?;
        tracing::debug!("MCU description lists {} pins", pins.len());
        Ok(Self { pins })
    }

    pub fn from_file(path: impl AsRef<Path>, encoding: Encoding) -> Result<Self> {
        Self::parse(&read_text(path, encoding)?)
    }

    pub fn pins(&self) -> &[PackagePin] {
        &self.pins
    }

    /// Package pin number of a pin name, e.g. `2` for `PC13`
    pub fn pin_number(&self, pin_name: &str) -> Option<u32> {
        if pin_name.is_empty() {
            return None;
        }
        self.pins
            .iter()
            .filter(|pin| pin.name.as_deref() == Some(pin_name))
            .find_map(|pin| pin.position.as_deref()?.trim().parse().ok())
    }
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

struct Parser<'a> {
    input: &'a str,
    iter: Peekable<TokenIter<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: TokenIter::new(input).peekable(),
        }
    }

    fn error(&self, message: impl Into<String>, at: logos::Span) -> Error {
        Error::Xml {
            message: message.into(),
            at,
        }
    }

    fn get(&mut self) -> Result<Token> {
        let Some(tok) = self.iter.next() else {
            let end = self.input.len();
            return Err(self.error("unexpected end of input", end..end));
        };
        Ok(tok)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        let tok = self.get()?;
        if tok.kind == kind {
            Ok(tok)
        } else {
            Err(self.error(format!("expected {:?}, found {:?}", kind, tok.kind), tok.span))
        }
    }

    /// Attributes of a start tag up to its end. Returns whether the element
    /// is empty (`/>`).
    fn parse_attributes(&mut self) -> Result<(Vec<(&'a str, String)>, bool)> {
        let input = self.input;
        let mut attributes = vec![];
        loop {
            let tok = self.get()?;
            match tok.kind {
                TokenKind::TagEnd => return Ok((attributes, false)),
                TokenKind::EmptyTagEnd => return Ok((attributes, true)),
                TokenKind::Name => {
                    self.expect(TokenKind::Eq)?;
                    let value = self.expect(TokenKind::Value)?;
                    attributes.push((&input[tok.span], unescape(&input[value.span])));
                }
                kind => {
                    return Err(self.error(format!("unexpected {:?} in tag", kind), tok.span));
                }
            }
        }
    }

    fn parse_document(mut self) -> Result<Vec<PackagePin>> {
        let input = self.input;
        let mut open: Vec<&'a str> = vec![];
        let mut mcu_depth = None;
        let mut found_mcu = false;
        let mut pins = vec![];

        while let Some(tok) = self.iter.next() {
            match tok.kind {
                TokenKind::StartTag => {
                    let name = &input[tok.span];
                    let (attributes, empty) = self.parse_attributes()?;
                    if name == "Mcu" && !found_mcu {
                        found_mcu = true;
                        if !empty {
                            mcu_depth = Some(open.len());
                        }
                    } else if name == "Pin" && mcu_depth.is_some() {
                        let mut pin = PackagePin::default();
                        for (key, value) in attributes {
                            match key {
                                "Name" => pin.name = Some(value),
                                "Position" => pin.position = Some(value),
                                _ => {}
                            }
                        }
                        pins.push(pin);
                    }
                    if !empty {
                        open.push(name);
                    }
                }
                TokenKind::EndTag => {
                    let name = &input[tok.span.clone()];
                    if open.pop() != Some(name) {
                        return Err(self.error(format!("unexpected closing tag {name}"), tok.span));
                    }
                    if mcu_depth == Some(open.len()) {
                        mcu_depth = None;
                    }
                }
                TokenKind::Error => {
                    return Err(self.error("unexpected markup", tok.span));
                }
                // character data
                _ => {}
            }
        }

        if let Some(name) = open.last() {
            let end = self.input.len();
            return Err(self.error(format!("element {name} is not closed"), end..end));
        }
        if !found_mcu {
            return Err(Error::MissingMcuNode);
        }
        Ok(pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    macro_rules! test_data {
        ($fname:expr) => {
            concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/", $fname)
        };
    }

    #[rstest]
    #[case("PB12", Some(33))]
    #[case("PC13", Some(2))]
    #[case("PA5", Some(21))]
    #[case("VBAT", Some(1))]
    #[case("PZ9", None)]
    #[case("", None)]
    #[case("pb12", None)]
    fn pin_numbers(#[case] name: &str, #[case] expected: Option<u32>) {
        let package = McuPackage::from_file(test_data!("mcu.xml"), Encoding::Utf8).unwrap();
        assert_eq!(package.pin_number(name), expected);
    }

    #[test]
    fn pins_outside_mcu_are_ignored() {
        let package = McuPackage::parse(
            "<Root><Pin Name=\"PA0\" Position=\"9\"/><Mcu><Pin Name=\"PA1\" Position=\"10\"/></Mcu></Root>",
        )
        .unwrap();
        assert_eq!(package.pins().len(), 1);
        assert_eq!(package.pin_number("PA0"), None);
        assert_eq!(package.pin_number("PA1"), Some(10));
    }

    #[test]
    fn pins_without_position_are_skipped() {
        let package = McuPackage::parse(
            "<Mcu><Pin Name=\"PA1\"/><Pin Name=\"PA1\" Position=\"x\"/><Pin Name=\"PA1\" Position=\"14\"></Pin></Mcu>",
        )
        .unwrap();
        assert_eq!(package.pin_number("PA1"), Some(14));
    }

    #[test]
    fn missing_root_node() {
        assert!(matches!(
            McuPackage::parse("<?xml version=\"1.0\"?><Other/>"),
            Err(Error::MissingMcuNode)
        ));
    }

    #[rstest]
    #[case("<Mcu><Pin Name=\"PA1\"></Mcu>")]
    #[case("<Mcu><Pin Name=PA1/></Mcu>")]
    #[case("<Mcu>")]
    fn malformed_markup(#[case] input: &str) {
        assert!(matches!(McuPackage::parse(input), Err(Error::Xml { .. })));
    }

    #[rstest]
    #[case("it's", "don't")]
    #[case("5\"", "x\"")]
    fn quotes_in_character_data(#[case] first: &str, #[case] second: &str) {
        let input = format!(
            "<Mcu><Note>{first}</Note><Pin Name=\"PA1\" Position=\"3\"/><Note>{second}</Note></Mcu>"
        );
        let package = McuPackage::parse(&input).unwrap();
        assert_eq!(package.pin_number("PA1"), Some(3));
    }

    #[test]
    fn stray_angle_bracket_is_an_error() {
        assert!(matches!(
            McuPackage::parse("<Mcu>a < b</Mcu>"),
            Err(Error::Xml { .. })
        ));
    }

    #[test]
    fn entities_are_unescaped() {
        let package =
            McuPackage::parse("<Mcu><Pin Name=\"A&amp;B\" Position=\"3\"/></Mcu>").unwrap();
        assert_eq!(package.pin_number("A&B"), Some(3));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            McuPackage::from_file(test_data!("missing.xml"), Encoding::Utf8),
            Err(Error::Io { .. })
        ));
    }
}
