use std::{borrow::Cow, path::Path};

use crate::{Error, Result};

/// Character set used to decode netlist files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Encoding {
    /// Windows-1252. Bytes without a mapping become U+FFFD.
    #[default]
    Latin,
    /// UTF-8, invalid sequences become U+FFFD
    Utf8,
}

// 0x80..=0x9F, the only range where Windows-1252 differs from ISO-8859-1
const CP1252_HIGH: [char; 32] = [
    '€', '\u{FFFD}', '‚', 'ƒ', '„', '…', '†', '‡', 'ˆ', '‰', 'Š', '‹', 'Œ', '\u{FFFD}', 'Ž',
    '\u{FFFD}', '\u{FFFD}', '‘', '’', '“', '”', '•', '–', '—', '˜', '™', 'š', '›', 'œ',
    '\u{FFFD}', 'ž', 'Ÿ',
];

impl Encoding {
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Latin => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
                    _ => char::from(b),
                })
                .collect(),
        }
    }
}

/// Read a text file in the given encoding, with `\n` line endings
pub(crate) fn read_text(path: impl AsRef<Path>, encoding: Encoding) -> Result<String> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    let text = encoding.decode(&bytes);
    Ok(normalize_line_endings(&text).into_owned())
}

/// Turn `\r\n`, `\n\r` and lone `\r` into `\n`
pub(crate) fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.replace("\r\n", "\n")
            .replace("\n\r", "\n")
            .replace('\r', "\n"),
    )
}
