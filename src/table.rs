//! Delimited text tables (CSV and friends).

use std::path::Path;

use crate::{encoding::read_text, Encoding, Error, Result};

/// Delimiters tried, in order, when none is given
pub const DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

pub fn detect_delimiter(text: &str) -> Option<u8> {
    DELIMITERS
        .into_iter()
        .find(|d| text.as_bytes().contains(d))
}

/// Split text into rows of columns. Quotes are ordinary characters, rows may
/// have differing column counts and blank lines are skipped.
pub fn parse_delimited(text: &str, delimiter: Option<u8>) -> Result<Vec<Vec<String>>> {
    let delimiter = match delimiter.or_else(|| detect_delimiter(text)) {
        Some(d) => d,
        None => return Err(Error::UnknownDelimiter),
    };
    tracing::trace!(delimiter = %char::from(delimiter).escape_default(), "splitting table");
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_owned).collect());
    }
    Ok(rows)
}

pub fn import_delimited(
    path: impl AsRef<Path>,
    delimiter: Option<u8>,
    encoding: Encoding,
) -> Result<Vec<Vec<String>>> {
    parse_delimited(&read_text(path, encoding)?, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case("a;b,c\td", Some(b';'))]
    #[case("a,b\tc", Some(b','))]
    #[case("a\tb", Some(b'\t'))]
    #[case("a b", None)]
    fn delimiter_detection_order(#[case] text: &str, #[case] expected: Option<u8>) {
        assert_eq!(detect_delimiter(text), expected);
    }

    #[test]
    fn rows_and_columns() {
        let rows = parse_delimited("Net;Pin\r\nSCK;70\r\n", None).unwrap();
        assert_eq!(
            rows,
            vec![
                vec!["Net".to_owned(), "Pin".to_owned()],
                vec!["SCK".to_owned(), "70".to_owned()],
            ]
        );
    }

    #[test]
    fn ragged_rows_and_quotes() {
        let rows = parse_delimited("a;\"b\n\nc;d;e\n", None).unwrap();
        assert_eq!(rows, vec![vec!["a", "\"b"], vec!["c", "d", "e"]]);
    }

    #[test]
    fn explicit_delimiter_wins() {
        let rows = parse_delimited("a;b,c", Some(b',')).unwrap();
        assert_eq!(rows, vec![vec!["a;b".to_owned(), "c".to_owned()]]);
    }

    #[test]
    fn no_delimiter_is_an_error() {
        assert!(matches!(
            parse_delimited("just text", None),
            Err(Error::UnknownDelimiter)
        ));
    }

    #[test]
    fn import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pins.csv");
        std::fs::write(&path, b"U1\tPA5\n\xB5C\tPB0\n").unwrap();
        let rows = import_delimited(&path, None, Encoding::Latin).unwrap();
        assert_eq!(rows, [["U1", "PA5"], ["µC", "PB0"]]);
    }
}
