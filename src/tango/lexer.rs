use logos::{Logos, SpannedIter};

pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) span: logos::Span,
}

pub(super) struct TokenIter<'a> {
    iter: SpannedIter<'a, LogosTokenKind>,
}

impl<'a> TokenIter<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            iter: LogosTokenKind::lexer(input).spanned(),
        }
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let (kind, span) = self.iter.next()?;
        let kind = match kind {
            Ok(LogosTokenKind::LBracket) => TokenKind::LBracket,
            Ok(LogosTokenKind::RBracket) => TokenKind::RBracket,
            Ok(LogosTokenKind::LParen) => TokenKind::LParen,
            Ok(LogosTokenKind::RParen) => TokenKind::RParen,
            Ok(LogosTokenKind::Newline) => TokenKind::Newline,
            // every byte but a line break is text, errors can only be stray bytes
            Ok(LogosTokenKind::Text) | Err(_) => TokenKind::Text,
        };
        Some(Token { kind, span })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// A line holding only `[`
    LBracket,
    RBracket,
    /// A line holding only `(`
    LParen,
    RParen,
    Newline,
    /// Any other line content
    Text,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
enum LogosTokenKind {
    #[regex(r"[ \t\f]*\[[ \t\f]*", priority = 3)]
    LBracket,
    #[regex(r"[ \t\f]*\][ \t\f]*", priority = 3)]
    RBracket,
    #[regex(r"[ \t\f]*\([ \t\f]*", priority = 3)]
    LParen,
    #[regex(r"[ \t\f]*\)[ \t\f]*", priority = 3)]
    RParen,
    #[regex(r"\r\n|\n|\r")]
    Newline,
    #[regex(r"[^\r\n]+")]
    Text,
}
