use logos::{Lexer, Logos};

pub(super) struct Token {
    pub(super) kind: TokenKind,
    pub(super) span: logos::Span,
}

/// Character data and markup are lexed separately from the inside of a
/// start tag, so quotes in text never pair up with quotes in attributes.
enum Mode<'a> {
    Content(Lexer<'a, ContentToken>),
    Tag(Lexer<'a, TagToken>),
}

pub(super) struct TokenIter<'a> {
    input: &'a str,
    mode: Option<Mode<'a>>,
}

impl<'a> TokenIter<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            mode: Some(Mode::Content(ContentToken::lexer(input))),
        }
    }

    fn next_content(&mut self, mut lexer: Lexer<'a, ContentToken>) -> Option<Token> {
        let kind = lexer.next()?;
        let span = lexer.span();
        let (kind, span) = match kind {
            Ok(ContentToken::StartTag) => {
                self.mode = Some(Mode::Tag(lexer.morph()));
                return Some(Token {
                    kind: TokenKind::StartTag,
                    span: (span.start + 1)..span.end,
                });
            }
            Ok(ContentToken::EndTag) => {
                let name = span.start + 2;
                let len = self.input[name..span.end]
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(0);
                (TokenKind::EndTag, name..name + len)
            }
            Ok(ContentToken::Text) => (TokenKind::Text, span),
            Err(_) => (TokenKind::Error, span),
        };
        self.mode = Some(Mode::Content(lexer));
        Some(Token { kind, span })
    }

    fn next_in_tag(&mut self, mut lexer: Lexer<'a, TagToken>) -> Option<Token> {
        let kind = lexer.next()?;
        let span = lexer.span();
        let (kind, span) = match kind {
            Ok(TagToken::EmptyTagEnd) | Ok(TagToken::TagEnd) => {
                let kind = if kind == Ok(TagToken::TagEnd) {
                    TokenKind::TagEnd
                } else {
                    TokenKind::EmptyTagEnd
                };
                self.mode = Some(Mode::Content(lexer.morph()));
                return Some(Token { kind, span });
            }
            Ok(TagToken::Eq) => (TokenKind::Eq, span),
            Ok(TagToken::Value) => (TokenKind::Value, (span.start + 1)..(span.end - 1)),
            Ok(TagToken::Name) => (TokenKind::Name, span),
            Err(_) => (TokenKind::Error, span),
        };
        self.mode = Some(Mode::Tag(lexer));
        Some(Token { kind, span })
    }
}

impl<'a> Iterator for TokenIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        match self.mode.take()? {
            Mode::Content(lexer) => self.next_content(lexer),
            Mode::Tag(lexer) => self.next_in_tag(lexer),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum TokenKind {
    /// `<Name`, the span covers the name
    StartTag,
    /// `</Name>`, the span covers the name
    EndTag,
    /// `/>`
    EmptyTagEnd,
    /// `>`
    TagEnd,
    Eq,
    /// Quoted attribute value, the span excludes the quotes
    Value,
    /// Attribute name
    Name,
    /// Character data between tags
    Text,
    Error,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"<\?([^?]|\?[^>])*\?>")]
#[logos(skip r"<!--([^-]|-[^-]|--[^>])*-->")]
#[logos(skip r"<![A-Za-z][^>]*>")]
enum ContentToken {
    #[regex(r"<[A-Za-z_][A-Za-z0-9_.:\-]*")]
    StartTag,
    #[regex(r"</[A-Za-z_][A-Za-z0-9_.:\-]*[ \t\r\n]*>")]
    EndTag,
    #[regex(r"[^<]+")]
    Text,
}

#[derive(Logos, Clone, Copy, Debug, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum TagToken {
    #[token("/>")]
    EmptyTagEnd,
    #[token(">")]
    TagEnd,
    #[token("=")]
    Eq,
    #[regex(r#""[^"]*""#)]
    #[regex(r"'[^']*'")]
    Value,
    #[regex(r#"[^<>=/"' \t\r\n]+"#)]
    Name,
}
