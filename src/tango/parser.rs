use std::iter::Peekable;

use crate::raw::{ComponentBlock, Line, NetBlock, TangoFile};

use super::lexer::{TokenIter, TokenKind};

/// What a single line of input holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind<'a> {
    Open(BlockKind),
    Close(BlockKind, &'a str),
    Text(&'a str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Component,
    Net,
}

enum State<'a> {
    Outside,
    Inside(BlockKind, usize, Vec<Line<'a>>),
}

pub(super) struct Parser<'a> {
    input: &'a str,
    iter: Peekable<TokenIter<'a>>,
    line: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            input,
            iter: TokenIter::new(input).peekable(),
            line: 0,
        }
    }

    /// Next line of input, `None` at the end
    fn next_line(&mut self) -> Option<(usize, LineKind<'a>)> {
        let token = self.iter.next()?;
        self.line += 1;
        let number = self.line;
        let input = self.input;
        let text = &input[token.span];
        let kind = match token.kind {
            TokenKind::Newline => return Some((number, LineKind::Text(""))),
            TokenKind::LBracket => LineKind::Open(BlockKind::Component),
            TokenKind::RBracket => LineKind::Close(BlockKind::Component, text),
            TokenKind::LParen => LineKind::Open(BlockKind::Net),
            TokenKind::RParen => LineKind::Close(BlockKind::Net, text),
            TokenKind::Text => LineKind::Text(text),
        };
        if let Some(next) = self.iter.peek() {
            if next.kind == TokenKind::Newline {
                self.iter.next();
            }
        }
        Some((number, kind))
    }

    fn finish(file: &mut TangoFile<'a>, kind: BlockKind, line: usize, lines: Vec<Line<'a>>) {
        match kind {
            BlockKind::Component => file.components.push(ComponentBlock { line, lines }),
            BlockKind::Net => file.nets.push(NetBlock { line, lines }),
        }
    }

    pub(super) fn parse_file(mut self) -> TangoFile<'a> {
        let mut file = TangoFile::default();
        let mut state = State::Outside;

        while let Some((number, kind)) = self.next_line() {
            state = match (state, kind) {
                (State::Outside, LineKind::Open(block)) => State::Inside(block, number, vec![]),
                // text between blocks carries no meaning
                (State::Outside, _) => State::Outside,
                (State::Inside(block, start, lines), LineKind::Close(closing, _))
                    if block == closing =>
                {
                    Self::finish(&mut file, block, start, lines);
                    State::Outside
                }
                (State::Inside(_, start, _), LineKind::Open(block)) => {
                    file.unterminated.push(start);
                    State::Inside(block, number, vec![])
                }
                (State::Inside(block, start, mut lines), LineKind::Close(_, text))
                | (State::Inside(block, start, mut lines), LineKind::Text(text)) => {
                    lines.push(Line { number, text });
                    State::Inside(block, start, lines)
                }
            };
        }

        if let State::Inside(_, start, _) = state {
            file.unterminated.push(start);
        }
        file
    }
}
