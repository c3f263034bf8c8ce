use std::fmt::Display;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug, Diagnostic)]
#[error("Unexpected character '{token}' at offset {offset}")]
#[diagnostic(
    code(binexpr::lexical),
    help("only binary digits (0, 1) and the operators `+` and `-` are allowed")
)]
pub struct LexicalError {
    #[source_code]
    src: NamedSource<String>,

    #[label("this character")]
    bad_bit: SourceSpan,

    pub token: char,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'de> {
    pub kind: TokenKind,
    pub lexeme: &'de str,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    Plus,
    Minus,
    End,
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Number => write!(f, "NUMBER"),
            TokenKind::Plus => write!(f, "PLUS"),
            TokenKind::Minus => write!(f, "MINUS"),
            TokenKind::End => write!(f, "END"),
        }
    }
}

impl Display for Token<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let lexeme = self.lexeme;
        let offset = self.offset;
        match self.kind {
            TokenKind::End => write!(f, "END @{offset}"),
            kind => write!(f, "{kind} {lexeme} @{offset}"),
        }
    }
}

pub struct Lexer<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
    rest: &'de str,
    byte: usize,
    finished: bool,
}

impl<'de> Lexer<'de> {
    pub fn new(filename: Option<&'de str>, input: &'de str) -> Self {
        Lexer {
            filename,
            whole: input,
            rest: input,
            byte: 0,
            finished: false,
        }
    }

    /// Runs the lexer to completion. On success the last token is always
    /// the single `End` token.
    pub fn tokenize(self) -> Result<Vec<Token<'de>>, LexicalError> {
        let tokens = self.collect::<Result<Vec<_>, _>>()?;
        trace!(count = tokens.len(), "tokenized input");
        Ok(tokens)
    }
}

impl<'de> Iterator for Lexer<'de> {
    type Item = Result<Token<'de>, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let mut chars = self.rest.chars();
            let Some(c) = chars.next() else {
                self.finished = true;
                return Some(Ok(Token {
                    kind: TokenKind::End,
                    lexeme: "",
                    offset: self.whole.len(),
                }));
            };
            let start = self.byte;
            let literal = &self.rest[..c.len_utf8()];
            let cur = self.rest;
            self.rest = chars.as_str();
            self.byte += c.len_utf8();

            let process = |kind: TokenKind| {
                Some(Ok(Token {
                    kind,
                    lexeme: literal,
                    offset: start,
                }))
            };

            match c {
                '+' => return process(TokenKind::Plus),
                '-' => return process(TokenKind::Minus),
                '0' | '1' => {
                    let first_non_digit = cur
                        .find(|c| !matches!(c, '0' | '1'))
                        .unwrap_or(cur.len());
                    let lexeme = &cur[..first_non_digit];

                    let extra_bytes = lexeme.len() - c.len_utf8();
                    self.byte += extra_bytes;
                    self.rest = &self.rest[extra_bytes..];

                    return Some(Ok(Token {
                        kind: TokenKind::Number,
                        lexeme,
                        offset: start,
                    }));
                }
                c if c.is_whitespace() => continue,
                c => {
                    // A failed lexer yields nothing further.
                    self.finished = true;
                    return Some(Err(LexicalError {
                        src: NamedSource::new(
                            self.filename.unwrap_or("<input>"),
                            self.whole.to_string(),
                        ),
                        bad_bit: SourceSpan::from(start..self.byte),
                        token: c,
                        offset: start,
                    }));
                }
            }
        }
    }
}
