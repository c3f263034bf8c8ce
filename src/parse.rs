use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{Ast, Operator},
    lex::{Token, TokenKind},
};

#[derive(Error, Debug, Diagnostic)]
pub enum SyntacticError {
    #[error("Unexpected end of input at offset {offset}, expected a binary number")]
    #[diagnostic(
        code(binexpr::syntax::eof),
        help("every operator needs a binary number on its right")
    )]
    UnexpectedEnd {
        #[source_code]
        src: NamedSource<String>,
        #[label("expression ends here")]
        span: SourceSpan,
        offset: usize,
    },

    #[error("Operator '{operator}' at offset {offset} has no left operand")]
    #[diagnostic(
        code(binexpr::syntax::missing_operand),
        help("put a binary number before `{operator}`")
    )]
    MissingLeftOperand {
        #[source_code]
        src: NamedSource<String>,
        #[label("this operator")]
        span: SourceSpan,
        operator: String,
        offset: usize,
    },

    #[error("Unexpected token '{lexeme}' at offset {offset}, expected a binary number")]
    #[diagnostic(code(binexpr::syntax::unexpected))]
    UnexpectedToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        lexeme: String,
        offset: usize,
    },

    #[error("Unexpected token '{lexeme}' at offset {offset}, expected end of expression")]
    #[diagnostic(
        code(binexpr::syntax::trailing),
        help("separate numbers with `+` or `-`")
    )]
    TrailingToken {
        #[source_code]
        src: NamedSource<String>,
        #[label("this token")]
        span: SourceSpan,
        lexeme: String,
        offset: usize,
    },

    #[error("Empty binary number at offset {offset}")]
    #[diagnostic(code(binexpr::syntax::empty_number))]
    EmptyNumber {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected binary digits")]
        span: SourceSpan,
        offset: usize,
    },
}

impl SyntacticError {
    pub fn offset(&self) -> usize {
        match self {
            SyntacticError::UnexpectedEnd { offset, .. }
            | SyntacticError::MissingLeftOperand { offset, .. }
            | SyntacticError::UnexpectedToken { offset, .. }
            | SyntacticError::TrailingToken { offset, .. }
            | SyntacticError::EmptyNumber { offset, .. } => *offset,
        }
    }
}

/// Recursive descent parser for
///
/// ```text
/// expression := term ( ('+' | '-') term )*
/// term       := NUMBER
/// ```
pub struct Parser<'de, 't> {
    filename: Option<&'de str>,
    whole: &'de str,
    tokens: &'t [Token<'de>],
    index: usize,
    current: Option<Token<'de>>,
}

impl<'de, 't> Parser<'de, 't> {
    pub fn new(filename: Option<&'de str>, whole: &'de str, tokens: &'t [Token<'de>]) -> Self {
        Parser {
            filename,
            whole,
            tokens,
            index: 0,
            current: tokens.first().copied(),
        }
    }

    pub fn parse(mut self) -> Result<Ast, SyntacticError> {
        let ast = self.expression()?;

        match self.current {
            Some(token) if token.kind != TokenKind::End => Err(SyntacticError::TrailingToken {
                src: self.source(),
                span: self.span(&token),
                lexeme: token.lexeme.to_string(),
                offset: token.offset,
            }),
            _ => Ok(ast),
        }
    }

    fn advance(&mut self) {
        if self.index + 1 < self.tokens.len() {
            self.index += 1;
            self.current = Some(self.tokens[self.index]);
        }
    }

    fn expression(&mut self) -> Result<Ast, SyntacticError> {
        let mut node = self.term()?;

        while let Some(token) = self.current {
            let operator = match token.kind {
                TokenKind::Plus => Operator::Plus,
                TokenKind::Minus => Operator::Minus,
                _ => break,
            };
            self.advance();
            let right = self.term()?;
            trace!(%operator, offset = token.offset, "folding binary operation");
            node = Ast::binary(node, operator, right, token.offset);
        }

        Ok(node)
    }

    fn term(&mut self) -> Result<Ast, SyntacticError> {
        let token = match self.current {
            None => {
                return Err(self.unexpected_end(self.whole.len()));
            }
            Some(Token {
                kind: TokenKind::End,
                offset,
                ..
            }) => {
                return Err(self.unexpected_end(offset));
            }
            Some(token) => token,
        };

        match token.kind {
            TokenKind::Number if token.lexeme.is_empty() => Err(SyntacticError::EmptyNumber {
                src: self.source(),
                span: SourceSpan::from(token.offset..token.offset),
                offset: token.offset,
            }),
            TokenKind::Number if token.lexeme.chars().all(|c| matches!(c, '0' | '1')) => {
                self.advance();
                Ok(Ast::number(token.lexeme))
            }
            TokenKind::Plus | TokenKind::Minus => Err(SyntacticError::MissingLeftOperand {
                src: self.source(),
                span: self.span(&token),
                operator: token.lexeme.to_string(),
                offset: token.offset,
            }),
            _ => Err(SyntacticError::UnexpectedToken {
                src: self.source(),
                span: self.span(&token),
                lexeme: token.lexeme.to_string(),
                offset: token.offset,
            }),
        }
    }

    fn unexpected_end(&self, offset: usize) -> SyntacticError {
        let offset = offset.min(self.whole.len());
        SyntacticError::UnexpectedEnd {
            src: self.source(),
            span: SourceSpan::from(offset..offset),
            offset,
        }
    }

    fn span(&self, token: &Token<'de>) -> SourceSpan {
        SourceSpan::from(token.offset..token.offset + token.lexeme.len())
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Lexer;

    fn parse(input: &str) -> Result<Ast, SyntacticError> {
        let tokens = Lexer::new(None, input).tokenize().expect("input should lex");
        Parser::new(None, input, &tokens).parse()
    }

    #[test]
    fn single_number() {
        assert_eq!(parse("101").unwrap(), Ast::number("101"));
    }

    #[test]
    fn chains_are_left_associative() {
        let ast = parse("1 - 10 + 11").unwrap();
        assert_eq!(ast.to_string(), "(+ (- 1 10) 11)");
        assert_eq!(
            ast,
            Ast::binary(
                Ast::binary(Ast::number("1"), Operator::Minus, Ast::number("10"), 2),
                Operator::Plus,
                Ast::number("11"),
                7,
            )
        );
    }

    #[test]
    fn depth_equals_operator_count() {
        let ast = parse("1+1+1+1-1").unwrap();
        assert_eq!(ast.operator_count(), 4);
        assert_eq!(ast.depth(), 4);
    }

    #[test]
    fn operator_without_left_operand() {
        let err = parse("+1").unwrap_err();
        assert!(matches!(err, SyntacticError::MissingLeftOperand { ref operator, .. } if operator == "+"));
        assert_eq!(err.offset(), 0);

        let err = parse("1+-1").unwrap_err();
        assert!(matches!(err, SyntacticError::MissingLeftOperand { .. }));
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn missing_right_operand_points_at_end() {
        let err = parse("1+").unwrap_err();
        assert!(matches!(err, SyntacticError::UnexpectedEnd { .. }));
        assert_eq!(err.offset(), 2);

        let err = parse("10 - ").unwrap_err();
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn empty_input_is_unexpected_end() {
        let err = parse("").unwrap_err();
        assert!(matches!(err, SyntacticError::UnexpectedEnd { offset: 0, .. }));
    }

    #[test]
    fn adjacent_numbers_leave_a_trailing_token() {
        let err = parse("1 1").unwrap_err();
        assert!(matches!(err, SyntacticError::TrailingToken { ref lexeme, .. } if lexeme == "1"));
        assert_eq!(err.offset(), 2);
    }

    #[test]
    fn empty_tokens_slice_is_unexpected_end() {
        let err = Parser::new(None, "", &[]).parse().unwrap_err();
        assert!(matches!(err, SyntacticError::UnexpectedEnd { offset: 0, .. }));
    }

    #[test]
    fn hand_built_empty_number() {
        let tokens = [
            Token {
                kind: TokenKind::Number,
                lexeme: "",
                offset: 0,
            },
            Token {
                kind: TokenKind::End,
                lexeme: "",
                offset: 0,
            },
        ];
        let err = Parser::new(None, "", &tokens).parse().unwrap_err();
        assert!(matches!(err, SyntacticError::EmptyNumber { offset: 0, .. }));
    }

    #[test]
    fn hand_built_non_binary_number() {
        let tokens = [
            Token {
                kind: TokenKind::Number,
                lexeme: "12",
                offset: 0,
            },
            Token {
                kind: TokenKind::End,
                lexeme: "",
                offset: 2,
            },
        ];
        let err = Parser::new(None, "12", &tokens).parse().unwrap_err();
        assert!(matches!(err, SyntacticError::UnexpectedToken { ref lexeme, .. } if lexeme == "12"));
    }
}
