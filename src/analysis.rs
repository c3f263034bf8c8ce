use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use crate::{
    Evaluator, Lexer, Parser,
    ast::Ast,
    eval::SemanticError,
    lex::{LexicalError, Token},
    parse::SyntacticError,
};

/// Any failure raised by one of the pipeline stages.
#[derive(Error, Debug, Diagnostic)]
pub enum AnalysisError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntactic(#[from] SyntacticError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Semantic(#[from] SemanticError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lexical,
    Syntactic,
    Semantic,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Lexical => write!(f, "LexicalError"),
            ErrorKind::Syntactic => write!(f, "SyntacticError"),
            ErrorKind::Semantic => write!(f, "SemanticError"),
        }
    }
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::Lexical(_) => ErrorKind::Lexical,
            AnalysisError::Syntactic(_) => ErrorKind::Syntactic,
            AnalysisError::Semantic(_) => ErrorKind::Semantic,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            AnalysisError::Lexical(e) => e.offset,
            AnalysisError::Syntactic(e) => e.offset(),
            AnalysisError::Semantic(e) => e.offset(),
        }
    }

    /// Number of bytes a caller should highlight starting at
    /// [`offset`](Self::offset). Empty-number errors span the run of binary
    /// digits that follows, everything else marks a single character.
    pub fn highlight_length(&self, input: &str) -> usize {
        match self {
            AnalysisError::Lexical(e) => e.token.len_utf8(),
            AnalysisError::Syntactic(SyntacticError::EmptyNumber { offset, .. }) => input
                .as_bytes()
                .get(*offset..)
                .map(|rest| rest.iter().take_while(|b| matches!(b, b'0' | b'1')).count())
                .unwrap_or(0)
                .max(1),
            _ => 1,
        }
    }
}

/// Outcome of a full lex → parse → evaluate run over one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisResult<'de> {
    Success {
        tokens: Vec<Token<'de>>,
        ast: Ast,
        result: String,
        original: &'de str,
    },
    Failure {
        error: String,
        kind: ErrorKind,
        position: usize,
        length: usize,
    },
}

impl AnalysisResult<'_> {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success { .. })
    }
}

/// Runs every stage, stopping at the first failure.
pub fn run<'de>(
    filename: Option<&'de str>,
    input: &'de str,
) -> Result<(Vec<Token<'de>>, Ast, String), AnalysisError> {
    let tokens = Lexer::new(filename, input).tokenize()?;
    let ast = Parser::new(filename, input, &tokens).parse()?;
    let result = Evaluator::new(filename, input).evaluate(&ast)?;
    Ok((tokens, ast, result))
}

/// Analyzes `input` and folds any stage failure into
/// [`AnalysisResult::Failure`].
pub fn analyze(input: &str) -> AnalysisResult<'_> {
    match run(None, input) {
        Ok((tokens, ast, result)) => {
            debug!(%ast, %result, "analysis succeeded");
            AnalysisResult::Success {
                tokens,
                ast,
                result,
                original: input,
            }
        }
        Err(e) => {
            let position = e.offset().min(input.len());
            let length = e.highlight_length(input);
            debug!(kind = %e.kind(), position, length, "analysis failed: {e}");
            AnalysisResult::Failure {
                error: e.to_string(),
                kind: e.kind(),
                position,
                length,
            }
        }
    }
}
