//! Lexer, parser and evaluator for `+`/`-` expressions over unsigned binary
//! numbers, with position-accurate error reporting.
//!
//! ```
//! use binexpr::{AnalysisResult, analyze};
//!
//! match analyze("1010 + 11") {
//!     AnalysisResult::Success { result, .. } => assert_eq!(result, "1101"),
//!     AnalysisResult::Failure { error, .. } => panic!("{error}"),
//! }
//! ```

pub mod analysis;
pub mod ast;
pub mod eval;
pub mod lex;
pub mod parse;
pub mod report;

pub use analysis::{AnalysisError, AnalysisResult, ErrorKind, analyze};
pub use ast::{Ast, Operator};
pub use eval::Evaluator;
pub use lex::Lexer;
pub use parse::Parser;
pub use report::Report;
