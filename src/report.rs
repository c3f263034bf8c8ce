use std::fmt::{self, Display};

use num_bigint::BigUint;

use crate::analysis::{AnalysisResult, ErrorKind};

/// Human-readable rendering of an [`AnalysisResult`]: tokens, tree, result
/// and a decimal cross-check on success; message, location and a hint on
/// failure.
pub struct Report<'a> {
    input: &'a str,
    analysis: &'a AnalysisResult<'a>,
}

impl<'a> Report<'a> {
    pub fn new(input: &'a str, analysis: &'a AnalysisResult<'a>) -> Self {
        Report { input, analysis }
    }
}

/// Rewrites every binary number in `expression` as its decimal value,
/// leaving operators and spacing alone: `1010 + 11` becomes `10 + 3`.
pub fn decimal_expression(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut rest = expression;
    while let Some(start) = rest.find(['0', '1']) {
        out.push_str(&rest[..start]);
        let digits = &rest[start..];
        let end = digits.find(|c| !matches!(c, '0' | '1')).unwrap_or(digits.len());
        match BigUint::parse_bytes(digits[..end].as_bytes(), 2) {
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&digits[..end]),
        }
        rest = &digits[end..];
    }
    out.push_str(rest);
    out
}

/// One-line cross-check of a result, e.g. `1010+11 = 10+3 = 13 = 1101`.
pub fn verification(expression: &str, result: &str) -> Option<String> {
    let value = BigUint::parse_bytes(result.as_bytes(), 2)?;
    Some(format!(
        "{expression} = {} = {value} = {}",
        decimal_expression(expression),
        value.to_str_radix(2)
    ))
}

pub fn hint(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Lexical => "only use binary digits (0, 1) and the operators + and -",
        ErrorKind::Syntactic => "make sure every operator has a binary number on both sides",
        ErrorKind::Semantic => {
            "negative results are not supported, keep every subtraction non-negative"
        }
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "expression: {}", self.input)?;
        match self.analysis {
            AnalysisResult::Success {
                tokens,
                ast,
                result,
                original,
            } => {
                writeln!(f, "tokens:")?;
                for (index, token) in tokens.iter().enumerate() {
                    writeln!(f, "  {}. {token}", index + 1)?;
                }
                writeln!(f, "ast:")?;
                for line in ast.tree().lines() {
                    writeln!(f, "  {line}")?;
                }
                match BigUint::parse_bytes(result.as_bytes(), 2) {
                    Some(value) => writeln!(f, "result: {result} (decimal {value})")?,
                    None => writeln!(f, "result: {result}")?,
                }
                if let Some(check) = verification(original, result) {
                    writeln!(f, "check: {check}")?;
                }
                Ok(())
            }
            AnalysisResult::Failure {
                error,
                kind,
                position,
                length,
            } => {
                writeln!(f, "error: {error}")?;
                writeln!(f, "kind: {kind}, position {position}, length {length}")?;

                let before = self
                    .input
                    .get(..*position)
                    .map_or(*position, |s| s.chars().count());
                let end = (*position + *length).min(self.input.len());
                let marked = self
                    .input
                    .get(*position..end)
                    .map_or(1, |s| s.chars().count())
                    .max(1);
                writeln!(f, "  {}", self.input)?;
                writeln!(f, "  {}{}", " ".repeat(before), "^".repeat(marked))?;
                writeln!(f, "hint: {}", hint(*kind))
            }
        }
    }
}
