use miette::{Diagnostic, NamedSource, SourceSpan};
use num_bigint::BigUint;
use thiserror::Error;
use tracing::trace;

use crate::ast::{Ast, Operator};

#[derive(Error, Debug, Diagnostic)]
pub enum SemanticError {
    #[error("The result of {left} - {right} is negative (-{difference}), only unsigned binary numbers are supported")]
    #[diagnostic(
        code(binexpr::semantic::negative),
        help("make sure the left operand is not smaller than the right one")
    )]
    NegativeResult {
        #[source_code]
        src: NamedSource<String>,
        #[label("this subtraction")]
        span: SourceSpan,
        left: String,
        right: String,
        difference: BigUint,
        offset: usize,
    },

    #[error("Operand '{digits}' of '{operator}' at offset {offset} is not a binary number")]
    #[diagnostic(code(binexpr::semantic::invalid_digits))]
    InvalidDigits {
        #[source_code]
        src: NamedSource<String>,
        #[label("this operation")]
        span: SourceSpan,
        digits: String,
        operator: Operator,
        offset: usize,
    },
}

impl SemanticError {
    pub fn offset(&self) -> usize {
        match self {
            SemanticError::NegativeResult { offset, .. }
            | SemanticError::InvalidDigits { offset, .. } => *offset,
        }
    }
}

/// Tree-walking interpreter producing unsigned binary digit strings.
///
/// Values are arbitrary precision, so any well-formed expression whose
/// intermediate results stay non-negative evaluates exactly.
pub struct Evaluator<'de> {
    filename: Option<&'de str>,
    whole: &'de str,
}

impl<'de> Evaluator<'de> {
    pub fn new(filename: Option<&'de str>, whole: &'de str) -> Self {
        Evaluator { filename, whole }
    }

    pub fn evaluate(&self, node: &Ast) -> Result<String, SemanticError> {
        match node {
            Ast::Number { digits } => Ok(digits.clone()),
            Ast::BinaryOp {
                left,
                operator,
                right,
                offset,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;

                let lhs = self.to_integer(&left, *operator, *offset)?;
                let rhs = self.to_integer(&right, *operator, *offset)?;

                let value = match operator {
                    Operator::Plus => lhs + rhs,
                    Operator::Minus if lhs < rhs => {
                        return Err(SemanticError::NegativeResult {
                            src: self.source(),
                            span: SourceSpan::from(*offset..*offset + 1),
                            difference: rhs - lhs,
                            left,
                            right,
                            offset: *offset,
                        });
                    }
                    Operator::Minus => lhs - rhs,
                };

                let digits = value.to_str_radix(2);
                trace!(
                    lhs = left.as_str(),
                    %operator,
                    rhs = right.as_str(),
                    result = digits.as_str(),
                    "evaluated binary operation"
                );
                Ok(digits)
            }
        }
    }

    fn to_integer(
        &self,
        digits: &str,
        operator: Operator,
        offset: usize,
    ) -> Result<BigUint, SemanticError> {
        BigUint::parse_bytes(digits.as_bytes(), 2).ok_or_else(|| SemanticError::InvalidDigits {
            src: self.source(),
            span: SourceSpan::from(offset..offset + 1),
            digits: digits.to_string(),
            operator,
            offset,
        })
    }

    fn source(&self) -> NamedSource<String> {
        NamedSource::new(self.filename.unwrap_or("<input>"), self.whole.to_string())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn eval(ast: &Ast) -> Result<String, SemanticError> {
        Evaluator::new(None, "").evaluate(ast)
    }

    #[test]
    fn number_is_returned_unchanged() {
        assert_eq!(eval(&Ast::number("0010")).unwrap(), "0010");
    }

    #[test]
    fn addition_and_subtraction() {
        let sum = Ast::binary(Ast::number("1010"), Operator::Plus, Ast::number("11"), 4);
        assert_eq!(eval(&sum).unwrap(), "1101");

        let zero = Ast::binary(Ast::number("11"), Operator::Minus, Ast::number("11"), 2);
        assert_eq!(eval(&zero).unwrap(), "0");
    }

    #[test]
    fn results_drop_leading_zeros() {
        let ast = Ast::binary(Ast::number("0001"), Operator::Plus, Ast::number("0"), 4);
        assert_eq!(eval(&ast).unwrap(), "1");
    }

    #[test]
    fn negative_subtraction_is_rejected() {
        let ast = Ast::binary(Ast::number("1"), Operator::Minus, Ast::number("11"), 1);
        let err = eval(&ast).unwrap_err();
        match &err {
            SemanticError::NegativeResult {
                left,
                right,
                difference,
                offset,
                ..
            } => {
                assert_eq!(left, "1");
                assert_eq!(right, "11");
                assert_eq!(*difference, BigUint::from(2u32));
                assert_eq!(*offset, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("(-2)"));
    }

    #[test]
    fn intermediate_negative_fails_even_if_total_would_not() {
        // (1 - 10) + 11 goes negative before the addition.
        let ast = Ast::binary(
            Ast::binary(Ast::number("1"), Operator::Minus, Ast::number("10"), 1),
            Operator::Plus,
            Ast::number("11"),
            4,
        );
        assert!(matches!(
            eval(&ast),
            Err(SemanticError::NegativeResult { offset: 1, .. })
        ));
    }

    #[test]
    fn wide_operands_are_exact() {
        // 2^130 - 1 plus 1 carries into bit 130.
        let wide = "1".repeat(130);
        let ast = Ast::binary(Ast::number(wide.clone()), Operator::Plus, Ast::number("1"), 130);
        assert_eq!(eval(&ast).unwrap(), format!("1{}", "0".repeat(130)));

        let ast = Ast::binary(Ast::number(wide.clone()), Operator::Plus, Ast::number("0"), 130);
        assert_eq!(eval(&ast).unwrap(), wide);

        let ast = Ast::binary(
            Ast::number(format!("1{}", "0".repeat(200))),
            Operator::Minus,
            Ast::number("1"),
            201,
        );
        assert_eq!(eval(&ast).unwrap(), "1".repeat(200));
    }

    #[test]
    fn hand_built_non_binary_operand() {
        let ast = Ast::binary(Ast::number("12"), Operator::Plus, Ast::number("1"), 2);
        assert!(matches!(
            eval(&ast),
            Err(SemanticError::InvalidDigits { ref digits, offset: 2, .. }) if digits == "12"
        ));
    }
}
