use std::fmt::{self, Display, Write};

use num_bigint::BigUint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Plus,
    Minus,
}

impl Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Plus => write!(f, "+"),
            Operator::Minus => write!(f, "-"),
        }
    }
}

/// Expression tree produced by the parser.
///
/// Chains fold to the left, so `1 - 10 + 11` is
/// `BinaryOp(BinaryOp(1 - 10) + 11)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ast {
    Number {
        digits: String,
    },
    BinaryOp {
        left: Box<Ast>,
        operator: Operator,
        right: Box<Ast>,
        /// Offset of the operator token in the source.
        offset: usize,
    },
}

impl Ast {
    pub fn number(digits: impl Into<String>) -> Self {
        Ast::Number {
            digits: digits.into(),
        }
    }

    pub fn binary(left: Ast, operator: Operator, right: Ast, offset: usize) -> Self {
        Ast::BinaryOp {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            offset,
        }
    }

    /// Number of `BinaryOp` nodes in the tree.
    pub fn operator_count(&self) -> usize {
        match self {
            Ast::Number { .. } => 0,
            Ast::BinaryOp { left, right, .. } => 1 + left.operator_count() + right.operator_count(),
        }
    }

    /// Longest chain of `BinaryOp` nodes from the root down.
    pub fn depth(&self) -> usize {
        match self {
            Ast::Number { .. } => 0,
            Ast::BinaryOp { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    /// Indented text tree, with each number's decimal value alongside.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.write_tree(&mut out, 0);
        out
    }

    fn write_tree(&self, out: &mut String, level: usize) -> fmt::Result {
        let indent = "  ".repeat(level);
        match self {
            Ast::Number { digits } => match BigUint::parse_bytes(digits.as_bytes(), 2) {
                Some(value) => writeln!(out, "{indent}Number {digits} (decimal {value})"),
                None => writeln!(out, "{indent}Number {digits}"),
            },
            Ast::BinaryOp {
                left,
                operator,
                right,
                ..
            } => {
                writeln!(out, "{indent}BinaryOp {operator}")?;
                writeln!(out, "{indent}  left:")?;
                left.write_tree(out, level + 2)?;
                writeln!(out, "{indent}  right:")?;
                right.write_tree(out, level + 2)
            }
        }
    }
}

impl Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Number { digits } => write!(f, "{digits}"),
            Ast::BinaryOp {
                left,
                operator,
                right,
                ..
            } => write!(f, "({operator} {left} {right})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample() -> Ast {
        // 1 - 10 + 11
        Ast::binary(
            Ast::binary(Ast::number("1"), Operator::Minus, Ast::number("10"), 1),
            Operator::Plus,
            Ast::number("11"),
            4,
        )
    }

    #[test]
    fn display_is_prefix() {
        assert_eq!(sample().to_string(), "(+ (- 1 10) 11)");
        assert_eq!(Ast::number("0").to_string(), "0");
    }

    #[test]
    fn depth_follows_operator_count_on_left_spine() {
        let ast = sample();
        assert_eq!(ast.operator_count(), 2);
        assert_eq!(ast.depth(), 2);
        assert_eq!(Ast::number("1").depth(), 0);
    }

    #[test]
    fn tree_shows_decimal_values() {
        let expected = "\
BinaryOp +
  left:
    BinaryOp -
      left:
        Number 1 (decimal 1)
      right:
        Number 10 (decimal 2)
  right:
    Number 11 (decimal 3)
";
        assert_eq!(sample().tree(), expected);
    }
}
