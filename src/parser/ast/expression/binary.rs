use crate::lexer::{Span, TokenKind};

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOperator {
    /// Map a token to its operator and precedence (higher binds tighter).
    pub fn from_token(kind: &TokenKind) -> Option<(BinaryOperator, u8)> {
        let op = match kind {
            TokenKind::DoublePipe => (BinaryOperator::Or, 1),
            TokenKind::DoubleAmpersand => (BinaryOperator::And, 2),
            TokenKind::Pipe => (BinaryOperator::BitOr, 3),
            TokenKind::Caret => (BinaryOperator::BitXor, 4),
            TokenKind::Ampersand => (BinaryOperator::BitAnd, 5),
            TokenKind::Equal => (BinaryOperator::Equals, 6),
            TokenKind::NotEqual => (BinaryOperator::NotEquals, 6),
            TokenKind::LessThan => (BinaryOperator::LessThan, 7),
            TokenKind::LessOrEqual => (BinaryOperator::LessOrEqual, 7),
            TokenKind::GreaterThan => (BinaryOperator::GreaterThan, 7),
            TokenKind::GreaterOrEqual => (BinaryOperator::GreaterOrEqual, 7),
            TokenKind::ShiftLeft => (BinaryOperator::ShiftLeft, 8),
            TokenKind::ShiftRight => (BinaryOperator::ShiftRight, 8),
            TokenKind::Plus => (BinaryOperator::Add, 9),
            TokenKind::Minus => (BinaryOperator::Subtract, 9),
            TokenKind::Times => (BinaryOperator::Multiply, 10),
            TokenKind::Divide => (BinaryOperator::Divide, 10),
            TokenKind::Percent => (BinaryOperator::Modulo, 10),
            _ => return None,
        };

        Some(op)
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::GreaterThan
                | BinaryOperator::LessThan
                | BinaryOperator::GreaterOrEqual
                | BinaryOperator::LessOrEqual
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinaryOperator::BitAnd
                | BinaryOperator::BitOr
                | BinaryOperator::BitXor
                | BinaryOperator::ShiftLeft
                | BinaryOperator::ShiftRight
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryExpression<T> {
    pub left: Expression<T>,
    pub right: Expression<T>,
    pub operator: BinaryOperator,
    pub info: T,
    pub position: Span,
}
