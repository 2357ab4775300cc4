use crate::lexer::Span;

use super::Expression;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PrefixOperator {
    /// `-x`
    Minus,
    /// `!x`
    Negate,
    /// `~x`
    BitNot,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Prefix<T> {
    pub operator: PrefixOperator,
    pub expression: Expression<T>,
    pub info: T,
    pub position: Span,
}
