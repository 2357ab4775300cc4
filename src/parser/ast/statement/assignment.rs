use crate::{lexer::Span, parser::ast::Expression};

/// `target = value;`. The target must check out as a non-constant l-value
/// (plain variable, index access or property access); the checker enforces
/// this through the `is_constant` discipline on expressions.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Assignment<T> {
    pub target: Expression<T>,
    pub value: Expression<T>,
    pub info: T,
    pub position: Span,
}
