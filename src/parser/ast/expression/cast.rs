use crate::{lexer::Span, parser::ast::TypeName};

use super::Expression;

/// The three cast forms: `as` (checked static conversion), `as!` (unchecked)
/// and `as?` (produces a nullable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CastMode {
    Regular,
    Force,
    Safe,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cast<T> {
    pub expression: Expression<T>,
    pub target: TypeName,
    pub mode: CastMode,
    pub info: T,
    pub position: Span,
}

/// `expr is Type`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InstanceCheck<T> {
    pub expression: Expression<T>,
    pub target: TypeName,
    pub info: T,
    pub position: Span,
}
