use std::{error::Error, fmt::Display};

use crate::lexer::Span;

use super::types::Type;

/// Every diagnostic the checker can produce. Fatality is a property of the
/// kind (see [`TypeCheckError::is_fatal`]), not of the reporting site:
/// continuable errors are accumulated and checking proceeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeCheckError {
    UnresolvedReference(UnresolvedReference, Span),
    TypeMismatch(TypeMismatch, Span),
    ArityMismatch(ArityMismatch, Span),
    IllegalGenericUse(IllegalGenericUse, Span),
    IllegalNullableTarget(IllegalNullableTarget, Span),
    DuplicateSymbol(DuplicateSymbol, Span),
    IllegalPattern(IllegalPattern, Span),
    ControlFlowMisuse(ControlFlowMisuse, Span),
    ExhaustivenessFailure(ExhaustivenessFailure, Span),
    MissingBuiltin(MissingBuiltin, Span),
    ImmutableAssign(ImmutableAssign, Span),
    UndefinedVariable(UndefinedVariable, Span),
    MissingDeclarationType(MissingDeclarationType, Span),
}

impl TypeCheckError {
    pub fn span(&self) -> Span {
        match self {
            TypeCheckError::UnresolvedReference(_, span) => span.clone(),
            TypeCheckError::TypeMismatch(_, span) => span.clone(),
            TypeCheckError::ArityMismatch(_, span) => span.clone(),
            TypeCheckError::IllegalGenericUse(_, span) => span.clone(),
            TypeCheckError::IllegalNullableTarget(_, span) => span.clone(),
            TypeCheckError::DuplicateSymbol(_, span) => span.clone(),
            TypeCheckError::IllegalPattern(_, span) => span.clone(),
            TypeCheckError::ControlFlowMisuse(_, span) => span.clone(),
            TypeCheckError::ExhaustivenessFailure(_, span) => span.clone(),
            TypeCheckError::MissingBuiltin(_, span) => span.clone(),
            TypeCheckError::ImmutableAssign(_, span) => span.clone(),
            TypeCheckError::UndefinedVariable(_, span) => span.clone(),
            TypeCheckError::MissingDeclarationType(_, span) => span.clone(),
        }
    }

    fn err(&self) -> Box<dyn Error> {
        match self {
            TypeCheckError::UnresolvedReference(e, _) => Box::new(e.clone()),
            TypeCheckError::TypeMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::ArityMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::IllegalGenericUse(e, _) => Box::new(e.clone()),
            TypeCheckError::IllegalNullableTarget(e, _) => Box::new(e.clone()),
            TypeCheckError::DuplicateSymbol(e, _) => Box::new(e.clone()),
            TypeCheckError::IllegalPattern(e, _) => Box::new(e.clone()),
            TypeCheckError::ControlFlowMisuse(e, _) => Box::new(e.clone()),
            TypeCheckError::ExhaustivenessFailure(e, _) => Box::new(e.clone()),
            TypeCheckError::MissingBuiltin(e, _) => Box::new(e.clone()),
            TypeCheckError::ImmutableAssign(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedVariable(e, _) => Box::new(e.clone()),
            TypeCheckError::MissingDeclarationType(e, _) => Box::new(e.clone()),
        }
    }

    /// Fatal errors halt the checker; everything else is reported and
    /// checking continues to surface more diagnostics.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            TypeCheckError::MissingBuiltin(..) | TypeCheckError::UnresolvedReference(..)
        )
    }
}

impl Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.span().to_string(self.err()).as_str())
    }
}

impl Error for TypeCheckError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedReference {
    pub name: String,
}

impl Display for UnresolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("Unresolved reference to '{}'", self.name))
    }
}

impl Error for UnresolvedReference {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: Type,
    pub actual: Type,
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Expected type '{}' but got '{}'",
            self.expected.shortname(),
            self.actual.shortname()
        ))
    }
}

impl Error for TypeMismatch {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityMismatch {
    pub name: String,
    pub expected: usize,
    pub actual: usize,
}

impl Display for ArityMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "'{}' takes {} argument(s) but {} were supplied",
            self.name, self.expected, self.actual
        ))
    }
}

impl Error for ArityMismatch {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IllegalGenericUse {
    pub name: String,
}

impl Display for IllegalGenericUse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "'{}' does not accept generic arguments",
            self.name
        ))
    }
}

impl Error for IllegalGenericUse {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IllegalNullableTarget {
    pub target: Type,
}

impl Display for IllegalNullableTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "'{}' can not hold null",
            self.target.shortname()
        ))
    }
}

impl Error for IllegalNullableTarget {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DuplicateSymbol {
    pub name: String,
}

impl Display for DuplicateSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("'{}' is already defined", self.name))
    }
}

impl Error for DuplicateSymbol {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IllegalPattern {
    pub reason: String,
}

impl Display for IllegalPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for IllegalPattern {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlFlowMisuse {
    pub construct: String,
    pub requirement: String,
}

impl Display for ControlFlowMisuse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "'{}' is only allowed {}",
            self.construct, self.requirement
        ))
    }
}

impl Error for ControlFlowMisuse {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExhaustivenessFailure {
    pub reason: String,
}

impl Display for ExhaustivenessFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reason)
    }
}

impl Error for ExhaustivenessFailure {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingBuiltin {
    pub name: String,
}

impl Display for MissingBuiltin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "required standard library type '{}' is missing",
            self.name
        ))
    }
}

impl Error for MissingBuiltin {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmutableAssign {
    pub name: String,
}

impl Display for ImmutableAssign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "can not assign to immutable binding '{}'",
            self.name
        ))
    }
}

impl Error for ImmutableAssign {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedVariable {
    pub variable_name: String,
}

impl Display for UndefinedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "Tried to access undefined variable {}",
            self.variable_name
        ))
    }
}

impl Error for UndefinedVariable {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingDeclarationType {
    pub name: String,
}

impl Display for MissingDeclarationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "'{}' needs a type annotation; its initializer type is unknown",
            self.name
        ))
    }
}

impl Error for MissingDeclarationType {}
