//! Type checking and semantic resolution. The checker walks the untyped
//! AST bidirectionally: a top-down *hint* travels through the
//! [`TypeCheckable::check`] calls while the bottom-up *inferred* type lands
//! in the shared [`TypeInformation`] slot of every node; the two are
//! reconciled by the matcher. A second stage ([`TypedConstruct::validate`])
//! guarantees every reachable node ends up with a concrete type.

pub mod builtins;
pub mod context;
pub mod declarations;
pub mod error;
pub mod matcher;
pub mod scope;
pub mod typed_ast;
pub mod types;

use std::fmt::{Display, Formatter};
use std::{cell::RefCell, error::Error, fmt::Debug, rc::Rc};

use crate::lexer::Span;
use crate::parser::ast::TopLevelStatement;

pub use self::types::Type;

use self::context::Context;
use self::error::TypeCheckError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeInformation {
    pub type_id: Rc<RefCell<Option<Type>>>,
    pub context: Context,
}

impl TypeInformation {
    pub fn has_type(&self) -> bool {
        self.type_id.borrow().is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTypeInformation {
    pub type_id: Type,
    pub context: Context,
}

impl TypeInformation {
    fn validate(self, position: &Span) -> Result<ValidatedTypeInformation, TypeValidationError> {
        let TypeInformation { type_id, context } = self;
        let current = type_id.borrow().clone();
        if let Some(type_id) = current {
            Ok(ValidatedTypeInformation { type_id, context })
        } else {
            Err(TypeValidationError(position.clone()))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeValidationError(pub Span);

impl TypeValidationError {
    const MESSAGE: &'static str = "Type must be known at compile time!";

    pub fn span(&self) -> Span {
        self.0.clone()
    }

    pub fn err(&self) -> String {
        Self::MESSAGE.to_string()
    }
}

impl Display for TypeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.to_string(Self::MESSAGE).as_str())
    }
}

impl Error for TypeValidationError {}

pub type TypeResult<T> = Result<T, TypeCheckError>;

/// One node kind of the untyped AST, checked into its typed counterpart.
/// `hint` is the expected type pushed down by the parent; per-node impls
/// may consume it (literals, null, lambdas, ...) and the dispatcher
/// reconciles it against the inferred type afterwards.
pub trait TypeCheckable {
    type Typed;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed>;

    /// Strip type information again, producing a fresh untyped clone.
    /// Used for generic instantiation and pattern lowering, both of which
    /// re-submit reverted nodes to `check`.
    fn revert(this: &Self::Typed) -> Self;
}

/// Registration of a declaration's prototype before its body is checked.
/// Runs for every top level statement so bodies may reference declarations
/// in any order.
pub trait ShallowCheck {
    fn shallow_check(&self, ctx: &mut Context) -> TypeResult<()>;
}

pub trait TypedConstruct
where
    Self: Debug,
{
    type Validated;

    fn validate(self) -> Result<Self::Validated, TypeValidationError>;
}

#[derive(Debug, Clone, Default)]
pub struct TypeChecker {
    context: Context,
    statements: Vec<TopLevelStatement<()>>,
}

impl TypeChecker {
    pub fn new(statements: Vec<TopLevelStatement<()>>) -> TypeChecker {
        TypeChecker {
            statements,
            ..Default::default()
        }
    }

    /// Register every declaration's prototype. Type declarations come
    /// first so function signatures can reference them.
    fn shallow_check(&mut self) -> TypeResult<()> {
        let type_declarations = self
            .statements
            .iter()
            .filter(|stm| matches!(stm, TopLevelStatement::TypeDeclaration(_)))
            .collect::<Vec<_>>();

        let other_statements = self
            .statements
            .iter()
            .filter(|stm| !matches!(stm, TopLevelStatement::TypeDeclaration(_)))
            .collect::<Vec<_>>();

        // Names first, bodies second: forward and mutual references among
        // declarations resolve against the pre-registered name set.
        for statement in &type_declarations {
            if let TopLevelStatement::TypeDeclaration(declaration) = statement {
                match declaration.pre_register(&mut self.context) {
                    Ok(()) => {}
                    Err(error) if error.is_fatal() => return Err(error),
                    Err(error) => self.context.report(error),
                }
            }
        }

        for statement in type_declarations.into_iter().chain(other_statements) {
            match statement.shallow_check(&mut self.context) {
                Ok(()) => {}
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => self.context.report(error),
            }
        }

        Ok(())
    }

    /// Check the whole program. Fatal errors abort; everything else is
    /// accumulated and returned next to the checked statements so a single
    /// run surfaces as many diagnostics as possible.
    pub fn check(
        mut self,
    ) -> TypeResult<(Vec<TopLevelStatement<TypeInformation>>, Vec<TypeCheckError>)> {
        builtins::register(&mut self.context)?;
        self.shallow_check()?;

        let mut checked = vec![];

        for statement in self.statements.iter() {
            match statement.clone().check(&mut self.context, None) {
                Ok(statement) => checked.push(statement),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => self.context.report(error),
            }
        }

        Ok((checked, self.context.reporter.errors()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::parse_program;

    fn check(input: &str) -> (Vec<TopLevelStatement<TypeInformation>>, Vec<TypeCheckError>) {
        let tokens = Lexer::new(input).lex().expect("lexing failed");
        let statements = parse_program(tokens).expect("parsing failed");
        TypeChecker::new(statements).check().expect("fatal error")
    }

    #[test]
    fn test_clean_program_has_no_errors() {
        let (_, errors) = check("fn main() -> void { let x = 42; }");
        assert_eq!(errors, vec![]);
    }

    #[test]
    fn test_errors_accumulate_across_statements() {
        let (_, errors) = check(
            "fn first() -> void { let x: bool = 1; }\nfn second() -> void { let y: bool = 2; }",
        );
        assert_eq!(errors.len(), 2);
    }
}
