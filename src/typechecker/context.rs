//! Inference context: the current lexical scope, the environment flags of
//! the surrounding construct, the shared diagnostic reporter and the owner
//! record of the enclosing function. Cloned freely; equality is
//! intentionally degenerate because context identity never participates in
//! type equality.

use std::{cell::RefCell, rc::Rc};

use crate::lexer::Span;

use super::{error::TypeCheckError, scope::Scope, types::Type};

/// Which constructs enclose the current checking position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub within_function: bool,
    pub within_loop: bool,
    pub within_class: bool,
    pub within_process: bool,
}

/// Accumulating diagnostic sink shared by every clone of a context.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    errors: Rc<RefCell<Vec<TypeCheckError>>>,
}

impl Reporter {
    pub fn report(&self, error: TypeCheckError) {
        self.errors.borrow_mut().push(error);
    }

    pub fn errors(&self) -> Vec<TypeCheckError> {
        self.errors.borrow().clone()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.borrow().is_empty()
    }
}

/// The enclosing function during body checking: its declared return type
/// and every return site encountered so far.
#[derive(Debug, Clone)]
pub struct FunctionOwner {
    pub return_type: Type,
    pub return_sites: Rc<RefCell<Vec<(Type, Span)>>>,
}

impl FunctionOwner {
    pub fn new(return_type: Type) -> FunctionOwner {
        FunctionOwner {
            return_type,
            return_sites: Rc::default(),
        }
    }

    pub fn register_return(&self, returned: Type, position: Span) {
        self.return_sites.borrow_mut().push((returned, position));
    }
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    pub scope: Scope,
    pub env: Environment,
    pub reporter: Reporter,
    pub owner: Option<FunctionOwner>,
}

impl Context {
    pub fn report(&self, error: TypeCheckError) {
        self.reporter.report(error);
    }
}

impl PartialEq for Context {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Context {}

impl<'a> From<&'a mut Context> for &'a Context {
    fn from(value: &'a mut Context) -> Self {
        value
    }
}
