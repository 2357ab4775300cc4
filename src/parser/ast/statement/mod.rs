mod assignment;
mod control_flow;
mod ffi_declaration;
mod function_declaration;
mod if_statement;
mod loops;
mod type_declaration;
mod variable_declaration;

pub use self::assignment::*;
pub use self::control_flow::*;
pub use self::ffi_declaration::*;
pub use self::function_declaration::*;
pub use self::if_statement::*;
pub use self::loops::*;
pub use self::type_declaration::*;
pub use self::variable_declaration::*;

use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

use super::{Expression, MatchExpression};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Statement<T> {
    Expression(Expression<T>),
    /// Trailing block expression without semicolon; its value becomes the
    /// block's value.
    YieldingExpression(Expression<T>),
    VariableDeclaration(VariableDeclaration<T>),
    Assignment(Assignment<T>),
    Return(ReturnStatement<T>),
    Break(BreakStatement<T>),
    Continue(ContinueStatement<T>),
    If(If<T>),
    While(WhileLoop<T>),
    DoWhile(DoWhileLoop<T>),
    For(Box<ForLoop<T>>),
    Foreach(Box<ForeachLoop<T>>),
    Match(Box<MatchExpression<T>>),
    Function(FunctionDeclaration<T>),
    /// Produced by desugaring passes; never parsed directly.
    Block(crate::parser::ast::Block<T>),
}

impl<T> Statement<T>
where
    T: Clone,
{
    pub fn position(&self) -> Span {
        match self {
            Statement::Expression(expr) => expr.position(),
            Statement::YieldingExpression(expr) => expr.position(),
            Statement::VariableDeclaration(decl) => decl.position.clone(),
            Statement::Assignment(assignment) => assignment.position.clone(),
            Statement::Return(ret) => ret.position.clone(),
            Statement::Break(stmt) => stmt.position.clone(),
            Statement::Continue(stmt) => stmt.position.clone(),
            Statement::If(stmt) => stmt.position.clone(),
            Statement::While(stmt) => stmt.position.clone(),
            Statement::DoWhile(stmt) => stmt.position.clone(),
            Statement::For(stmt) => stmt.position.clone(),
            Statement::Foreach(stmt) => stmt.position.clone(),
            Statement::Match(stmt) => stmt.position.clone(),
            Statement::Function(decl) => decl.position.clone(),
            Statement::Block(block) => block.position.clone(),
        }
    }
}

impl Statement<()> {
    pub fn parse(state: &mut ParseState) -> Result<Statement<()>, ParseError> {
        match state.peek_kind() {
            TokenKind::Let | TokenKind::Const => Ok(Statement::VariableDeclaration(
                VariableDeclaration::parse(state)?,
            )),
            TokenKind::Return => Ok(Statement::Return(ReturnStatement::parse(state)?)),
            TokenKind::Break => Ok(Statement::Break(BreakStatement::parse(state)?)),
            TokenKind::Continue => Ok(Statement::Continue(ContinueStatement::parse(state)?)),
            TokenKind::If => Ok(Statement::If(If::parse(state)?)),
            TokenKind::While => Ok(Statement::While(WhileLoop::parse(state)?)),
            TokenKind::Do => Ok(Statement::DoWhile(DoWhileLoop::parse(state)?)),
            TokenKind::For => Ok(Statement::For(Box::new(ForLoop::parse(state)?))),
            TokenKind::Foreach => Ok(Statement::Foreach(Box::new(ForeachLoop::parse(state)?))),
            TokenKind::Fn => Ok(Statement::Function(FunctionDeclaration::parse(state)?)),
            TokenKind::Match => {
                let match_expression = MatchExpression::parse(state)?;
                if matches!(state.peek_kind(), TokenKind::RBrace) {
                    // Trailing match without semicolon is the block's value.
                    return Ok(Statement::YieldingExpression(Expression::Match(Box::new(
                        match_expression,
                    ))));
                }
                state.accept(&TokenKind::Semicolon);
                Ok(Statement::Match(Box::new(match_expression)))
            }
            _ => Self::parse_expression_statement(state),
        }
    }

    fn parse_expression_statement(state: &mut ParseState) -> Result<Statement<()>, ParseError> {
        let expression = Expression::parse(state)?;

        if matches!(state.peek_kind(), TokenKind::Assign) {
            state.next();
            let value = Expression::parse(state)?;
            let position = expression.position().merge(&value.position());
            state.expect(&TokenKind::Semicolon)?;

            return Ok(Statement::Assignment(Assignment {
                target: expression,
                value,
                info: (),
                position,
            }));
        }

        if state.accept(&TokenKind::Semicolon).is_some() {
            return Ok(Statement::Expression(expression));
        }

        if matches!(state.peek_kind(), TokenKind::RBrace) {
            return Ok(Statement::YieldingExpression(expression));
        }

        Err(state.error("expected ';' after expression"))
    }
}

/// Everything that is allowed at the top level of a compilation unit.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TopLevelStatement<T> {
    Function(FunctionDeclaration<T>),
    TypeDeclaration(TypeDeclaration<T>),
    Ffi(FfiDeclaration<T>),
    VariableDeclaration(VariableDeclaration<T>),
}

impl TopLevelStatement<()> {
    pub fn parse(state: &mut ParseState) -> Result<TopLevelStatement<()>, ParseError> {
        match state.peek_kind() {
            TokenKind::Fn => Ok(TopLevelStatement::Function(FunctionDeclaration::parse(
                state,
            )?)),
            TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Variant
            | TokenKind::Enum
            | TokenKind::Type => Ok(TopLevelStatement::TypeDeclaration(TypeDeclaration::parse(
                state,
            )?)),
            TokenKind::Namespace => Ok(TopLevelStatement::Ffi(FfiDeclaration::parse(state)?)),
            TokenKind::Let | TokenKind::Const => Ok(TopLevelStatement::VariableDeclaration(
                VariableDeclaration::parse(state)?,
            )),
            other => Err(state.error(format!(
                "expected a declaration but found {}",
                other.describe()
            ))),
        }
    }
}
