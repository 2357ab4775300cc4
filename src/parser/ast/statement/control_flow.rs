use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::Expression, ParseError, ParseState},
};

/// `return;` or `return expr;`: only valid inside a function.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReturnStatement<T> {
    pub value: Option<Expression<T>>,
    pub info: T,
    pub position: Span,
}

impl ReturnStatement<()> {
    pub fn parse(state: &mut ParseState) -> Result<ReturnStatement<()>, ParseError> {
        let start = state.expect(&TokenKind::Return)?.position;

        let value = if matches!(state.peek_kind(), TokenKind::Semicolon) {
            None
        } else {
            Some(Expression::parse(state)?)
        };

        let end = state.expect(&TokenKind::Semicolon)?.position;

        Ok(ReturnStatement {
            value,
            info: (),
            position: start.merge(&end),
        })
    }
}

/// `break;`: only valid inside a loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BreakStatement<T> {
    pub info: T,
    pub position: Span,
}

impl BreakStatement<()> {
    pub fn parse(state: &mut ParseState) -> Result<BreakStatement<()>, ParseError> {
        let start = state.expect(&TokenKind::Break)?.position;
        let end = state.expect(&TokenKind::Semicolon)?.position;

        Ok(BreakStatement {
            info: (),
            position: start.merge(&end),
        })
    }
}

/// `continue;`: only valid inside a loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContinueStatement<T> {
    pub info: T,
    pub position: Span,
}

impl ContinueStatement<()> {
    pub fn parse(state: &mut ParseState) -> Result<ContinueStatement<()>, ParseError> {
        let start = state.expect(&TokenKind::Continue)?.position;
        let end = state.expect(&TokenKind::Semicolon)?.position;

        Ok(ContinueStatement {
            info: (),
            position: start.merge(&end),
        })
    }
}
