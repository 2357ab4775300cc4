use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::TypeName, ParseError, ParseState},
};

use super::Expression;

/// `new C<Args>(args)`: class instantiation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct New<T> {
    pub class: TypeName,
    pub args: Vec<Expression<T>>,
    pub info: T,
    pub position: Span,
}

impl New<()> {
    pub fn parse(state: &mut ParseState) -> Result<New<()>, ParseError> {
        let start = state.expect(&TokenKind::New)?.position;
        let (class, args, end) = parse_constructor(state)?;

        Ok(New {
            class,
            args,
            info: (),
            position: start.merge(&end),
        })
    }
}

/// `spawn C(args)`: constructs the class and wraps it into a process.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spawn<T> {
    pub class: TypeName,
    pub args: Vec<Expression<T>>,
    pub info: T,
    pub position: Span,
}

impl Spawn<()> {
    pub fn parse(state: &mut ParseState) -> Result<Spawn<()>, ParseError> {
        let start = state.expect(&TokenKind::Spawn)?.position;
        let (class, args, end) = parse_constructor(state)?;

        Ok(Spawn {
            class,
            args,
            info: (),
            position: start.merge(&end),
        })
    }
}

fn parse_constructor(
    state: &mut ParseState,
) -> Result<(TypeName, Vec<Expression<()>>, Span), ParseError> {
    let class = TypeName::parse(state)?;

    state.expect(&TokenKind::LParen)?;
    let mut args = vec![];
    while !matches!(state.peek_kind(), TokenKind::RParen) {
        args.push(Expression::parse(state)?);
        if state.accept(&TokenKind::Comma).is_none() {
            break;
        }
    }
    let end = state.expect(&TokenKind::RParen)?.position;

    Ok((class, args, end))
}
