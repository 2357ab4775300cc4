use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
    typechecker::Type,
};

use super::Expression;

/// Call, index and member access chains. The `overload` slot on index nodes
/// is populated by the checker when indexing resolves to an overloaded
/// `get`/`set` method instead of built-in array indexing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Postfix<T> {
    Call {
        expr: Expression<T>,
        args: Vec<Expression<T>>,
        info: T,
        position: Span,
    },
    Index {
        expr: Expression<T>,
        index: Expression<T>,
        #[serde(skip)]
        overload: Option<Box<Type>>,
        info: T,
        position: Span,
    },
    Property {
        expr: Expression<T>,
        property: String,
        info: T,
        position: Span,
    },
    NullableProperty {
        expr: Expression<T>,
        property: String,
        info: T,
        position: Span,
    },
}

impl<T> Postfix<T>
where
    T: Clone,
{
    pub fn get_info(&self) -> T {
        match self {
            Postfix::Call { info, .. } => info.clone(),
            Postfix::Index { info, .. } => info.clone(),
            Postfix::Property { info, .. } => info.clone(),
            Postfix::NullableProperty { info, .. } => info.clone(),
        }
    }

    pub fn position(&self) -> Span {
        match self {
            Postfix::Call { position, .. } => position.clone(),
            Postfix::Index { position, .. } => position.clone(),
            Postfix::Property { position, .. } => position.clone(),
            Postfix::NullableProperty { position, .. } => position.clone(),
        }
    }
}

impl Postfix<()> {
    /// Parse a primary expression followed by any number of postfix
    /// operations.
    pub fn parse_chain(state: &mut ParseState) -> Result<Expression<()>, ParseError> {
        let mut expr = Expression::parse_primary(state)?;

        loop {
            match state.peek_kind() {
                TokenKind::LParen => {
                    state.next();
                    let mut args = vec![];
                    while !matches!(state.peek_kind(), TokenKind::RParen) {
                        args.push(Expression::parse(state)?);
                        if state.accept(&TokenKind::Comma).is_none() {
                            break;
                        }
                    }
                    let end = state.expect(&TokenKind::RParen)?.position;
                    let position = expr.position().merge(&end);
                    expr = Expression::Postfix(Box::new(Postfix::Call {
                        expr,
                        args,
                        info: (),
                        position,
                    }));
                }
                TokenKind::LBracket => {
                    state.next();
                    let index = Expression::parse(state)?;
                    let end = state.expect(&TokenKind::RBracket)?.position;
                    let position = expr.position().merge(&end);
                    expr = Expression::Postfix(Box::new(Postfix::Index {
                        expr,
                        index,
                        overload: None,
                        info: (),
                        position,
                    }));
                }
                TokenKind::Dot => {
                    state.next();
                    let (property, end) = state.expect_identifier()?;
                    let position = expr.position().merge(&end);
                    expr = Expression::Postfix(Box::new(Postfix::Property {
                        expr,
                        property,
                        info: (),
                        position,
                    }));
                }
                TokenKind::QuestionDot => {
                    state.next();
                    let (property, end) = state.expect_identifier()?;
                    let position = expr.position().merge(&end);
                    expr = Expression::Postfix(Box::new(Postfix::NullableProperty {
                        expr,
                        property,
                        info: (),
                        position,
                    }));
                }
                _ => break,
            }
        }

        Ok(expr)
    }
}
