use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Block, Expression},
        ParseError, ParseState,
    },
};

/// `if (cond) { ... } else { ... }`: the condition must check to `bool`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct If<T> {
    pub condition: Expression<T>,
    pub then_block: Block<T>,
    pub else_block: Option<Block<T>>,
    pub info: T,
    pub position: Span,
}

impl If<()> {
    pub fn parse(state: &mut ParseState) -> Result<If<()>, ParseError> {
        let start = state.expect(&TokenKind::If)?.position;

        state.expect(&TokenKind::LParen)?;
        let condition = Expression::parse(state)?;
        state.expect(&TokenKind::RParen)?;

        let then_block = Block::parse(state)?;

        let else_block = if state.accept(&TokenKind::Else).is_some() {
            Some(Block::parse(state)?)
        } else {
            None
        };

        let end = else_block
            .as_ref()
            .map(|b| b.position.clone())
            .unwrap_or_else(|| then_block.position.clone());

        Ok(If {
            condition,
            then_block,
            else_block,
            info: (),
            position: start.merge(&end),
        })
    }
}
