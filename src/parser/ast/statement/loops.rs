use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Block, Expression, Id},
        ParseError, ParseState,
    },
};

use super::Statement;

/// `while (cond) { ... }`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WhileLoop<T> {
    pub condition: Expression<T>,
    pub block: Block<T>,
    pub info: T,
    pub position: Span,
}

impl WhileLoop<()> {
    pub fn parse(state: &mut ParseState) -> Result<WhileLoop<()>, ParseError> {
        let start = state.expect(&TokenKind::While)?.position;

        state.expect(&TokenKind::LParen)?;
        let condition = Expression::parse(state)?;
        state.expect(&TokenKind::RParen)?;

        let block = Block::parse(state)?;
        let position = start.merge(&block.position);

        Ok(WhileLoop {
            condition,
            block,
            info: (),
            position,
        })
    }
}

/// `do { ... } while (cond);`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DoWhileLoop<T> {
    pub block: Block<T>,
    pub condition: Expression<T>,
    pub info: T,
    pub position: Span,
}

impl DoWhileLoop<()> {
    pub fn parse(state: &mut ParseState) -> Result<DoWhileLoop<()>, ParseError> {
        let start = state.expect(&TokenKind::Do)?.position;
        let block = Block::parse(state)?;

        state.expect(&TokenKind::While)?;
        state.expect(&TokenKind::LParen)?;
        let condition = Expression::parse(state)?;
        state.expect(&TokenKind::RParen)?;
        let end = state.expect(&TokenKind::Semicolon)?.position;

        Ok(DoWhileLoop {
            block,
            condition,
            info: (),
            position: start.merge(&end),
        })
    }
}

/// `for (init; cond; update) { ... }`
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForLoop<T> {
    pub init: Option<Statement<T>>,
    pub condition: Expression<T>,
    pub update: Option<Statement<T>>,
    pub block: Block<T>,
    pub info: T,
    pub position: Span,
}

impl ForLoop<()> {
    pub fn parse(state: &mut ParseState) -> Result<ForLoop<()>, ParseError> {
        let start = state.expect(&TokenKind::For)?.position;
        state.expect(&TokenKind::LParen)?;

        let init = if state.accept(&TokenKind::Semicolon).is_some() {
            None
        } else {
            // The init statement consumes its own semicolon.
            Some(Statement::parse(state)?)
        };

        let condition = Expression::parse(state)?;
        state.expect(&TokenKind::Semicolon)?;

        let update = if matches!(state.peek_kind(), TokenKind::RParen) {
            None
        } else {
            Some(Self::parse_update(state)?)
        };

        state.expect(&TokenKind::RParen)?;
        let block = Block::parse(state)?;
        let position = start.merge(&block.position);

        Ok(ForLoop {
            init,
            condition,
            update,
            block,
            info: (),
            position,
        })
    }

    /// The update clause is an assignment or expression without the
    /// trailing semicolon.
    fn parse_update(state: &mut ParseState) -> Result<Statement<()>, ParseError> {
        let expression = Expression::parse(state)?;

        if state.accept(&TokenKind::Assign).is_some() {
            let value = Expression::parse(state)?;
            let position = expression.position().merge(&value.position());
            return Ok(Statement::Assignment(super::Assignment {
                target: expression,
                value,
                info: (),
                position,
            }));
        }

        Ok(Statement::Expression(expression))
    }
}

/// `foreach (i, v in expr) { ... }` or `foreach (v in expr) { ... }`.
/// Desugared by the checker into a plain `for` before its body is checked.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ForeachLoop<T> {
    pub index: Option<Id<T>>,
    pub value: Id<T>,
    pub iterable: Expression<T>,
    pub block: Block<T>,
    pub info: T,
    pub position: Span,
}

impl ForeachLoop<()> {
    pub fn parse(state: &mut ParseState) -> Result<ForeachLoop<()>, ParseError> {
        let start = state.expect(&TokenKind::Foreach)?.position;
        state.expect(&TokenKind::LParen)?;

        let (first, first_position) = state.expect_identifier()?;
        let first = Id::new(first, first_position);

        let (index, value) = if state.accept(&TokenKind::Comma).is_some() {
            let (second, second_position) = state.expect_identifier()?;
            (Some(first), Id::new(second, second_position))
        } else {
            (None, first)
        };

        state.expect(&TokenKind::In)?;
        let iterable = Expression::parse(state)?;
        state.expect(&TokenKind::RParen)?;

        let block = Block::parse(state)?;
        let position = start.merge(&block.position);

        Ok(ForeachLoop {
            index,
            value,
            iterable,
            block,
            info: (),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn state(input: &str) -> ParseState {
        ParseState::new(Lexer::new(input).lex().unwrap())
    }

    #[test]
    fn test_parse_while() {
        assert!(WhileLoop::parse(&mut state("while (true) {}")).is_ok());
    }

    #[test]
    fn test_parse_do_while() {
        assert!(DoWhileLoop::parse(&mut state("do {} while (false);")).is_ok());
    }

    #[test]
    fn test_parse_for() {
        let f = ForLoop::parse(&mut state("for (let i = 0; i < 10; i = i + 1) {}"))
            .expect("parsing failed");
        assert!(f.init.is_some());
        assert!(f.update.is_some());
    }

    #[test]
    fn test_parse_foreach_with_index() {
        let f = ForeachLoop::parse(&mut state("foreach (i, v in xs) {}")).expect("parsing failed");
        assert!(f.index.is_some());
        assert_eq!(f.value.name, "v");
    }
}
