use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Pattern, StructInit},
        ParseError, ParseState,
    },
};

use super::{Block, Expression, Id};

/// `match scrutinee { pattern (if guard)? => body, ... }`. The same node
/// serves the expression form (expression bodies, trailing wildcard
/// required) and the statement form (block bodies allowed).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchExpression<T> {
    pub scrutinee: Expression<T>,
    pub arms: Vec<MatchArm<T>>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MatchArm<T> {
    pub pattern: Pattern<T>,
    pub guard: Option<Expression<T>>,
    pub body: MatchArmBody<T>,
    /// Populated by the checker: the predicate + assignment form this arm
    /// lowers to.
    pub lowered: Option<LoweredArm<T>>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MatchArmBody<T> {
    Expression(Expression<T>),
    Block(Block<T>),
}

/// The lowered form of one arm: an optional pure boolean condition over the
/// scrutinee plus the variable assignments that run once the condition is
/// known true.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoweredArm<T> {
    pub condition: Option<Expression<T>>,
    pub assignments: Vec<LoweredAssignment<T>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoweredAssignment<T> {
    pub target: Id<T>,
    pub value: Expression<T>,
}

impl MatchExpression<()> {
    pub fn parse(state: &mut ParseState) -> Result<MatchExpression<()>, ParseError> {
        let start = state.expect(&TokenKind::Match)?.position;
        let scrutinee = Expression::parse(state)?;
        state.expect(&TokenKind::LBrace)?;

        let mut arms = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            arms.push(MatchArm::parse(state)?);
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(MatchExpression {
            scrutinee,
            arms,
            info: (),
            position: start.merge(&end),
        })
    }
}

impl MatchArm<()> {
    pub fn parse(state: &mut ParseState) -> Result<MatchArm<()>, ParseError> {
        let pattern = Pattern::parse(state)?;
        let start = pattern.position();

        let guard = if state.accept(&TokenKind::If).is_some() {
            Some(Expression::parse(state)?)
        } else {
            None
        };

        state.expect(&TokenKind::BigRightArrow)?;

        let body = if matches!(state.peek_kind(), TokenKind::LBrace) && !StructInit::lookahead(state)
        {
            MatchArmBody::Block(Block::parse(state)?)
        } else {
            MatchArmBody::Expression(Expression::parse(state)?)
        };

        let end = match &body {
            MatchArmBody::Expression(expr) => expr.position(),
            MatchArmBody::Block(block) => block.position.clone(),
        };

        Ok(MatchArm {
            pattern,
            guard,
            body,
            lowered: None,
            info: (),
            position: start.merge(&end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> MatchExpression<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        MatchExpression::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_match_with_wildcard() {
        let m = parse("match o { Opt.Some(x) => x, _ => 0 }");
        assert_eq!(m.arms.len(), 2);
        assert!(matches!(m.arms[0].pattern, Pattern::Datatype(_)));
        assert!(matches!(m.arms[1].pattern, Pattern::Wildcard(_)));
    }

    #[test]
    fn test_parse_guard() {
        let m = parse("match x { n if n == 0 => 1, _ => 2 }");
        assert!(m.arms[0].guard.is_some());
    }

    #[test]
    fn test_parse_block_bodies() {
        let m = parse("match x { _ => { return; } }");
        assert!(matches!(m.arms[0].body, MatchArmBody::Block(_)));
    }
}
