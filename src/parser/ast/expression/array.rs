use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

use super::Expression;

/// An array literal `[a, b, c]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArrayLiteral<T> {
    pub elements: Vec<Expression<T>>,
    pub info: T,
    pub position: Span,
}

impl ArrayLiteral<()> {
    pub fn parse(state: &mut ParseState) -> Result<ArrayLiteral<()>, ParseError> {
        let start = state.expect(&TokenKind::LBracket)?.position;

        let mut elements = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBracket) {
            elements.push(Expression::parse(state)?);
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBracket)?.position;

        Ok(ArrayLiteral {
            elements,
            info: (),
            position: start.merge(&end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> ArrayLiteral<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        ArrayLiteral::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_empty_array() {
        assert!(parse("[]").elements.is_empty());
    }

    #[test]
    fn test_parse_elements() {
        assert_eq!(parse("[1, 2, 3]").elements.len(), 3);
    }
}
