use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

use super::{Expression, Id};

/// `let a = e, b = f in body`: scoped bindings evaluated in declaration
/// order with no forward references, then the body in that scope.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LetIn<T> {
    pub declarations: Vec<(Id<T>, Expression<T>)>,
    pub body: Expression<T>,
    pub info: T,
    pub position: Span,
}

impl LetIn<()> {
    pub fn parse(state: &mut ParseState) -> Result<LetIn<()>, ParseError> {
        let start = state.expect(&TokenKind::Let)?.position;

        let mut declarations = vec![];
        loop {
            let (name, name_position) = state.expect_identifier()?;
            state.expect(&TokenKind::Assign)?;
            let value = Expression::parse(state)?;
            declarations.push((Id::new(name, name_position), value));

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        state.expect(&TokenKind::In)?;
        let body = Expression::parse(state)?;
        let position = start.merge(&body.position());

        Ok(LetIn {
            declarations,
            body,
            info: (),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn test_parse_let_in() {
        let mut state = ParseState::new(Lexer::new("let a = 1, b = 2 in a + b").lex().unwrap());
        let let_in = LetIn::parse(&mut state).expect("parsing failed");

        assert_eq!(let_in.declarations.len(), 2);
        assert_eq!(let_in.declarations[0].0.name, "a");
        assert!(matches!(let_in.body, Expression::Binary(_)));
    }
}
