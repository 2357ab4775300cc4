use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::TypeName, ParseError, ParseState},
};

use super::{Expression, Id};

/// A lambda `\(x: i32) -> i32 => x + 1`. The return type annotation is
/// optional; when present it becomes the hint for the body.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lambda<T> {
    pub parameters: Vec<LambdaParameter<T>>,
    pub return_type: Option<TypeName>,
    pub expression: Box<Expression<T>>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LambdaParameter<T> {
    pub name: Id<T>,
    pub type_name: Option<TypeName>,
    pub info: T,
    pub position: Span,
}

impl Lambda<()> {
    pub fn parse(state: &mut ParseState) -> Result<Lambda<()>, ParseError> {
        let start = state.expect(&TokenKind::Backslash)?.position;
        state.expect(&TokenKind::LParen)?;

        let mut parameters = vec![];
        while !matches!(state.peek_kind(), TokenKind::RParen) {
            let (name, name_position) = state.expect_identifier()?;

            let type_name = if state.accept(&TokenKind::Colon).is_some() {
                Some(TypeName::parse(state)?)
            } else {
                None
            };

            parameters.push(LambdaParameter {
                name: Id::new(name, name_position.clone()),
                type_name,
                info: (),
                position: name_position,
            });

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }
        state.expect(&TokenKind::RParen)?;

        let return_type = if state.accept(&TokenKind::SmallRightArrow).is_some() {
            Some(TypeName::parse(state)?)
        } else {
            None
        };

        state.expect(&TokenKind::BigRightArrow)?;
        let expression = Expression::parse(state)?;
        let position = start.merge(&expression.position());

        Ok(Lambda {
            parameters,
            return_type,
            expression: Box::new(expression),
            info: (),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Lambda<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Lambda::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_lambda_with_types() {
        let lambda = parse("\\(x: i32) -> i32 => x");
        assert_eq!(lambda.parameters.len(), 1);
        assert!(lambda.parameters[0].type_name.is_some());
        assert!(lambda.return_type.is_some());
    }

    #[test]
    fn test_parse_untyped_lambda() {
        let lambda = parse("\\(x, y) => x");
        assert_eq!(lambda.parameters.len(), 2);
        assert!(lambda.return_type.is_none());
    }
}
