use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::TypeName, ParseError, ParseState},
};

/// An identifier in expression position, optionally carrying explicit type
/// arguments (`id<i32>`).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Id<T> {
    pub name: String,
    pub type_args: Vec<TypeName>,
    pub info: T,
    pub position: Span,
}

impl Id<()> {
    pub fn new(name: impl ToString, position: Span) -> Id<()> {
        Id {
            name: name.to_string(),
            type_args: vec![],
            info: (),
            position,
        }
    }

    pub fn parse(state: &mut ParseState) -> Result<Id<()>, ParseError> {
        let (name, position) = state.expect_identifier()?;

        // `id<...>` is only a type application when the angle brackets close
        // and a call follows; otherwise `<` is an ordinary comparison.
        if matches!(state.peek_kind(), TokenKind::LessThan) {
            let checkpoint = state.checkpoint();
            if let Some(type_args) = Self::try_parse_type_args(state) {
                return Ok(Id {
                    name,
                    type_args,
                    info: (),
                    position,
                });
            }
            state.rewind(checkpoint);
        }

        Ok(Id {
            name,
            type_args: vec![],
            info: (),
            position,
        })
    }

    fn try_parse_type_args(state: &mut ParseState) -> Option<Vec<TypeName>> {
        state.next();

        let mut type_args = vec![];
        loop {
            type_args.push(TypeName::parse(state).ok()?);
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }
        state.expect_closing_angle().ok()?;

        if matches!(state.peek_kind(), TokenKind::LParen) {
            Some(type_args)
        } else {
            None
        }
    }
}
