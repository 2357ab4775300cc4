use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

use super::Expression;

/// An anonymous struct literal `{x: 1, y: 2}`. The resulting type is
/// structural, assembled from the field initializers.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructInit<T> {
    pub fields: Vec<StructInitField<T>>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructInitField<T> {
    pub name: String,
    pub value: Expression<T>,
    pub info: T,
    pub position: Span,
}

impl StructInit<()> {
    /// `{` followed by `ident :` begins a struct literal; everything else
    /// after `{` is a block.
    pub fn lookahead(state: &ParseState) -> bool {
        matches!(state.peek_kind(), TokenKind::LBrace)
            && matches!(state.nth_kind(1), TokenKind::Identifier(_))
            && matches!(state.nth_kind(2), TokenKind::Colon)
    }

    pub fn parse(state: &mut ParseState) -> Result<StructInit<()>, ParseError> {
        let start = state.expect(&TokenKind::LBrace)?.position;

        let mut fields = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            let (name, name_position) = state.expect_identifier()?;
            state.expect(&TokenKind::Colon)?;
            let value = Expression::parse(state)?;
            let position = name_position.merge(&value.position());

            fields.push(StructInitField {
                name,
                value,
                info: (),
                position,
            });

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(StructInit {
            fields,
            info: (),
            position: start.merge(&end),
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
    fn test_lookahead() {
        assert!(StructInit::lookahead(&state("{x: 1}")));
        assert!(!StructInit::lookahead(&state("{ let x = 1; }")));
    }

    #[test]
    fn test_parse_fields() {
        let init = StructInit::parse(&mut state("{x: 1, y: 2}")).expect("parsing failed");
        assert_eq!(init.fields.len(), 2);
        assert_eq!(init.fields[0].name, "x");
        assert_eq!(init.fields[1].name, "y");
    }
}
