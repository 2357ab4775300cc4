use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Expression, Id, TypeName},
        ParseError, ParseState,
    },
};

/// `let [mut] [strict] name[: T] = value;` or `const name: T = value;`.
/// In strict mode the declared type is stored verbatim, without widening
/// from the inferred initializer type.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableDeclaration<T> {
    pub id: Id<T>,
    pub mutable: bool,
    pub constant: bool,
    pub strict: bool,
    pub type_name: Option<TypeName>,
    pub value: Expression<T>,
    pub info: T,
    pub position: Span,
}

impl VariableDeclaration<()> {
    pub fn parse(state: &mut ParseState) -> Result<VariableDeclaration<()>, ParseError> {
        let (constant, start) = match state.peek_kind() {
            TokenKind::Const => (true, state.next().position),
            _ => (false, state.expect(&TokenKind::Let)?.position),
        };

        let mutable = !constant && state.accept(&TokenKind::Mut).is_some();
        let strict = state.accept(&TokenKind::Strict).is_some();

        let (name, name_position) = state.expect_identifier()?;

        let type_name = if state.accept(&TokenKind::Colon).is_some() {
            Some(TypeName::parse(state)?)
        } else {
            None
        };

        state.expect(&TokenKind::Assign)?;
        let value = Expression::parse(state)?;
        let position = start.merge(&value.position());
        state.expect(&TokenKind::Semicolon)?;

        Ok(VariableDeclaration {
            id: Id::new(name, name_position),
            mutable,
            constant,
            strict,
            type_name,
            value,
            info: (),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> VariableDeclaration<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        VariableDeclaration::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_plain_let() {
        let decl = parse("let x = 42;");
        assert_eq!(decl.id.name, "x");
        assert!(!decl.mutable && !decl.constant && !decl.strict);
        assert!(decl.type_name.is_none());
    }

    #[test]
    fn test_parse_typed_let() {
        let decl = parse("let x: u8 = 300;");
        assert!(decl.type_name.is_some());
    }

    #[test]
    fn test_parse_const_and_strict() {
        assert!(parse("const x: i32 = 1;").constant);
        assert!(parse("let strict x: i32 = 1;").strict);
        assert!(parse("let mut x = 1;").mutable);
    }
}
