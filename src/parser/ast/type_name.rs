use std::fmt::Display;

use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

/// A parsed type expression. Resolution into a semantic type happens in the
/// typechecker; until then everything user defined stays a named reference.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TypeName {
    /// Possibly package qualified reference, e.g. `std.string.String` or
    /// `Opt<i32>`. Basic types (`i32`, `bool`, ...) also parse as this form.
    Named {
        path: Vec<String>,
        type_args: Vec<TypeName>,
        position: Span,
    },
    /// `T?`
    Nullable(Box<TypeName>, Span),
    /// `T[]`
    Array(Box<TypeName>, Span),
    /// `fn(T, U) -> V`
    Function {
        params: Vec<TypeName>,
        return_type: Box<TypeName>,
        position: Span,
    },
    /// `{ x: i32, y: i32 }`
    Struct {
        fields: Vec<(String, TypeName)>,
        position: Span,
    },
    /// `A | B`
    Union(Box<TypeName>, Box<TypeName>, Span),
    /// `A & B`
    Join(Box<TypeName>, Box<TypeName>, Span),
}

impl TypeName {
    pub fn position(&self) -> Span {
        match self {
            TypeName::Named { position, .. } => position.clone(),
            TypeName::Nullable(_, position) => position.clone(),
            TypeName::Array(_, position) => position.clone(),
            TypeName::Function { position, .. } => position.clone(),
            TypeName::Struct { position, .. } => position.clone(),
            TypeName::Union(_, _, position) => position.clone(),
            TypeName::Join(_, _, position) => position.clone(),
        }
    }

    pub fn named(name: impl ToString, position: Span) -> TypeName {
        TypeName::Named {
            path: vec![name.to_string()],
            type_args: vec![],
            position,
        }
    }

    /// Full type expression: unions bind loosest, then joins, then the
    /// postfix `[]` / `?` suffixes.
    pub fn parse(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let mut lhs = Self::parse_join(state)?;

        while state.accept(&TokenKind::Pipe).is_some() {
            let rhs = Self::parse_join(state)?;
            let position = lhs.position().merge(&rhs.position());
            lhs = TypeName::Union(Box::new(lhs), Box::new(rhs), position);
        }

        Ok(lhs)
    }

    fn parse_join(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let mut lhs = Self::parse_postfix(state)?;

        while state.accept(&TokenKind::Ampersand).is_some() {
            let rhs = Self::parse_postfix(state)?;
            let position = lhs.position().merge(&rhs.position());
            lhs = TypeName::Join(Box::new(lhs), Box::new(rhs), position);
        }

        Ok(lhs)
    }

    fn parse_postfix(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let mut inner = Self::parse_primary(state)?;

        loop {
            if state.accept(&TokenKind::QuestionMark).is_some() {
                let position = inner.position();
                inner = TypeName::Nullable(Box::new(inner), position);
                continue;
            }

            if matches!(state.peek_kind(), TokenKind::LBracket)
                && matches!(state.nth_kind(1), TokenKind::RBracket)
            {
                state.next();
                state.next();
                let position = inner.position();
                inner = TypeName::Array(Box::new(inner), position);
                continue;
            }

            break;
        }

        Ok(inner)
    }

    fn parse_primary(state: &mut ParseState) -> Result<TypeName, ParseError> {
        match state.peek_kind() {
            TokenKind::LParen => {
                state.next();
                let inner = Self::parse(state)?;
                state.expect(&TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Fn => Self::parse_function(state),
            TokenKind::LBrace => Self::parse_struct(state),
            TokenKind::Identifier(_) => Self::parse_named(state),
            other => Err(state.error(format!("expected a type but found {}", other.describe()))),
        }
    }

    fn parse_function(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let start = state.expect(&TokenKind::Fn)?.position;
        state.expect(&TokenKind::LParen)?;

        let mut params = vec![];
        while !matches!(state.peek_kind(), TokenKind::RParen) {
            params.push(Self::parse(state)?);
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }
        state.expect(&TokenKind::RParen)?;
        state.expect(&TokenKind::SmallRightArrow)?;

        let return_type = Self::parse(state)?;
        let position = start.merge(&return_type.position());

        Ok(TypeName::Function {
            params,
            return_type: Box::new(return_type),
            position,
        })
    }

    fn parse_struct(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let start = state.expect(&TokenKind::LBrace)?.position;

        let mut fields = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            let (name, _) = state.expect_identifier()?;
            state.expect(&TokenKind::Colon)?;
            fields.push((name, Self::parse(state)?));

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(TypeName::Struct {
            fields,
            position: start.merge(&end),
        })
    }

    fn parse_named(state: &mut ParseState) -> Result<TypeName, ParseError> {
        let (first, start) = state.expect_identifier()?;
        let mut path = vec![first];
        let mut position = start;

        while matches!(state.peek_kind(), TokenKind::Dot)
            && matches!(state.nth_kind(1), TokenKind::Identifier(_))
        {
            state.next();
            let (segment, span) = state.expect_identifier()?;
            path.push(segment);
            position = position.merge(&span);
        }

        let mut type_args = vec![];
        if matches!(state.peek_kind(), TokenKind::LessThan) {
            state.next();
            loop {
                type_args.push(Self::parse(state)?);
                if state.accept(&TokenKind::Comma).is_none() {
                    break;
                }
            }
            let end = state.expect_closing_angle()?;
            position = position.merge(&end);
        }

        Ok(TypeName::Named {
            path,
            type_args,
            position,
        })
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Named {
                path, type_args, ..
            } => {
                write!(f, "{}", path.join("."))?;
                if !type_args.is_empty() {
                    let args = type_args
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "<{args}>")?;
                }
                Ok(())
            }
            TypeName::Nullable(inner, _) => write!(f, "{inner}?"),
            TypeName::Array(inner, _) => write!(f, "{inner}[]"),
            TypeName::Function {
                params,
                return_type,
                ..
            } => {
                let params = params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({params}) -> {return_type}")
            }
            TypeName::Struct { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {ty}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{ {fields} }}")
            }
            TypeName::Union(lhs, rhs, _) => write!(f, "{lhs} | {rhs}"),
            TypeName::Join(lhs, rhs, _) => write!(f, "{lhs} & {rhs}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> TypeName {
        let tokens = Lexer::new(input).lex().expect("lexing failed");
        let mut state = ParseState::new(tokens);
        TypeName::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(parse("i32"), TypeName::named("i32", Span::default()));
    }

    #[test]
    fn test_parse_qualified_path() {
        let TypeName::Named { path, .. } = parse("std.string.String") else {
            panic!("expected named type");
        };
        assert_eq!(path, vec!["std", "string", "String"]);
    }

    #[test]
    fn test_parse_nested_generics() {
        let TypeName::Named {
            path, type_args, ..
        } = parse("Opt<Opt<i32>>")
        else {
            panic!("expected named type");
        };
        assert_eq!(path, vec!["Opt"]);
        assert_eq!(type_args.len(), 1);
        let TypeName::Named { type_args, .. } = &type_args[0] else {
            panic!("expected nested named type");
        };
        assert_eq!(type_args[0], TypeName::named("i32", Span::default()));
    }

    #[test]
    fn test_parse_nullable_array() {
        assert_eq!(
            parse("i32[]?"),
            TypeName::Nullable(
                Box::new(TypeName::Array(
                    Box::new(TypeName::named("i32", Span::default())),
                    Span::default()
                )),
                Span::default()
            )
        );
    }

    #[test]
    fn test_parse_function_type() {
        assert_eq!(
            parse("fn(i32, bool) -> void"),
            TypeName::Function {
                params: vec![
                    TypeName::named("i32", Span::default()),
                    TypeName::named("bool", Span::default())
                ],
                return_type: Box::new(TypeName::named("void", Span::default())),
                position: Span::default(),
            }
        );
    }

    #[test]
    fn test_parse_struct_type() {
        assert_eq!(
            parse("{ x: i32, y: i32 }"),
            TypeName::Struct {
                fields: vec![
                    ("x".into(), TypeName::named("i32", Span::default())),
                    ("y".into(), TypeName::named("i32", Span::default())),
                ],
                position: Span::default(),
            }
        );
    }

    #[test]
    fn test_parse_union_and_join() {
        let TypeName::Union(lhs, _, _) = parse("A & B | C") else {
            panic!("expected union");
        };
        assert!(matches!(*lhs, TypeName::Join(..)));
    }
}
