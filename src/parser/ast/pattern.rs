use std::{cell::RefCell, rc::Rc};

use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
    typechecker::Type,
};

use super::{Bool, Expression, IntKind, Null, Num, Prefix, PrefixOperator};

/// A pattern in a match arm. Patterns are checked against the scrutinee
/// type and lowered into a predicate expression plus variable assignments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Pattern<T> {
    Wildcard(WildcardPattern<T>),
    Literal(LiteralPattern<T>),
    Variable(VariablePattern<T>),
    Array(ArrayPattern<T>),
    Struct(StructPattern<T>),
    Datatype(DatatypePattern<T>),
}

impl<T> Pattern<T> {
    pub fn position(&self) -> Span {
        match self {
            Pattern::Wildcard(p) => p.position.clone(),
            Pattern::Literal(p) => p.position.clone(),
            Pattern::Variable(p) => p.position.clone(),
            Pattern::Array(p) => p.position.clone(),
            Pattern::Struct(p) => p.position.clone(),
            Pattern::Datatype(p) => p.position.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WildcardPattern<T> {
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LiteralPattern<T> {
    pub value: Expression<T>,
    pub info: T,
    pub position: Span,
}

/// A fresh variable binding. The `symbol` slot is shared with the scope
/// entry the binding creates; it is bound on first inference only and the
/// pointer is never exchanged afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariablePattern<T> {
    pub name: String,
    #[serde(skip)]
    pub symbol: Rc<RefCell<Option<Type>>>,
    pub constant: bool,
    pub info: T,
    pub position: Span,
}

impl VariablePattern<()> {
    pub fn new(name: impl ToString, position: Span) -> VariablePattern<()> {
        VariablePattern {
            name: name.to_string(),
            symbol: Rc::default(),
            constant: false,
            info: (),
            position,
        }
    }
}

/// `[p0, p1, ...rest]`: without the rest binding the match is
/// exact-length, with it min-length.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ArrayPattern<T> {
    pub elements: Vec<Pattern<T>>,
    pub rest: Option<VariablePattern<T>>,
    pub info: T,
    pub position: Span,
}

/// `{field: p, ..., ...rest}`: the rest binding collects the uncaptured
/// fields into a fresh struct.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StructPattern<T> {
    pub fields: Vec<(String, Pattern<T>)>,
    pub rest: Option<VariablePattern<T>>,
    pub info: T,
    pub position: Span,
}

/// `Path.To.Type(args...)`: variant constructor, enum member or interface
/// pattern, depending on the scrutinee.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DatatypePattern<T> {
    pub path: Vec<String>,
    pub args: Vec<Pattern<T>>,
    pub info: T,
    pub position: Span,
}

impl Pattern<()> {
    pub fn parse(state: &mut ParseState) -> Result<Pattern<()>, ParseError> {
        match state.peek_kind() {
            TokenKind::Underscore => {
                let position = state.next().position;
                Ok(Pattern::Wildcard(WildcardPattern { info: (), position }))
            }
            TokenKind::IntLiteral(_)
            | TokenKind::BinaryIntLiteral(_)
            | TokenKind::OctIntLiteral(_)
            | TokenKind::HexIntLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::DoubleLiteral(_) => {
                let num = Num::parse(state)?;
                let position = num.position();
                Ok(Pattern::Literal(LiteralPattern {
                    value: Expression::Num(num),
                    info: (),
                    position,
                }))
            }
            TokenKind::Minus => {
                let start = state.next().position;
                let num = Num::parse(state)?;
                let position = start.merge(&num.position());
                Ok(Pattern::Literal(LiteralPattern {
                    value: Expression::Prefix(Box::new(Prefix {
                        operator: PrefixOperator::Minus,
                        expression: Expression::Num(num),
                        info: (),
                        position: position.clone(),
                    })),
                    info: (),
                    position,
                }))
            }
            TokenKind::True | TokenKind::False => {
                let value = Bool::parse(state)?;
                let position = value.position.clone();
                Ok(Pattern::Literal(LiteralPattern {
                    value: Expression::Bool(value),
                    info: (),
                    position,
                }))
            }
            TokenKind::Null => {
                let value = Null::parse(state)?;
                let position = value.position.clone();
                Ok(Pattern::Literal(LiteralPattern {
                    value: Expression::Null(value),
                    info: (),
                    position,
                }))
            }
            TokenKind::StringLiteral(_) => {
                let value = super::AstString::parse(state)?;
                let position = value.position.clone();
                Ok(Pattern::Literal(LiteralPattern {
                    value: Expression::AstString(value),
                    info: (),
                    position,
                }))
            }
            TokenKind::Identifier(_) => Self::parse_name(state),
            TokenKind::LBracket => Self::parse_array(state),
            TokenKind::LBrace => Self::parse_struct(state),
            other => Err(state.error(format!(
                "expected a pattern but found {}",
                other.describe()
            ))),
        }
    }

    fn parse_name(state: &mut ParseState) -> Result<Pattern<()>, ParseError> {
        let (first, start) = state.expect_identifier()?;
        let mut path = vec![first];
        let mut position = start;

        while state.accept(&TokenKind::Dot).is_some() {
            let (segment, span) = state.expect_identifier()?;
            path.push(segment);
            position = position.merge(&span);
        }

        // A bare name binds a variable; a path or argument list selects a
        // datatype (variant constructor, enum member, interface).
        if path.len() == 1 && !matches!(state.peek_kind(), TokenKind::LParen) {
            return Ok(Pattern::Variable(VariablePattern::new(
                path.remove(0),
                position,
            )));
        }

        let mut args = vec![];
        if state.accept(&TokenKind::LParen).is_some() {
            while !matches!(state.peek_kind(), TokenKind::RParen) {
                args.push(Pattern::parse(state)?);
                if state.accept(&TokenKind::Comma).is_none() {
                    break;
                }
            }
            let end = state.expect(&TokenKind::RParen)?.position;
            position = position.merge(&end);
        }

        Ok(Pattern::Datatype(DatatypePattern {
            path,
            args,
            info: (),
            position,
        }))
    }

    fn parse_array(state: &mut ParseState) -> Result<Pattern<()>, ParseError> {
        let start = state.expect(&TokenKind::LBracket)?.position;

        let mut elements = vec![];
        let mut rest = None;

        while !matches!(state.peek_kind(), TokenKind::RBracket) {
            if state.accept(&TokenKind::Ellipsis).is_some() {
                let (name, span) = state.expect_identifier()?;
                rest = Some(VariablePattern::new(name, span));
                break;
            }

            elements.push(Pattern::parse(state)?);
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBracket)?.position;

        Ok(Pattern::Array(ArrayPattern {
            elements,
            rest,
            info: (),
            position: start.merge(&end),
        }))
    }

    fn parse_struct(state: &mut ParseState) -> Result<Pattern<()>, ParseError> {
        let start = state.expect(&TokenKind::LBrace)?.position;

        let mut fields = vec![];
        let mut rest = None;

        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            if state.accept(&TokenKind::Ellipsis).is_some() {
                let (name, span) = state.expect_identifier()?;
                rest = Some(VariablePattern::new(name, span));
                break;
            }

            let (name, span) = state.expect_identifier()?;
            let pattern = if state.accept(&TokenKind::Colon).is_some() {
                Pattern::parse(state)?
            } else {
                // Shorthand `{x}` binds the field to a variable of the
                // same name.
                Pattern::Variable(VariablePattern::new(&name, span))
            };
            fields.push((name, pattern));

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(Pattern::Struct(StructPattern {
            fields,
            rest,
            info: (),
            position: start.merge(&end),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Pattern<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Pattern::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_wildcard() {
        assert!(matches!(parse("_"), Pattern::Wildcard(_)));
    }

    #[test]
    fn test_parse_variable() {
        let Pattern::Variable(var) = parse("x") else {
            panic!("expected variable pattern");
        };
        assert_eq!(var.name, "x");
    }

    #[test]
    fn test_parse_datatype_with_args() {
        let Pattern::Datatype(pattern) = parse("Opt.Some(x)") else {
            panic!("expected datatype pattern");
        };
        assert_eq!(pattern.path, vec!["Opt", "Some"]);
        assert_eq!(pattern.args.len(), 1);
    }

    #[test]
    fn test_parse_enum_member_pattern() {
        let Pattern::Datatype(pattern) = parse("Color.Red") else {
            panic!("expected datatype pattern");
        };
        assert_eq!(pattern.path, vec!["Color", "Red"]);
        assert!(pattern.args.is_empty());
    }

    #[test]
    fn test_parse_array_with_rest() {
        let Pattern::Array(pattern) = parse("[a, b, ...tail]") else {
            panic!("expected array pattern");
        };
        assert_eq!(pattern.elements.len(), 2);
        assert_eq!(pattern.rest.as_ref().unwrap().name, "tail");
    }

    #[test]
    fn test_parse_struct_with_rest() {
        let Pattern::Struct(pattern) = parse("{x: 0, ...rest}") else {
            panic!("expected struct pattern");
        };
        assert_eq!(pattern.fields.len(), 1);
        assert_eq!(pattern.rest.as_ref().unwrap().name, "rest");
    }

    #[test]
    fn test_parse_negative_literal() {
        assert!(matches!(parse("-3"), Pattern::Literal(_)));
    }
}
