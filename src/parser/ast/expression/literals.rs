use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

/// Textual form of an integer literal. The checker uses it when selecting
/// the least sufficient storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum IntKind {
    Decimal,
    Binary,
    Octal,
    Hex,
}

/// Textual form of a floating point literal (`2.0f` vs `2.0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FloatKind {
    Single,
    Double,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Num<T> {
    Integer(u64, IntKind, T, Span),
    FloatingPoint(f64, FloatKind, T, Span),
}

impl<T> Num<T>
where
    T: Clone,
{
    pub fn get_info(&self) -> T {
        match self {
            Num::Integer(_, _, info, _) => info.clone(),
            Num::FloatingPoint(_, _, info, _) => info.clone(),
        }
    }

    pub fn position(&self) -> Span {
        match self {
            Num::Integer(_, _, _, position) => position.clone(),
            Num::FloatingPoint(_, _, _, position) => position.clone(),
        }
    }
}

impl Num<()> {
    pub fn parse(state: &mut ParseState) -> Result<Num<()>, ParseError> {
        let token = state.next();
        let position = token.position;

        let num = match token.kind {
            TokenKind::IntLiteral(value) => Num::Integer(value, IntKind::Decimal, (), position),
            TokenKind::BinaryIntLiteral(value) => Num::Integer(value, IntKind::Binary, (), position),
            TokenKind::OctIntLiteral(value) => Num::Integer(value, IntKind::Octal, (), position),
            TokenKind::HexIntLiteral(value) => Num::Integer(value, IntKind::Hex, (), position),
            TokenKind::FloatLiteral(value) => {
                Num::FloatingPoint(value, FloatKind::Single, (), position)
            }
            TokenKind::DoubleLiteral(value) => {
                Num::FloatingPoint(value, FloatKind::Double, (), position)
            }
            other => {
                return Err(ParseError {
                    message: format!("expected numeric literal but found {}", other.describe()),
                    position: Some(position),
                })
            }
        };

        Ok(num)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bool<T> {
    pub value: bool,
    pub info: T,
    pub position: Span,
}

impl Bool<()> {
    pub fn parse(state: &mut ParseState) -> Result<Bool<()>, ParseError> {
        let token = state.next();
        let value = match token.kind {
            TokenKind::True => true,
            TokenKind::False => false,
            other => {
                return Err(ParseError {
                    message: format!("expected boolean literal but found {}", other.describe()),
                    position: Some(token.position),
                })
            }
        };

        Ok(Bool {
            value,
            info: (),
            position: token.position,
        })
    }
}

/// The `null` literal.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Null<T> {
    pub info: T,
    pub position: Span,
}

impl Null<()> {
    pub fn parse(state: &mut ParseState) -> Result<Null<()>, ParseError> {
        let token = state.expect(&TokenKind::Null)?;
        Ok(Null {
            info: (),
            position: token.position,
        })
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AstString<T> {
    pub value: String,
    pub info: T,
    pub position: Span,
}

impl AstString<()> {
    pub fn parse(state: &mut ParseState) -> Result<AstString<()>, ParseError> {
        let token = state.next();
        let TokenKind::StringLiteral(value) = token.kind else {
            return Err(ParseError {
                message: format!(
                    "expected string literal but found {}",
                    token.kind.describe()
                ),
                position: Some(token.position),
            });
        };

        Ok(AstString {
            value,
            info: (),
            position: token.position,
        })
    }
}

/// A binary string literal `b"..."`, typed as `u8[]`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BinaryString<T> {
    pub value: Vec<u8>,
    pub info: T,
    pub position: Span,
}

impl BinaryString<()> {
    pub fn parse(state: &mut ParseState) -> Result<BinaryString<()>, ParseError> {
        let token = state.next();
        let TokenKind::BinaryStringLiteral(value) = token.kind else {
            return Err(ParseError {
                message: format!(
                    "expected binary string literal but found {}",
                    token.kind.describe()
                ),
                position: Some(token.position),
            });
        };

        Ok(BinaryString {
            value,
            info: (),
            position: token.position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn state(input: &str) -> ParseState {
        ParseState::new(Lexer::new(input).lex().expect("lexing failed"))
    }

    #[test]
    fn test_parse_int_kinds() {
        assert_eq!(
            Num::parse(&mut state("0x10")).unwrap(),
            Num::Integer(16, IntKind::Hex, (), Span::default())
        );
        assert_eq!(
            Num::parse(&mut state("42")).unwrap(),
            Num::Integer(42, IntKind::Decimal, (), Span::default())
        );
    }

    #[test]
    fn test_parse_float_kinds() {
        assert_eq!(
            Num::parse(&mut state("2.5f")).unwrap(),
            Num::FloatingPoint(2.5, FloatKind::Single, (), Span::default())
        );
        assert_eq!(
            Num::parse(&mut state("2.5")).unwrap(),
            Num::FloatingPoint(2.5, FloatKind::Double, (), Span::default())
        );
    }

    #[test]
    fn test_parse_bool() {
        assert!(Bool::parse(&mut state("true")).unwrap().value);
        assert!(!Bool::parse(&mut state("false")).unwrap().value);
    }
}
