mod array;
mod binary;
mod block;
mod cast;
mod id;
mod lambda;
mod let_in;
mod literals;
mod match_expression;
mod new_spawn;
mod postfix;
mod prefix;
mod struct_init;

pub use self::array::*;
pub use self::binary::*;
pub use self::block::*;
pub use self::cast::*;
pub use self::id::*;
pub use self::lambda::*;
pub use self::let_in::*;
pub use self::literals::*;
pub use self::match_expression::*;
pub use self::new_spawn::*;
pub use self::postfix::*;
pub use self::prefix::*;
pub use self::struct_init::*;

use crate::{
    lexer::{Span, TokenKind},
    parser::{ParseError, ParseState},
};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expression<T> {
    Id(Id<T>),
    Num(Num<T>),
    Bool(Bool<T>),
    Null(Null<T>),
    AstString(AstString<T>),
    BinaryString(BinaryString<T>),
    Array(ArrayLiteral<T>),
    StructInit(StructInit<T>),
    Binary(Box<BinaryExpression<T>>),
    Prefix(Box<Prefix<T>>),
    Postfix(Box<Postfix<T>>),
    Cast(Box<Cast<T>>),
    InstanceCheck(Box<InstanceCheck<T>>),
    New(New<T>),
    Spawn(Spawn<T>),
    Lambda(Lambda<T>),
    LetIn(Box<LetIn<T>>),
    Match(Box<MatchExpression<T>>),
    Block(Block<T>),
    Parens(Box<Expression<T>>),
}

impl<T> Expression<T>
where
    T: Clone,
{
    pub fn get_info(&self) -> T {
        match self {
            Expression::Id(Id { info, .. }) => info.clone(),
            Expression::Num(num) => num.get_info(),
            Expression::Bool(Bool { info, .. }) => info.clone(),
            Expression::Null(Null { info, .. }) => info.clone(),
            Expression::AstString(AstString { info, .. }) => info.clone(),
            Expression::BinaryString(BinaryString { info, .. }) => info.clone(),
            Expression::Array(ArrayLiteral { info, .. }) => info.clone(),
            Expression::StructInit(StructInit { info, .. }) => info.clone(),
            Expression::Binary(binary) => binary.info.clone(),
            Expression::Prefix(prefix) => prefix.info.clone(),
            Expression::Postfix(postfix) => postfix.get_info(),
            Expression::Cast(cast) => cast.info.clone(),
            Expression::InstanceCheck(check) => check.info.clone(),
            Expression::New(New { info, .. }) => info.clone(),
            Expression::Spawn(Spawn { info, .. }) => info.clone(),
            Expression::Lambda(Lambda { info, .. }) => info.clone(),
            Expression::LetIn(let_in) => let_in.info.clone(),
            Expression::Match(match_expr) => match_expr.info.clone(),
            Expression::Block(Block { info, .. }) => info.clone(),
            Expression::Parens(expr) => expr.get_info(),
        }
    }

    pub fn position(&self) -> Span {
        match self {
            Expression::Id(Id { position, .. }) => position.clone(),
            Expression::Num(num) => num.position(),
            Expression::Bool(Bool { position, .. }) => position.clone(),
            Expression::Null(Null { position, .. }) => position.clone(),
            Expression::AstString(AstString { position, .. }) => position.clone(),
            Expression::BinaryString(BinaryString { position, .. }) => position.clone(),
            Expression::Array(ArrayLiteral { position, .. }) => position.clone(),
            Expression::StructInit(StructInit { position, .. }) => position.clone(),
            Expression::Binary(binary) => binary.position.clone(),
            Expression::Prefix(prefix) => prefix.position.clone(),
            Expression::Postfix(postfix) => postfix.position(),
            Expression::Cast(cast) => cast.position.clone(),
            Expression::InstanceCheck(check) => check.position.clone(),
            Expression::New(New { position, .. }) => position.clone(),
            Expression::Spawn(Spawn { position, .. }) => position.clone(),
            Expression::Lambda(Lambda { position, .. }) => position.clone(),
            Expression::LetIn(let_in) => let_in.position.clone(),
            Expression::Match(match_expr) => match_expr.position.clone(),
            Expression::Block(Block { position, .. }) => position.clone(),
            Expression::Parens(expr) => expr.position(),
        }
    }
}

impl Expression<()> {
    pub fn parse(state: &mut ParseState) -> Result<Expression<()>, ParseError> {
        Self::parse_binary(state, 0)
    }

    fn parse_binary(state: &mut ParseState, min_prec: u8) -> Result<Expression<()>, ParseError> {
        let mut lhs = Self::parse_unary(state)?;

        loop {
            let Some((operator, prec)) = BinaryOperator::from_token(state.peek_kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            state.next();

            let rhs = Self::parse_binary(state, prec + 1)?;
            let position = lhs.position().merge(&rhs.position());
            lhs = Expression::Binary(Box::new(BinaryExpression {
                left: lhs,
                right: rhs,
                operator,
                info: (),
                position,
            }));
        }

        Ok(lhs)
    }

    fn parse_unary(state: &mut ParseState) -> Result<Expression<()>, ParseError> {
        let operator = match state.peek_kind() {
            TokenKind::Minus => Some(PrefixOperator::Minus),
            TokenKind::ExclamationMark => Some(PrefixOperator::Negate),
            TokenKind::Tilde => Some(PrefixOperator::BitNot),
            _ => None,
        };

        let Some(operator) = operator else {
            return Self::parse_cast_level(state);
        };

        let start = state.next().position;
        let operand = Self::parse_unary(state)?;
        let position = start.merge(&operand.position());

        Ok(Expression::Prefix(Box::new(Prefix {
            operator,
            expression: operand,
            info: (),
            position,
        })))
    }

    /// Casts and instance checks bind tighter than every binary operator.
    fn parse_cast_level(state: &mut ParseState) -> Result<Expression<()>, ParseError> {
        let mut expr = Postfix::parse_chain(state)?;

        loop {
            let mode = match state.peek_kind() {
                TokenKind::As => Some(CastMode::Regular),
                TokenKind::AsBang => Some(CastMode::Force),
                TokenKind::AsQuestion => Some(CastMode::Safe),
                TokenKind::Is => None,
                _ => break,
            };

            if let Some(mode) = mode {
                state.next();
                let target = super::TypeName::parse(state)?;
                let position = expr.position().merge(&target.position());
                expr = Expression::Cast(Box::new(Cast {
                    expression: expr,
                    target,
                    mode,
                    info: (),
                    position,
                }));
            } else {
                state.next();
                let target = super::TypeName::parse(state)?;
                let position = expr.position().merge(&target.position());
                expr = Expression::InstanceCheck(Box::new(InstanceCheck {
                    expression: expr,
                    target,
                    info: (),
                    position,
                }));
            }
        }

        Ok(expr)
    }

    pub(crate) fn parse_primary(state: &mut ParseState) -> Result<Expression<()>, ParseError> {
        match state.peek_kind() {
            TokenKind::Identifier(_) => Ok(Expression::Id(Id::parse(state)?)),
            TokenKind::This => {
                let position = state.next().position;
                Ok(Expression::Id(Id {
                    name: "this".into(),
                    type_args: vec![],
                    info: (),
                    position,
                }))
            }
            TokenKind::IntLiteral(_)
            | TokenKind::BinaryIntLiteral(_)
            | TokenKind::OctIntLiteral(_)
            | TokenKind::HexIntLiteral(_)
            | TokenKind::FloatLiteral(_)
            | TokenKind::DoubleLiteral(_) => Ok(Expression::Num(Num::parse(state)?)),
            TokenKind::True | TokenKind::False => Ok(Expression::Bool(Bool::parse(state)?)),
            TokenKind::Null => Ok(Expression::Null(Null::parse(state)?)),
            TokenKind::StringLiteral(_) => Ok(Expression::AstString(AstString::parse(state)?)),
            TokenKind::BinaryStringLiteral(_) => {
                Ok(Expression::BinaryString(BinaryString::parse(state)?))
            }
            TokenKind::CharLiteral(_) => Err(state.error("char literals are not supported yet")),
            TokenKind::LParen => {
                state.next();
                let inner = Expression::parse(state)?;
                state.expect(&TokenKind::RParen)?;
                Ok(Expression::Parens(Box::new(inner)))
            }
            TokenKind::LBracket => Ok(Expression::Array(ArrayLiteral::parse(state)?)),
            TokenKind::LBrace => {
                if StructInit::lookahead(state) {
                    Ok(Expression::StructInit(StructInit::parse(state)?))
                } else {
                    Ok(Expression::Block(Block::parse(state)?))
                }
            }
            TokenKind::Backslash => Ok(Expression::Lambda(Lambda::parse(state)?)),
            TokenKind::Let => Ok(Expression::LetIn(Box::new(LetIn::parse(state)?))),
            TokenKind::Match => Ok(Expression::Match(Box::new(MatchExpression::parse(state)?))),
            TokenKind::New => Ok(Expression::New(New::parse(state)?)),
            TokenKind::Spawn => Ok(Expression::Spawn(Spawn::parse(state)?)),
            other => Err(state.error(format!(
                "expected an expression but found {}",
                other.describe()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Expression<()> {
        let tokens = Lexer::new(input).lex().expect("lexing failed");
        let mut state = ParseState::new(tokens);
        Expression::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_precedence() {
        let Expression::Binary(binary) = parse("1 + 2 * 3") else {
            panic!("expected binary expression");
        };
        assert_eq!(binary.operator, BinaryOperator::Add);
        assert!(matches!(binary.right, Expression::Binary(_)));
    }

    #[test]
    fn test_parse_comparison_of_arithmetic() {
        let Expression::Binary(binary) = parse("a + 1 == b") else {
            panic!("expected binary expression");
        };
        assert_eq!(binary.operator, BinaryOperator::Equals);
    }

    #[test]
    fn test_parse_cast_binds_tighter_than_binary() {
        let Expression::Binary(binary) = parse("x as u8 + 1") else {
            panic!("expected binary expression");
        };
        assert!(matches!(binary.left, Expression::Cast(_)));
    }

    #[test]
    fn test_parse_instance_check() {
        let Expression::InstanceCheck(check) = parse("x is Foo") else {
            panic!("expected instance check");
        };
        assert!(matches!(check.expression, Expression::Id(_)));
    }

    #[test]
    fn test_parse_prefix() {
        let Expression::Prefix(prefix) = parse("-42") else {
            panic!("expected prefix expression");
        };
        assert_eq!(prefix.operator, PrefixOperator::Minus);
    }

    #[test]
    fn test_parse_call_with_type_args() {
        let Expression::Postfix(postfix) = parse("id<i32>(3)") else {
            panic!("expected call");
        };
        let Postfix::Call { expr, args, .. } = postfix.as_ref() else {
            panic!("expected call postfix");
        };
        let Expression::Id(id) = expr else {
            panic!("expected id callee");
        };
        assert_eq!(id.name, "id");
        assert_eq!(id.type_args.len(), 1);
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn test_less_than_is_not_type_application() {
        let Expression::Binary(binary) = parse("a < b") else {
            panic!("expected comparison");
        };
        assert_eq!(binary.operator, BinaryOperator::LessThan);
    }
}
