use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Block, Expression, Id, TypeName},
        ParseError, ParseState,
    },
};

/// `fn name<G, H: Constraint>(params) -> T { ... }` or the expression form
/// `fn name<T>(x: T) -> T = x;`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionDeclaration<T> {
    pub id: Id<T>,
    pub generics: Vec<GenericParameter>,
    pub parameters: Vec<FunctionParameter<T>>,
    pub return_type: TypeName,
    pub body: FunctionBody<T>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenericParameter {
    pub name: String,
    pub constraint: Option<TypeName>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FunctionParameter<T> {
    pub name: Id<T>,
    pub type_name: TypeName,
    pub mutable: bool,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum FunctionBody<T> {
    Block(Block<T>),
    Expression(Box<Expression<T>>),
}

impl FunctionDeclaration<()> {
    pub fn parse(state: &mut ParseState) -> Result<FunctionDeclaration<()>, ParseError> {
        let start = state.expect(&TokenKind::Fn)?.position;
        let (name, name_position) = state.expect_identifier()?;

        let generics = Self::parse_generics(state)?;
        let parameters = Self::parse_parameters(state)?;

        state.expect(&TokenKind::SmallRightArrow)?;
        let return_type = TypeName::parse(state)?;

        let (body, end) = if state.accept(&TokenKind::Assign).is_some() {
            let expression = Expression::parse(state)?;
            let end = state.expect(&TokenKind::Semicolon)?.position;
            (FunctionBody::Expression(Box::new(expression)), end)
        } else {
            let block = Block::parse(state)?;
            let end = block.position.clone();
            (FunctionBody::Block(block), end)
        };

        Ok(FunctionDeclaration {
            id: Id::new(name, name_position),
            generics,
            parameters,
            return_type,
            body,
            info: (),
            position: start.merge(&end),
        })
    }

    pub(crate) fn parse_generics(
        state: &mut ParseState,
    ) -> Result<Vec<GenericParameter>, ParseError> {
        let mut generics = vec![];

        if state.accept(&TokenKind::LessThan).is_some() {
            loop {
                let (name, position) = state.expect_identifier()?;
                let constraint = if state.accept(&TokenKind::Colon).is_some() {
                    Some(TypeName::parse(state)?)
                } else {
                    None
                };
                generics.push(GenericParameter {
                    name,
                    constraint,
                    position,
                });

                if state.accept(&TokenKind::Comma).is_none() {
                    break;
                }
            }
            state.expect_closing_angle()?;
        }

        Ok(generics)
    }

    pub(crate) fn parse_parameters(
        state: &mut ParseState,
    ) -> Result<Vec<FunctionParameter<()>>, ParseError> {
        state.expect(&TokenKind::LParen)?;

        let mut parameters = vec![];
        while !matches!(state.peek_kind(), TokenKind::RParen) {
            let mutable = state.accept(&TokenKind::Mut).is_some();
            let (name, name_position) = state.expect_identifier()?;
            state.expect(&TokenKind::Colon)?;
            let type_name = TypeName::parse(state)?;
            let position = name_position.merge(&type_name.position());

            parameters.push(FunctionParameter {
                name: Id::new(name, name_position),
                type_name,
                mutable,
                info: (),
                position,
            });

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }
        state.expect(&TokenKind::RParen)?;

        Ok(parameters)
    }
}
