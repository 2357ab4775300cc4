use crate::{
    lexer::{Span, TokenKind},
    parser::{
        ast::{Id, IntKind, TypeName},
        ParseError, ParseState,
    },
};

use super::{FunctionDeclaration, GenericParameter};

/// A named type declaration. The shorthand forms `class`, `interface`,
/// `variant` and `enum` all normalize into this node, as does
/// `type Name<G> = <type-expression>`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TypeDeclaration<T> {
    pub id: Id<T>,
    pub generics: Vec<GenericParameter>,
    pub body: TypeDeclarationBody<T>,
    pub info: T,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum TypeDeclarationBody<T> {
    Alias(TypeName),
    Class(ClassDeclaration<T>),
    Interface(InterfaceDeclaration),
    Variant(VariantDeclaration),
    Enum(EnumDeclaration),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClassDeclaration<T> {
    pub supertypes: Vec<TypeName>,
    pub attributes: Vec<AttributeDeclaration>,
    pub methods: Vec<MethodDeclaration<T>>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AttributeDeclaration {
    pub name: String,
    pub type_name: TypeName,
    pub is_static: bool,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodDeclaration<T> {
    pub function: FunctionDeclaration<T>,
    pub is_static: bool,
    pub is_override: bool,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InterfaceDeclaration {
    pub supertypes: Vec<TypeName>,
    pub methods: Vec<MethodSignature>,
}

/// A bodyless method signature, used by interfaces and FFI namespaces.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<(String, TypeName)>,
    pub return_type: TypeName,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantDeclaration {
    pub constructors: Vec<VariantConstructorDeclaration>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantConstructorDeclaration {
    pub name: String,
    pub parameters: Vec<(String, TypeName)>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumDeclaration {
    pub target: Option<TypeName>,
    pub members: Vec<EnumMemberDeclaration>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnumMemberDeclaration {
    pub name: String,
    pub value: Option<EnumMemberValue>,
    pub position: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum EnumMemberValue {
    Int(i64, IntKind),
    Str(String),
}

impl TypeDeclaration<()> {
    pub fn parse(state: &mut ParseState) -> Result<TypeDeclaration<()>, ParseError> {
        let keyword = state.next();
        let start = keyword.position.clone();

        let (name, name_position) = state.expect_identifier()?;
        let generics = FunctionDeclaration::parse_generics(state)?;

        let body = match keyword.kind {
            TokenKind::Class => TypeDeclarationBody::Class(Self::parse_class(state)?),
            TokenKind::Interface => TypeDeclarationBody::Interface(Self::parse_interface(state)?),
            TokenKind::Variant => TypeDeclarationBody::Variant(Self::parse_variant(state)?),
            TokenKind::Enum => TypeDeclarationBody::Enum(Self::parse_enum(state)?),
            TokenKind::Type => {
                state.expect(&TokenKind::Assign)?;
                let aliased = TypeName::parse(state)?;
                state.expect(&TokenKind::Semicolon)?;
                TypeDeclarationBody::Alias(aliased)
            }
            other => {
                return Err(ParseError {
                    message: format!(
                        "expected a type declaration but found {}",
                        other.describe()
                    ),
                    position: Some(start),
                })
            }
        };

        Ok(TypeDeclaration {
            id: Id::new(name, name_position.clone()),
            generics,
            body,
            info: (),
            position: start.merge(&name_position),
        })
    }

    fn parse_supertypes(state: &mut ParseState) -> Result<Vec<TypeName>, ParseError> {
        let mut supertypes = vec![];

        if state.accept(&TokenKind::Colon).is_some() {
            loop {
                supertypes.push(TypeName::parse(state)?);
                if state.accept(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        Ok(supertypes)
    }

    fn parse_class(state: &mut ParseState) -> Result<ClassDeclaration<()>, ParseError> {
        let supertypes = Self::parse_supertypes(state)?;
        state.expect(&TokenKind::LBrace)?;

        let mut attributes = vec![];
        let mut methods = vec![];

        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            let is_static = state.accept(&TokenKind::Static).is_some();
            let is_override = state.accept(&TokenKind::Override).is_some();

            match state.peek_kind() {
                TokenKind::Let => {
                    state.next();
                    let (name, position) = state.expect_identifier()?;
                    state.expect(&TokenKind::Colon)?;
                    let type_name = TypeName::parse(state)?;
                    state.expect(&TokenKind::Semicolon)?;
                    attributes.push(AttributeDeclaration {
                        name,
                        type_name,
                        is_static,
                        position,
                    });
                }
                TokenKind::Fn => {
                    let function = FunctionDeclaration::parse(state)?;
                    methods.push(MethodDeclaration {
                        function,
                        is_static,
                        is_override,
                    });
                }
                other => {
                    return Err(state.error(format!(
                        "expected an attribute or method but found {}",
                        other.describe()
                    )))
                }
            }
        }

        state.expect(&TokenKind::RBrace)?;

        Ok(ClassDeclaration {
            supertypes,
            attributes,
            methods,
        })
    }

    fn parse_interface(state: &mut ParseState) -> Result<InterfaceDeclaration, ParseError> {
        let supertypes = Self::parse_supertypes(state)?;
        state.expect(&TokenKind::LBrace)?;

        let mut methods = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            methods.push(MethodSignature::parse(state)?);
        }

        state.expect(&TokenKind::RBrace)?;

        Ok(InterfaceDeclaration {
            supertypes,
            methods,
        })
    }

    fn parse_variant(state: &mut ParseState) -> Result<VariantDeclaration, ParseError> {
        state.expect(&TokenKind::LBrace)?;

        let mut constructors = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            let (name, position) = state.expect_identifier()?;
            state.expect(&TokenKind::LParen)?;

            let mut parameters = vec![];
            while !matches!(state.peek_kind(), TokenKind::RParen) {
                let (param, _) = state.expect_identifier()?;
                state.expect(&TokenKind::Colon)?;
                parameters.push((param, TypeName::parse(state)?));
                if state.accept(&TokenKind::Comma).is_none() {
                    break;
                }
            }
            state.expect(&TokenKind::RParen)?;

            constructors.push(VariantConstructorDeclaration {
                name,
                parameters,
                position,
            });

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        state.expect(&TokenKind::RBrace)?;

        Ok(VariantDeclaration { constructors })
    }

    fn parse_enum(state: &mut ParseState) -> Result<EnumDeclaration, ParseError> {
        let target = if state.accept(&TokenKind::Colon).is_some() {
            Some(TypeName::parse(state)?)
        } else {
            None
        };

        state.expect(&TokenKind::LBrace)?;

        let mut members = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            let (name, position) = state.expect_identifier()?;

            let value = if state.accept(&TokenKind::Assign).is_some() {
                Some(EnumMemberValue::parse(state)?)
            } else {
                None
            };

            members.push(EnumMemberDeclaration {
                name,
                value,
                position,
            });

            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }

        state.expect(&TokenKind::RBrace)?;

        Ok(EnumDeclaration { target, members })
    }
}

impl MethodSignature {
    pub fn parse(state: &mut ParseState) -> Result<MethodSignature, ParseError> {
        state.expect(&TokenKind::Fn)?;
        let (name, position) = state.expect_identifier()?;

        state.expect(&TokenKind::LParen)?;
        let mut parameters = vec![];
        while !matches!(state.peek_kind(), TokenKind::RParen) {
            let (param, _) = state.expect_identifier()?;
            state.expect(&TokenKind::Colon)?;
            parameters.push((param, TypeName::parse(state)?));
            if state.accept(&TokenKind::Comma).is_none() {
                break;
            }
        }
        state.expect(&TokenKind::RParen)?;

        state.expect(&TokenKind::SmallRightArrow)?;
        let return_type = TypeName::parse(state)?;
        state.expect(&TokenKind::Semicolon)?;

        Ok(MethodSignature {
            name,
            parameters,
            return_type,
            position,
        })
    }
}

impl EnumMemberValue {
    fn parse(state: &mut ParseState) -> Result<EnumMemberValue, ParseError> {
        let negative = state.accept(&TokenKind::Minus).is_some();
        let token = state.next();

        let value = match token.kind {
            TokenKind::IntLiteral(v) => EnumMemberValue::Int(v as i64, IntKind::Decimal),
            TokenKind::HexIntLiteral(v) => EnumMemberValue::Int(v as i64, IntKind::Hex),
            TokenKind::OctIntLiteral(v) => EnumMemberValue::Int(v as i64, IntKind::Octal),
            TokenKind::BinaryIntLiteral(v) => EnumMemberValue::Int(v as i64, IntKind::Binary),
            TokenKind::StringLiteral(v) if !negative => EnumMemberValue::Str(v),
            other => {
                return Err(ParseError {
                    message: format!("invalid enum member value {}", other.describe()),
                    position: Some(token.position),
                })
            }
        };

        match (negative, value) {
            (true, EnumMemberValue::Int(v, kind)) => Ok(EnumMemberValue::Int(-v, kind)),
            (_, value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> TypeDeclaration<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        TypeDeclaration::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_class() {
        let decl = parse(
            "class Point : Printable { let x: i32; let y: i32; fn norm() -> i32 { return 0; } }",
        );
        let TypeDeclarationBody::Class(class) = decl.body else {
            panic!("expected class declaration");
        };
        assert_eq!(class.supertypes.len(), 1);
        assert_eq!(class.attributes.len(), 2);
        assert_eq!(class.methods.len(), 1);
    }

    #[test]
    fn test_parse_static_attribute() {
        let decl = parse("class Counter { static let total: u64; }");
        let TypeDeclarationBody::Class(class) = decl.body else {
            panic!("expected class declaration");
        };
        assert!(class.attributes[0].is_static);
    }

    #[test]
    fn test_parse_interface() {
        let decl = parse("interface Runnable { fn run() -> void; }");
        let TypeDeclarationBody::Interface(interface) = decl.body else {
            panic!("expected interface declaration");
        };
        assert_eq!(interface.methods[0].name, "run");
    }

    #[test]
    fn test_parse_variant() {
        let decl = parse("variant Opt<T> { Some(v: T), None() }");
        assert_eq!(decl.generics.len(), 1);
        let TypeDeclarationBody::Variant(variant) = decl.body else {
            panic!("expected variant declaration");
        };
        assert_eq!(variant.constructors.len(), 2);
        assert_eq!(variant.constructors[0].parameters.len(), 1);
    }

    #[test]
    fn test_parse_enum() {
        let decl = parse("enum Color : u8 { Red, Green = 5, Blue }");
        let TypeDeclarationBody::Enum(e) = decl.body else {
            panic!("expected enum declaration");
        };
        assert!(e.target.is_some());
        assert_eq!(e.members.len(), 3);
        assert_eq!(
            e.members[1].value,
            Some(EnumMemberValue::Int(5, IntKind::Decimal))
        );
    }

    #[test]
    fn test_parse_string_enum() {
        let decl = parse("enum Mode { On = \"on\", Off = \"off\" }");
        let TypeDeclarationBody::Enum(e) = decl.body else {
            panic!("expected enum declaration");
        };
        assert_eq!(e.members[0].value, Some(EnumMemberValue::Str("on".into())));
    }

    #[test]
    fn test_parse_alias() {
        let decl = parse("type Bytes = u8[];");
        assert!(matches!(decl.body, TypeDeclarationBody::Alias(_)));
    }
}
