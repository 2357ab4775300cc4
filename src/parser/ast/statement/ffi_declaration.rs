use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::Id, ParseError, ParseState},
};

use super::MethodSignature;

/// `namespace Name from "path" { fn sig; ... }`: a foreign function
/// namespace. Only the signatures matter to the front end; loading is a
/// downstream concern.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FfiDeclaration<T> {
    pub id: Id<T>,
    pub source_path: String,
    pub methods: Vec<MethodSignature>,
    pub info: T,
    pub position: Span,
}

impl FfiDeclaration<()> {
    pub fn parse(state: &mut ParseState) -> Result<FfiDeclaration<()>, ParseError> {
        let start = state.expect(&TokenKind::Namespace)?.position;
        let (name, name_position) = state.expect_identifier()?;

        state.expect(&TokenKind::From)?;
        let path_token = state.next();
        let TokenKind::StringLiteral(source_path) = path_token.kind else {
            return Err(ParseError {
                message: format!(
                    "expected library path string but found {}",
                    path_token.kind.describe()
                ),
                position: Some(path_token.position),
            });
        };

        state.expect(&TokenKind::LBrace)?;
        let mut methods = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            methods.push(MethodSignature::parse(state)?);
        }
        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(FfiDeclaration {
            id: Id::new(name, name_position),
            source_path,
            methods,
            info: (),
            position: start.merge(&end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    #[test]
    fn test_parse_ffi_namespace() {
        let mut state = ParseState::new(
            Lexer::new("namespace libm from \"libm.so\" { fn sqrt(x: f64) -> f64; }")
                .lex()
                .unwrap(),
        );
        let ffi = FfiDeclaration::parse(&mut state).expect("parsing failed");

        assert_eq!(ffi.id.name, "libm");
        assert_eq!(ffi.source_path, "libm.so");
        assert_eq!(ffi.methods.len(), 1);
    }
}
