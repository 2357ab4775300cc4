use crate::{
    lexer::{Span, TokenKind},
    parser::{ast::Statement, ParseError, ParseState},
};

/// A braced statement sequence. A trailing expression without semicolon
/// becomes the block's value (a yielding expression).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block<T> {
    pub statements: Vec<Statement<T>>,
    pub info: T,
    pub position: Span,
}

impl Block<()> {
    pub fn parse(state: &mut ParseState) -> Result<Block<()>, ParseError> {
        let start = state.expect(&TokenKind::LBrace)?.position;

        let mut statements = vec![];
        while !matches!(state.peek_kind(), TokenKind::RBrace) {
            if state.is_eof() {
                return Err(ParseError::eof("block"));
            }
            statements.push(Statement::parse(state)?);
        }

        let end = state.expect(&TokenKind::RBrace)?.position;

        Ok(Block {
            statements,
            info: (),
            position: start.merge(&end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Block<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Block::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_parse_empty_block() {
        assert!(parse("{}").statements.is_empty());
    }

    #[test]
    fn test_parse_yielding_expression() {
        let block = parse("{ let x = 1; x }");
        assert_eq!(block.statements.len(), 2);
        assert!(matches!(
            block.statements[1],
            Statement::YieldingExpression(_)
        ));
    }
}
