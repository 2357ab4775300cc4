use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Block, Statement},
    typechecker::{
        context::Context, types::Type, TypeCheckable, TypeInformation, TypeResult,
        TypeValidationError, TypedConstruct, ValidatedTypeInformation,
    },
};

impl TypeCheckable for Block<()> {
    type Typed = Block<TypeInformation>;

    /// Statements check in a fresh scope; a trailing yielding expression
    /// (which receives the block's hint) provides the block's value,
    /// otherwise the block is void.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Block {
            statements,
            position,
            ..
        } = self;

        ctx.scope.enter_scope();

        let total = statements.len();
        let mut checked = vec![];
        for (index, statement) in statements.into_iter().enumerate() {
            let is_last = index + 1 == total;
            let statement_hint = match (&statement, is_last) {
                (Statement::YieldingExpression(_), true) => hint,
                _ => None,
            };

            let result = match statement_hint {
                Some(statement_hint) => {
                    let Statement::YieldingExpression(expression) = statement else {
                        unreachable!()
                    };
                    expression
                        .check(ctx, Some(statement_hint))
                        .map(Statement::YieldingExpression)
                }
                None => statement.check(ctx, None),
            };

            match result {
                Ok(statement) => checked.push(statement),
                Err(error) => {
                    ctx.scope.exit_scope();
                    return Err(error);
                }
            }
        }

        ctx.scope.exit_scope();

        let type_id = match checked.last() {
            Some(Statement::YieldingExpression(expression)) => {
                { expression.get_info().type_id.borrow().clone() }.unwrap_or(Type::Void)
            }
            _ => Type::Void,
        };

        Ok(Block {
            statements: checked,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(type_id))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Block {
            statements: this.statements.iter().map(TypeCheckable::revert).collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Block<TypeInformation> {
    type Validated = Block<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Block {
            statements,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for statement in statements {
            validated.push(statement.validate()?);
        }

        Ok(Block {
            statements: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::Result;

    use crate::{
        lexer::Lexer,
        parser::{ast::Block, ParseState},
        typechecker::{
            context::Context,
            types::{BasicType, Type},
            TypeCheckable,
        },
    };

    fn parse(input: &str) -> Block<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Block::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_yielding_block_type() -> Result<()> {
        let mut ctx = Context::default();
        let block = parse("{ let x = 1; x }").check(&mut ctx, None)?;

        assert_eq!(
            block.info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U8))))
        );
        Ok(())
    }

    #[test]
    fn test_void_block() -> Result<()> {
        let mut ctx = Context::default();
        let block = parse("{ let x = 1; }").check(&mut ctx, None)?;

        assert_eq!(block.info.type_id, Rc::new(RefCell::new(Some(Type::Void))));
        Ok(())
    }

    #[test]
    fn test_block_scope_is_dropped() -> Result<()> {
        let mut ctx = Context::default();
        parse("{ let x = 1; }").check(&mut ctx, None)?;

        assert!(ctx.scope.resolve_name("x").is_none());
        Ok(())
    }
}
