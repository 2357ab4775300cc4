use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Assignment, Expression, Postfix},
    typechecker::{
        context::Context,
        error::{ControlFlowMisuse, ImmutableAssign, TypeCheckError},
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

/// L-value discipline: plain variables must be mutable bindings; index and
/// property targets assign through their container.
fn check_target(ctx: &mut Context, target: &Expression<TypeInformation>) {
    match target {
        Expression::Id(id) => {
            if let Some(false) = ctx.scope.is_variable_mutable(&id.name) {
                ctx.report(TypeCheckError::ImmutableAssign(
                    ImmutableAssign {
                        name: id.name.clone(),
                    },
                    id.position.clone(),
                ));
            }
        }
        Expression::Postfix(postfix) => {
            if !matches!(
                postfix.as_ref(),
                Postfix::Index { .. } | Postfix::Property { .. }
            ) {
                ctx.report(TypeCheckError::ControlFlowMisuse(
                    ControlFlowMisuse {
                        construct: "assignment".into(),
                        requirement: "with a variable, index or member target".into(),
                    },
                    target.position(),
                ));
            }
        }
        Expression::Parens(inner) => check_target(ctx, inner),
        other => {
            ctx.report(TypeCheckError::ControlFlowMisuse(
                ControlFlowMisuse {
                    construct: "assignment".into(),
                    requirement: "with a variable, index or member target".into(),
                },
                other.position(),
            ));
        }
    }
}

impl TypeCheckable for Assignment<()> {
    type Typed = Assignment<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Assignment {
            target,
            value,
            position,
            ..
        } = self;

        let target = target.check(ctx, None)?;
        check_target(ctx, &target);

        let target_type = { target.get_info().type_id.borrow().clone() };
        let value = value.check(ctx, target_type.as_ref())?;

        Ok(Assignment {
            target,
            value,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Assignment {
            target: TypeCheckable::revert(&this.target),
            value: TypeCheckable::revert(&this.value),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Assignment<TypeInformation> {
    type Validated = Assignment<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Assignment {
            target,
            value,
            info,
            position,
        } = self;

        Ok(Assignment {
            target: target.validate()?,
            value: value.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        lexer::Lexer,
        parser::{ast::Statement, ParseState},
        typechecker::{context::Context, TypeCheckable},
    };

    fn check(ctx: &mut Context, input: &str) {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Statement::parse(&mut state)
            .expect("parsing failed")
            .check(ctx, None)
            .expect("checking failed");
    }

    #[test]
    fn test_mutable_assignment() -> Result<()> {
        let mut ctx = Context::default();
        check(&mut ctx, "let mut x = 1;");
        check(&mut ctx, "x = 2;");

        assert!(!ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_immutable_assignment_is_reported() -> Result<()> {
        let mut ctx = Context::default();
        check(&mut ctx, "let x = 1;");
        check(&mut ctx, "x = 2;");

        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_value_adopts_target_type() -> Result<()> {
        let mut ctx = Context::default();
        check(&mut ctx, "let mut x: i64 = 1;");
        check(&mut ctx, "x = 300;");

        assert!(!ctx.reporter.has_errors());
        Ok(())
    }
}
