use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::If,
    typechecker::{
        context::Context, types::Type, TypeCheckable, TypeInformation, TypeResult,
        TypeValidationError, TypedConstruct, ValidatedTypeInformation,
    },
};

impl TypeCheckable for If<()> {
    type Typed = If<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let If {
            condition,
            then_block,
            else_block,
            position,
            ..
        } = self;

        let condition = condition.check(ctx, Some(&Type::Boolean))?;
        let then_block = then_block.check(ctx, None)?;
        let else_block = match else_block {
            Some(block) => Some(block.check(ctx, None)?),
            None => None,
        };

        Ok(If {
            condition,
            then_block,
            else_block,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        If {
            condition: TypeCheckable::revert(&this.condition),
            then_block: TypeCheckable::revert(&this.then_block),
            else_block: this.else_block.as_ref().map(TypeCheckable::revert),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for If<TypeInformation> {
    type Validated = If<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let If {
            condition,
            then_block,
            else_block,
            info,
            position,
        } = self;

        Ok(If {
            condition: condition.validate()?,
            then_block: then_block.validate()?,
            else_block: else_block.map(|b| b.validate()).transpose()?,
            info: info.validate(&position)?,
            position,
        })
    }
}
