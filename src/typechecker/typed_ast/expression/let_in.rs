use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Id, LetIn},
    typechecker::{
        context::Context,
        error::TypeCheckError,
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for LetIn<()> {
    type Typed = LetIn<TypeInformation>;

    /// Bindings are inferred in declaration order with no forward
    /// references; the body is then inferred in the extended scope and
    /// provides the result type.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let LetIn {
            declarations,
            body,
            position,
            ..
        } = self;

        ctx.scope.enter_scope();

        let mut checked_declarations = vec![];
        for (id, value) in declarations {
            let value = value.check(ctx, None)?;
            let slot = value.get_info().type_id;

            if let Err(duplicate) = ctx.scope.add_variable(&id.name, slot.clone(), false) {
                ctx.report(TypeCheckError::DuplicateSymbol(duplicate, id.position.clone()));
            }

            let info = TypeInformation {
                type_id: slot,
                context: ctx.clone(),
            };
            checked_declarations.push((
                Id {
                    name: id.name,
                    type_args: vec![],
                    info,
                    position: id.position,
                },
                value,
            ));
        }

        let body = body.check(ctx, hint);
        ctx.scope.exit_scope();
        let body = body?;

        Ok(LetIn {
            declarations: checked_declarations,
            info: body.get_info(),
            body,
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        LetIn {
            declarations: this
                .declarations
                .iter()
                .map(|(id, value)| {
                    (
                        Id {
                            name: id.name.clone(),
                            type_args: vec![],
                            info: (),
                            position: id.position.clone(),
                        },
                        TypeCheckable::revert(value),
                    )
                })
                .collect(),
            body: TypeCheckable::revert(&this.body),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for LetIn<TypeInformation> {
    type Validated = LetIn<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let LetIn {
            declarations,
            body,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for (id, value) in declarations {
            validated.push((id.validate()?, value.validate()?));
        }

        Ok(LetIn {
            declarations: validated,
            body: body.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}
