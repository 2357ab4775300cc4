use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Cast, CastMode, InstanceCheck},
    typechecker::{
        context::Context,
        error::{TypeCheckError, TypeMismatch},
        matcher,
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for Cast<()> {
    type Typed = Cast<TypeInformation>;

    /// The three cast modes: `as` is a checked static conversion, `as!` is
    /// unchecked, `as?` produces a nullable of the target.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Cast {
            expression,
            target,
            mode,
            position,
            ..
        } = self;

        let expression = expression.check(ctx, None)?;
        let source = { expression.get_info().type_id.borrow().clone() }
            .unwrap_or(Type::Unset)
            .deref(ctx)?;

        let mut target_type = Type::try_from((&target, &*ctx))?.deref(ctx)?;

        // Casting within a variant family: an uninstantiated constructor
        // target picks up the scrutinee's instantiation.
        match (&target_type, &source) {
            (Type::VariantConstructor(constructor), Type::Variant(variant)) => {
                if let Some(instantiated) = variant.constructor(&constructor.name) {
                    target_type = Type::VariantConstructor(Box::new(instantiated.clone()));
                }
            }
            (Type::VariantConstructor(target), Type::VariantConstructor(scrutinee)) => {
                if target.name == scrutinee.name && target.parent == scrutinee.parent {
                    target_type = source.clone();
                }
            }
            _ => {}
        }

        let type_id = match mode {
            CastMode::Regular => {
                let upcast = matcher::matches(ctx, &target_type, &source, false);
                let numeric = source.is_numeric() && target_type.is_numeric();
                let downcast = matcher::matches(ctx, &source, &target_type, false);

                if !upcast.success && !numeric && !downcast.success {
                    ctx.report(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: target_type.clone(),
                            actual: source,
                        },
                        position.clone(),
                    ));
                }
                target_type
            }
            CastMode::Force => target_type,
            CastMode::Safe => match &target_type {
                Type::Nullable(_) => target_type,
                _ => match Type::wrap_nullable(target_type, &position) {
                    Ok(wrapped) => wrapped,
                    Err(error) => {
                        ctx.report(error);
                        Type::Unset
                    }
                },
            },
        };

        Ok(Cast {
            expression,
            target,
            mode,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(type_id))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        let Cast {
            expression,
            target,
            mode,
            position,
            ..
        } = this;

        Cast {
            expression: TypeCheckable::revert(expression),
            target: target.clone(),
            mode: *mode,
            info: (),
            position: position.clone(),
        }
    }
}

impl TypedConstruct for Cast<TypeInformation> {
    type Validated = Cast<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Cast {
            expression,
            target,
            mode,
            info,
            position,
        } = self;

        Ok(Cast {
            expression: expression.validate()?,
            target,
            mode,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for InstanceCheck<()> {
    type Typed = InstanceCheck<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let InstanceCheck {
            expression,
            target,
            position,
            ..
        } = self;

        let expression = expression.check(ctx, None)?;
        // The target only needs to resolve; the check itself is a runtime
        // question and always types as bool.
        Type::try_from((&target, &*ctx))?;

        Ok(InstanceCheck {
            expression,
            target,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Boolean))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        let InstanceCheck {
            expression,
            target,
            position,
            ..
        } = this;

        InstanceCheck {
            expression: TypeCheckable::revert(expression),
            target: target.clone(),
            info: (),
            position: position.clone(),
        }
    }
}

impl TypedConstruct for InstanceCheck<TypeInformation> {
    type Validated = InstanceCheck<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let InstanceCheck {
            expression,
            target,
            info,
            position,
        } = self;

        Ok(InstanceCheck {
            expression: expression.validate()?,
            target,
            info: info.validate(&position)?,
            position,
        })
    }
}
