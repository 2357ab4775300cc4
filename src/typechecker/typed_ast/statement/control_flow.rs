use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{BreakStatement, ContinueStatement, ReturnStatement},
    typechecker::{
        context::Context,
        error::{ControlFlowMisuse, TypeCheckError},
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for ReturnStatement<()> {
    type Typed = ReturnStatement<TypeInformation>;

    /// `return` needs an enclosing function. The returned expression is
    /// hinted with the owner's declared return type and the site is
    /// registered on the owner.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let ReturnStatement {
            value, position, ..
        } = self;

        if !ctx.env.within_function {
            return Err(TypeCheckError::ControlFlowMisuse(
                ControlFlowMisuse {
                    construct: "return".into(),
                    requirement: "inside a function".into(),
                },
                position,
            ));
        }

        let owner = ctx.owner.clone();
        let return_hint = owner.as_ref().map(|owner| owner.return_type.clone());

        let value = match value {
            Some(value) => Some(value.check(ctx, return_hint.as_ref())?),
            None => {
                if let Some(expected) = &return_hint {
                    if !matches!(expected, Type::Void | Type::Unset) {
                        ctx.report(TypeCheckError::TypeMismatch(
                            crate::typechecker::error::TypeMismatch {
                                expected: expected.clone(),
                                actual: Type::Void,
                            },
                            position.clone(),
                        ));
                    }
                }
                None
            }
        };

        if let Some(owner) = &owner {
            let returned = value
                .as_ref()
                .and_then(|v| v.get_info().type_id.borrow().clone())
                .unwrap_or(Type::Void);
            owner.register_return(returned, position.clone());
        }

        Ok(ReturnStatement {
            value,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        ReturnStatement {
            value: this.value.as_ref().map(TypeCheckable::revert),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for ReturnStatement<TypeInformation> {
    type Validated = ReturnStatement<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let ReturnStatement {
            value,
            info,
            position,
        } = self;

        Ok(ReturnStatement {
            value: value.map(|v| v.validate()).transpose()?,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for BreakStatement<()> {
    type Typed = BreakStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let BreakStatement { position, .. } = self;

        if !ctx.env.within_loop {
            return Err(TypeCheckError::ControlFlowMisuse(
                ControlFlowMisuse {
                    construct: "break".into(),
                    requirement: "inside a loop".into(),
                },
                position,
            ));
        }

        Ok(BreakStatement {
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context: ctx.clone(),
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        BreakStatement {
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for BreakStatement<TypeInformation> {
    type Validated = BreakStatement<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let BreakStatement { info, position } = self;

        Ok(BreakStatement {
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for ContinueStatement<()> {
    type Typed = ContinueStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ContinueStatement { position, .. } = self;

        if !ctx.env.within_loop {
            return Err(TypeCheckError::ControlFlowMisuse(
                ControlFlowMisuse {
                    construct: "continue".into(),
                    requirement: "inside a loop".into(),
                },
                position,
            ));
        }

        Ok(ContinueStatement {
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context: ctx.clone(),
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        ContinueStatement {
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for ContinueStatement<TypeInformation> {
    type Validated = ContinueStatement<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let ContinueStatement { info, position } = self;

        Ok(ContinueStatement {
            info: info.validate(&position)?,
            position,
        })
    }
}
