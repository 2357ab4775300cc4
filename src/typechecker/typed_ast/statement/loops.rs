use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{DoWhileLoop, ForLoop, ForeachLoop, Statement, WhileLoop},
    transform,
    typechecker::{
        context::{Context, Reporter},
        error::{TypeCheckError, TypeMismatch},
        typed_ast::expression::member_access,
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for WhileLoop<()> {
    type Typed = WhileLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let WhileLoop {
            condition,
            block,
            position,
            ..
        } = self;

        let condition = condition.check(ctx, Some(&Type::Boolean))?;

        let previous = ctx.env.within_loop;
        ctx.env.within_loop = true;
        let block = block.check(ctx, None);
        ctx.env.within_loop = previous;
        let block = block?;

        Ok(WhileLoop {
            condition,
            block,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        WhileLoop {
            condition: TypeCheckable::revert(&this.condition),
            block: TypeCheckable::revert(&this.block),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for WhileLoop<TypeInformation> {
    type Validated = WhileLoop<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let WhileLoop {
            condition,
            block,
            info,
            position,
        } = self;

        Ok(WhileLoop {
            condition: condition.validate()?,
            block: block.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for DoWhileLoop<()> {
    type Typed = DoWhileLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let DoWhileLoop {
            block,
            condition,
            position,
            ..
        } = self;

        let previous = ctx.env.within_loop;
        ctx.env.within_loop = true;
        let block = block.check(ctx, None);
        ctx.env.within_loop = previous;
        let block = block?;

        let condition = condition.check(ctx, Some(&Type::Boolean))?;

        Ok(DoWhileLoop {
            block,
            condition,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        DoWhileLoop {
            block: TypeCheckable::revert(&this.block),
            condition: TypeCheckable::revert(&this.condition),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for DoWhileLoop<TypeInformation> {
    type Validated = DoWhileLoop<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let DoWhileLoop {
            block,
            condition,
            info,
            position,
        } = self;

        Ok(DoWhileLoop {
            block: block.validate()?,
            condition: condition.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for ForLoop<()> {
    type Typed = ForLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let ForLoop {
            init,
            condition,
            update,
            block,
            position,
            ..
        } = self;

        // The init binding lives in a scope that wraps the whole loop.
        ctx.scope.enter_scope();

        let result = (|| {
            let init = match init {
                Some(init) => Some(init.check(ctx, None)?),
                None => None,
            };
            let condition = condition.check(ctx, Some(&Type::Boolean))?;
            let update = match update {
                Some(update) => Some(update.check(ctx, None)?),
                None => None,
            };

            let previous = ctx.env.within_loop;
            ctx.env.within_loop = true;
            let block = block.check(ctx, None);
            ctx.env.within_loop = previous;

            Ok::<_, TypeCheckError>((init, condition, update, block?))
        })();

        ctx.scope.exit_scope();
        let (init, condition, update, block) = result?;

        Ok(ForLoop {
            init,
            condition,
            update,
            block,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        ForLoop {
            init: this.init.as_ref().map(TypeCheckable::revert),
            condition: TypeCheckable::revert(&this.condition),
            update: this.update.as_ref().map(TypeCheckable::revert),
            block: TypeCheckable::revert(&this.block),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for ForLoop<TypeInformation> {
    type Validated = ForLoop<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let ForLoop {
            init,
            condition,
            update,
            block,
            info,
            position,
        } = self;

        Ok(ForLoop {
            init: init.map(|i| i.validate()).transpose()?,
            condition: condition.validate()?,
            update: update.map(|u| u.validate()).transpose()?,
            block: block.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl ForeachLoop<()> {
    /// Foreach never survives checking: depending on the iterable's kind
    /// it lowers to a counted `for` or to the `getIterable()` protocol
    /// loop, and the lowered statement is what gets checked.
    pub(crate) fn check_statement(
        self: Box<Self>,
        ctx: &mut Context,
    ) -> TypeResult<Statement<TypeInformation>> {
        // Probe the iterable's type without publishing diagnostics; the
        // lowered form re-checks it for real.
        let mut scratch = Context {
            scope: ctx.scope.clone(),
            env: ctx.env.clone(),
            reporter: Reporter::default(),
            owner: ctx.owner.clone(),
        };
        let iterable_type = match self.iterable.clone().check(&mut scratch, None) {
            Ok(iterable) => { iterable.get_info().type_id.borrow().clone() }
                .unwrap_or(Type::Unset)
                .deref(ctx)?,
            Err(_) => Type::Unset,
        };

        let lowered = match &iterable_type {
            Type::Array(_) | Type::Unset => transform::foreach_to_counted_for(*self),
            other => {
                if member_access(ctx, other, "getIterable")?.is_some() {
                    transform::foreach_to_iterator_loop(*self)
                } else {
                    ctx.report(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: Type::Array(Box::new(Type::Unset)),
                            actual: other.clone(),
                        },
                        self.iterable.position(),
                    ));
                    transform::foreach_to_counted_for(*self)
                }
            }
        };

        lowered.check(ctx, None)
    }
}

impl TypeCheckable for ForeachLoop<()> {
    type Typed = ForeachLoop<TypeInformation>;

    fn check(self, _ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        // Foreach is rewritten by `check_statement` before plain node
        // checking could ever see it.
        unreachable!("foreach must be lowered through Statement::check")
    }

    fn revert(this: &Self::Typed) -> Self {
        ForeachLoop {
            index: this.index.as_ref().map(TypeCheckable::revert),
            value: TypeCheckable::revert(&this.value),
            iterable: TypeCheckable::revert(&this.iterable),
            block: TypeCheckable::revert(&this.block),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for ForeachLoop<TypeInformation> {
    type Validated = ForeachLoop<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let ForeachLoop {
            index,
            value,
            iterable,
            block,
            info,
            position,
        } = self;

        Ok(ForeachLoop {
            index: index.map(|i| i.validate()).transpose()?,
            value: value.validate()?,
            iterable: iterable.validate()?,
            block: block.validate()?,
            info: info.validate(&position)?,
            position,
        })
    }
}
