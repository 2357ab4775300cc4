use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::Id,
    typechecker::{
        context::Context,
        error::{TypeCheckError, UndefinedVariable},
        types::{MetaKind, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for Id<()> {
    type Typed = Id<TypeInformation>;

    /// Identifier resolution walks the scope chain. A name that resolves
    /// to a type declaration instead of a value yields the corresponding
    /// meta type; explicit type arguments select (and cache) a generic
    /// function instantiation.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Id {
            name,
            type_args,
            position,
            ..
        } = self;

        if !type_args.is_empty() {
            let Some(function) = ctx.scope.get_function(&name) else {
                return Err(TypeCheckError::UndefinedVariable(
                    UndefinedVariable {
                        variable_name: name,
                    },
                    position,
                ));
            };

            let mut args = vec![];
            for arg in &type_args {
                args.push(Type::try_from((arg, &*ctx))?);
            }

            let instantiated = function.instantiate(&args, ctx, &position)?;

            return Ok(Id {
                name,
                type_args,
                info: TypeInformation {
                    type_id: Rc::new(RefCell::new(Some(instantiated))),
                    context: ctx.clone(),
                },
                position,
            });
        }

        // Value bindings shadow everything else.
        if let Some(type_id) = ctx.scope.resolve_name(&name) {
            return Ok(Id {
                name,
                type_args,
                info: TypeInformation {
                    type_id,
                    context: ctx.clone(),
                },
                position,
            });
        }

        if let Some(function) = ctx.scope.get_function(&name) {
            if !function.generics.is_empty() {
                return Err(TypeCheckError::ArityMismatch(
                    crate::typechecker::error::ArityMismatch {
                        name,
                        expected: function.generics.len(),
                        actual: 0,
                    },
                    position,
                ));
            }

            return Ok(Id {
                name,
                type_args,
                info: TypeInformation {
                    type_id: Rc::new(RefCell::new(Some(function.ty))),
                    context: ctx.clone(),
                },
                position,
            });
        }

        if let Some(declared) = ctx.scope.get_declared_type(&name) {
            let kind = match &declared.ty {
                Type::Class(_) => Some(MetaKind::Class),
                Type::Interface(_) => Some(MetaKind::Interface),
                Type::Enum(_) => Some(MetaKind::Enum),
                Type::Variant(_) => Some(MetaKind::Variant),
                _ => None,
            };

            if let Some(kind) = kind {
                return Ok(Id {
                    name,
                    type_args,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(Some(Type::Meta(
                            kind,
                            Box::new(declared.ty),
                        )))),
                        context: ctx.clone(),
                    },
                    position,
                });
            }
        }

        if ctx.scope.get_ffi(&name).is_some() {
            return Ok(Id {
                name: name.clone(),
                type_args,
                info: TypeInformation {
                    type_id: Rc::new(RefCell::new(Some(Type::FfiNamespace(name)))),
                    context: ctx.clone(),
                },
                position,
            });
        }

        Err(TypeCheckError::UndefinedVariable(
            UndefinedVariable {
                variable_name: name,
            },
            position,
        ))
    }

    fn revert(this: &Self::Typed) -> Self {
        let Id {
            name,
            type_args,
            position,
            ..
        } = this;

        Id {
            name: name.to_owned(),
            type_args: type_args.to_owned(),
            info: (),
            position: position.clone(),
        }
    }
}

impl TypedConstruct for Id<TypeInformation> {
    type Validated = Id<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Id {
            name,
            type_args,
            info,
            position,
        } = self;

        Ok(Id {
            name,
            type_args,
            info: info.validate(&position)?,
            position,
        })
    }
}
