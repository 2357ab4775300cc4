use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Expression, New, Spawn},
    typechecker::{
        context::Context,
        error::{ArityMismatch, TypeCheckError, TypeMismatch},
        types::{ClassType, ProcessType, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

/// Resolve the constructed class and check the arguments against its
/// `init` constructor. Returns the instantiated class type.
fn check_construction(
    ctx: &mut Context,
    class_name: &crate::parser::ast::TypeName,
    args: Vec<Expression<()>>,
    position: &crate::lexer::Span,
) -> TypeResult<(Option<ClassType>, Vec<Expression<TypeInformation>>)> {
    let target = Type::try_from((class_name, &*ctx))?.deref(ctx)?;

    let Type::Class(class) = target else {
        ctx.report(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Class(Box::new(ClassType {
                    name: class_name.to_string(),
                    supertypes: vec![],
                    attributes: vec![],
                    methods: vec![],
                })),
                actual: target,
            },
            position.clone(),
        ));
        let mut checked = vec![];
        for arg in args {
            checked.push(arg.check(ctx, None)?);
        }
        return Ok((None, checked));
    };

    let constructor = class.method("init").map(|init| init.ty.clone());

    let checked = match constructor {
        Some(init) => match init.deref(ctx)? {
            Type::Function { params, .. } => {
                if params.len() != args.len() {
                    return Err(TypeCheckError::ArityMismatch(
                        ArityMismatch {
                            name: class.name.clone(),
                            expected: params.len(),
                            actual: args.len(),
                        },
                        position.clone(),
                    ));
                }

                let mut checked = vec![];
                for (param, arg) in params.iter().zip(args.into_iter()) {
                    checked.push(arg.check(ctx, Some(&param.ty))?);
                }
                checked
            }
            _ => {
                let mut checked = vec![];
                for arg in args {
                    checked.push(arg.check(ctx, None)?);
                }
                checked
            }
        },
        None => {
            if !args.is_empty() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: class.name.clone(),
                        expected: 0,
                        actual: args.len(),
                    },
                    position.clone(),
                ));
            }
            vec![]
        }
    };

    Ok((Some(*class), checked))
}

impl TypeCheckable for New<()> {
    type Typed = New<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let New {
            class,
            args,
            position,
            ..
        } = self;

        let (constructed, args) = check_construction(ctx, &class, args, &position)?;
        let type_id = constructed
            .map(|c| Type::Class(Box::new(c)))
            .unwrap_or(Type::Unset);

        Ok(New {
            class,
            args,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(type_id))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        New {
            class: this.class.clone(),
            args: this.args.iter().map(TypeCheckable::revert).collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for New<TypeInformation> {
    type Validated = New<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let New {
            class,
            args,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for arg in args {
            validated.push(arg.validate()?);
        }

        Ok(New {
            class,
            args: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for Spawn<()> {
    type Typed = Spawn<TypeInformation>;

    /// `spawn` constructs the class like `new` but the result is a process
    /// carrying the class's member surface.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Spawn {
            class,
            args,
            position,
            ..
        } = self;

        let (constructed, args) = check_construction(ctx, &class, args, &position)?;
        let type_id = constructed
            .map(|c| {
                Type::Process(Box::new(ProcessType {
                    name: c.name,
                    attributes: c.attributes,
                    methods: c.methods,
                }))
            })
            .unwrap_or(Type::Unset);

        Ok(Spawn {
            class,
            args,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(type_id))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Spawn {
            class: this.class.clone(),
            args: this.args.iter().map(TypeCheckable::revert).collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Spawn<TypeInformation> {
    type Validated = Spawn<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Spawn {
            class,
            args,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for arg in args {
            validated.push(arg.validate()?);
        }

        Ok(Spawn {
            class,
            args: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}
