use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::Postfix,
    typechecker::{
        context::Context,
        error::{ArityMismatch, TypeCheckError, TypeMismatch, UndefinedVariable},
        matcher,
        types::{BasicType, FunctionParamType, MetaKind, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

/// Look up a member on an already dereferenced object type. `Ok(None)`
/// means the member does not exist; the caller turns that into a
/// diagnostic.
pub(crate) fn member_access(
    ctx: &Context,
    object: &Type,
    property: &str,
) -> TypeResult<Option<Type>> {
    let ty = match object {
        Type::Unset => Some(Type::Unset),

        // The array surface is fixed: length, extend, slice.
        Type::Array(element) => match property {
            "length" => Some(Type::Basic(BasicType::U64)),
            "extend" => Some(Type::Function {
                params: vec![FunctionParamType::unnamed(Type::Basic(BasicType::U64))],
                return_value: Box::new(Type::Void),
            }),
            "slice" => Some(Type::Function {
                params: vec![
                    FunctionParamType::unnamed(Type::Basic(BasicType::U64)),
                    FunctionParamType::unnamed(Type::Basic(BasicType::U64)),
                ],
                return_value: Box::new(Type::Array(element.clone())),
            }),
            _ => None,
        },

        Type::Struct(s) => s
            .fields
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, ty)| ty.clone()),

        // Projection out of a matched variant constructor.
        Type::VariantConstructor(constructor) => constructor
            .parameters
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, ty)| ty.clone()),

        Type::Class(class) => class
            .attribute(property)
            .filter(|a| !a.is_static)
            .map(|a| a.ty.clone())
            .or_else(|| {
                class
                    .method(property)
                    .filter(|m| !m.is_static)
                    .map(|m| m.ty.clone())
            })
            .map(|ty| ty.deref(ctx))
            .transpose()?,

        Type::Interface(interface) => interface
            .methods
            .iter()
            .find(|m| m.name == property)
            .map(|m| m.ty.deref(ctx))
            .transpose()?,

        Type::Process(process) => process
            .attributes
            .iter()
            .find(|a| a.name == property && !a.is_static)
            .map(|a| a.ty.clone())
            .or_else(|| {
                process
                    .methods
                    .iter()
                    .find(|m| m.name == property && !m.is_static)
                    .map(|m| m.ty.clone())
            })
            .map(|ty| ty.deref(ctx))
            .transpose()?,

        Type::FfiNamespace(name) => ctx
            .scope
            .get_ffi(name)
            .and_then(|ffi| ffi.method(property).cloned()),

        // Static access and constructor/member selection go through the
        // meta type of the named declaration.
        Type::Meta(MetaKind::Class, inner) => match inner.as_ref() {
            Type::Class(class) => class
                .attribute(property)
                .filter(|a| a.is_static)
                .map(|a| a.ty.clone())
                .or_else(|| {
                    class
                        .method(property)
                        .filter(|m| m.is_static)
                        .map(|m| m.ty.clone())
                })
                .map(|ty| ty.deref(ctx))
                .transpose()?,
            _ => None,
        },
        Type::Meta(MetaKind::Enum, inner) => match inner.as_ref() {
            Type::Enum(e) => e.member(property).map(|_| Type::Enum(e.clone())),
            _ => None,
        },
        Type::Meta(MetaKind::Variant, inner) => match inner.as_ref() {
            Type::Variant(variant) => variant.constructor(property).map(|constructor| {
                Type::Function {
                    params: constructor
                        .parameters
                        .iter()
                        .map(|(name, ty)| FunctionParamType::named(name, ty.clone()))
                        .collect(),
                    return_value: Box::new(Type::VariantConstructor(Box::new(
                        constructor.clone(),
                    ))),
                }
            }),
            _ => None,
        },

        _ => None,
    };

    Ok(ty)
}

fn object_type(ctx: &Context, info: &TypeInformation) -> TypeResult<Type> {
    match { info.type_id.borrow().clone() } {
        Some(ty) => ty.deref(ctx),
        None => Ok(Type::Unset),
    }
}

impl TypeCheckable for Postfix<()> {
    type Typed = Postfix<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();

        match self {
            Postfix::Call {
                expr,
                args,
                position,
                ..
            } => {
                let expr = expr.check(ctx, None)?;
                let mut callee = object_type(ctx, &expr.get_info())?;

                // A hint can instantiate a generic callee up front (e.g. a
                // variant constructor under a concrete variant hint), so
                // the argument hints are already concrete.
                if let (
                    Some(hint),
                    Type::Function {
                        params,
                        return_value,
                    },
                ) = (hint, &callee)
                {
                    let outcome = matcher::matches(ctx, hint, return_value, false);
                    if outcome.success && !outcome.substitutions.is_empty() {
                        callee = Type::Function {
                            params: params
                                .iter()
                                .map(|p| crate::typechecker::types::FunctionParamType {
                                    name: p.name.clone(),
                                    ty: p.ty.substitute(&outcome.substitutions),
                                    mutable: p.mutable,
                                })
                                .collect(),
                            return_value: Box::new(
                                return_value.substitute(&outcome.substitutions),
                            ),
                        };
                    }
                }

                let (checked_args, type_id) = match &callee {
                    Type::Function {
                        params,
                        return_value,
                    } => {
                        if params.len() != args.len() {
                            return Err(TypeCheckError::ArityMismatch(
                                ArityMismatch {
                                    name: "function".into(),
                                    expected: params.len(),
                                    actual: args.len(),
                                },
                                position,
                            ));
                        }

                        let mut checked = vec![];
                        let mut pairs = vec![];
                        for (param, arg) in params.iter().zip(args.into_iter()) {
                            let arg = arg.check(ctx, Some(&param.ty))?;
                            let arg_ty = { arg.get_info().type_id.borrow().clone() }
                                .unwrap_or(Type::Unset);
                            pairs.push((param.ty.clone(), arg_ty));
                            checked.push(arg);
                        }

                        // One shared substitution pass over the whole
                        // argument list keeps generics consistent and
                        // instantiates the return type.
                        let outcome = matcher::matches_many(ctx, &pairs, false);
                        let return_type = if outcome.success {
                            if outcome.substitutions.is_empty() {
                                return_value.as_ref().clone()
                            } else {
                                return_value.substitute(&outcome.substitutions)
                            }
                        } else {
                            ctx.report(TypeCheckError::TypeMismatch(
                                TypeMismatch {
                                    expected: callee.clone(),
                                    actual: Type::Function {
                                        params: pairs
                                            .iter()
                                            .map(|(_, got)| {
                                                FunctionParamType::unnamed(got.clone())
                                            })
                                            .collect(),
                                        return_value: Box::new(Type::Unset),
                                    },
                                },
                                position.clone(),
                            ));
                            return_value.as_ref().clone()
                        };

                        (checked, Some(return_type))
                    }
                    Type::Unset => {
                        let mut checked = vec![];
                        for arg in args {
                            checked.push(arg.check(ctx, None)?);
                        }
                        (checked, Some(Type::Unset))
                    }
                    other => {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Function {
                                    params: vec![],
                                    return_value: Box::new(Type::Unset),
                                },
                                actual: other.clone(),
                            },
                            position.clone(),
                        ));
                        let mut checked = vec![];
                        for arg in args {
                            checked.push(arg.check(ctx, None)?);
                        }
                        (checked, Some(Type::Unset))
                    }
                };

                Ok(Postfix::Call {
                    expr,
                    args: checked_args,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(type_id)),
                        context,
                    },
                    position,
                })
            }

            Postfix::Index {
                expr,
                index,
                position,
                ..
            } => {
                let expr = expr.check(ctx, None)?;
                let object = object_type(ctx, &expr.get_info())?;

                let (index, overload, type_id) = match &object {
                    Type::Array(element) => {
                        let index = index.check(ctx, Some(&Type::Basic(BasicType::U64)))?;
                        (index, None, Some(element.as_ref().clone()))
                    }
                    Type::Class(class) => {
                        // Operator overloading hook: a `get` method turns
                        // indexing into a method call for the emitter.
                        match class.method("get").filter(|m| !m.is_static) {
                            None => {
                                ctx.report(TypeCheckError::TypeMismatch(
                                    TypeMismatch {
                                        expected: Type::Array(Box::new(Type::Unset)),
                                        actual: object.clone(),
                                    },
                                    position.clone(),
                                ));
                                let index = index.check(ctx, None)?;
                                (index, None, Some(Type::Unset))
                            }
                            Some(get) => match get.ty.deref(ctx)? {
                                Type::Function {
                                    params,
                                    return_value,
                                } if params.len() == 1 => {
                                    let index = index.check(ctx, Some(&params[0].ty))?;
                                    (
                                        index,
                                        Some(Box::new(get.ty.clone())),
                                        Some(*return_value),
                                    )
                                }
                                _ => {
                                    let index = index.check(ctx, None)?;
                                    (index, Some(Box::new(get.ty.clone())), Some(Type::Unset))
                                }
                            },
                        }
                    }
                    Type::Unset => {
                        let index = index.check(ctx, None)?;
                        (index, None, Some(Type::Unset))
                    }
                    other => {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Array(Box::new(Type::Unset)),
                                actual: other.clone(),
                            },
                            position.clone(),
                        ));
                        let index = index.check(ctx, None)?;
                        (index, None, Some(Type::Unset))
                    }
                };

                Ok(Postfix::Index {
                    expr,
                    index,
                    overload,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(type_id)),
                        context,
                    },
                    position,
                })
            }

            Postfix::Property {
                expr,
                property,
                position,
                ..
            } => {
                let expr = expr.check(ctx, None)?;
                let object = object_type(ctx, &expr.get_info())?;

                let type_id = match member_access(ctx, &object, &property)? {
                    Some(ty) => Some(ty),
                    None => {
                        ctx.report(TypeCheckError::UndefinedVariable(
                            UndefinedVariable {
                                variable_name: property.clone(),
                            },
                            position.clone(),
                        ));
                        Some(Type::Unset)
                    }
                };

                Ok(Postfix::Property {
                    expr,
                    property,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(type_id)),
                        context,
                    },
                    position,
                })
            }

            Postfix::NullableProperty {
                expr,
                property,
                position,
                ..
            } => {
                let expr = expr.check(ctx, None)?;
                let object = object_type(ctx, &expr.get_info())?;

                let type_id = match &object {
                    Type::Nullable(inner) => {
                        let inner = inner.deref(ctx)?;
                        match member_access(ctx, &inner, &property)? {
                            Some(member) => match &member {
                                // An already-nullable member passes through;
                                // anything else must admit wrapping because
                                // the access may short circuit to null.
                                Type::Nullable(_) | Type::Unset => Some(member),
                                _ => match Type::wrap_nullable(member, &position) {
                                    Ok(wrapped) => Some(wrapped),
                                    Err(error) => {
                                        ctx.report(error);
                                        Some(Type::Unset)
                                    }
                                },
                            },
                            None => {
                                ctx.report(TypeCheckError::UndefinedVariable(
                                    UndefinedVariable {
                                        variable_name: property.clone(),
                                    },
                                    position.clone(),
                                ));
                                Some(Type::Unset)
                            }
                        }
                    }
                    Type::Unset => Some(Type::Unset),
                    other => {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Nullable(Box::new(Type::Unset)),
                                actual: other.clone(),
                            },
                            position.clone(),
                        ));
                        Some(Type::Unset)
                    }
                };

                Ok(Postfix::NullableProperty {
                    expr,
                    property,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(type_id)),
                        context,
                    },
                    position,
                })
            }
        }
    }

    fn revert(this: &Self::Typed) -> Self {
        match this {
            Postfix::Call {
                expr,
                args,
                position,
                ..
            } => Postfix::Call {
                expr: TypeCheckable::revert(expr),
                args: args.iter().map(TypeCheckable::revert).collect(),
                info: (),
                position: position.clone(),
            },
            Postfix::Index {
                expr,
                index,
                position,
                ..
            } => Postfix::Index {
                expr: TypeCheckable::revert(expr),
                index: TypeCheckable::revert(index),
                overload: None,
                info: (),
                position: position.clone(),
            },
            Postfix::Property {
                expr,
                property,
                position,
                ..
            } => Postfix::Property {
                expr: TypeCheckable::revert(expr),
                property: property.clone(),
                info: (),
                position: position.clone(),
            },
            Postfix::NullableProperty {
                expr,
                property,
                position,
                ..
            } => Postfix::NullableProperty {
                expr: TypeCheckable::revert(expr),
                property: property.clone(),
                info: (),
                position: position.clone(),
            },
        }
    }
}

impl TypedConstruct for Postfix<TypeInformation> {
    type Validated = Postfix<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        match self {
            Postfix::Call {
                expr,
                args,
                info,
                position,
            } => {
                let mut validated = vec![];
                for arg in args {
                    validated.push(arg.validate()?);
                }
                Ok(Postfix::Call {
                    expr: expr.validate()?,
                    args: validated,
                    info: info.validate(&position)?,
                    position,
                })
            }
            Postfix::Index {
                expr,
                index,
                overload,
                info,
                position,
            } => Ok(Postfix::Index {
                expr: expr.validate()?,
                index: index.validate()?,
                overload,
                info: info.validate(&position)?,
                position,
            }),
            Postfix::Property {
                expr,
                property,
                info,
                position,
            } => Ok(Postfix::Property {
                expr: expr.validate()?,
                property,
                info: info.validate(&position)?,
                position,
            }),
            Postfix::NullableProperty {
                expr,
                property,
                info,
                position,
            } => Ok(Postfix::NullableProperty {
                expr: expr.validate()?,
                property,
                info: info.validate(&position)?,
                position,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::Result;

    use crate::{
        lexer::Span,
        parser::ast::{Expression, Id, IntKind, Num, Postfix},
        typechecker::{
            context::Context,
            types::{BasicType, StructType, Type},
            TypeCheckable,
        },
    };

    fn var(ctx: &mut Context, name: &str, ty: Type) {
        ctx.scope
            .add_variable(name, Rc::new(RefCell::new(Some(ty))), false)
            .expect("adding failed");
    }

    #[test]
    fn test_array_length() -> Result<()> {
        let mut ctx = Context::default();
        var(
            &mut ctx,
            "xs",
            Type::Array(Box::new(Type::Basic(BasicType::U8))),
        );

        let access = Postfix::Property {
            expr: Expression::Id(Id::new("xs", Span::default())),
            property: "length".into(),
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            access.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U64))))
        );
        Ok(())
    }

    #[test]
    fn test_struct_field_access() -> Result<()> {
        let mut ctx = Context::default();
        var(
            &mut ctx,
            "p",
            Type::Struct(StructType {
                fields: vec![("x".into(), Type::Basic(BasicType::I32))],
            }),
        );

        let access = Postfix::Property {
            expr: Expression::Id(Id::new("p", Span::default())),
            property: "x".into(),
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            access.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::I32))))
        );
        Ok(())
    }

    #[test]
    fn test_missing_member_is_reported() -> Result<()> {
        let mut ctx = Context::default();
        var(
            &mut ctx,
            "p",
            Type::Struct(StructType { fields: vec![] }),
        );

        Postfix::Property {
            expr: Expression::Id(Id::new("p", Span::default())),
            property: "missing".into(),
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_array_indexing() -> Result<()> {
        let mut ctx = Context::default();
        var(
            &mut ctx,
            "xs",
            Type::Array(Box::new(Type::Basic(BasicType::U8))),
        );

        let access = Postfix::Index {
            expr: Expression::Id(Id::new("xs", Span::default())),
            index: Expression::Num(Num::Integer(0, IntKind::Decimal, (), Span::default())),
            overload: None,
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            access.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U8))))
        );
        Ok(())
    }

    #[test]
    fn test_slice_returns_same_array() -> Result<()> {
        let mut ctx = Context::default();
        var(
            &mut ctx,
            "xs",
            Type::Array(Box::new(Type::Basic(BasicType::U8))),
        );

        let call = Postfix::Call {
            expr: Expression::Postfix(Box::new(Postfix::Property {
                expr: Expression::Id(Id::new("xs", Span::default())),
                property: "slice".into(),
                info: (),
                position: Span::default(),
            })),
            args: vec![
                Expression::Num(Num::Integer(0, IntKind::Decimal, (), Span::default())),
                Expression::Num(Num::Integer(2, IntKind::Decimal, (), Span::default())),
            ],
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            call.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Array(Box::new(Type::Basic(
                BasicType::U8
            ))))))
        );
        Ok(())
    }
}
