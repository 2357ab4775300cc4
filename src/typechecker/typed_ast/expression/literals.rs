use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{AstString, BinaryString, Bool, FloatKind, Null, Num},
    typechecker::{
        builtins,
        context::Context,
        error::{IllegalNullableTarget, TypeCheckError, TypeMismatch},
        types::{BasicType, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

fn info(ctx: &Context, ty: Type) -> TypeInformation {
    TypeInformation {
        type_id: Rc::new(RefCell::new(Some(ty))),
        context: ctx.clone(),
    }
}

/// The smallest unsigned kind a non-negative value fits in.
pub(crate) fn least_sufficient_unsigned(value: u64) -> BasicType {
    if value <= u8::MAX as u64 {
        BasicType::U8
    } else if value <= u16::MAX as u64 {
        BasicType::U16
    } else if value <= u32::MAX as u64 {
        BasicType::U32
    } else {
        BasicType::U64
    }
}

/// The smallest signed kind a negative value fits in.
pub(crate) fn least_sufficient_signed(value: i64) -> BasicType {
    if value >= i8::MIN as i64 {
        BasicType::I8
    } else if value >= i16::MIN as i64 {
        BasicType::I16
    } else if value >= i32::MIN as i64 {
        BasicType::I32
    } else {
        BasicType::I64
    }
}

fn numeric_hint(ctx: &Context, hint: Option<&Type>) -> Option<BasicType> {
    match hint {
        Some(hint) => match hint.deref(ctx) {
            Ok(Type::Basic(basic)) => Some(basic),
            _ => None,
        },
        None => None,
    }
}

impl TypeCheckable for Num<()> {
    type Typed = Num<TypeInformation>;

    /// A numeric hint fixes the literal's stored type after a storage
    /// range check; without one the least sufficient kind by textual form
    /// wins.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let target = numeric_hint(ctx, hint);

        match self {
            Num::Integer(value, kind, _, position) => {
                let ty = match target {
                    Some(basic) => {
                        if !basic.fits_unsigned(value) {
                            return Err(TypeCheckError::TypeMismatch(
                                TypeMismatch {
                                    expected: Type::Basic(basic),
                                    actual: Type::Basic(least_sufficient_unsigned(value)),
                                },
                                position,
                            ));
                        }
                        basic
                    }
                    None => least_sufficient_unsigned(value),
                };

                Ok(Num::Integer(value, kind, info(ctx, Type::Basic(ty)), position))
            }
            Num::FloatingPoint(value, kind, _, position) => {
                let ty = match target {
                    Some(basic) => {
                        if !basic.fits_float(value) {
                            return Err(TypeCheckError::TypeMismatch(
                                TypeMismatch {
                                    expected: Type::Basic(basic),
                                    actual: Type::Basic(BasicType::F64),
                                },
                                position,
                            ));
                        }
                        basic
                    }
                    None => match kind {
                        FloatKind::Single => BasicType::F32,
                        FloatKind::Double => {
                            if BasicType::F32.fits_float(value) {
                                BasicType::F32
                            } else {
                                BasicType::F64
                            }
                        }
                    },
                };

                Ok(Num::FloatingPoint(
                    value,
                    kind,
                    info(ctx, Type::Basic(ty)),
                    position,
                ))
            }
        }
    }

    fn revert(this: &Self::Typed) -> Self {
        match this {
            Num::Integer(value, kind, _, position) => {
                Num::Integer(*value, *kind, (), position.clone())
            }
            Num::FloatingPoint(value, kind, _, position) => {
                Num::FloatingPoint(*value, *kind, (), position.clone())
            }
        }
    }
}

impl TypedConstruct for Num<TypeInformation> {
    type Validated = Num<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        match self {
            Num::Integer(value, kind, info, position) => {
                Ok(Num::Integer(value, kind, info.validate(&position)?, position))
            }
            Num::FloatingPoint(value, kind, info, position) => Ok(Num::FloatingPoint(
                value,
                kind,
                info.validate(&position)?,
                position,
            )),
        }
    }
}

impl TypeCheckable for Bool<()> {
    type Typed = Bool<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Bool {
            value, position, ..
        } = self;

        Ok(Bool {
            value,
            info: info(ctx, Type::Boolean),
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Bool {
            value: this.value,
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Bool<TypeInformation> {
    type Validated = Bool<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Bool {
            value,
            info,
            position,
        } = self;

        Ok(Bool {
            value,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for Null<()> {
    type Typed = Null<TypeInformation>;

    /// `null` needs a `Null` or nullable hint; anywhere else it is an
    /// illegal nullable target. The stored type adopts the hint so the
    /// emitter sees the target-typed null.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Null { position, .. } = self;

        let ty = match hint {
            None => Type::Null,
            Some(hint) => {
                let derefed = hint.deref(ctx).unwrap_or(Type::Unset);
                match derefed {
                    Type::Null | Type::Nullable(_) | Type::Unset => derefed,
                    other => {
                        ctx.report(TypeCheckError::IllegalNullableTarget(
                            IllegalNullableTarget {
                                target: other.clone(),
                            },
                            position.clone(),
                        ));
                        // Poison with the hint so checking continues.
                        other
                    }
                }
            }
        };

        Ok(Null {
            info: info(ctx, ty),
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Null {
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Null<TypeInformation> {
    type Validated = Null<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Null { info, position } = self;

        Ok(Null {
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for AstString<()> {
    type Typed = AstString<TypeInformation>;

    /// String literals live in the built-in `String` class, unless the
    /// hint is a string enum and the literal is one of its members.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let AstString {
            value, position, ..
        } = self;

        if let Some(hint) = hint {
            if let Ok(Type::Enum(e)) = hint.deref(ctx) {
                if e.is_string_enum() && e.has_string_member(&value) {
                    return Ok(AstString {
                        value,
                        info: info(ctx, Type::Enum(e)),
                        position,
                    });
                }
            }
        }

        let string = builtins::required(ctx, builtins::STRING, &position)?;
        let string = string.deref(ctx)?;

        Ok(AstString {
            value,
            info: info(ctx, string),
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        AstString {
            value: this.value.clone(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for AstString<TypeInformation> {
    type Validated = AstString<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let AstString {
            value,
            info,
            position,
        } = self;

        Ok(AstString {
            value,
            info: info.validate(&position)?,
            position,
        })
    }
}

impl TypeCheckable for BinaryString<()> {
    type Typed = BinaryString<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let BinaryString {
            value, position, ..
        } = self;

        Ok(BinaryString {
            value,
            info: info(ctx, Type::Array(Box::new(Type::Basic(BasicType::U8)))),
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        BinaryString {
            value: this.value.clone(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for BinaryString<TypeInformation> {
    type Validated = BinaryString<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let BinaryString {
            value,
            info,
            position,
        } = self;

        Ok(BinaryString {
            value,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::Result;

    use super::*;
    use crate::lexer::Span;
    use crate::parser::ast::IntKind;
    use crate::typechecker::declarations::DeclaredType;
    use crate::typechecker::types::{EnumMember, EnumType, EnumValue};

    #[test]
    fn test_least_sufficient_selection() -> Result<()> {
        let mut ctx = Context::default();

        let Num::Integer(_, _, info, _) =
            Num::Integer(42, IntKind::Decimal, (), Span::default()).check(&mut ctx, None)?
        else {
            unreachable!()
        };
        assert_eq!(
            info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U8))))
        );

        let Num::Integer(_, _, info, _) =
            Num::Integer(70000, IntKind::Decimal, (), Span::default()).check(&mut ctx, None)?
        else {
            unreachable!()
        };
        assert_eq!(
            info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U32))))
        );

        Ok(())
    }

    #[test]
    fn test_hint_fixes_storage_type() -> Result<()> {
        let mut ctx = Context::default();

        let num = Num::Integer(42, IntKind::Decimal, (), Span::default())
            .check(&mut ctx, Some(&Type::Basic(BasicType::I64)))?;

        assert_eq!(
            num.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::I64))))
        );
        Ok(())
    }

    #[test]
    fn test_out_of_range_literal_is_rejected() {
        let mut ctx = Context::default();

        let result = Num::Integer(300, IntKind::Decimal, (), Span::default())
            .check(&mut ctx, Some(&Type::Basic(BasicType::U8)));

        assert_eq!(
            result,
            Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: Type::Basic(BasicType::U8),
                    actual: Type::Basic(BasicType::U16),
                },
                Span::default()
            ))
        );
    }

    #[test]
    fn test_float_selection() -> Result<()> {
        let mut ctx = Context::default();

        let num = Num::FloatingPoint(2.5, FloatKind::Double, (), Span::default())
            .check(&mut ctx, None)?;
        assert_eq!(
            num.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::F32))))
        );

        let num = Num::FloatingPoint(1e300, FloatKind::Double, (), Span::default())
            .check(&mut ctx, None)?;
        assert_eq!(
            num.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::F64))))
        );

        Ok(())
    }

    #[test]
    fn test_null_requires_nullable_hint() -> Result<()> {
        let mut ctx = Context::default();

        let null = Null {
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, Some(&Type::Basic(BasicType::I32)))?;

        assert!(ctx.reporter.has_errors());
        assert!(null.info.has_type());
        Ok(())
    }

    #[test]
    fn test_string_enum_literal() -> Result<()> {
        let mut ctx = Context::default();
        let mode = EnumType {
            name: "Mode".into(),
            target: None,
            members: vec![EnumMember {
                name: "On".into(),
                value: Some(EnumValue::Str("on".into())),
            }],
        };
        ctx.scope
            .add_declared_type(DeclaredType::new(
                "Mode",
                vec![],
                Type::Enum(mode.clone()),
            ))
            .expect("adding failed");

        let string = AstString {
            value: "on".into(),
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, Some(&Type::Enum(mode.clone())))?;

        assert_eq!(
            { string.info.type_id.borrow().clone() },
            Some(Type::Enum(mode))
        );
        Ok(())
    }
}
