use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Expression, Num, Prefix, PrefixOperator},
    typechecker::{
        context::Context,
        error::{TypeCheckError, TypeMismatch},
        typed_ast::expression::literals::least_sufficient_signed,
        types::{BasicType, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for Prefix<()> {
    type Typed = Prefix<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Prefix {
            operator,
            expression,
            position,
            ..
        } = self;

        match operator {
            // A negated integer literal is typed as one negative literal,
            // not as negation of an unsigned value.
            PrefixOperator::Minus => {
                if let Expression::Num(Num::Integer(value, kind, (), literal_position)) =
                    &expression
                {
                    let negated = negate_literal(*value).ok_or_else(|| {
                        TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(BasicType::I64),
                                actual: Type::Basic(BasicType::U64),
                            },
                            position.clone(),
                        )
                    })?;

                    let ty = signed_literal_type(ctx, negated, hint, &position)?;
                    let info = TypeInformation {
                        type_id: Rc::new(RefCell::new(Some(ty))),
                        context,
                    };

                    return Ok(Prefix {
                        operator,
                        expression: Expression::Num(Num::Integer(
                            *value,
                            *kind,
                            info.clone(),
                            literal_position.clone(),
                        )),
                        info,
                        position,
                    });
                }

                let expression = expression.check(ctx, None)?;
                let ty = { expression.get_info().type_id.borrow().clone() };

                if let Some(ty) = &ty {
                    let derefed = ty.deref(ctx)?;
                    let signed = matches!(
                        &derefed,
                        Type::Basic(basic) if basic.is_signed() || basic.is_float()
                    );
                    if !signed {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(BasicType::I64),
                                actual: derefed,
                            },
                            position.clone(),
                        ));
                    }
                }

                Ok(Prefix {
                    operator,
                    expression,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(ty)),
                        context,
                    },
                    position,
                })
            }
            PrefixOperator::Negate => {
                let expression = expression.check(ctx, Some(&Type::Boolean))?;

                Ok(Prefix {
                    operator,
                    expression,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(Some(Type::Boolean))),
                        context,
                    },
                    position,
                })
            }
            PrefixOperator::BitNot => {
                let expression = expression.check(ctx, None)?;
                let ty = { expression.get_info().type_id.borrow().clone() };

                if let Some(ty) = &ty {
                    let derefed = ty.deref(ctx)?;
                    if !matches!(&derefed, Type::Basic(basic) if !basic.is_float()) {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(BasicType::I64),
                                actual: derefed,
                            },
                            position.clone(),
                        ));
                    }
                }

                Ok(Prefix {
                    operator,
                    expression,
                    info: TypeInformation {
                        type_id: Rc::new(RefCell::new(ty)),
                        context,
                    },
                    position,
                })
            }
        }
    }

    fn revert(this: &Self::Typed) -> Self {
        let Prefix {
            operator,
            expression,
            position,
            ..
        } = this;

        Prefix {
            operator: *operator,
            expression: TypeCheckable::revert(expression),
            info: (),
            position: position.clone(),
        }
    }
}

fn negate_literal(value: u64) -> Option<i64> {
    if value <= i64::MAX as u64 {
        Some(-(value as i64))
    } else if value == (i64::MAX as u64) + 1 {
        Some(i64::MIN)
    } else {
        None
    }
}

fn signed_literal_type(
    ctx: &Context,
    value: i64,
    hint: Option<&Type>,
    position: &crate::lexer::Span,
) -> TypeResult<Type> {
    let target = match hint.map(|h| h.deref(ctx)) {
        Some(Ok(Type::Basic(basic))) => Some(basic),
        _ => None,
    };

    match target {
        Some(basic) if basic.is_float() => Ok(Type::Basic(basic)),
        Some(basic) => {
            if !basic.fits_negative(value) {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::Basic(basic),
                        actual: Type::Basic(least_sufficient_signed(value)),
                    },
                    position.clone(),
                ));
            }
            Ok(Type::Basic(basic))
        }
        None => Ok(Type::Basic(least_sufficient_signed(value))),
    }
}

impl TypedConstruct for Prefix<TypeInformation> {
    type Validated = Prefix<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Prefix {
            operator,
            expression,
            info,
            position,
        } = self;

        Ok(Prefix {
            operator,
            expression: expression.validate()?,
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
    use crate::{lexer::Span, parser::ast::IntKind};

    fn negative(value: u64) -> Prefix<()> {
        Prefix {
            operator: PrefixOperator::Minus,
            expression: Expression::Num(Num::Integer(value, IntKind::Decimal, (), Span::default())),
            info: (),
            position: Span::default(),
        }
    }

    #[test]
    fn test_negative_literal_selects_signed_kind() -> Result<()> {
        let mut ctx = Context::default();

        let prefix = negative(1).check(&mut ctx, None)?;
        assert_eq!(
            prefix.info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::I8))))
        );

        let prefix = negative(1000).check(&mut ctx, None)?;
        assert_eq!(
            prefix.info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::I16))))
        );
        Ok(())
    }

    #[test]
    fn test_negative_literal_rejected_for_unsigned_hint() {
        let mut ctx = Context::default();
        let result = negative(1).check(&mut ctx, Some(&Type::Basic(BasicType::U8)));
        assert!(result.is_err());
    }

    #[test]
    fn test_negate_requires_bool() -> Result<()> {
        let mut ctx = Context::default();
        let prefix = Prefix {
            operator: PrefixOperator::Negate,
            expression: Expression::Num(Num::Integer(1, IntKind::Decimal, (), Span::default())),
            info: (),
            position: Span::default(),
        }
        .check(&mut ctx, None)?;

        assert_eq!(
            prefix.info.type_id,
            Rc::new(RefCell::new(Some(Type::Boolean)))
        );
        assert!(ctx.reporter.has_errors());
        Ok(())
    }
}
