use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{BinaryExpression, BinaryOperator},
    typechecker::{
        context::Context,
        error::{TypeCheckError, TypeMismatch},
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

fn is_integer(ty: &Type) -> bool {
    matches!(ty, Type::Basic(basic) if !basic.is_float())
}

fn comparable(ty: &Type) -> bool {
    matches!(
        ty,
        Type::Basic(_)
            | Type::Boolean
            | Type::Enum(_)
            | Type::Class(_)
            | Type::Nullable(_)
            | Type::Null
            | Type::Unset
    )
}

impl TypeCheckable for BinaryExpression<()> {
    type Typed = BinaryExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let BinaryExpression {
            left,
            right,
            operator,
            position,
            ..
        } = self;

        // Arithmetic and bitwise results keep the operand type, so the
        // surrounding hint reaches the left operand; logical operands are
        // hinted boolean.
        let left_hint = if operator.is_logical() {
            Some(Type::Boolean)
        } else if operator.is_comparison() {
            None
        } else {
            hint.cloned()
        };

        let left = left.check(ctx, left_hint.as_ref())?;
        let left_type = { left.get_info().type_id.borrow().clone() };

        // The right operand is expected to agree with the left; any
        // disagreement is reported by that reconciliation.
        let right = right.check(ctx, left_type.as_ref())?;

        let operand_type = match &left_type {
            Some(left_type) => Some(left_type.deref(ctx)?),
            None => None,
        };

        let type_id = match operator {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::Divide
            | BinaryOperator::Modulo => {
                if let Some(ty) = &operand_type {
                    if !ty.is_numeric() {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(crate::typechecker::types::BasicType::I64),
                                actual: ty.clone(),
                            },
                            position.clone(),
                        ));
                    }
                }
                operand_type
            }
            BinaryOperator::Equals | BinaryOperator::NotEquals => {
                if let Some(ty) = &operand_type {
                    if !comparable(ty) {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Boolean,
                                actual: ty.clone(),
                            },
                            position.clone(),
                        ));
                    }
                }
                Some(Type::Boolean)
            }
            BinaryOperator::GreaterThan
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterOrEqual
            | BinaryOperator::LessOrEqual => {
                if let Some(ty) = &operand_type {
                    if !ty.is_numeric() {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(crate::typechecker::types::BasicType::I64),
                                actual: ty.clone(),
                            },
                            position.clone(),
                        ));
                    }
                }
                Some(Type::Boolean)
            }
            BinaryOperator::And | BinaryOperator::Or => Some(Type::Boolean),
            BinaryOperator::BitAnd
            | BinaryOperator::BitOr
            | BinaryOperator::BitXor
            | BinaryOperator::ShiftLeft
            | BinaryOperator::ShiftRight => {
                if let Some(ty) = &operand_type {
                    if !is_integer(ty) {
                        ctx.report(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Basic(crate::typechecker::types::BasicType::I64),
                                actual: ty.clone(),
                            },
                            position.clone(),
                        ));
                    }
                }
                operand_type
            }
        };

        Ok(BinaryExpression {
            left,
            right,
            operator,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(type_id)),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        let BinaryExpression {
            left,
            right,
            operator,
            position,
            ..
        } = this;

        BinaryExpression {
            left: TypeCheckable::revert(left),
            right: TypeCheckable::revert(right),
            operator: *operator,
            info: (),
            position: position.clone(),
        }
    }
}

impl TypedConstruct for BinaryExpression<TypeInformation> {
    type Validated = BinaryExpression<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let BinaryExpression {
            left,
            right,
            operator,
            info,
            position,
        } = self;

        Ok(BinaryExpression {
            left: left.validate()?,
            right: right.validate()?,
            operator,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use anyhow::Result;

    use crate::{
        lexer::Span,
        parser::ast::{BinaryExpression, BinaryOperator, Expression, IntKind, Num},
        typechecker::{
            context::Context,
            types::{BasicType, Type},
            TypeCheckable,
        },
    };

    fn binary(operator: BinaryOperator) -> BinaryExpression<()> {
        BinaryExpression {
            left: Expression::Num(Num::Integer(42, IntKind::Decimal, (), Span::default())),
            right: Expression::Num(Num::Integer(7, IntKind::Decimal, (), Span::default())),
            operator,
            info: (),
            position: Span::default(),
        }
    }

    #[test]
    fn test_arithmetic_keeps_operand_type() -> Result<()> {
        let mut ctx = Context::default();
        let expression = binary(BinaryOperator::Add).check(&mut ctx, None)?;

        assert_eq!(
            expression.info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U8))))
        );
        assert!(!ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_comparison_yields_bool() -> Result<()> {
        let mut ctx = Context::default();
        let expression = binary(BinaryOperator::Equals).check(&mut ctx, None)?;

        assert_eq!(
            expression.info.type_id,
            Rc::new(RefCell::new(Some(Type::Boolean)))
        );
        Ok(())
    }

    #[test]
    fn test_hint_reaches_operands() -> Result<()> {
        let mut ctx = Context::default();
        let expression =
            binary(BinaryOperator::Add).check(&mut ctx, Some(&Type::Basic(BasicType::U16)))?;

        assert_eq!(
            expression.info.type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::U16))))
        );
        Ok(())
    }

    #[test]
    fn test_mismatched_operands_are_reported() -> Result<()> {
        let mut ctx = Context::default();
        let expression = BinaryExpression {
            left: Expression::Num(Num::Integer(1, IntKind::Decimal, (), Span::default())),
            right: Expression::Bool(crate::parser::ast::Bool {
                value: true,
                info: (),
                position: Span::default(),
            }),
            operator: BinaryOperator::Add,
            info: (),
            position: Span::default(),
        };

        expression.check(&mut ctx, None)?;
        assert!(ctx.reporter.has_errors());
        Ok(())
    }
}
