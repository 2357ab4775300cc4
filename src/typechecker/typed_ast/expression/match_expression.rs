use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{
        Expression, Id, LoweredArm, LoweredAssignment, MatchArm, MatchArmBody, MatchExpression,
        Pattern,
    },
    transform,
    typechecker::{
        context::Context,
        error::{ExhaustivenessFailure, TypeCheckError},
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

fn scrutinee_is_const(scrutinee: &Expression<()>, ctx: &Context) -> bool {
    match scrutinee {
        Expression::Id(id) => ctx.scope.is_constant(&id.name),
        Expression::Parens(inner) => scrutinee_is_const(inner, ctx),
        _ => false,
    }
}

impl MatchExpression<()> {
    /// Check a match in expression or statement form. Both share pattern
    /// dispatch and lowering; the expression form additionally requires a
    /// trailing wildcard and reconciles a result type across arms.
    pub(crate) fn check_match(
        self,
        ctx: &mut Context,
        hint: Option<&Type>,
        statement_form: bool,
    ) -> TypeResult<MatchExpression<TypeInformation>> {
        let context = ctx.clone();
        let MatchExpression {
            scrutinee,
            arms,
            position,
            ..
        } = self;

        let is_const = scrutinee_is_const(&scrutinee, ctx);
        let scrutinee = scrutinee.check(ctx, None)?;
        let scrutinee_type = { scrutinee.get_info().type_id.borrow().clone() }
            .unwrap_or(Type::Unset)
            .deref(ctx)?;

        // Every lowered arm re-derives the scrutinee through fresh nodes.
        let base = TypeCheckable::revert(&scrutinee);

        if arms.is_empty() {
            ctx.report(TypeCheckError::ExhaustivenessFailure(
                ExhaustivenessFailure {
                    reason: "match must have at least one arm".into(),
                },
                position.clone(),
            ));
        } else if !statement_form {
            let has_default = matches!(
                arms.last().map(|arm| &arm.pattern),
                Some(Pattern::Wildcard(_))
            );
            if !has_default {
                ctx.report(TypeCheckError::ExhaustivenessFailure(
                    ExhaustivenessFailure {
                        reason: "match expression requires a trailing wildcard arm".into(),
                    },
                    position.clone(),
                ));
            }
        }

        let mut result_type = hint.cloned();
        let mut checked_arms = vec![];

        for arm in arms {
            ctx.scope.enter_scope();
            let result = check_arm(
                ctx,
                arm,
                &scrutinee_type,
                is_const,
                &base,
                &mut result_type,
                statement_form,
            );
            ctx.scope.exit_scope();
            checked_arms.push(result?);
        }

        let type_id = if statement_form {
            Type::Void
        } else {
            result_type.unwrap_or(Type::Unset)
        };

        Ok(MatchExpression {
            scrutinee,
            arms: checked_arms,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(type_id))),
                context,
            },
            position,
        })
    }
}

fn check_arm(
    ctx: &mut Context,
    arm: MatchArm<()>,
    scrutinee_type: &Type,
    is_const: bool,
    base: &Expression<()>,
    result_type: &mut Option<Type>,
    statement_form: bool,
) -> TypeResult<MatchArm<TypeInformation>> {
    let MatchArm {
        pattern,
        guard,
        body,
        position,
        ..
    } = arm;

    let pattern = pattern.check(ctx, scrutinee_type, is_const)?;

    let guard = match guard {
        Some(guard) => Some(guard.check(ctx, Some(&Type::Boolean))?),
        None => None,
    };

    // Lower the pattern over the scrutinee base and fold the guard onto
    // the condition. The lowered conjunction re-enters the checker and
    // must come out boolean.
    let (condition, assignments) = pattern.lower(base);
    let condition = match (&condition, &guard) {
        (Some(condition), Some(guard)) => Some(transform::binary(
            condition.clone(),
            crate::parser::ast::BinaryOperator::And,
            TypeCheckable::revert(guard),
            &position,
        )),
        (Some(condition), None) => Some(condition.clone()),
        (None, Some(guard)) => Some(TypeCheckable::revert(guard)),
        (None, None) => None,
    };
    let condition = match condition {
        Some(condition) => Some(condition.check(ctx, Some(&Type::Boolean))?),
        None => None,
    };

    let mut lowered_assignments = vec![];
    for (name, value) in assignments {
        let target = Id::new(name, position.clone()).check(ctx, None)?;
        let binding_type = { target.info.type_id.borrow().clone() };
        let value = value.check(ctx, binding_type.as_ref())?;
        lowered_assignments.push(LoweredAssignment { target, value });
    }

    let (body, arm_type) = if statement_form {
        match body {
            MatchArmBody::Block(block) => {
                let block = block.check(ctx, None)?;
                (MatchArmBody::Block(block), Type::Void)
            }
            MatchArmBody::Expression(expression) => {
                let expression = expression.check(ctx, None)?;
                (MatchArmBody::Expression(expression), Type::Void)
            }
        }
    } else {
        let expression = transform::arm_body_to_expression(body);
        let expression = expression.check(ctx, result_type.as_ref())?;
        let ty = { expression.get_info().type_id.borrow().clone() }.unwrap_or(Type::Unset);
        if result_type.is_none() {
            *result_type = Some(ty.clone());
        }
        (MatchArmBody::Expression(expression), ty)
    };

    Ok(MatchArm {
        pattern,
        guard,
        body,
        lowered: Some(LoweredArm {
            condition,
            assignments: lowered_assignments,
        }),
        info: TypeInformation {
            type_id: Rc::new(RefCell::new(Some(arm_type))),
            context: ctx.clone(),
        },
        position,
    })
}

impl TypeCheckable for MatchExpression<()> {
    type Typed = MatchExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        self.check_match(ctx, hint, false)
    }

    fn revert(this: &Self::Typed) -> Self {
        MatchExpression {
            scrutinee: TypeCheckable::revert(&this.scrutinee),
            arms: this
                .arms
                .iter()
                .map(|arm| MatchArm {
                    pattern: Pattern::revert(&arm.pattern),
                    guard: arm.guard.as_ref().map(TypeCheckable::revert),
                    body: match &arm.body {
                        MatchArmBody::Expression(expression) => {
                            MatchArmBody::Expression(TypeCheckable::revert(expression))
                        }
                        MatchArmBody::Block(block) => {
                            MatchArmBody::Block(TypeCheckable::revert(block))
                        }
                    },
                    lowered: None,
                    info: (),
                    position: arm.position.clone(),
                })
                .collect(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for MatchExpression<TypeInformation> {
    type Validated = MatchExpression<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let MatchExpression {
            scrutinee,
            arms,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for arm in arms {
            let position = arm.position.clone();

            let lowered = match arm.lowered {
                Some(lowered) => {
                    let condition = lowered.condition.map(|c| c.validate()).transpose()?;
                    let mut assignments = vec![];
                    for assignment in lowered.assignments {
                        assignments.push(LoweredAssignment {
                            target: assignment.target.validate()?,
                            value: assignment.value.validate()?,
                        });
                    }
                    Some(LoweredArm {
                        condition,
                        assignments,
                    })
                }
                None => None,
            };

            validated.push(MatchArm {
                pattern: arm.pattern.validate()?,
                guard: arm.guard.map(|g| g.validate()).transpose()?,
                body: match arm.body {
                    MatchArmBody::Expression(expression) => {
                        MatchArmBody::Expression(expression.validate()?)
                    }
                    MatchArmBody::Block(block) => MatchArmBody::Block(block.validate()?),
                },
                lowered,
                info: arm.info.validate(&position)?,
                position,
            });
        }

        Ok(MatchExpression {
            scrutinee: scrutinee.validate()?,
            arms: validated,
            info: info.validate(&position)?,
            position,
        })
    }
}
