//! Pattern checking and lowering. `check` validates a pattern against the
//! scrutinee type and binds fresh variables; `lower` rewrites the checked
//! pattern into a pure boolean predicate over a base expression plus the
//! assignments that run once the predicate holds. Lowered nodes are always
//! fresh allocations so they re-enter inference with empty slots.

use std::{cell::RefCell, rc::Rc};

use crate::{
    lexer::Span,
    parser::ast::{
        ArrayPattern, CastMode, DatatypePattern, Expression, LiteralPattern, Pattern,
        StructInit, StructInitField, StructPattern, TypeName, VariablePattern, WildcardPattern,
    },
    transform,
    typechecker::{
        context::Context,
        error::{ArityMismatch, DuplicateSymbol, IllegalPattern, TypeCheckError},
        types::{StructType, Type},
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

fn illegal(reason: impl ToString, position: &Span) -> TypeCheckError {
    TypeCheckError::IllegalPattern(
        IllegalPattern {
            reason: reason.to_string(),
        },
        position.clone(),
    )
}

/// Bind a variable pattern to the scrutinee type. The shared symbol slot
/// is written on first inference only; clones keep the pointer and rebind
/// into their own scope.
fn bind(
    ctx: &mut Context,
    variable: VariablePattern<()>,
    ty: &Type,
    is_const: bool,
) -> VariablePattern<TypeInformation> {
    let VariablePattern {
        name,
        symbol,
        position,
        ..
    } = variable;

    if symbol.borrow().is_none() {
        *symbol.borrow_mut() = Some(ty.clone());
    }

    // Pattern bindings must be fresh names.
    if ctx.scope.resolve_name(&name).is_some() {
        ctx.report(TypeCheckError::DuplicateSymbol(
            DuplicateSymbol { name: name.clone() },
            position.clone(),
        ));
    } else if let Err(duplicate) = ctx.scope.add_pattern_variable(&name, symbol.clone()) {
        ctx.report(TypeCheckError::DuplicateSymbol(duplicate, position.clone()));
    }

    let node_info = TypeInformation {
        type_id: symbol.clone(),
        context: ctx.clone(),
    };

    VariablePattern {
        name,
        symbol,
        constant: is_const,
        info: node_info,
        position,
    }
}

impl Pattern<()> {
    /// Typecheck against the (already dereferenced) scrutinee type,
    /// binding pattern variables into the current scope. The `is_const`
    /// flag of the scrutinee propagates to every binding.
    pub fn check(
        self,
        ctx: &mut Context,
        scrutinee: &Type,
        is_const: bool,
    ) -> TypeResult<Pattern<TypeInformation>> {
        match self {
            Pattern::Wildcard(WildcardPattern { position, .. }) => {
                Ok(Pattern::Wildcard(WildcardPattern {
                    info: info(ctx, scrutinee.clone()),
                    position,
                }))
            }

            Pattern::Literal(LiteralPattern {
                value, position, ..
            }) => {
                let hint = match scrutinee {
                    Type::Unset => None,
                    other => Some(other),
                };
                let value = value.check(ctx, hint)?;
                let ty = { value.get_info().type_id.borrow().clone() }.unwrap_or(Type::Unset);

                Ok(Pattern::Literal(LiteralPattern {
                    value,
                    info: info(ctx, ty),
                    position,
                }))
            }

            Pattern::Variable(variable) => Ok(Pattern::Variable(bind(
                ctx, variable, scrutinee, is_const,
            ))),

            Pattern::Array(ArrayPattern {
                elements,
                rest,
                position,
                ..
            }) => {
                let element_type = match scrutinee {
                    Type::Array(element) => element.deref(ctx)?,
                    Type::Unset => Type::Unset,
                    other => {
                        ctx.report(illegal(
                            format!(
                                "array pattern can not match a scrutinee of type '{}'",
                                other.shortname()
                            ),
                            &position,
                        ));
                        Type::Unset
                    }
                };

                let mut checked = vec![];
                for element in elements {
                    checked.push(element.check(ctx, &element_type, is_const)?);
                }

                let rest = rest.map(|rest| {
                    bind(
                        ctx,
                        rest,
                        &Type::Array(Box::new(element_type.clone())),
                        is_const,
                    )
                });

                Ok(Pattern::Array(ArrayPattern {
                    elements: checked,
                    rest,
                    info: info(ctx, scrutinee.clone()),
                    position,
                }))
            }

            Pattern::Struct(StructPattern {
                fields,
                rest,
                position,
                ..
            }) => {
                let struct_type = match scrutinee {
                    Type::Struct(s) => Some(s.clone()),
                    other => {
                        ctx.report(illegal(
                            format!(
                                "struct pattern can not match a scrutinee of type '{}'",
                                other.shortname()
                            ),
                            &position,
                        ));
                        None
                    }
                };

                let mut captured = vec![];
                let mut checked = vec![];

                for (name, pattern) in fields {
                    let field_type = struct_type
                        .as_ref()
                        .and_then(|s| {
                            s.fields
                                .iter()
                                .find(|(field, _)| *field == name)
                                .map(|(_, ty)| ty.clone())
                        })
                        .unwrap_or_else(|| {
                            ctx.report(illegal(
                                format!("scrutinee has no field '{name}'"),
                                &position,
                            ));
                            Type::Unset
                        });

                    captured.push(name.clone());
                    checked.push((name, pattern.check(ctx, &field_type, is_const)?));
                }

                let rest = match rest {
                    None => None,
                    Some(rest) => {
                        let uncaptured = struct_type
                            .as_ref()
                            .map(|s| {
                                s.fields
                                    .iter()
                                    .filter(|(name, _)| !captured.contains(name))
                                    .cloned()
                                    .collect::<Vec<_>>()
                            })
                            .unwrap_or_default();

                        if uncaptured.is_empty() {
                            ctx.report(illegal(
                                "rest pattern requires at least one uncaptured field",
                                &rest.position,
                            ));
                        }

                        Some(bind(
                            ctx,
                            rest,
                            &Type::Struct(StructType { fields: uncaptured }),
                            is_const,
                        ))
                    }
                };

                Ok(Pattern::Struct(StructPattern {
                    fields: checked,
                    rest,
                    info: info(ctx, scrutinee.clone()),
                    position,
                }))
            }

            Pattern::Datatype(pattern) => Self::check_datatype(pattern, ctx, scrutinee, is_const),
        }
    }

    fn check_datatype(
        pattern: DatatypePattern<()>,
        ctx: &mut Context,
        scrutinee: &Type,
        is_const: bool,
    ) -> TypeResult<Pattern<TypeInformation>> {
        let DatatypePattern {
            path,
            args,
            position,
            ..
        } = pattern;
        let name = path.last().cloned().unwrap_or_default();

        match scrutinee {
            Type::Variant(variant) => {
                if path.len() > 1 && path[path.len() - 2] != variant.name {
                    return Err(illegal(
                        format!(
                            "constructor '{}' does not belong to variant '{}'",
                            path.join("."),
                            variant.name
                        ),
                        &position,
                    ));
                }

                let Some(constructor) = variant.constructor(&name) else {
                    return Err(illegal(
                        format!("variant '{}' has no constructor '{name}'", variant.name),
                        &position,
                    ));
                };
                let constructor = constructor.clone();

                if constructor.parameters.len() != args.len() {
                    return Err(TypeCheckError::ArityMismatch(
                        ArityMismatch {
                            name: format!("{}.{}", variant.name, name),
                            expected: constructor.parameters.len(),
                            actual: args.len(),
                        },
                        position,
                    ));
                }

                let mut checked = vec![];
                for ((_, param_type), arg) in constructor.parameters.iter().zip(args) {
                    let param_type = param_type.deref(ctx)?;
                    checked.push(arg.check(ctx, &param_type, is_const)?);
                }

                Ok(Pattern::Datatype(DatatypePattern {
                    path,
                    args: checked,
                    info: info(ctx, Type::VariantConstructor(Box::new(constructor))),
                    position,
                }))
            }

            Type::VariantConstructor(constructor) => {
                if constructor.name != name {
                    return Err(illegal(
                        format!(
                            "pattern names constructor '{name}' but the scrutinee is '{}.{}'",
                            constructor.parent, constructor.name
                        ),
                        &position,
                    ));
                }

                if constructor.parameters.len() != args.len() {
                    return Err(TypeCheckError::ArityMismatch(
                        ArityMismatch {
                            name: format!("{}.{}", constructor.parent, constructor.name),
                            expected: constructor.parameters.len(),
                            actual: args.len(),
                        },
                        position,
                    ));
                }

                let parameters = constructor.parameters.clone();
                let mut checked = vec![];
                for ((_, param_type), arg) in parameters.iter().zip(args) {
                    let param_type = param_type.deref(ctx)?;
                    checked.push(arg.check(ctx, &param_type, is_const)?);
                }

                Ok(Pattern::Datatype(DatatypePattern {
                    path,
                    args: checked,
                    info: info(ctx, Type::VariantConstructor(constructor.clone())),
                    position,
                }))
            }

            Type::Enum(e) => {
                if path.len() > 1 && path[path.len() - 2] != e.name {
                    return Err(illegal(
                        format!("'{}' is not a member of enum '{}'", path.join("."), e.name),
                        &position,
                    ));
                }
                if e.member(&name).is_none() {
                    return Err(illegal(
                        format!("enum '{}' has no member '{name}'", e.name),
                        &position,
                    ));
                }
                if !args.is_empty() {
                    return Err(illegal("enum member patterns take no arguments", &position));
                }

                Ok(Pattern::Datatype(DatatypePattern {
                    path,
                    args: vec![],
                    info: info(ctx, Type::Enum(e.clone())),
                    position,
                }))
            }

            Type::Class(_) | Type::Interface(_) => {
                let target = TypeName::Named {
                    path: path.clone(),
                    type_args: vec![],
                    position: position.clone(),
                };
                let resolved = Type::try_from((&target, &*ctx))?.deref(ctx)?;

                let Type::Interface(interface) = resolved else {
                    // Class-to-class matches can not be decided safely at
                    // runtime, so only interfaces are admitted here.
                    return Err(illegal(
                        format!(
                            "'{}' is not an interface; only interface patterns may match class scrutinees",
                            path.join(".")
                        ),
                        &position,
                    ));
                };

                if !args.is_empty() {
                    return Err(illegal("interface patterns take no arguments", &position));
                }

                Ok(Pattern::Datatype(DatatypePattern {
                    path,
                    args: vec![],
                    info: info(ctx, Type::Interface(interface)),
                    position,
                }))
            }

            other => Err(illegal(
                format!(
                    "pattern '{}' can not match a scrutinee of type '{}'",
                    path.join("."),
                    other.shortname()
                ),
                &position,
            )),
        }
    }
}

/// A lowered pattern: the predicate over the base expression and the
/// `(name, value)` assignments that run under a true predicate.
pub type Lowered = (Option<Expression<()>>, Vec<(String, Expression<()>)>);

impl Pattern<TypeInformation> {
    /// Rewrite this checked pattern into predicate + assignment form over
    /// `base`. All produced nodes are fresh and untyped.
    pub fn lower(&self, base: &Expression<()>) -> Lowered {
        use crate::parser::ast::BinaryOperator;

        match self {
            Pattern::Wildcard(_) => (None, vec![]),

            Pattern::Literal(literal) => {
                let value = TypeCheckable::revert(&literal.value);
                let position = literal.position.clone();

                let condition = if matches!(value, Expression::AstString(_)) {
                    transform::call(
                        transform::property(base.clone(), "eq", &position),
                        vec![value],
                        &position,
                    )
                } else {
                    transform::binary(base.clone(), BinaryOperator::Equals, value, &position)
                };

                (Some(condition), vec![])
            }

            Pattern::Variable(variable) => {
                (None, vec![(variable.name.clone(), base.clone())])
            }

            Pattern::Array(pattern) => {
                let position = pattern.position.clone();
                let length = transform::property(base.clone(), "length", &position);
                let count = pattern.elements.len() as u64;

                let length_check = if pattern.rest.is_some() {
                    transform::binary(
                        length.clone(),
                        BinaryOperator::GreaterOrEqual,
                        transform::int(count, &position),
                        &position,
                    )
                } else {
                    transform::binary(
                        length.clone(),
                        BinaryOperator::Equals,
                        transform::int(count, &position),
                        &position,
                    )
                };

                let mut condition = Some(length_check);
                let mut assignments = vec![];

                for (i, element) in pattern.elements.iter().enumerate() {
                    let sub_base =
                        transform::index(base.clone(), transform::int(i as u64, &position), &position);
                    let (sub_condition, sub_assignments) = element.lower(&sub_base);
                    condition = conjoin(condition, sub_condition, &position);
                    assignments.extend(sub_assignments);
                }

                if let Some(rest) = &pattern.rest {
                    assignments.push((
                        rest.name.clone(),
                        transform::call(
                            transform::property(base.clone(), "slice", &position),
                            vec![transform::int(count, &position), length],
                            &position,
                        ),
                    ));
                }

                (condition, assignments)
            }

            Pattern::Struct(pattern) => {
                let position = pattern.position.clone();
                let mut condition = None;
                let mut assignments = vec![];

                for (name, sub_pattern) in &pattern.fields {
                    let sub_base = transform::property(base.clone(), name, &position);
                    let (sub_condition, sub_assignments) = sub_pattern.lower(&sub_base);
                    condition = conjoin(condition, sub_condition, &position);
                    assignments.extend(sub_assignments);
                }

                if let Some(rest) = &pattern.rest {
                    // The rest binding is a fresh struct over the
                    // uncaptured fields of the scrutinee.
                    let uncaptured = match { rest.symbol.borrow().clone() } {
                        Some(Type::Struct(s)) => s.fields,
                        _ => vec![],
                    };

                    let fields = uncaptured
                        .into_iter()
                        .map(|(name, _)| StructInitField {
                            value: transform::property(base.clone(), &name, &position),
                            name,
                            info: (),
                            position: position.clone(),
                        })
                        .collect();

                    assignments.push((
                        rest.name.clone(),
                        Expression::StructInit(StructInit {
                            fields,
                            info: (),
                            position: position.clone(),
                        }),
                    ));
                }

                (condition, assignments)
            }

            Pattern::Datatype(pattern) => self.lower_datatype(pattern, base),
        }
    }

    fn lower_datatype(
        &self,
        pattern: &DatatypePattern<TypeInformation>,
        base: &Expression<()>,
    ) -> Lowered {
        use crate::parser::ast::{BinaryOperator, Cast, Id, InstanceCheck};

        let position = pattern.position.clone();
        let resolved = { pattern.info.type_id.borrow().clone() };

        match resolved {
            // Enum member: `base == EnumType.Member`.
            Some(Type::Enum(e)) => {
                let member = pattern.path.last().cloned().unwrap_or_default();
                let selector = transform::property(
                    Expression::Id(Id::new(e.name.clone(), position.clone())),
                    &member,
                    &position,
                );
                (
                    Some(transform::binary(
                        base.clone(),
                        BinaryOperator::Equals,
                        selector,
                        &position,
                    )),
                    vec![],
                )
            }

            // Variant constructor: `base is Ctor` plus projections of the
            // force-cast base through each parameter. The target path comes
            // from the resolved constructor, not the written pattern, so
            // unqualified constructor patterns lower correctly.
            Some(Type::VariantConstructor(constructor)) => {
                let target = TypeName::Named {
                    path: vec![constructor.parent.clone(), constructor.name.clone()],
                    type_args: vec![],
                    position: position.clone(),
                };

                let mut condition = Some(Expression::InstanceCheck(Box::new(InstanceCheck {
                    expression: base.clone(),
                    target: target.clone(),
                    info: (),
                    position: position.clone(),
                })));
                let mut assignments = vec![];

                for ((name, _), arg) in constructor.parameters.iter().zip(&pattern.args) {
                    let projected = transform::property(
                        Expression::Cast(Box::new(Cast {
                            expression: base.clone(),
                            target: target.clone(),
                            mode: CastMode::Force,
                            info: (),
                            position: position.clone(),
                        })),
                        name,
                        &position,
                    );

                    let (sub_condition, sub_assignments) = arg.lower(&projected);
                    condition = conjoin(condition, sub_condition, &position);
                    assignments.extend(sub_assignments);
                }

                (condition, assignments)
            }

            // Interface pattern: a plain runtime instance check.
            Some(Type::Interface(_)) => {
                let target = TypeName::Named {
                    path: pattern.path.clone(),
                    type_args: vec![],
                    position: position.clone(),
                };

                (
                    Some(Expression::InstanceCheck(Box::new(InstanceCheck {
                        expression: base.clone(),
                        target,
                        info: (),
                        position,
                    }))),
                    vec![],
                )
            }

            _ => (None, vec![]),
        }
    }

    pub fn revert(this: &Self) -> Pattern<()> {
        match this {
            Pattern::Wildcard(pattern) => Pattern::Wildcard(WildcardPattern {
                info: (),
                position: pattern.position.clone(),
            }),
            Pattern::Literal(pattern) => Pattern::Literal(LiteralPattern {
                value: TypeCheckable::revert(&pattern.value),
                info: (),
                position: pattern.position.clone(),
            }),
            Pattern::Variable(pattern) => Pattern::Variable(VariablePattern {
                name: pattern.name.clone(),
                symbol: pattern.symbol.clone(),
                constant: pattern.constant,
                info: (),
                position: pattern.position.clone(),
            }),
            Pattern::Array(pattern) => Pattern::Array(ArrayPattern {
                elements: pattern.elements.iter().map(Pattern::revert).collect(),
                rest: pattern.rest.as_ref().map(|rest| VariablePattern {
                    name: rest.name.clone(),
                    symbol: rest.symbol.clone(),
                    constant: rest.constant,
                    info: (),
                    position: rest.position.clone(),
                }),
                info: (),
                position: pattern.position.clone(),
            }),
            Pattern::Struct(pattern) => Pattern::Struct(StructPattern {
                fields: pattern
                    .fields
                    .iter()
                    .map(|(name, p)| (name.clone(), Pattern::revert(p)))
                    .collect(),
                rest: pattern.rest.as_ref().map(|rest| VariablePattern {
                    name: rest.name.clone(),
                    symbol: rest.symbol.clone(),
                    constant: rest.constant,
                    info: (),
                    position: rest.position.clone(),
                }),
                info: (),
                position: pattern.position.clone(),
            }),
            Pattern::Datatype(pattern) => Pattern::Datatype(DatatypePattern {
                path: pattern.path.clone(),
                args: pattern.args.iter().map(Pattern::revert).collect(),
                info: (),
                position: pattern.position.clone(),
            }),
        }
    }

    pub fn validate(self) -> Result<Pattern<ValidatedTypeInformation>, TypeValidationError> {
        match self {
            Pattern::Wildcard(pattern) => {
                let position = pattern.position;
                Ok(Pattern::Wildcard(WildcardPattern {
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
            Pattern::Literal(pattern) => {
                let position = pattern.position;
                Ok(Pattern::Literal(LiteralPattern {
                    value: pattern.value.validate()?,
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
            Pattern::Variable(pattern) => {
                let position = pattern.position;
                Ok(Pattern::Variable(VariablePattern {
                    name: pattern.name,
                    symbol: pattern.symbol,
                    constant: pattern.constant,
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
            Pattern::Array(pattern) => {
                let position = pattern.position;
                let mut elements = vec![];
                for element in pattern.elements {
                    elements.push(element.validate()?);
                }
                Ok(Pattern::Array(ArrayPattern {
                    elements,
                    rest: pattern
                        .rest
                        .map(|rest| {
                            let position = rest.position;
                            Ok::<_, TypeValidationError>(VariablePattern {
                                name: rest.name,
                                symbol: rest.symbol,
                                constant: rest.constant,
                                info: rest.info.validate(&position)?,
                                position,
                            })
                        })
                        .transpose()?,
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
            Pattern::Struct(pattern) => {
                let position = pattern.position;
                let mut fields = vec![];
                for (name, p) in pattern.fields {
                    fields.push((name, p.validate()?));
                }
                Ok(Pattern::Struct(StructPattern {
                    fields,
                    rest: pattern
                        .rest
                        .map(|rest| {
                            let position = rest.position;
                            Ok::<_, TypeValidationError>(VariablePattern {
                                name: rest.name,
                                symbol: rest.symbol,
                                constant: rest.constant,
                                info: rest.info.validate(&position)?,
                                position,
                            })
                        })
                        .transpose()?,
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
            Pattern::Datatype(pattern) => {
                let position = pattern.position;
                let mut args = vec![];
                for arg in pattern.args {
                    args.push(arg.validate()?);
                }
                Ok(Pattern::Datatype(DatatypePattern {
                    path: pattern.path,
                    args,
                    info: pattern.info.validate(&position)?,
                    position,
                }))
            }
        }
    }
}

fn conjoin(
    lhs: Option<Expression<()>>,
    rhs: Option<Expression<()>>,
    position: &Span,
) -> Option<Expression<()>> {
    use crate::parser::ast::BinaryOperator;

    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => Some(transform::binary(
            lhs,
            BinaryOperator::And,
            rhs,
            position,
        )),
        (Some(lhs), None) => Some(lhs),
        (None, rhs) => rhs,
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::*;
    use crate::{
        lexer::Lexer,
        parser::ParseState,
        typechecker::types::{BasicType, VariantConstructorType, VariantType},
    };

    fn parse(input: &str) -> Pattern<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Pattern::parse(&mut state).expect("parsing failed")
    }

    fn base() -> Expression<()> {
        Expression::Id(crate::parser::ast::Id::new("o", Span::default()))
    }

    fn u8_array() -> Type {
        Type::Array(Box::new(Type::Basic(BasicType::U8)))
    }

    #[test]
    fn test_wildcard_matches_anything() -> Result<()> {
        let mut ctx = Context::default();
        let pattern = parse("_").check(&mut ctx, &Type::Boolean, false)?;

        let (condition, assignments) = pattern.lower(&base());
        assert!(condition.is_none());
        assert!(assignments.is_empty());
        Ok(())
    }

    #[test]
    fn test_variable_binds_scrutinee_type() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.enter_scope();
        let pattern = parse("x").check(&mut ctx, &Type::Boolean, true)?;

        let Pattern::Variable(variable) = &pattern else {
            panic!("expected variable pattern");
        };
        assert_eq!({ variable.symbol.borrow().clone() }, Some(Type::Boolean));
        assert!(variable.constant);
        assert!(ctx.scope.resolve_name("x").is_some());

        let (condition, assignments) = pattern.lower(&base());
        assert!(condition.is_none());
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].0, "x");
        Ok(())
    }

    #[test]
    fn test_pattern_shadowing_is_rejected() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope
            .add_variable(
                "x",
                Rc::new(RefCell::new(Some(Type::Boolean))),
                false,
            )
            .expect("adding failed");
        ctx.scope.enter_scope();

        parse("x").check(&mut ctx, &Type::Boolean, false)?;
        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_array_pattern_rejects_non_array() -> Result<()> {
        let mut ctx = Context::default();
        parse("[a]").check(&mut ctx, &Type::Boolean, false)?;
        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_array_rest_lowering() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.enter_scope();
        let pattern = parse("[a, b, ...tail]").check(&mut ctx, &u8_array(), false)?;

        let (condition, assignments) = pattern.lower(&base());
        // Min-length check plus the element and rest assignments.
        assert!(condition.is_some());
        assert_eq!(assignments.len(), 3);
        assert_eq!(assignments[2].0, "tail");

        let Pattern::Array(array) = &pattern else {
            panic!("expected array pattern");
        };
        assert_eq!(
            { array.rest.as_ref().unwrap().symbol.borrow().clone() },
            Some(u8_array())
        );
        Ok(())
    }

    #[test]
    fn test_struct_rest_requires_uncaptured_fields() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.enter_scope();
        let scrutinee = Type::Struct(StructType {
            fields: vec![("x".into(), Type::Basic(BasicType::I32))],
        });

        parse("{x: 0, ...rest}").check(&mut ctx, &scrutinee, false)?;
        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_struct_rest_collects_uncaptured() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.enter_scope();
        let scrutinee = Type::Struct(StructType {
            fields: vec![
                ("x".into(), Type::Basic(BasicType::I32)),
                ("y".into(), Type::Basic(BasicType::I32)),
                ("z".into(), Type::Basic(BasicType::I32)),
            ],
        });

        let pattern = parse("{x: 0, ...rest}").check(&mut ctx, &scrutinee, false)?;
        assert!(!ctx.reporter.has_errors());

        let Pattern::Struct(struct_pattern) = &pattern else {
            panic!("expected struct pattern");
        };
        assert_eq!(
            { struct_pattern.rest.as_ref().unwrap().symbol.borrow().clone() },
            Some(Type::Struct(StructType {
                fields: vec![
                    ("y".into(), Type::Basic(BasicType::I32)),
                    ("z".into(), Type::Basic(BasicType::I32)),
                ]
            }))
        );
        Ok(())
    }

    #[test]
    fn test_variant_constructor_pattern() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.enter_scope();

        let variant = Type::Variant(VariantType {
            name: "Opt".into(),
            constructors: vec![
                VariantConstructorType {
                    name: "Some".into(),
                    parameters: vec![("v".into(), Type::Basic(BasicType::I32))],
                    parent: "Opt".into(),
                },
                VariantConstructorType {
                    name: "None".into(),
                    parameters: vec![],
                    parent: "Opt".into(),
                },
            ],
        });

        let pattern = parse("Opt.Some(x)").check(&mut ctx, &variant, false)?;
        assert_eq!(
            { ctx.scope.resolve_name("x").unwrap().borrow().clone() },
            Some(Type::Basic(BasicType::I32))
        );

        let (condition, assignments) = pattern.lower(&base());
        assert!(matches!(condition, Some(Expression::InstanceCheck(_))));
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].0, "x");
        Ok(())
    }

    #[test]
    fn test_constructor_arity_is_checked() {
        let mut ctx = Context::default();
        let variant = Type::Variant(VariantType {
            name: "Opt".into(),
            constructors: vec![VariantConstructorType {
                name: "Some".into(),
                parameters: vec![("v".into(), Type::Basic(BasicType::I32))],
                parent: "Opt".into(),
            }],
        });

        assert!(parse("Opt.Some(a, b)")
            .check(&mut ctx, &variant, false)
            .is_err());
    }
}
