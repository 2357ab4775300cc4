use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Lambda, LambdaParameter},
    typechecker::{
        context::{Context, FunctionOwner},
        error::{MissingDeclarationType, TypeCheckError},
        types::{FunctionParamType, Type},
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for Lambda<()> {
    type Typed = Lambda<TypeInformation>;

    /// A lambda opens a fresh function scope. Parameter types come from
    /// annotations or, positionally, from a function-typed hint; the
    /// return type (annotated or hinted) flows into the body as its hint.
    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let Lambda {
            parameters,
            return_type,
            expression,
            position,
            ..
        } = self;

        let hinted = match hint.map(|h| h.deref(ctx)) {
            Some(Ok(Type::Function {
                params,
                return_value,
            })) => Some((params, *return_value)),
            _ => None,
        };

        ctx.scope.enter_scope();
        let previous_env = ctx.env.clone();
        let previous_owner = ctx.owner.take();
        ctx.env.within_function = true;

        let mut checked_parameters = vec![];
        let mut param_types = vec![];

        for (index, parameter) in parameters.into_iter().enumerate() {
            let LambdaParameter {
                name,
                type_name,
                position: param_position,
                ..
            } = parameter;

            let ty = match &type_name {
                Some(type_name) => Some(Type::try_from((type_name, &*ctx))?),
                None => hinted
                    .as_ref()
                    .and_then(|(params, _)| params.get(index))
                    .map(|p| p.ty.clone()),
            };

            let Some(ty) = ty else {
                ctx.env = previous_env;
                ctx.owner = previous_owner;
                ctx.scope.exit_scope();
                return Err(TypeCheckError::MissingDeclarationType(
                    MissingDeclarationType {
                        name: name.name.clone(),
                    },
                    param_position,
                ));
            };

            let slot = Rc::new(RefCell::new(Some(ty.clone())));
            if let Err(duplicate) = ctx.scope.add_variable(&name.name, slot.clone(), false) {
                ctx.report(TypeCheckError::DuplicateSymbol(
                    duplicate,
                    param_position.clone(),
                ));
            }

            param_types.push(FunctionParamType::named(&name.name, ty));

            let info = TypeInformation {
                type_id: slot,
                context: ctx.clone(),
            };
            checked_parameters.push(LambdaParameter {
                name: crate::parser::ast::Id {
                    name: name.name,
                    type_args: vec![],
                    info: info.clone(),
                    position: name.position,
                },
                type_name,
                info,
                position: param_position,
            });
        }

        let annotated_return = match &return_type {
            Some(type_name) => Some(Type::try_from((type_name, &*ctx))?),
            None => hinted.as_ref().map(|(_, ret)| ret.clone()),
        };

        ctx.owner = annotated_return.clone().map(FunctionOwner::new);

        let body = expression.check(ctx, annotated_return.as_ref())?;

        ctx.env = previous_env;
        ctx.owner = previous_owner;
        ctx.scope.exit_scope();

        let body_type =
            { body.get_info().type_id.borrow().clone() }.unwrap_or(Type::Unset);
        let return_value = annotated_return.unwrap_or(body_type);

        let ty = Type::Function {
            params: param_types,
            return_value: Box::new(return_value),
        };

        Ok(Lambda {
            parameters: checked_parameters,
            return_type,
            expression: Box::new(body),
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(ty))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        Lambda {
            parameters: this
                .parameters
                .iter()
                .map(|parameter| LambdaParameter {
                    name: crate::parser::ast::Id {
                        name: parameter.name.name.clone(),
                        type_args: vec![],
                        info: (),
                        position: parameter.name.position.clone(),
                    },
                    type_name: parameter.type_name.clone(),
                    info: (),
                    position: parameter.position.clone(),
                })
                .collect(),
            return_type: this.return_type.clone(),
            expression: Box::new(TypeCheckable::revert(this.expression.as_ref())),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for Lambda<TypeInformation> {
    type Validated = Lambda<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let Lambda {
            parameters,
            return_type,
            expression,
            info,
            position,
        } = self;

        let mut validated = vec![];
        for parameter in parameters {
            let position = parameter.position.clone();
            validated.push(LambdaParameter {
                name: parameter.name.validate()?,
                type_name: parameter.type_name,
                info: parameter.info.validate(&position)?,
                position,
            });
        }

        Ok(Lambda {
            parameters: validated,
            return_type,
            expression: Box::new(expression.validate()?),
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
        lexer::Lexer,
        parser::{ast::Lambda, ParseState},
        typechecker::{
            context::Context,
            types::{BasicType, FunctionParamType, Type},
            TypeCheckable,
        },
    };

    fn parse(input: &str) -> Lambda<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        Lambda::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_annotated_lambda() -> Result<()> {
        let mut ctx = Context::default();
        let lambda = parse("\\(x: i32) -> i32 => x").check(&mut ctx, None)?;

        assert_eq!(
            lambda.info.type_id,
            Rc::new(RefCell::new(Some(Type::Function {
                params: vec![FunctionParamType::named("x", Type::Basic(BasicType::I32))],
                return_value: Box::new(Type::Basic(BasicType::I32)),
            })))
        );
        Ok(())
    }

    #[test]
    fn test_hint_types_parameters() -> Result<()> {
        let mut ctx = Context::default();
        let hint = Type::Function {
            params: vec![FunctionParamType::unnamed(Type::Boolean)],
            return_value: Box::new(Type::Boolean),
        };

        let lambda = parse("\\(x) => x").check(&mut ctx, Some(&hint))?;
        let Some(Type::Function { params, .. }) = ({ lambda.info.type_id.borrow().clone() }) else {
            panic!("expected function type");
        };
        assert_eq!(params[0].ty, Type::Boolean);
        Ok(())
    }

    #[test]
    fn test_unannotated_lambda_without_hint_fails() {
        let mut ctx = Context::default();
        assert!(parse("\\(x) => x").check(&mut ctx, None).is_err());
    }
}
