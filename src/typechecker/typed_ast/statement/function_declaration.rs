use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{
        FunctionBody, FunctionDeclaration, FunctionParameter, GenericParameter, Id,
    },
    typechecker::{
        context::{Context, FunctionOwner},
        declarations::{DeclaredFunction, DeclaredType, GenericParam},
        error::TypeCheckError,
        matcher,
        types::{FunctionParamType, Type},
        ShallowCheck, TypeCheckable, TypeInformation, TypeResult, TypeValidationError,
        TypedConstruct, ValidatedTypeInformation,
    },
};

/// Register the declaration's generic parameters as placeholder types in
/// the current (temporary) frame and return their semantic form.
pub(crate) fn register_generics(
    ctx: &mut Context,
    generics: &[GenericParameter],
) -> TypeResult<Vec<GenericParam>> {
    let mut semantic = vec![];

    for generic in generics {
        let constraint = match &generic.constraint {
            Some(constraint) => Some(Type::try_from((constraint, &*ctx))?),
            None => None,
        };

        let placeholder = Type::Generic {
            name: generic.name.clone(),
            constraint: constraint.clone().map(Box::new),
        };

        if let Err(duplicate) = ctx
            .scope
            .add_declared_type(DeclaredType::new(&generic.name, vec![], placeholder))
        {
            ctx.report(TypeCheckError::DuplicateSymbol(
                duplicate,
                generic.position.clone(),
            ));
        }

        semantic.push(GenericParam {
            name: generic.name.clone(),
            constraint,
        });
    }

    Ok(semantic)
}

/// Build the function's prototype from its signature. Assumes the generic
/// placeholders are already in scope.
fn prototype(
    ctx: &Context,
    parameters: &[FunctionParameter<()>],
    return_type: &crate::parser::ast::TypeName,
) -> TypeResult<Type> {
    let mut params = vec![];
    for parameter in parameters {
        let ty = Type::try_from((&parameter.type_name, ctx))?;
        params.push(FunctionParamType {
            name: parameter.name.name.clone(),
            ty,
            mutable: parameter.mutable,
        });
    }

    Ok(Type::Function {
        params,
        return_value: Box::new(Type::try_from((return_type, ctx))?),
    })
}

impl ShallowCheck for FunctionDeclaration<()> {
    /// First pass: reserve the prototype slot so bodies may reference the
    /// function (and each other) in any order.
    fn shallow_check(&self, ctx: &mut Context) -> TypeResult<()> {
        ctx.scope.enter_scope();
        let result = (|| {
            let generics = register_generics(ctx, &self.generics)?;
            let ty = prototype(ctx, &self.parameters, &self.return_type)?;
            Ok::<_, TypeCheckError>((generics, ty))
        })();
        ctx.scope.exit_scope();

        let (generics, ty) = result?;
        let template = (!self.generics.is_empty()).then(|| self.clone());

        let declared = DeclaredFunction::new(&self.id.name, generics, template, ty);
        ctx.scope.add_function(declared).map_err(|duplicate| {
            TypeCheckError::DuplicateSymbol(duplicate, self.id.position.clone())
        })?;

        Ok(())
    }
}

impl TypeCheckable for FunctionDeclaration<()> {
    type Typed = FunctionDeclaration<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let template = (!self.generics.is_empty()).then(|| self.clone());

        let FunctionDeclaration {
            id,
            generics,
            parameters,
            return_type,
            body,
            position,
            ..
        } = self;

        ctx.scope.enter_scope();
        let previous_env = ctx.env.clone();
        let previous_owner = ctx.owner.take();

        let result = (|| {
            let semantic_generics = register_generics(ctx, &generics)?;

            let mut checked_parameters = vec![];
            let mut param_types = vec![];
            for parameter in &parameters {
                let ty = Type::try_from((&parameter.type_name, &*ctx))?;
                let slot = Rc::new(RefCell::new(Some(ty.clone())));

                if let Err(duplicate) =
                    ctx.scope
                        .add_variable(&parameter.name.name, slot.clone(), parameter.mutable)
                {
                    ctx.report(TypeCheckError::DuplicateSymbol(
                        duplicate,
                        parameter.position.clone(),
                    ));
                }

                param_types.push(FunctionParamType {
                    name: parameter.name.name.clone(),
                    ty,
                    mutable: parameter.mutable,
                });

                let info = TypeInformation {
                    type_id: slot,
                    context: ctx.clone(),
                };
                checked_parameters.push(FunctionParameter {
                    name: Id {
                        name: parameter.name.name.clone(),
                        type_args: vec![],
                        info: info.clone(),
                        position: parameter.name.position.clone(),
                    },
                    type_name: parameter.type_name.clone(),
                    mutable: parameter.mutable,
                    info,
                    position: parameter.position.clone(),
                });
            }

            let return_type_id = Type::try_from((&return_type, &*ctx))?;

            ctx.env.within_function = true;
            let owner = FunctionOwner::new(return_type_id.clone());
            ctx.owner = Some(owner.clone());

            let checked_body = match body {
                FunctionBody::Expression(expression) => FunctionBody::Expression(Box::new(
                    expression.check(ctx, Some(&return_type_id))?,
                )),
                FunctionBody::Block(block) => {
                    let block = block.check(ctx, None)?;

                    // Without explicit return sites the block's trailing
                    // value has to satisfy the declared return type.
                    if owner.return_sites.borrow().is_empty() {
                        let block_type = { block.info.type_id.borrow().clone() }
                            .unwrap_or(Type::Void);
                        let outcome = matcher::matches(ctx, &return_type_id, &block_type, false);
                        if !outcome.success {
                            ctx.report(TypeCheckError::TypeMismatch(
                                crate::typechecker::error::TypeMismatch {
                                    expected: return_type_id.clone(),
                                    actual: block_type,
                                },
                                block.position.clone(),
                            ));
                        }
                    }

                    FunctionBody::Block(block)
                }
            };

            Ok::<_, TypeCheckError>((
                semantic_generics,
                checked_parameters,
                param_types,
                return_type_id,
                checked_body,
            ))
        })();

        ctx.env = previous_env;
        ctx.owner = previous_owner;
        ctx.scope.exit_scope();

        let (semantic_generics, checked_parameters, param_types, return_type_id, checked_body) =
            result?;

        let function_type = Type::Function {
            params: param_types,
            return_value: Box::new(return_type_id),
        };

        // Late binding: the shallow prototype slot is replaced by the
        // final declaration.
        ctx.scope.override_function(DeclaredFunction::new(
            &id.name,
            semantic_generics,
            template,
            function_type.clone(),
        ));

        let info = TypeInformation {
            type_id: Rc::new(RefCell::new(Some(function_type))),
            context,
        };

        Ok(FunctionDeclaration {
            id: Id {
                name: id.name,
                type_args: vec![],
                info: info.clone(),
                position: id.position,
            },
            generics,
            parameters: checked_parameters,
            return_type,
            body: checked_body,
            info,
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        FunctionDeclaration {
            id: TypeCheckable::revert(&this.id),
            generics: this.generics.clone(),
            parameters: this
                .parameters
                .iter()
                .map(|parameter| FunctionParameter {
                    name: TypeCheckable::revert(&parameter.name),
                    type_name: parameter.type_name.clone(),
                    mutable: parameter.mutable,
                    info: (),
                    position: parameter.position.clone(),
                })
                .collect(),
            return_type: this.return_type.clone(),
            body: match &this.body {
                FunctionBody::Block(block) => FunctionBody::Block(TypeCheckable::revert(block)),
                FunctionBody::Expression(expression) => {
                    FunctionBody::Expression(Box::new(TypeCheckable::revert(expression.as_ref())))
                }
            },
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for FunctionDeclaration<TypeInformation> {
    type Validated = FunctionDeclaration<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let FunctionDeclaration {
            id,
            generics,
            parameters,
            return_type,
            body,
            info,
            position,
        } = self;

        let mut validated_parameters = vec![];
        for parameter in parameters {
            let position = parameter.position.clone();
            validated_parameters.push(FunctionParameter {
                name: parameter.name.validate()?,
                type_name: parameter.type_name,
                mutable: parameter.mutable,
                info: parameter.info.validate(&position)?,
                position,
            });
        }

        Ok(FunctionDeclaration {
            id: id.validate()?,
            generics,
            parameters: validated_parameters,
            return_type,
            body: match body {
                FunctionBody::Block(block) => FunctionBody::Block(block.validate()?),
                FunctionBody::Expression(expression) => {
                    FunctionBody::Expression(Box::new(expression.validate()?))
                }
            },
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
        parser::{ast::FunctionDeclaration, ParseState},
        typechecker::{
            context::Context,
            types::{BasicType, FunctionParamType, Type},
            ShallowCheck, TypeCheckable,
        },
    };

    fn parse(input: &str) -> FunctionDeclaration<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        FunctionDeclaration::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_prototype_registration() -> Result<()> {
        let mut ctx = Context::default();
        let declaration = parse("fn add(a: i32, b: i32) -> i32 = a + b;");
        declaration.shallow_check(&mut ctx)?;

        let declared = ctx.scope.get_function("add").expect("missing prototype");
        assert_eq!(
            declared.ty,
            Type::Function {
                params: vec![
                    FunctionParamType::named("a", Type::Basic(BasicType::I32)),
                    FunctionParamType::named("b", Type::Basic(BasicType::I32)),
                ],
                return_value: Box::new(Type::Basic(BasicType::I32)),
            }
        );
        Ok(())
    }

    #[test]
    fn test_expression_body_is_hinted() -> Result<()> {
        let mut ctx = Context::default();
        let function = parse("fn answer() -> i64 = 42;").check(&mut ctx, None)?;

        let crate::parser::ast::FunctionBody::Expression(body) = &function.body else {
            panic!("expected expression body");
        };
        assert_eq!(
            body.get_info().type_id,
            Rc::new(RefCell::new(Some(Type::Basic(BasicType::I64))))
        );
        Ok(())
    }

    #[test]
    fn test_return_sites_are_checked() -> Result<()> {
        let mut ctx = Context::default();
        parse("fn wrong() -> bool { return 1; }").check(&mut ctx, None)?;

        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_missing_value_for_non_void() -> Result<()> {
        let mut ctx = Context::default();
        parse("fn wrong() -> i32 { }").check(&mut ctx, None)?;

        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_yielding_body_counts_as_return_value() -> Result<()> {
        let mut ctx = Context::default();
        parse("fn id(x: i32) -> i32 { x }").check(&mut ctx, None)?;

        assert!(!ctx.reporter.has_errors());
        Ok(())
    }
}
