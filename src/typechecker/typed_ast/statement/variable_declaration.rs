use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{Id, VariableDeclaration},
    typechecker::{
        context::Context,
        error::{MissingDeclarationType, TypeCheckError},
        types::Type,
        TypeCheckable, TypeInformation, TypeResult, TypeValidationError, TypedConstruct,
        ValidatedTypeInformation,
    },
};

impl TypeCheckable for VariableDeclaration<()> {
    type Typed = VariableDeclaration<TypeInformation>;

    /// The declared type (if any) is the initializer's hint. In strict
    /// mode the declared type is stored verbatim; otherwise the inferred
    /// (and reconciled) type of the initializer wins.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let VariableDeclaration {
            id,
            mutable,
            constant,
            strict,
            type_name,
            value,
            position,
            ..
        } = self;

        let declared = match &type_name {
            Some(type_name) => match Type::try_from((type_name, &*ctx)) {
                Ok(ty) => Some(ty),
                Err(error) => {
                    ctx.report(error);
                    None
                }
            },
            None => None,
        };

        let value = value.check(ctx, declared.as_ref())?;

        let slot = match (&declared, strict) {
            (Some(declared), true) => Rc::new(RefCell::new(Some(declared.clone()))),
            _ => value.get_info().type_id,
        };

        if { slot.borrow().is_none() } {
            return Err(TypeCheckError::MissingDeclarationType(
                MissingDeclarationType {
                    name: id.name.clone(),
                },
                position,
            ));
        }

        let add_result = if constant {
            let ty = { slot.borrow().clone() }.unwrap_or(Type::Unset);
            ctx.scope.add_constant(&id.name, ty)
        } else {
            ctx.scope.add_variable(&id.name, slot.clone(), mutable)
        };

        if let Err(duplicate) = add_result {
            ctx.report(TypeCheckError::DuplicateSymbol(
                duplicate,
                id.position.clone(),
            ));
        }

        let id = Id {
            name: id.name,
            type_args: vec![],
            info: TypeInformation {
                type_id: slot,
                context: ctx.clone(),
            },
            position: id.position,
        };

        Ok(VariableDeclaration {
            id,
            mutable,
            constant,
            strict,
            type_name,
            value,
            info: TypeInformation {
                type_id: Rc::new(RefCell::new(Some(Type::Void))),
                context,
            },
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        VariableDeclaration {
            id: TypeCheckable::revert(&this.id),
            mutable: this.mutable,
            constant: this.constant,
            strict: this.strict,
            type_name: this.type_name.clone(),
            value: TypeCheckable::revert(&this.value),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for VariableDeclaration<TypeInformation> {
    type Validated = VariableDeclaration<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let VariableDeclaration {
            id,
            mutable,
            constant,
            strict,
            type_name,
            value,
            info,
            position,
        } = self;

        Ok(VariableDeclaration {
            id: id.validate()?,
            mutable,
            constant,
            strict,
            type_name,
            value: value.validate()?,
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
        parser::{ast::VariableDeclaration, ParseState},
        typechecker::{
            context::Context,
            types::{BasicType, Type},
            TypeCheckable,
        },
    };

    fn parse(input: &str) -> VariableDeclaration<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        VariableDeclaration::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_inference_without_annotation() -> Result<()> {
        let mut ctx = Context::default();
        parse("let x = 42;").check(&mut ctx, None)?;

        assert_eq!(
            ctx.scope.resolve_name("x"),
            Some(Rc::new(RefCell::new(Some(Type::Basic(BasicType::U8)))))
        );
        Ok(())
    }

    #[test]
    fn test_annotation_is_the_hint() -> Result<()> {
        let mut ctx = Context::default();
        parse("let x: i64 = 42;").check(&mut ctx, None)?;

        assert_eq!(
            ctx.scope.resolve_name("x"),
            Some(Rc::new(RefCell::new(Some(Type::Basic(BasicType::I64)))))
        );
        Ok(())
    }

    #[test]
    fn test_out_of_range_annotation() {
        let mut ctx = Context::default();
        assert!(parse("let x: u8 = 300;").check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_constant_registration() -> Result<()> {
        let mut ctx = Context::default();
        parse("const x: i32 = 1;").check(&mut ctx, None)?;

        assert!(ctx.scope.is_constant("x"));
        Ok(())
    }

    #[test]
    fn test_duplicate_is_reported() -> Result<()> {
        let mut ctx = Context::default();
        parse("let x = 1;").check(&mut ctx, None)?;
        parse("let x = 2;").check(&mut ctx, None)?;

        assert!(ctx.reporter.has_errors());
        Ok(())
    }
}
