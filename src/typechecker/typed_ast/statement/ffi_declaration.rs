use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{FfiDeclaration, Id},
    typechecker::{
        context::Context,
        declarations::DeclaredFfi,
        error::TypeCheckError,
        types::{FunctionParamType, Type},
        ShallowCheck, TypeCheckable, TypeInformation, TypeResult, TypeValidationError,
        TypedConstruct, ValidatedTypeInformation,
    },
};

impl ShallowCheck for FfiDeclaration<()> {
    fn shallow_check(&self, ctx: &mut Context) -> TypeResult<()> {
        let mut methods = vec![];

        for method in &self.methods {
            let mut params = vec![];
            for (name, type_name) in &method.parameters {
                params.push(FunctionParamType::named(
                    name,
                    Type::try_from((type_name, &*ctx))?,
                ));
            }

            methods.push((
                method.name.clone(),
                Type::Function {
                    params,
                    return_value: Box::new(Type::try_from((&method.return_type, &*ctx))?),
                },
            ));
        }

        ctx.scope
            .add_ffi(DeclaredFfi {
                name: self.id.name.clone(),
                source_path: self.source_path.clone(),
                methods,
            })
            .map_err(|duplicate| {
                TypeCheckError::DuplicateSymbol(duplicate, self.id.position.clone())
            })?;

        Ok(())
    }
}

impl TypeCheckable for FfiDeclaration<()> {
    type Typed = FfiDeclaration<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let FfiDeclaration {
            id,
            source_path,
            methods,
            position,
            ..
        } = self;

        let info = TypeInformation {
            type_id: Rc::new(RefCell::new(Some(Type::FfiNamespace(id.name.clone())))),
            context: ctx.clone(),
        };

        Ok(FfiDeclaration {
            id: Id {
                name: id.name,
                type_args: vec![],
                info: info.clone(),
                position: id.position,
            },
            source_path,
            methods,
            info,
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        FfiDeclaration {
            id: TypeCheckable::revert(&this.id),
            source_path: this.source_path.clone(),
            methods: this.methods.clone(),
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for FfiDeclaration<TypeInformation> {
    type Validated = FfiDeclaration<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let FfiDeclaration {
            id,
            source_path,
            methods,
            info,
            position,
        } = self;

        Ok(FfiDeclaration {
            id: id.validate()?,
            source_path,
            methods,
            info: info.validate(&position)?,
            position,
        })
    }
}
