//! Built-in standard library surface the checker depends on: the `String`
//! class, the `Runnable` interface and the `ArrayIterator` wrapper backing
//! the foreach iteration protocol. These are registered into the root
//! scope before checking; a missing builtin at a use site is fatal.

use crate::lexer::Span;

use super::{
    context::Context,
    declarations::{DeclaredType, GenericParam},
    error::{MissingBuiltin, TypeCheckError},
    types::{
        BasicType, ClassMethod, ClassType, FunctionParamType, InterfaceMethod, InterfaceType,
        ReferenceType, Type,
    },
    TypeResult,
};

pub const STRING: &str = "String";
pub const RUNNABLE: &str = "Runnable";
pub const ARRAY_ITERATOR: &str = "ArrayIterator";

fn string_reference() -> Type {
    Type::Reference(ReferenceType {
        path: vec!["std".into(), "string".into(), STRING.into()],
        type_args: vec![],
    })
}

fn function(params: Vec<Type>, return_value: Type) -> Type {
    Type::Function {
        params: params.into_iter().map(FunctionParamType::unnamed).collect(),
        return_value: Box::new(return_value),
    }
}

fn string_class() -> ClassType {
    ClassType {
        name: STRING.into(),
        supertypes: vec![],
        attributes: vec![],
        methods: vec![
            ClassMethod {
                name: "length".into(),
                ty: function(vec![], Type::Basic(BasicType::U64)),
                is_static: false,
            },
            ClassMethod {
                name: "eq".into(),
                ty: function(vec![string_reference()], Type::Boolean),
                is_static: false,
            },
            ClassMethod {
                name: "concat".into(),
                ty: function(vec![string_reference()], string_reference()),
                is_static: false,
            },
            ClassMethod {
                name: "slice".into(),
                ty: function(
                    vec![Type::Basic(BasicType::U64), Type::Basic(BasicType::U64)],
                    string_reference(),
                ),
                is_static: false,
            },
        ],
    }
}

fn runnable_interface() -> InterfaceType {
    InterfaceType {
        name: RUNNABLE.into(),
        supertypes: vec![],
        methods: vec![InterfaceMethod {
            name: "run".into(),
            ty: function(vec![], Type::Void),
        }],
    }
}

fn array_iterator_class() -> ClassType {
    let element = Type::Generic {
        name: "T".into(),
        constraint: None,
    };

    ClassType {
        name: ARRAY_ITERATOR.into(),
        supertypes: vec![],
        attributes: vec![],
        methods: vec![
            ClassMethod {
                name: "hasNext".into(),
                ty: function(vec![], Type::Boolean),
                is_static: false,
            },
            ClassMethod {
                name: "next".into(),
                ty: function(vec![], element),
                is_static: false,
            },
        ],
    }
}

/// Register the builtins into the current (root) scope.
pub fn register(ctx: &mut Context) -> TypeResult<()> {
    let declarations = [
        DeclaredType::new(STRING, vec![], Type::Class(Box::new(string_class()))),
        DeclaredType::new(
            RUNNABLE,
            vec![],
            Type::Interface(Box::new(runnable_interface())),
        ),
        DeclaredType::new(
            ARRAY_ITERATOR,
            vec![GenericParam {
                name: "T".into(),
                constraint: None,
            }],
            Type::Class(Box::new(array_iterator_class())),
        ),
    ];

    for declaration in declarations {
        let name = declaration.name.clone();
        ctx.scope.add_declared_type(declaration).map_err(|_| {
            TypeCheckError::MissingBuiltin(MissingBuiltin { name }, Span::default())
        })?;
    }

    Ok(())
}

/// Resolve a required builtin type; its absence is a fatal error.
pub fn required(ctx: &Context, name: &str, position: &Span) -> TypeResult<Type> {
    let Some(declared) = ctx.scope.get_declared_type(name) else {
        return Err(TypeCheckError::MissingBuiltin(
            MissingBuiltin { name: name.into() },
            position.clone(),
        ));
    };

    Ok(declared.ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_registered() {
        let mut ctx = Context::default();
        register(&mut ctx).expect("registration failed");

        assert!(ctx.scope.get_declared_type(STRING).is_some());
        assert!(ctx.scope.get_declared_type(RUNNABLE).is_some());
        assert!(ctx.scope.get_declared_type(ARRAY_ITERATOR).is_some());
    }

    #[test]
    fn test_missing_builtin_is_fatal() {
        let ctx = Context::default();
        let error = required(&ctx, STRING, &Span::default()).unwrap_err();
        assert!(error.is_fatal());
    }
}
