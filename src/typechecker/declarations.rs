//! Declared symbols: named types, functions and FFI namespaces. Generic
//! declarations are templates plus a serialize-keyed instantiation cache;
//! the template itself is never mutated.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    lexer::Span,
    parser::ast::FunctionDeclaration,
    typechecker::error::ArityMismatch,
};

use super::{
    context::Context,
    error::{TypeCheckError, TypeMismatch},
    matcher,
    types::Type,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericParam {
    pub name: String,
    pub constraint: Option<Type>,
}

/// A named type declaration. `ty` is the uninstantiated template; concrete
/// uses go through [`DeclaredType::instantiate`] which substitutes and
/// caches per serialized argument tuple.
#[derive(Debug, Clone)]
pub struct DeclaredType {
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub ty: Type,
    instantiations: Rc<RefCell<HashMap<String, Type>>>,
}

impl DeclaredType {
    pub fn new(name: impl ToString, generics: Vec<GenericParam>, ty: Type) -> DeclaredType {
        DeclaredType {
            name: name.to_string(),
            generics,
            ty,
            instantiations: Rc::default(),
        }
    }

    pub fn check_arity(&self, actual: usize, position: &Span) -> Result<(), TypeCheckError> {
        if self.generics.len() != actual {
            return Err(TypeCheckError::ArityMismatch(
                ArityMismatch {
                    name: self.name.clone(),
                    expected: self.generics.len(),
                    actual,
                },
                position.clone(),
            ));
        }
        Ok(())
    }

    pub fn instantiate(
        &self,
        args: &[Type],
        ctx: &Context,
        position: &Span,
    ) -> Result<Type, TypeCheckError> {
        if self.generics.is_empty() {
            return Ok(self.ty.clone());
        }

        self.check_arity(args.len(), position)?;

        let key = cache_key(args);
        if let Some(cached) = self.instantiations.borrow().get(&key) {
            return Ok(cached.clone());
        }

        check_constraints(&self.generics, args, ctx, position)?;

        let map = substitution_map(&self.generics, args);
        let instantiated = self.ty.substitute(&map);

        self.instantiations
            .borrow_mut()
            .insert(key, instantiated.clone());

        Ok(instantiated)
    }

    /// Exposes whether a concrete argument tuple already has a cached
    /// instantiation. Equal serialized tuples always share one entry.
    pub fn cached_instantiation(&self, args: &[Type]) -> Option<Type> {
        self.instantiations.borrow().get(&cache_key(args)).cloned()
    }
}

/// A declared function. Non-generic functions only ever use `ty`; generic
/// ones keep their untyped declaration around so each instantiation can
/// clone prototype and body through the substitution and re-check.
#[derive(Debug, Clone)]
pub struct DeclaredFunction {
    pub name: String,
    pub generics: Vec<GenericParam>,
    pub declaration: Option<FunctionDeclaration<()>>,
    pub ty: Type,
    instantiations: Rc<RefCell<HashMap<String, Type>>>,
}

impl DeclaredFunction {
    pub fn new(
        name: impl ToString,
        generics: Vec<GenericParam>,
        declaration: Option<FunctionDeclaration<()>>,
        ty: Type,
    ) -> DeclaredFunction {
        DeclaredFunction {
            name: name.to_string(),
            generics,
            declaration,
            ty,
            instantiations: Rc::default(),
        }
    }

    pub fn check_arity(&self, actual: usize, position: &Span) -> Result<(), TypeCheckError> {
        if self.generics.len() != actual {
            return Err(TypeCheckError::ArityMismatch(
                ArityMismatch {
                    name: self.name.clone(),
                    expected: self.generics.len(),
                    actual,
                },
                position.clone(),
            ));
        }
        Ok(())
    }

    /// Instantiate the prototype for concrete type arguments. The cache is
    /// filled before the body re-check so recursive uses of the same
    /// instantiation resolve against it instead of recursing.
    pub fn instantiate(
        &self,
        args: &[Type],
        ctx: &Context,
        position: &Span,
    ) -> Result<Type, TypeCheckError> {
        if self.generics.is_empty() {
            return Ok(self.ty.clone());
        }

        self.check_arity(args.len(), position)?;

        let key = cache_key(args);
        if let Some(cached) = self.instantiations.borrow().get(&key) {
            return Ok(cached.clone());
        }

        check_constraints(&self.generics, args, ctx, position)?;

        let map = substitution_map(&self.generics, args);
        let instantiated = self.ty.substitute(&map);

        self.instantiations
            .borrow_mut()
            .insert(key, instantiated.clone());

        if let Some(declaration) = &self.declaration {
            self.recheck_body(declaration.clone(), args, ctx)?;
        }

        Ok(instantiated)
    }

    pub fn cached_instantiation(&self, args: &[Type]) -> Option<Type> {
        self.instantiations.borrow().get(&cache_key(args)).cloned()
    }

    /// Re-check a clone of the declaration body under the concrete
    /// arguments. The instantiation scope omits pattern-bound variables so
    /// patterns inside the body rebind their own symbols.
    fn recheck_body(
        &self,
        declaration: FunctionDeclaration<()>,
        args: &[Type],
        ctx: &Context,
    ) -> Result<(), TypeCheckError> {
        use super::TypeCheckable;

        let mut instantiation_ctx = Context {
            scope: ctx.scope.clone_for_instantiation(),
            env: ctx.env.clone(),
            reporter: ctx.reporter.clone(),
            owner: None,
        };
        instantiation_ctx.scope.enter_scope();

        for (generic, arg) in self.generics.iter().zip(args.iter()) {
            let _ = instantiation_ctx.scope.add_declared_type(DeclaredType::new(
                &generic.name,
                vec![],
                arg.clone(),
            ));
        }

        let mut stripped = declaration;
        stripped.generics.clear();
        stripped.check(&mut instantiation_ctx, None)?;

        Ok(())
    }
}

/// A foreign function namespace: name, library path and method surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredFfi {
    pub name: String,
    pub source_path: String,
    pub methods: Vec<(String, Type)>,
}

impl DeclaredFfi {
    pub fn method(&self, name: &str) -> Option<&Type> {
        self.methods
            .iter()
            .find(|(method, _)| method == name)
            .map(|(_, ty)| ty)
    }
}

fn cache_key(args: &[Type]) -> String {
    args.iter()
        .map(|a| a.serialize())
        .collect::<Vec<_>>()
        .join(",")
}

fn substitution_map(generics: &[GenericParam], args: &[Type]) -> HashMap<String, Type> {
    generics
        .iter()
        .zip(args.iter())
        .map(|(generic, arg)| (generic.name.clone(), arg.clone()))
        .collect()
}

fn check_constraints(
    generics: &[GenericParam],
    args: &[Type],
    ctx: &Context,
    position: &Span,
) -> Result<(), TypeCheckError> {
    for (generic, arg) in generics.iter().zip(args.iter()) {
        let Some(constraint) = &generic.constraint else {
            continue;
        };
        // Constraints on still-generic arguments are deferred until the
        // argument itself becomes concrete.
        if matches!(arg, Type::Generic { .. }) {
            continue;
        }

        let outcome = matcher::matches(ctx, constraint, arg, false);
        if !outcome.success {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: constraint.clone(),
                    actual: arg.clone(),
                },
                position.clone(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::BasicType;

    fn generic(name: &str) -> Type {
        Type::Generic {
            name: name.into(),
            constraint: None,
        }
    }

    #[test]
    fn test_instantiation_is_cached() {
        let declared = DeclaredType::new(
            "Box",
            vec![GenericParam {
                name: "T".into(),
                constraint: None,
            }],
            Type::Array(Box::new(generic("T"))),
        );
        let ctx = Context::default();

        let args = vec![Type::Basic(BasicType::I32)];
        assert!(declared.cached_instantiation(&args).is_none());

        let first = declared
            .instantiate(&args, &ctx, &Span::default())
            .expect("instantiation failed");
        assert_eq!(first, Type::Array(Box::new(Type::Basic(BasicType::I32))));

        // Equal serialized tuples map to the same cached node.
        let cached = declared.cached_instantiation(&[Type::Basic(BasicType::I32)]);
        assert_eq!(cached, Some(first));
    }

    #[test]
    fn test_arity_mismatch() {
        let declared = DeclaredType::new(
            "Box",
            vec![GenericParam {
                name: "T".into(),
                constraint: None,
            }],
            Type::Array(Box::new(generic("T"))),
        );
        let ctx = Context::default();

        assert!(declared.instantiate(&[], &ctx, &Span::default()).is_err());
    }

    #[test]
    fn test_template_is_not_mutated() {
        let template = Type::Array(Box::new(generic("T")));
        let declared = DeclaredType::new(
            "Box",
            vec![GenericParam {
                name: "T".into(),
                constraint: None,
            }],
            template.clone(),
        );
        let ctx = Context::default();

        declared
            .instantiate(&[Type::Basic(BasicType::U8)], &ctx, &Span::default())
            .expect("instantiation failed");

        assert_eq!(declared.ty, template);
    }
}
