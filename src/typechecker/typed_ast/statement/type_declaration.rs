use std::{cell::RefCell, rc::Rc};

use crate::{
    parser::ast::{
        ClassDeclaration, EnumDeclaration, EnumMemberValue, Id, InterfaceDeclaration,
        MethodDeclaration, TypeDeclaration, TypeDeclarationBody, VariantDeclaration,
    },
    typechecker::{
        context::Context,
        declarations::DeclaredType,
        error::{DuplicateSymbol, TypeCheckError, TypeMismatch},
        types::{
            BasicType, ClassAttribute, ClassMethod, ClassType, EnumMember, EnumType, EnumValue,
            FunctionParamType, InterfaceMethod, InterfaceType, Type, VariantConstructorType,
            VariantType,
        },
        ShallowCheck, TypeCheckable, TypeInformation, TypeResult, TypeValidationError,
        TypedConstruct, ValidatedTypeInformation,
    },
};

use super::function_declaration::register_generics;

fn signature_type(
    ctx: &Context,
    parameters: &[(String, crate::parser::ast::TypeName)],
    return_type: &crate::parser::ast::TypeName,
) -> TypeResult<Type> {
    let mut params = vec![];
    for (name, type_name) in parameters {
        params.push(FunctionParamType::named(
            name,
            Type::try_from((type_name, ctx))?,
        ));
    }

    Ok(Type::Function {
        params,
        return_value: Box::new(Type::try_from((return_type, ctx))?),
    })
}

fn convert_class(
    name: &str,
    class: &ClassDeclaration<()>,
    ctx: &mut Context,
) -> TypeResult<Type> {
    let mut supertypes = vec![];
    for supertype in &class.supertypes {
        supertypes.push(Type::try_from((supertype, &*ctx))?);
    }

    let mut attributes = vec![];
    let mut seen = vec![];

    for attribute in &class.attributes {
        if seen.contains(&attribute.name) {
            return Err(TypeCheckError::DuplicateSymbol(
                DuplicateSymbol {
                    name: attribute.name.clone(),
                },
                attribute.position.clone(),
            ));
        }
        seen.push(attribute.name.clone());

        attributes.push(ClassAttribute {
            name: attribute.name.clone(),
            ty: Type::try_from((&attribute.type_name, &*ctx))?,
            is_static: attribute.is_static,
        });
    }

    let mut methods = vec![];
    for method in &class.methods {
        let method_name = &method.function.id.name;
        // Attribute and method namespaces are disjoint.
        if seen.contains(method_name) {
            return Err(TypeCheckError::DuplicateSymbol(
                DuplicateSymbol {
                    name: method_name.clone(),
                },
                method.function.id.position.clone(),
            ));
        }
        seen.push(method_name.clone());

        let parameters = method
            .function
            .parameters
            .iter()
            .map(|p| (p.name.name.clone(), p.type_name.clone()))
            .collect::<Vec<_>>();

        methods.push(ClassMethod {
            name: method_name.clone(),
            ty: signature_type(ctx, &parameters, &method.function.return_type)?,
            is_static: method.is_static,
        });
    }

    Ok(Type::Class(Box::new(ClassType {
        name: name.to_string(),
        supertypes,
        attributes,
        methods,
    })))
}

fn convert_interface(
    name: &str,
    interface: &InterfaceDeclaration,
    ctx: &Context,
) -> TypeResult<Type> {
    let mut supertypes = vec![];
    for supertype in &interface.supertypes {
        supertypes.push(Type::try_from((supertype, ctx))?);
    }

    let mut methods = vec![];
    for method in &interface.methods {
        if methods.iter().any(|m: &InterfaceMethod| m.name == method.name) {
            return Err(TypeCheckError::DuplicateSymbol(
                DuplicateSymbol {
                    name: method.name.clone(),
                },
                method.position.clone(),
            ));
        }

        methods.push(InterfaceMethod {
            name: method.name.clone(),
            ty: signature_type(ctx, &method.parameters, &method.return_type)?,
        });
    }

    Ok(Type::Interface(Box::new(InterfaceType {
        name: name.to_string(),
        supertypes,
        methods,
    })))
}

fn convert_variant(name: &str, variant: &VariantDeclaration, ctx: &Context) -> TypeResult<Type> {
    let mut constructors: Vec<VariantConstructorType> = vec![];

    for constructor in &variant.constructors {
        if constructors.iter().any(|c| c.name == constructor.name) {
            return Err(TypeCheckError::DuplicateSymbol(
                DuplicateSymbol {
                    name: constructor.name.clone(),
                },
                constructor.position.clone(),
            ));
        }

        let mut parameters = vec![];
        for (param, type_name) in &constructor.parameters {
            parameters.push((param.clone(), Type::try_from((type_name, ctx))?));
        }

        constructors.push(VariantConstructorType {
            name: constructor.name.clone(),
            parameters,
            // The parent link is always set at construction.
            parent: name.to_string(),
        });
    }

    Ok(Type::Variant(VariantType {
        name: name.to_string(),
        constructors,
    }))
}

fn convert_enum(name: &str, declaration: &EnumDeclaration, ctx: &Context) -> TypeResult<Type> {
    let target = match &declaration.target {
        None => None,
        Some(type_name) => match Type::try_from((type_name, ctx))? {
            Type::Basic(basic) if !basic.is_float() => Some(basic),
            other => {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::Basic(BasicType::I64),
                        actual: other,
                    },
                    type_name.position(),
                ))
            }
        },
    };

    let mut members: Vec<EnumMember> = vec![];
    for member in &declaration.members {
        if members.iter().any(|m| m.name == member.name) {
            return Err(TypeCheckError::DuplicateSymbol(
                DuplicateSymbol {
                    name: member.name.clone(),
                },
                member.position.clone(),
            ));
        }

        members.push(EnumMember {
            name: member.name.clone(),
            value: member.value.as_ref().map(|value| match value {
                EnumMemberValue::Int(v, _) => EnumValue::Int(*v),
                EnumMemberValue::Str(v) => EnumValue::Str(v.clone()),
            }),
        });
    }

    Ok(Type::Enum(EnumType {
        name: name.to_string(),
        target,
        members,
    }))
}

impl TypeDeclaration<()> {
    /// First half of the shallow pass: the name (with its generic arity)
    /// enters the registry before any body is resolved, which is what lets
    /// mutually recursive types reference each other.
    pub fn pre_register(&self, ctx: &mut Context) -> TypeResult<()> {
        let generics = self
            .generics
            .iter()
            .map(|generic| crate::typechecker::declarations::GenericParam {
                name: generic.name.clone(),
                constraint: None,
            })
            .collect();

        ctx.scope
            .add_declared_type(DeclaredType::new(&self.id.name, generics, Type::Unset))
            .map_err(|duplicate| {
                TypeCheckError::DuplicateSymbol(duplicate, self.id.position.clone())
            })?;

        Ok(())
    }
}

impl ShallowCheck for TypeDeclaration<()> {
    /// Second half of the shallow pass: resolve the declaration body
    /// against the fully pre-registered name set.
    fn shallow_check(&self, ctx: &mut Context) -> TypeResult<()> {
        ctx.scope.enter_scope();
        let result = (|| {
            let generics = register_generics(ctx, &self.generics)?;

            let ty = match &self.body {
                TypeDeclarationBody::Alias(type_name) => Type::try_from((type_name, &*ctx))?,
                TypeDeclarationBody::Class(class) => convert_class(&self.id.name, class, ctx)?,
                TypeDeclarationBody::Interface(interface) => {
                    convert_interface(&self.id.name, interface, ctx)?
                }
                TypeDeclarationBody::Variant(variant) => {
                    convert_variant(&self.id.name, variant, ctx)?
                }
                TypeDeclarationBody::Enum(declaration) => {
                    convert_enum(&self.id.name, declaration, ctx)?
                }
            };

            Ok::<_, TypeCheckError>((generics, ty))
        })();
        ctx.scope.exit_scope();

        let (generics, ty) = result?;

        ctx.scope
            .override_declared_type(DeclaredType::new(&self.id.name, generics, ty));

        Ok(())
    }
}

impl TypeCheckable for TypeDeclaration<()> {
    type Typed = TypeDeclaration<TypeInformation>;

    /// The deep pass checks method bodies; every other body form was fully
    /// resolved by the shallow pass.
    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let context = ctx.clone();
        let TypeDeclaration {
            id,
            generics,
            body,
            position,
            ..
        } = self;

        let body = match body {
            TypeDeclarationBody::Class(class) => {
                ctx.scope.enter_scope();
                let previous_env = ctx.env.clone();
                ctx.env.within_class = true;

                let result = (|| {
                    register_generics(ctx, &generics)?;

                    let this_type = ctx
                        .scope
                        .get_declared_type(&id.name)
                        .map(|declared| declared.ty)
                        .unwrap_or(Type::Unset);

                    let mut methods = vec![];
                    for method in class.methods {
                        ctx.scope.enter_scope();
                        let function = (|| {
                            if !method.is_static {
                                let slot = Rc::new(RefCell::new(Some(this_type.clone())));
                                let _ = ctx.scope.add_variable("this", slot, false);
                            }
                            method.function.check(ctx, None)
                        })();
                        ctx.scope.exit_scope();

                        methods.push(MethodDeclaration {
                            function: function?,
                            is_static: method.is_static,
                            is_override: method.is_override,
                        });
                    }

                    Ok::<_, TypeCheckError>(TypeDeclarationBody::Class(ClassDeclaration {
                        supertypes: class.supertypes,
                        attributes: class.attributes,
                        methods,
                    }))
                })();

                ctx.env = previous_env;
                ctx.scope.exit_scope();
                result?
            }
            TypeDeclarationBody::Alias(type_name) => TypeDeclarationBody::Alias(type_name),
            TypeDeclarationBody::Interface(interface) => {
                TypeDeclarationBody::Interface(interface)
            }
            TypeDeclarationBody::Variant(variant) => TypeDeclarationBody::Variant(variant),
            TypeDeclarationBody::Enum(declaration) => TypeDeclarationBody::Enum(declaration),
        };

        let info = TypeInformation {
            type_id: Rc::new(RefCell::new(Some(Type::Void))),
            context,
        };

        Ok(TypeDeclaration {
            id: Id {
                name: id.name,
                type_args: vec![],
                info: info.clone(),
                position: id.position,
            },
            generics,
            body,
            info,
            position,
        })
    }

    fn revert(this: &Self::Typed) -> Self {
        TypeDeclaration {
            id: TypeCheckable::revert(&this.id),
            generics: this.generics.clone(),
            body: match &this.body {
                TypeDeclarationBody::Alias(type_name) => {
                    TypeDeclarationBody::Alias(type_name.clone())
                }
                TypeDeclarationBody::Class(class) => {
                    TypeDeclarationBody::Class(ClassDeclaration {
                        supertypes: class.supertypes.clone(),
                        attributes: class.attributes.clone(),
                        methods: class
                            .methods
                            .iter()
                            .map(|method| MethodDeclaration {
                                function: TypeCheckable::revert(&method.function),
                                is_static: method.is_static,
                                is_override: method.is_override,
                            })
                            .collect(),
                    })
                }
                TypeDeclarationBody::Interface(interface) => {
                    TypeDeclarationBody::Interface(interface.clone())
                }
                TypeDeclarationBody::Variant(variant) => {
                    TypeDeclarationBody::Variant(variant.clone())
                }
                TypeDeclarationBody::Enum(declaration) => {
                    TypeDeclarationBody::Enum(declaration.clone())
                }
            },
            info: (),
            position: this.position.clone(),
        }
    }
}

impl TypedConstruct for TypeDeclaration<TypeInformation> {
    type Validated = TypeDeclaration<ValidatedTypeInformation>;

    fn validate(self) -> Result<Self::Validated, TypeValidationError> {
        let TypeDeclaration {
            id,
            generics,
            body,
            info,
            position,
        } = self;

        let body = match body {
            TypeDeclarationBody::Alias(type_name) => TypeDeclarationBody::Alias(type_name),
            TypeDeclarationBody::Class(class) => {
                let mut methods = vec![];
                for method in class.methods {
                    methods.push(MethodDeclaration {
                        function: method.function.validate()?,
                        is_static: method.is_static,
                        is_override: method.is_override,
                    });
                }
                TypeDeclarationBody::Class(ClassDeclaration {
                    supertypes: class.supertypes,
                    attributes: class.attributes,
                    methods,
                })
            }
            TypeDeclarationBody::Interface(interface) => {
                TypeDeclarationBody::Interface(interface)
            }
            TypeDeclarationBody::Variant(variant) => TypeDeclarationBody::Variant(variant),
            TypeDeclarationBody::Enum(declaration) => TypeDeclarationBody::Enum(declaration),
        };

        Ok(TypeDeclaration {
            id: id.validate()?,
            generics,
            body,
            info: info.validate(&position)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use crate::{
        lexer::Lexer,
        parser::{ast::TypeDeclaration, ParseState},
        typechecker::{context::Context, types::Type, ShallowCheck, TypeCheckable},
    };

    fn parse(input: &str) -> TypeDeclaration<()> {
        let mut state = ParseState::new(Lexer::new(input).lex().unwrap());
        TypeDeclaration::parse(&mut state).expect("parsing failed")
    }

    #[test]
    fn test_variant_registration() -> Result<()> {
        let mut ctx = Context::default();
        parse("variant Opt<T> { Some(v: T), None() }").shallow_check(&mut ctx)?;

        let declared = ctx.scope.get_declared_type("Opt").expect("missing variant");
        assert_eq!(declared.generics.len(), 1);

        let Type::Variant(variant) = &declared.ty else {
            panic!("expected variant type");
        };
        assert_eq!(variant.constructors.len(), 2);
        assert_eq!(variant.constructors[0].parent, "Opt");
        Ok(())
    }

    #[test]
    fn test_class_member_disjointness() {
        let mut ctx = Context::default();
        let result = parse("class C { let x: i32; fn x() -> void { } }").shallow_check(&mut ctx);

        assert!(result.is_err());
    }

    #[test]
    fn test_enum_registration() -> Result<()> {
        let mut ctx = Context::default();
        parse("enum Color : u8 { Red, Green = 5 }").shallow_check(&mut ctx)?;

        let declared = ctx.scope.get_declared_type("Color").expect("missing enum");
        let Type::Enum(e) = &declared.ty else {
            panic!("expected enum type");
        };
        assert_eq!(e.members.len(), 2);
        Ok(())
    }

    #[test]
    fn test_method_bodies_are_checked() -> Result<()> {
        let mut ctx = Context::default();
        let declaration = parse("class C { let x: i32; fn wrong() -> bool { return 1; } }");
        declaration.shallow_check(&mut ctx)?;
        declaration.check(&mut ctx, None)?;

        assert!(ctx.reporter.has_errors());
        Ok(())
    }

    #[test]
    fn test_this_is_bound_in_methods() -> Result<()> {
        let mut ctx = Context::default();
        let declaration = parse("class C { let x: i32; fn getX() -> i32 { return this.x; } }");
        declaration.shallow_check(&mut ctx)?;
        declaration.check(&mut ctx, None)?;

        assert!(!ctx.reporter.has_errors());
        Ok(())
    }
}
