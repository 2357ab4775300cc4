//! The type matcher: a recursive two-operand compatibility check
//! `(ctx, expected, got, strict)`. Failures are returned as values for the
//! caller to format into a diagnostic, never thrown. Matching an expected
//! generic records a substitution; a second encounter of the same generic
//! verifies consistency against the recorded type.

use std::collections::HashMap;

use super::{
    context::Context,
    types::{ClassMethod, ClassType, InterfaceType, Type},
};

#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub success: bool,
    pub message: Option<String>,
    pub substitutions: HashMap<String, Type>,
}

impl MatchOutcome {
    fn ok(substitutions: HashMap<String, Type>) -> MatchOutcome {
        MatchOutcome {
            success: true,
            message: None,
            substitutions,
        }
    }

    fn fail(message: String) -> MatchOutcome {
        MatchOutcome {
            success: false,
            message: Some(message),
            substitutions: HashMap::new(),
        }
    }
}

pub fn matches(ctx: &Context, expected: &Type, got: &Type, strict: bool) -> MatchOutcome {
    let mut substitutions = HashMap::new();
    match check(ctx, expected, got, strict, &mut substitutions) {
        Ok(()) => MatchOutcome::ok(substitutions),
        Err(message) => MatchOutcome::fail(message),
    }
}

/// Match several expected/got pairs against one shared substitution map,
/// so a generic spanning multiple positions must resolve consistently.
/// Used for call argument lists.
pub fn matches_many(ctx: &Context, pairs: &[(Type, Type)], strict: bool) -> MatchOutcome {
    let mut substitutions = HashMap::new();

    for (expected, got) in pairs {
        if let Err(message) = check(ctx, expected, got, strict, &mut substitutions) {
            return MatchOutcome::fail(message);
        }
    }

    MatchOutcome::ok(substitutions)
}

fn mismatch(expected: &Type, got: &Type) -> String {
    format!(
        "expected '{}' but got '{}'",
        expected.shortname(),
        got.shortname()
    )
}

fn check(
    ctx: &Context,
    expected: &Type,
    got: &Type,
    strict: bool,
    substitutions: &mut HashMap<String, Type>,
) -> Result<(), String> {
    let expected = expected.deref(ctx).map_err(|e| e.to_string())?;
    let got = got.deref(ctx).map_err(|e| e.to_string())?;

    // An expected generic records (or verifies) a substitution.
    if let Type::Generic { name, constraint } = &expected {
        if let Some(previous) = substitutions.get(name) {
            if previous.serialize() == got.serialize() {
                return Ok(());
            }
            return Err(format!(
                "conflicting substitutions for '{name}': '{}' vs '{}'",
                previous.shortname(),
                got.shortname()
            ));
        }

        if let Some(constraint) = constraint {
            if !matches!(got, Type::Generic { .. }) {
                check(ctx, constraint, &got, strict, substitutions)?;
            }
        }

        substitutions.insert(name.clone(), got.clone());
        return Ok(());
    }

    // A generic on the got side unifies the other way around, which is
    // what lets a hinted construction instantiate a generic constructor.
    if let Type::Generic { name, .. } = &got {
        if let Some(previous) = substitutions.get(name) {
            if previous.serialize() == expected.serialize() {
                return Ok(());
            }
            return Err(format!(
                "conflicting substitutions for '{name}': '{}' vs '{}'",
                previous.shortname(),
                expected.shortname()
            ));
        }

        substitutions.insert(name.clone(), expected.clone());
        return Ok(());
    }

    // Reflexivity: identical serialized identity always matches.
    if expected.serialize() == got.serialize() {
        return Ok(());
    }

    // Unknown operands defer instead of cascading.
    if matches!(expected, Type::Unset) || matches!(got, Type::Unset) {
        return Ok(());
    }

    match (&expected, &got) {
        (Type::Nullable(_), Type::Null) => Ok(()),
        (Type::Nullable(inner), Type::Nullable(other)) => {
            check(ctx, inner, other, strict, substitutions)
        }
        (Type::Nullable(inner), other) => check(ctx, inner, other, strict, substitutions),
        (_, Type::Null) => Err(format!(
            "null can not be used where '{}' is expected",
            expected.shortname()
        )),
        (_, Type::Nullable(_)) => Err(format!(
            "'{}' may be null and does not narrow to '{}'",
            got.shortname(),
            expected.shortname()
        )),

        (Type::Array(inner), Type::Array(other)) => {
            check(ctx, inner, other, strict, substitutions)
        }

        (Type::Struct(expected_struct), Type::Struct(got_struct)) => {
            for (name, expected_field) in &expected_struct.fields {
                let Some((_, got_field)) =
                    got_struct.fields.iter().find(|(field, _)| field == name)
                else {
                    return Err(format!("missing struct field '{name}'"));
                };
                check(ctx, expected_field, got_field, strict, substitutions)?;
            }

            if strict && got_struct.fields.len() > expected_struct.fields.len() {
                return Err("struct has extra fields in strict mode".into());
            }

            Ok(())
        }

        (Type::Variant(variant), Type::VariantConstructor(constructor)) => {
            if constructor.parent != variant.name {
                return Err(format!(
                    "constructor '{}' does not belong to variant '{}'",
                    constructor.name, variant.name
                ));
            }

            let Some(declared) = variant.constructor(&constructor.name) else {
                return Err(format!(
                    "variant '{}' has no constructor '{}'",
                    variant.name, constructor.name
                ));
            };

            if declared.parameters.len() != constructor.parameters.len() {
                return Err(mismatch(&expected, &got));
            }
            for ((_, declared_ty), (_, got_ty)) in
                declared.parameters.iter().zip(constructor.parameters.iter())
            {
                check(ctx, declared_ty, got_ty, strict, substitutions)?;
            }

            Ok(())
        }

        (Type::Variant(expected_variant), Type::Variant(got_variant)) => {
            if expected_variant.name != got_variant.name
                || expected_variant.constructors.len() != got_variant.constructors.len()
            {
                return Err(mismatch(&expected, &got));
            }

            for (expected_ctor, got_ctor) in expected_variant
                .constructors
                .iter()
                .zip(got_variant.constructors.iter())
            {
                if expected_ctor.name != got_ctor.name
                    || expected_ctor.parameters.len() != got_ctor.parameters.len()
                {
                    return Err(mismatch(&expected, &got));
                }
                for ((_, expected_ty), (_, got_ty)) in
                    expected_ctor.parameters.iter().zip(got_ctor.parameters.iter())
                {
                    check(ctx, expected_ty, got_ty, strict, substitutions)?;
                }
            }

            Ok(())
        }

        (Type::VariantConstructor(expected_ctor), Type::VariantConstructor(got_ctor)) => {
            if expected_ctor.parent != got_ctor.parent
                || expected_ctor.name != got_ctor.name
                || expected_ctor.parameters.len() != got_ctor.parameters.len()
            {
                return Err(mismatch(&expected, &got));
            }

            for ((_, expected_ty), (_, got_ty)) in expected_ctor
                .parameters
                .iter()
                .zip(got_ctor.parameters.iter())
            {
                check(ctx, expected_ty, got_ty, strict, substitutions)?;
            }

            Ok(())
        }

        (Type::Class(expected_class), Type::Class(got_class)) => {
            if expected_class.name == got_class.name {
                return check_class_members(ctx, expected_class, got_class, strict, substitutions);
            }

            // A subclass matches anywhere an ancestor is expected.
            if class_descends_from(ctx, got_class, &expected_class.name) {
                return Ok(());
            }

            Err(mismatch(&expected, &got))
        }

        // The nominal-to-structural rule: anything exposing every method of
        // the interface with a compatible signature satisfies it.
        (Type::Interface(interface), Type::Class(_))
        | (Type::Interface(interface), Type::Interface(_))
        | (Type::Interface(interface), Type::Process(_)) => {
            let required = collect_interface_methods(ctx, interface);
            let provided = collect_provided_methods(ctx, &got);

            for method in required {
                let Some(found) = provided.iter().find(|m| m.name == method.name) else {
                    return Err(format!(
                        "'{}' is missing method '{}' required by interface '{}'",
                        got.shortname(),
                        method.name,
                        interface.name
                    ));
                };
                check(ctx, &method.ty, &found.ty, strict, substitutions).map_err(|_| {
                    format!(
                        "method '{}' of '{}' is not compatible with interface '{}'",
                        method.name,
                        got.shortname(),
                        interface.name
                    )
                })?;
            }

            Ok(())
        }

        (
            Type::Function {
                params: expected_params,
                return_value: expected_return,
            },
            Type::Function {
                params: got_params,
                return_value: got_return,
            },
        ) => {
            if expected_params.len() != got_params.len() {
                return Err(format!(
                    "function takes {} parameter(s) but {} were expected",
                    got_params.len(),
                    expected_params.len()
                ));
            }

            // Parameters are contravariant, the return type covariant.
            for (expected_param, got_param) in expected_params.iter().zip(got_params.iter()) {
                check(ctx, &got_param.ty, &expected_param.ty, strict, substitutions)?;
            }
            check(ctx, expected_return, got_return, strict, substitutions)
        }

        (Type::Union(lhs, rhs), _) => {
            let mut attempt = substitutions.clone();
            if check(ctx, lhs, &got, strict, &mut attempt).is_ok() {
                *substitutions = attempt;
                return Ok(());
            }
            check(ctx, rhs, &got, strict, substitutions)
                .map_err(|_| mismatch(&expected, &got))
        }
        (_, Type::Union(lhs, rhs)) => {
            check(ctx, &expected, lhs, strict, substitutions)
                .and_then(|()| check(ctx, &expected, rhs, strict, substitutions))
                .map_err(|_| mismatch(&expected, &got))
        }

        (Type::Join(lhs, rhs), _) => {
            check(ctx, lhs, &got, strict, substitutions)
                .and_then(|()| check(ctx, rhs, &got, strict, substitutions))
                .map_err(|_| mismatch(&expected, &got))
        }
        (_, Type::Join(lhs, rhs)) => {
            let mut attempt = substitutions.clone();
            if check(ctx, &expected, lhs, strict, &mut attempt).is_ok() {
                *substitutions = attempt;
                return Ok(());
            }
            check(ctx, &expected, rhs, strict, substitutions)
                .map_err(|_| mismatch(&expected, &got))
        }

        _ => Err(mismatch(&expected, &got)),
    }
}

fn check_class_members(
    ctx: &Context,
    expected: &ClassType,
    got: &ClassType,
    strict: bool,
    substitutions: &mut HashMap<String, Type>,
) -> Result<(), String> {
    if expected.attributes.len() != got.attributes.len()
        || expected.methods.len() != got.methods.len()
    {
        return Err(format!(
            "class '{}' was declared with different members",
            expected.name
        ));
    }

    for (expected_attr, got_attr) in expected.attributes.iter().zip(got.attributes.iter()) {
        if expected_attr.name != got_attr.name {
            return Err(format!(
                "class '{}' was declared with different members",
                expected.name
            ));
        }
        check(ctx, &expected_attr.ty, &got_attr.ty, strict, substitutions)?;
    }

    for (expected_method, got_method) in expected.methods.iter().zip(got.methods.iter()) {
        if expected_method.name != got_method.name {
            return Err(format!(
                "class '{}' was declared with different members",
                expected.name
            ));
        }
        check(ctx, &expected_method.ty, &got_method.ty, strict, substitutions)?;
    }

    Ok(())
}

fn class_descends_from(ctx: &Context, class: &ClassType, ancestor: &str) -> bool {
    for supertype in &class.supertypes {
        let Ok(supertype) = supertype.deref(ctx) else {
            continue;
        };
        if let Type::Class(superclass) = &supertype {
            if superclass.name == ancestor || class_descends_from(ctx, superclass, ancestor) {
                return true;
            }
        }
    }
    false
}

/// All methods an interface requires, including those of its
/// superinterfaces.
fn collect_interface_methods(ctx: &Context, interface: &InterfaceType) -> Vec<ClassMethod> {
    let mut methods: Vec<ClassMethod> = interface
        .methods
        .iter()
        .map(|m| ClassMethod {
            name: m.name.clone(),
            ty: m.ty.clone(),
            is_static: false,
        })
        .collect();

    for supertype in &interface.supertypes {
        let Ok(supertype) = supertype.deref(ctx) else {
            continue;
        };
        if let Type::Interface(superinterface) = supertype {
            for method in collect_interface_methods(ctx, &superinterface) {
                if !methods.iter().any(|m| m.name == method.name) {
                    methods.push(method);
                }
            }
        }
    }

    methods
}

/// The method surface a type offers when checked against an interface,
/// including inherited class methods.
fn collect_provided_methods(ctx: &Context, ty: &Type) -> Vec<ClassMethod> {
    match ty {
        Type::Class(class) => {
            let mut methods = class.methods.clone();
            for supertype in &class.supertypes {
                let Ok(supertype) = supertype.deref(ctx) else {
                    continue;
                };
                if let Type::Class(_) = &supertype {
                    for method in collect_provided_methods(ctx, &supertype) {
                        if !methods.iter().any(|m| m.name == method.name) {
                            methods.push(method);
                        }
                    }
                }
            }
            methods
        }
        Type::Interface(interface) => collect_interface_methods(ctx, interface),
        Type::Process(process) => process.methods.clone(),
        _ => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typechecker::types::{
        BasicType, ClassAttribute, FunctionParamType, InterfaceMethod, StructType,
        VariantConstructorType, VariantType,
    };

    fn ctx() -> Context {
        Context::default()
    }

    fn i32_ty() -> Type {
        Type::Basic(BasicType::I32)
    }

    fn struct_ty(fields: Vec<(&str, Type)>) -> Type {
        Type::Struct(StructType {
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), ty))
                .collect(),
        })
    }

    #[test]
    fn test_reflexivity() {
        let ctx = ctx();
        for ty in [
            i32_ty(),
            Type::Boolean,
            Type::Void,
            Type::Null,
            Type::Array(Box::new(Type::Basic(BasicType::U8))),
            struct_ty(vec![("x", i32_ty())]),
        ] {
            assert!(matches(&ctx, &ty, &ty, false).success, "{ty:?}");
        }
    }

    #[test]
    fn test_null_soundness() {
        let ctx = ctx();
        let nullable = Type::Nullable(Box::new(struct_ty(vec![("x", i32_ty())])));

        assert!(matches(&ctx, &nullable, &Type::Null, false).success);
        assert!(!matches(&ctx, &i32_ty(), &Type::Null, false).success);
        // A nullable value does not narrow into a plain one.
        assert!(!matches(&ctx, &struct_ty(vec![("x", i32_ty())]), &nullable, false).success);
    }

    #[test]
    fn test_struct_extra_fields() {
        let ctx = ctx();
        let expected = struct_ty(vec![("x", i32_ty())]);
        let got = struct_ty(vec![("x", i32_ty()), ("y", i32_ty())]);

        assert!(matches(&ctx, &expected, &got, false).success);
        assert!(!matches(&ctx, &expected, &got, true).success);
    }

    #[test]
    fn test_variant_accepts_own_constructor() {
        let ctx = ctx();
        let constructor = VariantConstructorType {
            name: "Some".into(),
            parameters: vec![("v".into(), i32_ty())],
            parent: "Opt".into(),
        };
        let variant = Type::Variant(VariantType {
            name: "Opt".into(),
            constructors: vec![
                constructor.clone(),
                VariantConstructorType {
                    name: "None".into(),
                    parameters: vec![],
                    parent: "Opt".into(),
                },
            ],
        });

        assert!(
            matches(
                &ctx,
                &variant,
                &Type::VariantConstructor(Box::new(constructor)),
                false
            )
            .success
        );

        let foreign = VariantConstructorType {
            name: "Some".into(),
            parameters: vec![("v".into(), i32_ty())],
            parent: "Other".into(),
        };
        assert!(
            !matches(
                &ctx,
                &variant,
                &Type::VariantConstructor(Box::new(foreign)),
                false
            )
            .success
        );
    }

    #[test]
    fn test_generic_substitution_consistency() {
        let ctx = ctx();
        let generic = Type::Generic {
            name: "T".into(),
            constraint: None,
        };
        let pair_expected = struct_ty(vec![("a", generic.clone()), ("b", generic)]);

        let consistent = struct_ty(vec![("a", i32_ty()), ("b", i32_ty())]);
        let outcome = matches(&ctx, &pair_expected, &consistent, false);
        assert!(outcome.success);
        assert_eq!(outcome.substitutions.get("T"), Some(&i32_ty()));

        let conflicting = struct_ty(vec![("a", i32_ty()), ("b", Type::Boolean)]);
        assert!(!matches(&ctx, &pair_expected, &conflicting, false).success);
    }

    #[test]
    fn test_function_variance() {
        let ctx = ctx();
        let expected = Type::Function {
            params: vec![FunctionParamType::unnamed(i32_ty())],
            return_value: Box::new(Type::Boolean),
        };
        let same = Type::Function {
            params: vec![FunctionParamType::unnamed(i32_ty())],
            return_value: Box::new(Type::Boolean),
        };
        let wrong_arity = Type::Function {
            params: vec![],
            return_value: Box::new(Type::Boolean),
        };

        assert!(matches(&ctx, &expected, &same, false).success);
        assert!(!matches(&ctx, &expected, &wrong_arity, false).success);
    }

    #[test]
    fn test_class_as_interface() {
        let ctx = ctx();
        let run = Type::Function {
            params: vec![],
            return_value: Box::new(Type::Void),
        };
        let interface = Type::Interface(Box::new(InterfaceType {
            name: "Runnable".into(),
            supertypes: vec![],
            methods: vec![InterfaceMethod {
                name: "run".into(),
                ty: run.clone(),
            }],
        }));

        let conforming = Type::Class(Box::new(ClassType {
            name: "Job".into(),
            supertypes: vec![],
            attributes: vec![ClassAttribute {
                name: "id".into(),
                ty: i32_ty(),
                is_static: false,
            }],
            methods: vec![ClassMethod {
                name: "run".into(),
                ty: run,
                is_static: false,
            }],
        }));
        let lacking = Type::Class(Box::new(ClassType {
            name: "Plain".into(),
            supertypes: vec![],
            attributes: vec![],
            methods: vec![],
        }));

        assert!(matches(&ctx, &interface, &conforming, false).success);
        assert!(!matches(&ctx, &interface, &lacking, false).success);
    }

    #[test]
    fn test_union_rules() {
        let ctx = ctx();
        let union = Type::Union(Box::new(i32_ty()), Box::new(Type::Boolean));

        assert!(matches(&ctx, &union, &Type::Boolean, false).success);
        assert!(matches(&ctx, &union, &i32_ty(), false).success);
        assert!(!matches(&ctx, &union, &Type::Void, false).success);

        // Matching against a union on the right requires both components.
        assert!(!matches(&ctx, &i32_ty(), &union, false).success);
        let same_union = Type::Union(Box::new(i32_ty()), Box::new(i32_ty()));
        assert!(matches(&ctx, &i32_ty(), &same_union, false).success);
    }

    #[test]
    fn test_join_requires_both() {
        let ctx = ctx();
        let join = Type::Join(Box::new(i32_ty()), Box::new(Type::Boolean));
        assert!(!matches(&ctx, &join, &i32_ty(), false).success);

        let same_join = Type::Join(Box::new(i32_ty()), Box::new(i32_ty()));
        assert!(matches(&ctx, &same_join, &i32_ty(), false).success);
    }
}
