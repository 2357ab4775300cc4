use std::error::Error;

use opal_lang::{
    lexer::Lexer,
    parser::{ast::FunctionDeclaration, ParseState},
    typechecker::{
        context::Context,
        types::{BasicType, FunctionParamType, Type},
        ShallowCheck,
    },
};
use test_utils::{expect_clean, expect_errors};

#[test]
fn generic_function_instantiation() {
    expect_clean(
        "fn id<T>(x: T) -> T = x;\n\
         fn main() -> void { let y: i32 = id<i32>(3); }",
    );
}

#[test]
fn instantiations_are_cached_per_argument_tuple() -> Result<(), Box<dyn Error>> {
    let mut ctx = Context::default();
    let mut state = ParseState::new(Lexer::new("fn id<T>(x: T) -> T = x;").lex()?);
    FunctionDeclaration::parse(&mut state)?.shallow_check(&mut ctx)?;

    let declared = ctx.scope.get_function("id").expect("missing declaration");
    let args = vec![Type::Basic(BasicType::I32)];

    assert!(declared.cached_instantiation(&args).is_none());

    let first = declared.instantiate(&args, &ctx, &Default::default())?;
    let second = declared.instantiate(&args, &ctx, &Default::default())?;

    // Equal serialized argument tuples share one cached instantiation.
    assert_eq!(first, second);
    assert_eq!(declared.cached_instantiation(&args), Some(first.clone()));
    assert_eq!(
        first,
        Type::Function {
            params: vec![FunctionParamType::named("x", Type::Basic(BasicType::I32))],
            return_value: Box::new(Type::Basic(BasicType::I32)),
        }
    );

    Ok(())
}

#[test]
fn generic_arity_is_enforced() {
    let errors = expect_errors(
        "fn id<T>(x: T) -> T = x;\n\
         fn main() -> void { let y = id<i32, u8>(3); }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, opal_lang::typechecker::error::TypeCheckError::ArityMismatch(..))));
}

#[test]
fn generic_constraints_are_checked() {
    expect_clean(
        "interface Runner { fn run() -> void; }\n\
         class Job { fn run() -> void { } }\n\
         fn go<T: Runner>(t: T) -> void { }\n\
         fn main() -> void { go<Job>(new Job()); }",
    );

    expect_errors(
        "interface Runner { fn run() -> void; }\n\
         class Idle { }\n\
         fn go<T: Runner>(t: T) -> void { }\n\
         fn main() -> void { go<Idle>(new Idle()); }",
    );
}

#[test]
fn generic_class_instantiation() {
    expect_clean(
        "class Pair<T> { let a: T; let b: T; }\n\
         fn main() -> void { let p: Pair<i32>? = null; }",
    );
}

#[test]
fn inconsistent_substitution_is_rejected() {
    expect_errors(
        "fn both<T>(a: T, b: T) -> T = a;\n\
         fn main() -> void { let y = both<i32>(1, true); }",
    );
}
