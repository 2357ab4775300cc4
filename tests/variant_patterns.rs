use opal_lang::{
    parser::ast::{
        Block, Expression, FunctionBody, MatchArmBody, MatchExpression, Statement,
        TopLevelStatement,
    },
    typechecker::{
        error::TypeCheckError,
        types::{BasicType, Type},
        TypeInformation,
    },
};
use test_utils::{expect_clean, expect_errors, CheckedProgram};

fn function_block<'a>(program: &'a CheckedProgram, name: &str) -> &'a Block<TypeInformation> {
    program
        .iter()
        .find_map(|stmt| match stmt {
            TopLevelStatement::Function(f) if f.id.name == name => match &f.body {
                FunctionBody::Block(block) => Some(block),
                _ => None,
            },
            _ => None,
        })
        .expect("function not found")
}

fn first_match(block: &Block<TypeInformation>) -> &MatchExpression<TypeInformation> {
    block
        .statements
        .iter()
        .find_map(|stmt| match stmt {
            Statement::VariableDeclaration(decl) => match &decl.value {
                Expression::Match(m) => Some(m.as_ref()),
                _ => None,
            },
            _ => None,
        })
        .expect("match not found")
}

const PICK: &str = "variant Opt<T> { Some(v: T), None() }\n\
     fn pick(o: Opt<i32>) -> i32 { let r = match o { Opt.Some(x) => x, _ => 0 }; return r; }";

#[test]
fn variant_pattern_match_checks() {
    let program = expect_clean(PICK);

    let block = function_block(&program, "pick");
    let matched = first_match(block);

    // The match result carries the first arm's type.
    assert_eq!(
        { matched.info.type_id.borrow().clone() },
        Some(Type::Basic(BasicType::I32))
    );
}

#[test]
fn lowered_arm_is_condition_plus_assignment() {
    let program = expect_clean(PICK);
    let matched = first_match(function_block(&program, "pick"));

    let lowered = matched.arms[0].lowered.as_ref().expect("arm not lowered");

    // Condition: `o is Opt.Some`, re-checked to bool.
    let condition = lowered.condition.as_ref().expect("missing condition");
    assert!(matches!(condition, Expression::InstanceCheck(_)));
    assert_eq!(
        { condition.get_info().type_id.borrow().clone() },
        Some(Type::Boolean)
    );

    // Assignment: `x = (o as! Opt.Some).v` with the instantiated type.
    assert_eq!(lowered.assignments.len(), 1);
    let assignment = &lowered.assignments[0];
    assert_eq!(assignment.target.name, "x");
    assert_eq!(
        { assignment.value.get_info().type_id.borrow().clone() },
        Some(Type::Basic(BasicType::I32))
    );

    // The wildcard arm lowers to no condition at all.
    let default = matched.arms[1].lowered.as_ref().expect("arm not lowered");
    assert!(default.condition.is_none());
    assert!(default.assignments.is_empty());
}

#[test]
fn guard_is_folded_into_the_condition() {
    let program = expect_clean(
        "variant Opt<T> { Some(v: T), None() }\n\
         fn pick(o: Opt<i32>) -> i32 {\n\
             let r = match o { Opt.Some(x) if x > 0 => x, _ => 0 };\n\
             return r;\n\
         }",
    );
    let matched = first_match(function_block(&program, "pick"));

    let lowered = matched.arms[0].lowered.as_ref().expect("arm not lowered");
    let condition = lowered.condition.as_ref().expect("missing condition");

    // `o is Opt.Some && x > 0`
    assert!(matches!(condition, Expression::Binary(_)));
    assert_eq!(
        { condition.get_info().type_id.borrow().clone() },
        Some(Type::Boolean)
    );
}

#[test]
fn foreign_constructor_is_rejected() {
    let errors = expect_errors(
        "variant Opt<T> { Some(v: T), None() }\n\
         variant Res<T> { Ok(v: T), Err() }\n\
         fn pick(o: Opt<i32>) -> i32 { let r = match o { Res.Ok(x) => x, _ => 0 }; return r; }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalPattern(..))));
}

#[test]
fn constructor_arity_is_enforced() {
    let errors = expect_errors(
        "variant Opt<T> { Some(v: T), None() }\n\
         fn pick(o: Opt<i32>) -> i32 { let r = match o { Opt.Some(a, b) => a, _ => 0 }; return r; }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::ArityMismatch(..))));
}

#[test]
fn constructing_variants_under_a_hint() {
    let program = expect_clean(
        "variant Opt<T> { Some(v: T), None() }\n\
         fn main() -> void { let o: Opt<i32> = Opt.Some(3); }",
    );

    let block = function_block(&program, "main");
    let Some(Statement::VariableDeclaration(decl)) = block.statements.first() else {
        panic!("expected declaration");
    };

    let Some(Type::VariantConstructor(constructor)) =
        ({ decl.value.get_info().type_id.borrow().clone() })
    else {
        panic!("expected a constructor type");
    };
    assert_eq!(constructor.parent, "Opt");
    assert_eq!(constructor.parameters[0].1, Type::Basic(BasicType::I32));
}

#[test]
fn match_arm_bodies_may_be_blocks() {
    expect_clean(
        "variant Opt<T> { Some(v: T), None() }\n\
         fn handle(o: Opt<i32>) -> void {\n\
             match o { Opt.Some(x) => { let y = x + 1; }, _ => { } };\n\
         }",
    );
}

#[test]
fn match_statement_bodies_use_match_arm_body_block() {
    let program = expect_clean(
        "variant Opt<T> { Some(v: T), None() }\n\
         fn handle(o: Opt<i32>) -> void { match o { Opt.Some(x) => { }, _ => { } }; }",
    );

    let block = function_block(&program, "handle");
    let Some(Statement::Match(matched)) = block.statements.first() else {
        panic!("expected match statement");
    };
    assert!(matches!(matched.arms[0].body, MatchArmBody::Block(_)));
}
