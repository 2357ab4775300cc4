use opal_lang::{
    parser::ast::{
        Block, Expression, FunctionBody, MatchExpression, Statement, TopLevelStatement,
    },
    typechecker::{error::TypeCheckError, types::Type, TypeInformation},
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

#[test]
fn enum_member_access_through_the_enum_name() {
    expect_clean(
        "enum Color : u8 { Red, Green = 5, Blue }\n\
         fn main() -> void { let c: Color = Color.Red; }",
    );
}

#[test]
fn enum_patterns_lower_to_equality() {
    let program = expect_clean(
        "enum Color : u8 { Red, Green, Blue }\n\
         fn rank(c: Color) -> u8 {\n\
             let r = match c { Color.Red => 1, Color.Green => 2, _ => 0 };\n\
             return r;\n\
         }",
    );

    let matched = first_match(function_block(&program, "rank"));
    let lowered = matched.arms[0].lowered.as_ref().expect("arm not lowered");

    // `c == Color.Red`
    let condition = lowered.condition.as_ref().expect("missing condition");
    assert!(matches!(condition, Expression::Binary(_)));
    assert_eq!(
        { condition.get_info().type_id.borrow().clone() },
        Some(Type::Boolean)
    );
    assert!(lowered.assignments.is_empty());
}

#[test]
fn unknown_member_is_rejected() {
    let errors = expect_errors(
        "enum Color { Red }\n\
         fn rank(c: Color) -> u8 { let r = match c { Color.Purple => 1, _ => 0 }; return r; }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalPattern(..))));
}

#[test]
fn enum_member_patterns_take_no_arguments() {
    expect_errors(
        "enum Color { Red }\n\
         fn rank(c: Color) -> u8 { let r = match c { Color.Red(x) => 1, _ => 0 }; return r; }",
    );
}

#[test]
fn enums_reject_generic_arguments() {
    let errors = expect_errors(
        "enum Color { Red }\n\
         fn paint(c: Color<u8>) -> void { }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalGenericUse(..))));
}

#[test]
fn enum_equality_comparisons() {
    expect_clean(
        "enum Color { Red, Green }\n\
         fn same(a: Color, b: Color) -> bool { return a == b; }",
    );
}
