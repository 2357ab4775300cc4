use opal_lang::{
    parser::ast::{
        BinaryOperator, Block, Expression, FunctionBody, MatchExpression, Statement,
        TopLevelStatement,
    },
    typechecker::{
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

const TAKE: &str = "fn take(xs: u8[]) -> u8[] {\n\
         let r = match xs { [a, b, ...tail] => tail, _ => [] };\n\
         return r;\n\
     }";

#[test]
fn array_rest_pattern_checks() {
    let program = expect_clean(TAKE);
    let matched = first_match(function_block(&program, "take"));

    assert_eq!(
        { matched.info.type_id.borrow().clone() },
        Some(Type::Array(Box::new(Type::Basic(BasicType::U8))))
    );
}

#[test]
fn array_rest_lowering_shape() {
    let program = expect_clean(TAKE);
    let matched = first_match(function_block(&program, "take"));
    let lowered = matched.arms[0].lowered.as_ref().expect("arm not lowered");

    // A rest pattern produces a min-length check: `xs.length >= 2 && ...`.
    let condition = lowered.condition.as_ref().expect("missing condition");
    assert_eq!(
        { condition.get_info().type_id.borrow().clone() },
        Some(Type::Boolean)
    );

    fn contains_min_length(expression: &Expression<TypeInformation>) -> bool {
        match expression {
            Expression::Binary(binary) => {
                binary.operator == BinaryOperator::GreaterOrEqual
                    || contains_min_length(&binary.left)
                    || contains_min_length(&binary.right)
            }
            _ => false,
        }
    }
    assert!(contains_min_length(condition));

    // `a = xs[0]`, `b = xs[1]`, `tail = xs.slice(2, xs.length)`.
    assert_eq!(lowered.assignments.len(), 3);
    assert_eq!(lowered.assignments[0].target.name, "a");
    assert_eq!(lowered.assignments[1].target.name, "b");

    let tail = &lowered.assignments[2];
    assert_eq!(tail.target.name, "tail");
    assert_eq!(
        { tail.value.get_info().type_id.borrow().clone() },
        Some(Type::Array(Box::new(Type::Basic(BasicType::U8))))
    );
    assert!(matches!(tail.value, Expression::Postfix(_)));
}

#[test]
fn exact_length_pattern_without_rest() {
    let program = expect_clean(
        "fn pair(xs: u8[]) -> u8 {\n\
             let r = match xs { [a, b] => a, _ => 0 };\n\
             return r;\n\
         }",
    );
    let matched = first_match(function_block(&program, "pair"));
    let lowered = matched.arms[0].lowered.as_ref().expect("arm not lowered");

    // Exact-length arms compare `xs.length == 2`.
    fn contains_equality(expression: &Expression<TypeInformation>) -> bool {
        match expression {
            Expression::Binary(binary) => {
                binary.operator == BinaryOperator::Equals
                    || contains_equality(&binary.left)
                    || contains_equality(&binary.right)
            }
            _ => false,
        }
    }
    assert!(contains_equality(
        lowered.condition.as_ref().expect("missing condition")
    ));
    assert_eq!(lowered.assignments.len(), 2);
}

#[test]
fn array_pattern_rejects_non_array_scrutinee() {
    expect_errors(
        "fn broken(x: bool) -> bool { let r = match x { [a] => true, _ => false }; return r; }",
    );
}

#[test]
fn nested_literal_elements() {
    expect_clean(
        "fn starts_with_zero(xs: u8[]) -> bool {\n\
             let r = match xs { [0, ...rest] => true, _ => false };\n\
             return r;\n\
         }",
    );
}
