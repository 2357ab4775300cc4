use opal_lang::typechecker::error::TypeCheckError;
use test_utils::{expect_clean, expect_errors};

#[test]
fn break_outside_a_loop_is_rejected() {
    let errors = expect_errors("fn main() -> void { break; }");
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::ControlFlowMisuse(..))));
}

#[test]
fn continue_outside_a_loop_is_rejected() {
    expect_errors("fn main() -> void { continue; }");
}

#[test]
fn loop_control_inside_loops() {
    expect_clean(
        "fn main() -> void {\n\
             while (true) { break; }\n\
             do { continue; } while (false);\n\
             for (let mut i = 0; i < 3; i = i + 1) { break; }\n\
         }",
    );
}

#[test]
fn conditions_must_be_boolean() {
    expect_errors("fn main() -> void { while (1) { } }");
    expect_errors("fn main() -> void { if (1) { } }");
}

#[test]
fn return_values_match_the_declared_type() {
    expect_clean("fn answer() -> i64 { return 42; }");
    expect_errors("fn answer() -> bool { return 42; }");
    expect_errors("fn answer() -> i64 { return; }");
}

#[test]
fn foreach_over_an_array_desugars_to_a_counted_for() {
    expect_clean(
        "fn sum(xs: u64[]) -> u64 {\n\
             let mut total: u64 = 0;\n\
             foreach (v in xs) { total = total + v; }\n\
             return total;\n\
         }",
    );
}

#[test]
fn foreach_with_an_index_binding() {
    expect_clean(
        "fn weigh(xs: u64[]) -> u64 {\n\
             let mut total: u64 = 0;\n\
             foreach (i, v in xs) { total = total + i + v; }\n\
             return total;\n\
         }",
    );
}

#[test]
fn foreach_drives_the_iterable_protocol() {
    expect_clean(
        "class Range {\n\
             fn getIterable() -> ArrayIterator<u64> { return new ArrayIterator<u64>(); }\n\
         }\n\
         fn total(r: Range) -> u64 {\n\
             let mut sum: u64 = 0;\n\
             foreach (v in r) { sum = sum + v; }\n\
             return sum;\n\
         }",
    );
}

#[test]
fn foreach_over_a_non_iterable_is_rejected() {
    expect_errors("fn main() -> void { foreach (v in true) { } }");
}

#[test]
fn match_expression_requires_a_trailing_wildcard() {
    let errors = expect_errors(
        "fn pick(x: u8) -> u8 { let r = match x { 0 => 1 }; return r; }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::ExhaustivenessFailure(..))));
}

#[test]
fn match_statement_does_not_require_a_wildcard() {
    expect_clean("fn handle(x: u8) -> void { match x { 0 => { return; } }; }");
}

#[test]
fn empty_match_is_rejected() {
    expect_errors("fn handle(x: u8) -> void { match x { }; }");
}

#[test]
fn break_inside_a_lowered_foreach_body() {
    expect_clean(
        "fn first(xs: u8[]) -> u8 {\n\
             let mut found: u8 = 0;\n\
             foreach (v in xs) { found = v; break; }\n\
             return found;\n\
         }",
    );
}
