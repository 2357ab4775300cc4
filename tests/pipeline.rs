use opal_lang::typechecker::TypedConstruct;
use test_utils::{check_source, expect_clean};

const PROGRAM: &str = "variant Opt<T> { Some(v: T), None() }\n\
     enum Color : u8 { Red, Green, Blue }\n\
     class Point {\n\
         let x: i32;\n\
         let y: i32;\n\
         fn init(x: i32, y: i32) -> void { }\n\
         fn swap() -> Point { return this; }\n\
     }\n\
     fn classify(o: Opt<i32>, c: Color) -> i32 {\n\
         let base: i32 = match o { Opt.Some(v) => v, _ => 0 };\n\
         let bonus: i32 = match c { Color.Red => 1, _ => 0 };\n\
         return base + bonus;\n\
     }\n\
     fn main() -> void {\n\
         let p = new Point(1, 2);\n\
         let total: i32 = classify(Opt.Some(3), Color.Green) + p.x;\n\
     }";

/// After a clean check, every reachable node must carry a concrete type;
/// the validation stage turns that invariant into a hard guarantee.
#[test]
fn every_node_validates_after_checking() {
    let program = expect_clean(PROGRAM);

    for statement in program {
        statement.validate().expect("node without a type survived");
    }
}

#[test]
fn diagnostics_do_not_abort_the_run() {
    let (checked, errors) = check_source(
        "fn first() -> void { let a: bool = 1; }\n\
         fn second() -> void { let b: bool = 2; }\n\
         fn third() -> void { let c: bool = true; }",
    )
    .expect("front end failed");

    // One diagnostic per broken function, and the clean one still checks.
    assert_eq!(errors.len(), 2);
    assert_eq!(checked.len(), 3);
}

#[test]
fn lowered_arms_validate_too() {
    let program = expect_clean(
        "fn take(xs: u8[]) -> u8[] {\n\
             let r = match xs { [a, b, ...tail] => tail, _ => [] };\n\
             return r;\n\
         }",
    );

    for statement in program {
        statement.validate().expect("lowered node without a type");
    }
}
