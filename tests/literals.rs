use opal_lang::{
    parser::ast::{Block, FunctionBody, Statement, TopLevelStatement},
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

fn declared_type(block: &Block<TypeInformation>, name: &str) -> Type {
    block
        .statements
        .iter()
        .find_map(|stmt| match stmt {
            Statement::VariableDeclaration(decl) if decl.id.name == name => {
                decl.id.info.type_id.borrow().clone()
            }
            _ => None,
        })
        .expect("declaration not found")
}

#[test]
fn out_of_range_literal_is_rejected() {
    let errors = expect_errors("fn main() -> void { let x: u8 = 300; }");
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::TypeMismatch(..))));
}

#[test]
fn boundary_values_fit() {
    expect_clean(
        "fn main() -> void {\n\
             let a: u8 = 255;\n\
             let b: i8 = 127;\n\
             let c: i8 = -128;\n\
             let d: u64 = 18446744073709551615;\n\
         }",
    );
}

#[test]
fn negative_literal_rejected_for_unsigned() {
    expect_errors("fn main() -> void { let x: u8 = -1; }");
}

#[test]
fn negative_out_of_range_is_rejected() {
    expect_errors("fn main() -> void { let x: i8 = -129; }");
}

#[test]
fn least_sufficient_types_without_hint() {
    let program = expect_clean(
        "fn main() -> void {\n\
             let small = 42;\n\
             let medium = 70000;\n\
             let negative = -5;\n\
             let fraction = 2.5;\n\
             let wide = 1e300;\n\
         }",
    );

    let main = function_block(&program, "main");
    assert_eq!(declared_type(main, "small"), Type::Basic(BasicType::U8));
    assert_eq!(declared_type(main, "medium"), Type::Basic(BasicType::U32));
    assert_eq!(declared_type(main, "negative"), Type::Basic(BasicType::I8));
    assert_eq!(declared_type(main, "fraction"), Type::Basic(BasicType::F32));
    assert_eq!(declared_type(main, "wide"), Type::Basic(BasicType::F64));
}

#[test]
fn hinted_literal_stores_the_target_type() {
    let program = expect_clean("fn main() -> void { let x: i64 = 3; }");
    let main = function_block(&program, "main");
    assert_eq!(declared_type(main, "x"), Type::Basic(BasicType::I64));
}

#[test]
fn binary_string_is_a_byte_array() {
    let program = expect_clean("fn main() -> void { let bytes = b\"ab\"; }");
    let main = function_block(&program, "main");
    assert_eq!(
        declared_type(main, "bytes"),
        Type::Array(Box::new(Type::Basic(BasicType::U8)))
    );
}

#[test]
fn string_literal_is_the_builtin_string_class() {
    let program = expect_clean("fn main() -> void { let s = \"hello\"; }");
    let main = function_block(&program, "main");

    let Type::Class(class) = declared_type(main, "s") else {
        panic!("expected the String class");
    };
    assert_eq!(class.name, "String");
}

#[test]
fn string_enum_literal_members() {
    let program = expect_clean(
        "enum Mode { On = \"on\", Off = \"off\" }\n\
         fn main() -> void { let m: Mode = \"on\"; }",
    );
    let main = function_block(&program, "main");
    assert!(matches!(declared_type(main, "m"), Type::Enum(_)));

    expect_errors(
        "enum Mode { On = \"on\", Off = \"off\" }\n\
         fn main() -> void { let m: Mode = \"sideways\"; }",
    );
}

#[test]
fn string_methods_are_available() {
    expect_clean(
        "fn main() -> void {\n\
             let s = \"hello\";\n\
             let same: bool = s.eq(\"hello\");\n\
             let len: u64 = s.length();\n\
         }",
    );
}
