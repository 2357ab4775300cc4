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
fn nullable_member_access() {
    let program = expect_clean(
        "class Foo { let bar: i32?; }\n\
         fn main() -> void { let a: Foo? = null; let b = a?.bar; }",
    );

    let main = function_block(&program, "main");
    assert_eq!(
        declared_type(main, "b"),
        Type::Nullable(Box::new(Type::Basic(BasicType::I32)))
    );
}

#[test]
fn nullable_access_to_non_wrappable_member_fails() {
    let errors = expect_errors(
        "class Foo { let bar: i32; }\n\
         fn main() -> void { let a: Foo? = null; let b = a?.bar; }",
    );

    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalNullableTarget(..))));
}

#[test]
fn null_needs_a_nullable_target() {
    let errors = expect_errors("fn main() -> void { let x: i32 = null; }");
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalNullableTarget(..))));
}

#[test]
fn nullable_does_not_narrow_implicitly() {
    let errors = expect_errors(
        "class Foo { }\n\
         fn use(f: Foo) -> void { }\n\
         fn main() -> void { let a: Foo? = null; use(a); }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::TypeMismatch(..))));
}

#[test]
fn nullable_accepts_value_and_null() {
    expect_clean(
        "class Foo { }\n\
         fn main() -> void { let a: Foo? = new Foo(); let b: Foo? = null; }",
    );
}

#[test]
fn nullable_of_nullable_is_ill_formed() {
    expect_errors("class Foo { }\nfn main() -> void { let a: Foo?? = null; }");
}
