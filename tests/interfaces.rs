use opal_lang::typechecker::error::TypeCheckError;
use test_utils::{expect_clean, expect_errors};

#[test]
fn class_satisfies_interface_by_methods() {
    expect_clean(
        "interface Printable { fn print() -> void; }\n\
         class Doc { let pages: i32; fn print() -> void { } }\n\
         fn show(p: Printable) -> void { p.print(); }\n\
         fn main() -> void { show(new Doc()); }",
    );
}

#[test]
fn missing_method_fails_the_interface() {
    let errors = expect_errors(
        "interface Printable { fn print() -> void; }\n\
         class Mute { }\n\
         fn show(p: Printable) -> void { }\n\
         fn main() -> void { show(new Mute()); }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::TypeMismatch(..))));
}

#[test]
fn incompatible_signature_fails_the_interface() {
    expect_errors(
        "interface Printable { fn print() -> void; }\n\
         class Odd { fn print(copies: i32) -> void { } }\n\
         fn show(p: Printable) -> void { }\n\
         fn main() -> void { show(new Odd()); }",
    );
}

#[test]
fn inherited_methods_count() {
    expect_clean(
        "interface Printable { fn print() -> void; }\n\
         class Base { fn print() -> void { } }\n\
         class Derived : Base { let extra: i32; }\n\
         fn show(p: Printable) -> void { }\n\
         fn main() -> void { show(new Derived()); }",
    );
}

#[test]
fn superinterface_methods_are_required() {
    expect_errors(
        "interface Readable { fn read() -> i32; }\n\
         interface Document : Readable { fn print() -> void; }\n\
         class HalfDoc { fn print() -> void { } }\n\
         fn open(d: Document) -> void { }\n\
         fn main() -> void { open(new HalfDoc()); }",
    );
}

#[test]
fn interface_pattern_on_class_scrutinee() {
    expect_clean(
        "interface Printable { fn print() -> void; }\n\
         class Doc { fn print() -> void { } }\n\
         fn kind(d: Doc) -> i32 { let r = match d { Printable() => 1, _ => 0 }; return r; }",
    );
}

#[test]
fn class_pattern_on_class_scrutinee_is_rejected() {
    let errors = expect_errors(
        "class Doc { }\n\
         class Other { }\n\
         fn kind(d: Doc) -> i32 { let r = match d { Other() => 1, _ => 0 }; return r; }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalPattern(..))));
}

#[test]
fn interfaces_reject_generic_arguments() {
    let errors = expect_errors(
        "interface Printable { fn print() -> void; }\n\
         fn show(p: Printable<i32>) -> void { }",
    );
    assert!(errors
        .iter()
        .any(|e| matches!(e, TypeCheckError::IllegalGenericUse(..))));
}
