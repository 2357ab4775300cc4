//! Shared harness for the integration tests: drive source text through
//! the whole front end (lex, parse, check) and hand back the typed AST
//! plus accumulated diagnostics.

use anyhow::{anyhow, Result};

use opal_lang::{
    lexer::Lexer,
    parser::{ast::TopLevelStatement, parse_program},
    typechecker::{error::TypeCheckError, TypeChecker, TypeInformation},
};

pub type CheckedProgram = Vec<TopLevelStatement<TypeInformation>>;

/// Lex and parse only.
pub fn parse_source(source: &str) -> Result<Vec<TopLevelStatement<()>>> {
    let tokens = Lexer::new(source).lex().map_err(|error| anyhow!("{error}"))?;
    parse_program(tokens).map_err(|error| anyhow!("{error}"))
}

/// Full pipeline; fatal checker errors become `Err`, everything else is
/// returned alongside the checked program.
pub fn check_source(source: &str) -> Result<(CheckedProgram, Vec<TypeCheckError>)> {
    let statements = parse_source(source)?;
    TypeChecker::new(statements)
        .check()
        .map_err(|error| anyhow!("{error}"))
}

/// Check a program that is expected to be well typed.
pub fn expect_clean(source: &str) -> CheckedProgram {
    let (checked, errors) = check_source(source).expect("front end failed");
    assert!(errors.is_empty(), "unexpected diagnostics: {errors:#?}");
    checked
}

/// Check a program that is expected to produce diagnostics.
pub fn expect_errors(source: &str) -> Vec<TypeCheckError> {
    let (_, errors) = check_source(source).expect("front end failed");
    assert!(!errors.is_empty(), "expected diagnostics, got none");
    errors
}
