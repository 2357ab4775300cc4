use std::{fs, path::PathBuf, process::ExitCode};

use anyhow::{anyhow, Context as _, Result};
use clap::Parser;
use log::{debug, LevelFilter};
use simple_logger::SimpleLogger;

use opal_lang::{lexer::Lexer, parser::parse_program, typechecker::TypeChecker};

/// Front end driver: lex, parse, desugar and typecheck an Opal source
/// file, reporting every diagnostic of the run.
#[derive(Parser)]
#[command(name = "opalc", version, about)]
struct Cli {
    /// Source file to check.
    file: PathBuf,

    /// Dump the token stream as JSON and exit.
    #[arg(long)]
    emit_tokens: bool,

    /// Dump the parsed AST as JSON and exit.
    #[arg(long)]
    emit_ast: bool,

    /// Verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .init()?;

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let tokens = Lexer::new(&source)
        .lex()
        .map_err(|error| anyhow!("{error}"))?;
    debug!("lexed {} tokens", tokens.len());

    if cli.emit_tokens {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
        return Ok(ExitCode::SUCCESS);
    }

    let statements = match parse_program(tokens) {
        Ok(statements) => statements,
        Err(error) => {
            eprintln!("{error}");
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!("parsed {} top level declarations", statements.len());

    if cli.emit_ast {
        println!("{}", serde_json::to_string_pretty(&statements)?);
        return Ok(ExitCode::SUCCESS);
    }

    let (checked, errors) = match TypeChecker::new(statements).check() {
        Ok(result) => result,
        Err(fatal) => {
            eprintln!("{fatal}");
            return Ok(ExitCode::FAILURE);
        }
    };

    if !errors.is_empty() {
        for error in &errors {
            eprintln!("{error}");
        }
        return Ok(ExitCode::FAILURE);
    }

    debug!("checked {} declarations", checked.len());
    Ok(ExitCode::SUCCESS)
}
