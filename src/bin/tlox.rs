//! Lox interpreter command-line.
//!
//! `tlox <command> <filename>` runs one stage of the pipeline over a file:
//!
//! - `tokenize`: dump the tokens,
//! - `parse`: print the parenthesized form of an expression,
//! - `evaluate`: print the value of an expression,
//! - `run`: execute a program.
//!
//! When called without argument it drops into an interactive read-evaluate-print loop.
//!
//! Exit status is 65 on lexical or syntax errors and 70 on runtime errors. Set `RUST_LOG` (for
//! instance `RUST_LOG=tlox=debug`) to trace the interpreter on stderr.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{self, Context};
use clap::Parser;

use tlox::{Interpreter, LoxError};

/// Tree-walking interpreter for the Lox language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// One of `tokenize`, `parse`, `evaluate` or `run`. Starts a REPL when omitted.
    command: Option<String>,

    /// Lox source file.
    filename: Option<PathBuf>,
}

fn main() -> Result<(), anyhow::Error> {
    init_tracing();
    let args = Args::parse();

    let code = match (args.command, args.filename) {
        (None, _) => {
            run_prompt()?;
            0
        }
        (Some(command), Some(filename)) => run_command(&command, &filename)?,
        (Some(_), None) => {
            eprintln!("Usage: tlox <command> <filename>");
            1
        }
    };
    io::stdout().flush()?;
    process::exit(code);
}

/// Logs go to stderr, and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

const COMMANDS: [&str; 4] = ["tokenize", "parse", "evaluate", "run"];

/// Returns the process exit status.
fn run_command(command: &str, filename: &Path) -> Result<i32, anyhow::Error> {
    if !COMMANDS.contains(&command) {
        eprintln!("Unknown command: {}", command);
        return Ok(1);
    }

    let source = fs::read_to_string(filename)
        .with_context(|| format!("failed to read {}", filename.display()))?;

    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    let result = match command {
        "tokenize" => {
            let (tokens, diags) = interp.tokenize(&source);
            if diags.has_errors() {
                eprintln!("{}", diags);
            }
            for token in &tokens {
                println!("{}", token);
            }
            if diags.has_errors() {
                Err(LoxError::Static(diags))
            } else {
                Ok(())
            }
        }
        "parse" => interp
            .parse_expression(&source)
            .map(|expr| println!("{}", expr)),
        "evaluate" => interp.evaluate(&source).map(|value| println!("{}", value)),
        _ => interp.run(&source),
    };

    match result {
        Ok(()) => Ok(0),
        // Lexical errors were already printed by `tokenize`.
        Err(e @ LoxError::Static(_)) if command == "tokenize" => Ok(e.exit_code()),
        Err(e) => {
            eprintln!("{}", e);
            Ok(e.exit_code())
        }
    }
}

fn run_prompt() -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 || input.trim().is_empty() {
            break;
        }

        // Each line starts with a clean slate of diagnostics; definitions persist.
        if let Err(e) = interp.run(&input) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}
