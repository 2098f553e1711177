// ABOUTME: CLI entry point: batch runner for .chi scripts and the REPL

use chi_lang::config::{EXTENSION, PROMPT, USAGE, WELCOME_MESSAGE};
use chi_lang::env::Environment;
use chi_lang::error::ParseError;
use chi_lang::eval::eval_program;
use chi_lang::lexer::Lexer;
use chi_lang::parser::Parser;
use clap::Parser as ClapParser;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::path::{Path, PathBuf};

/// Chi interpreter
#[derive(ClapParser, Debug)]
#[command(name = "chi")]
#[command(version = chi_lang::config::VERSION)]
#[command(about = "A statically-annotated, expression-oriented scripting language")]
struct CliArgs {
    /// Script file to execute (optional - if not provided, starts REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_script(&path),
        None => repl(),
    }
}

/// Batch mode: parse and evaluate one `.chi` file. Parse diagnostics and
/// runtime errors print to stdout; the exit status stays 0 either way.
fn run_script(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !is_chi_file(path) {
        println!("{USAGE}");
        return Ok(());
    }

    let source = std::fs::read_to_string(path)
        .map_err(|error| format!("cannot read script file {}: {error}", path.display()))?;

    let mut parser = Parser::new(Lexer::new(&source));
    let program = parser.parse_program();
    if !parser.errors.is_empty() {
        print_parse_errors(&parser.errors);
        return Ok(());
    }

    let env = Environment::new();
    if let Err(error) = eval_program(&program, &env) {
        println!("ERROR: {error}");
    }
    Ok(())
}

/// Interactive mode: one environment persists across lines, so bindings
/// survive from prompt to prompt.
fn repl() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut editor = DefaultEditor::with_config(config)?;

    println!("{WELCOME_MESSAGE}");
    let env = Environment::new();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                let mut parser = Parser::new(Lexer::new(&line));
                let program = parser.parse_program();
                if !parser.errors.is_empty() {
                    print_parse_errors(&parser.errors);
                    continue;
                }
                if program.statements.is_empty() {
                    continue;
                }

                match eval_program(&program, &env) {
                    Ok(value) => println!("{value}"),
                    Err(error) => println!("ERROR: {error}"),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(error) => {
                eprintln!("Error: {error}");
                break;
            }
        }
    }
    Ok(())
}

fn is_chi_file(path: &Path) -> bool {
    path.to_str().is_some_and(|path| path.ends_with(EXTENSION))
}

fn print_parse_errors(errors: &[ParseError]) {
    println!("Parser panicked! Errors:");
    for error in errors {
        println!("\t{error}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_script_argument() {
        let args = CliArgs::parse_from(["chi", "script.chi"]);
        assert_eq!(args.script, Some(PathBuf::from("script.chi")));

        let args = CliArgs::parse_from(["chi"]);
        assert!(args.script.is_none());
    }

    #[test]
    fn test_is_chi_file() {
        assert!(is_chi_file(Path::new("examples/fib.chi")));
        assert!(!is_chi_file(Path::new("fib.txt")));
        assert!(!is_chi_file(Path::new("fib")));
    }
}
