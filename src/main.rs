use anyhow::{bail, Context, Result};
use colored::*;
use pascaline::repl::Repl;
use pascaline_core::parser::{parse, Interpreter, SemanticAnalyzer};
use std::process;

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err.to_string().red());
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut file = None;
    let mut show_scopes = false;
    let mut reemit = false;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--scope" => show_scopes = true,
            "--reemit" => reemit = true,
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            _ if arg.starts_with('-') => bail!("unknown option '{}' (try --help)", arg),
            _ => {
                if file.replace(arg).is_some() {
                    bail!("only one source file can be given");
                }
            }
        }
    }

    match file {
        Some(path) => run_file(&path, show_scopes, reemit),
        None => Repl::new()?.run(),
    }
}

fn print_usage() {
    println!("Usage: pascaline [FILE] [--scope] [--reemit]");
    println!();
    println!("Runs a Pascaline source file and prints the final global bindings.");
    println!("With no file, starts the interactive arithmetic calculator.");
    println!();
    println!("  --scope    print the symbol table of every scope after analysis");
    println!("  --reemit   print the program back with scope-decorated names");
}

fn run_file(path: &str, show_scopes: bool, reemit: bool) -> Result<()> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path))?;

    let program = parse(&source)?;
    let analysis = SemanticAnalyzer::analyze(&program)?;

    if show_scopes {
        for dump in &analysis.scope_trace {
            println!("{}", dump);
            println!();
        }
    }

    if reemit {
        println!("{}", pascaline::reemit::reemit(&program)?);
        return Ok(());
    }

    let mut interpreter = Interpreter::new(analysis.resolutions);
    let frame = interpreter.run_program(&program)?;

    println!("{}", format!("program {} finished", frame.name()).green());
    for (name, value) in frame.members() {
        println!("  {} = {}", name.bold(), value.to_string().cyan());
    }
    Ok(())
}
