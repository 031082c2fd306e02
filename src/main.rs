mod builtins;
mod config;
mod cont;
mod env;
mod error;
mod eval;
mod highlighter;
mod number;
mod parser;
mod sym;
mod value;

use builtins::register_builtins;
use clap::Parser;
use env::Environment;
use eval::evaluate;
use highlighter::SchemeHelper;
use parser::ReadOutcome;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use value::Value;

/// Scheme interpreter with first-class continuations and proper tail calls
#[derive(Parser, Debug)]
#[command(name = "scheme-kont")]
#[command(version = config::VERSION)]
#[command(about = "A small Scheme interpreter with call/cc and proper tail calls")]
struct CliArgs {
    /// Script file to evaluate (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Pass "-" to drop into the REPL after the script finishes
    #[arg(value_name = "-")]
    interactive: Option<String>,
}

fn main() {
    let args = CliArgs::parse();

    if let Some(flag) = &args.interactive {
        if flag != "-" {
            eprintln!("unrecognized argument: {}", flag);
            std::process::exit(1);
        }
    }

    let env = Environment::global();
    register_builtins(env.clone());

    if let Some(path) = &args.script {
        if let Err(message) = run_script(path, &env) {
            eprintln!("{}", message);
            std::process::exit(1);
        }
        if args.interactive.is_none() {
            return;
        }
    }

    if let Err(message) = repl(&env) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}

/// Evaluates a script file top to bottom; the first failure aborts it.
fn run_script(path: &Path, env: &Rc<Environment>) -> Result<(), String> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read script file {}: {}", path.display(), e))?;
    let expressions = parser::parse_all(&source).map_err(|e| e.to_string())?;
    for expr in expressions {
        evaluate(expr, env).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// The interactive loop. Lines accumulate while an expression is still
/// open; each completed expression is evaluated and echoed unless its
/// result is VOID.
fn repl(env: &Rc<Environment>) -> Result<(), String> {
    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(rl_config)
        .map_err(|e| format!("failed to initialize line editor: {}", e))?;
    rl.set_helper(Some(SchemeHelper::new()));

    let history_file = ".scheme_kont_history";
    let _ = rl.load_history(history_file);

    let mut pending = String::new();
    loop {
        let prompt = if pending.is_empty() {
            config::PROMPT
        } else {
            config::CONTINUE_PROMPT
        };

        match rl.readline(prompt) {
            Ok(line) => {
                pending.push_str(&line);
                pending.push('\n');
                drain_expressions(&mut pending, env);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C abandons the expression in progress
                pending.clear();
            }
            Err(ReadlineError::Eof) => {
                println!("{}", config::GOODBYE);
                break;
            }
            Err(err) => {
                eprintln!("{}", err);
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}

/// Evaluates every complete expression in `pending`, leaving an incomplete
/// tail in place for the next line. A malformed buffer is discarded.
fn drain_expressions(pending: &mut String, env: &Rc<Environment>) {
    loop {
        match parser::read_expr(pending) {
            Ok(ReadOutcome::Expr(expr, used)) => {
                pending.drain(..used);
                match evaluate(expr, env) {
                    Ok(Value::Void) => {}
                    Ok(result) => println!("{}", result),
                    Err(e) => eprintln!("{}", e),
                }
            }
            Ok(ReadOutcome::End) => {
                pending.clear();
                return;
            }
            Ok(ReadOutcome::Incomplete) => return,
            Err(e) => {
                eprintln!("{}", e);
                pending.clear();
                return;
            }
        }
    }
}
