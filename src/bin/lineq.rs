extern crate lineq;

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lineq::syntax::{lexer, linter};
use lineq::{CompileError, Equation, Error, Lexer};

const EXIT_INPUT_ERROR: i32 = 1;
const EXIT_CHAIN_FAULT: i32 = 2;

/// Normalize linear constraints and objective functions.
#[derive(Parser, Debug)]
#[command(name = "lineq", version)]
struct Cli {
    /// Source file, `-` or nothing reads stdin
    input: Option<PathBuf>,

    /// Source text given inline
    #[arg(short, long, conflicts_with = "input")]
    expr: Option<String>,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Only lex and lint the source
    #[arg(long)]
    lint_only: bool,

    /// Print the token chain instead of equations
    #[arg(long, conflicts_with = "lint_only")]
    tokens: bool,

    /// -v info, -vv debug, -vvv trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {}", e);
    }
}

fn read_source(cli: &Cli) -> io::Result<String> {
    if let Some(ref expr) = cli.expr {
        return Ok(expr.clone());
    }
    match cli.input {
        Some(ref path) if path.as_os_str() != "-" => fs::read_to_string(path),
        _ => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn fail(e: &dyn CompileError, code: i32) -> i32 {
    let stderr = io::stderr();
    let _ = e.report(&mut stderr.lock());
    code
}

fn fail_with(e: &Error) -> i32 {
    let code = if e.is_input_error() {
        EXIT_INPUT_ERROR
    } else {
        EXIT_CHAIN_FAULT
    };
    fail(e, code)
}

fn dump_tokens(source: &str) -> i32 {
    for token in Lexer::new(source) {
        match token {
            Ok(token) => println!("{}", token),
            Err(e) => return fail(&e, EXIT_INPUT_ERROR),
        }
    }
    0
}

fn lint_only(source: &str) -> i32 {
    let chain = match lexer::lex(source) {
        Ok(chain) => chain,
        Err(e) => return fail(&e, EXIT_INPUT_ERROR),
    };
    match linter::lint(&chain, source) {
        Ok(()) => {
            println!("ok");
            0
        }
        Err(e) => fail_with(&e),
    }
}

fn print_text(equations: &[Equation]) {
    match equations.split_first() {
        Some((objective, constraints)) if objective.contains("Z") => {
            println!("objective:");
            println!("  {}", objective);
            println!("constraints:");
            for equation in constraints {
                println!("  {}", equation);
            }
        }
        _ => {
            for equation in equations {
                println!("{}", equation);
            }
        }
    }
}

fn run(cli: &Cli, source: &str) -> i32 {
    if cli.tokens {
        return dump_tokens(source);
    }
    if cli.lint_only {
        return lint_only(source);
    }
    let equations = match lineq::syntax::parse(source) {
        Ok(equations) => equations,
        Err(e) => return fail_with(&e),
    };
    info!(count = equations.len(), "parsed equations");
    match cli.format {
        Format::Text => print_text(&equations),
        Format::Json => match serde_json::to_string_pretty(&equations) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("error: {}", e);
                return EXIT_INPUT_ERROR;
            }
        },
    }
    0
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let source = match read_source(&cli) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(EXIT_INPUT_ERROR);
        }
    };
    process::exit(run(&cli, &source));
}
