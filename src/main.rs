use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser as _;
use log::LevelFilter;
use serde::Serialize;

use butterfly::diagnostic::{Diagnostic, ansi::AnsiRenderer, json, registry};
use butterfly::lexer::Tokenizer;
use butterfly::parser::Parser;
use butterfly::vm::{self, STACK_SIZE, Vm, VmConfig};
use butterfly::Error;

/// Evaluate an additive integer expression through the tokenizer, parser,
/// bytecode compiler and stack VM.
#[derive(clap::Parser, Debug)]
#[command(name = "butterfly", version)]
struct Cli {
    /// Source file to evaluate
    #[arg(required_unless_present = "explain")]
    file: Option<PathBuf>,

    /// Print the token stream and stop
    #[arg(long, conflicts_with = "ast")]
    tokens: bool,

    /// Print the expression tree as JSON and stop
    #[arg(long)]
    ast: bool,

    /// Print the disassembled bytecode before running
    #[arg(long)]
    disasm: bool,

    /// Machine-readable output: JSON tokens, bytecode, result and diagnostics
    #[arg(long)]
    json: bool,

    /// Capacity of the VM value stack
    #[arg(long, value_name = "N", default_value_t = STACK_SIZE)]
    stack_size: usize,

    /// Disable ANSI colour in diagnostics
    #[arg(long)]
    no_color: bool,

    /// Explain an error code (e.g. BFY-P001) and exit
    #[arg(long, value_name = "CODE")]
    explain: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Silent unless RUST_LOG asks for more.
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(LevelFilter::Off).env().init() {
        eprintln!("failed to initialise logging: {e}");
    }

    let path = match (&cli.explain, &cli.file) {
        (Some(code), _) => return explain(code),
        (None, Some(path)) => path,
        // FILE is required unless --explain is given
        (None, None) => unreachable!(),
    };
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli, &source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let diagnostics: Vec<Diagnostic> = (&err).into();
            for d in diagnostics {
                report(&cli, d.with_source(source.as_str()));
            }
            ExitCode::FAILURE
        }
    }
}

fn explain(code: &str) -> ExitCode {
    match registry::lookup(code) {
        Some(entry) => {
            print!("{}", entry.long);
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("unknown error code: {code}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli, source: &str) -> Result<(), Error> {
    if cli.tokens {
        return dump_tokens(cli, source);
    }

    let mut parser = Parser::new(Tokenizer::new(source))?;
    let program = parser.parse_program()?;
    let trailing = parser.unconsumed().cloned();
    let errors = parser.into_errors();
    if !errors.is_empty() {
        return Err(Error::Parse(errors));
    }
    if let Some(token) = trailing {
        let warning = Diagnostic::warning(format!("trailing input ignored, starting at {:?}", token.lexeme))
            .with_code("BFY-W001")
            .with_span(token.span, "not part of the expression")
            .with_source(source);
        report(cli, warning);
    }

    if cli.ast {
        print_json(&program);
        return Ok(());
    }

    let bytecode = vm::compile(&program)?;
    if cli.disasm {
        if cli.json {
            print_json(&bytecode);
        } else {
            print!("{}", bytecode.instructions);
        }
    }

    let mut machine = Vm::with_config(bytecode, VmConfig { stack_capacity: cli.stack_size })?;
    machine.run()?;

    let result = machine.stack_top();
    if cli.json {
        println!("{}", serde_json::json!({ "result": result }));
    } else {
        match result {
            Some(value) => println!("{value}"),
            None => println!("no result"),
        }
    }
    Ok(())
}

fn dump_tokens(cli: &Cli, source: &str) -> Result<(), Error> {
    if cli.json {
        let tokens = butterfly::lexer::lex(source)?;
        print_json(&tokens);
        return Ok(());
    }
    for token in Tokenizer::new(source) {
        println!("{}", token?);
    }
    Ok(())
}

fn report(cli: &Cli, d: Diagnostic) {
    if cli.json {
        eprintln!("{}", json::render(&d));
    } else {
        let use_color = !cli.no_color
            && std::env::var_os("NO_COLOR").is_none()
            && std::io::stderr().is_terminal();
        eprint!("{}", AnsiRenderer { use_color }.render(&d));
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Serialization error: {}", e),
    }
}
