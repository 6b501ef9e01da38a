use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::ast_printer::AstPrinter;
use rox::error::LoxError;
use rox::interpreter::{InterpretError, Interpreter};
use rox::parser::Parser;
use rox::resolver::Resolver;
use rox::scanner::Scanner;
use rox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token stream as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);

    let source = std::fs::read_to_string(&filename)
        .with_context(|| format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", source.len(), filename);

    Ok(source)
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env() // RUST_LOG overrides the default level
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

/// Report `error` on stderr and exit with its status code.
fn fail(error: LoxError) -> ! {
    match &error {
        LoxError::Runtime(e) => debug!("Runtime error on line {}: {:?}", e.line(), e),
        _ => debug!("Exiting after error: {}", error),
    }
    eprintln!("{}", error);
    std::process::exit(error.exit_code());
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut first_error: Option<LoxError> = None;

    for result in Scanner::new(source.as_bytes()) {
        match result {
            Ok(token) => tokens.push(token),
            Err(e) => {
                eprintln!("{}", e);
                first_error.get_or_insert(e);
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for token in &tokens {
            println!("{}", token);
        }
    }

    if let Some(e) = first_error {
        std::process::exit(e.exit_code());
    }

    Ok(())
}

fn parse_expression(source: &str) -> std::result::Result<rox::expr::Expr, LoxError> {
    let tokens = Scanner::new(source.as_bytes()).scan_all()?;
    Parser::new(tokens).parse_expression()
}

fn run(source: &str) {
    let statements = match Scanner::new(source.as_bytes())
        .scan_all()
        .and_then(|tokens| Parser::new(tokens).parse())
    {
        Ok(statements) => statements,
        Err(e) => fail(e),
    };

    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::new();

    if let Err(e) = Resolver::new(&mut interpreter).resolve(&statements) {
        fail(e);
    }

    match interpreter.interpret(&statements) {
        Ok(()) => info!("Program executed successfully"),
        Err(e) => fail(e),
    }
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let filename = match &args.commands {
        Commands::Tokenize { filename, .. }
        | Commands::Parse { filename }
        | Commands::Evaluate { filename }
        | Commands::Run { filename } => filename.clone(),
    };

    let Some(filename) = filename else {
        info!("No filepath provided");
        println!("No input filepath was provided. Exiting...");
        return Ok(());
    };

    let source = read_file(filename)?;

    match args.commands {
        Commands::Tokenize { json, .. } => tokenize(&source, json)?,

        Commands::Parse { .. } => match parse_expression(&source) {
            Ok(expr) => println!("{}", AstPrinter.print(&expr)),
            Err(e) => fail(e),
        },

        Commands::Evaluate { .. } => {
            let expr = match parse_expression(&source) {
                Ok(expr) => expr,
                Err(e) => fail(e),
            };

            match Interpreter::new().evaluate(&expr) {
                Ok(value) => println!("{}", value),
                Err(InterpretError::Runtime(e)) => fail(LoxError::Runtime(e)),
                Err(InterpretError::Return { value, .. }) => println!("{}", value),
            }
        }

        Commands::Run { .. } => run(&source),
    }

    Ok(())
}
