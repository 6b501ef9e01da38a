pub mod ast_printer;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;
pub mod value;

use log::info;

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::output::Output;
use crate::parser::Parser;
use crate::resolver::Resolver;
use crate::scanner::Scanner;

/// Scan, parse, resolve and run `source` on a fresh interpreter that prints
/// to `output`.  Nothing executes unless the first three stages succeed.
pub fn run_source(source: &str, output: Output) -> Result<()> {
    let tokens = Scanner::new(source.as_bytes()).scan_all()?;
    let statements = Parser::new(tokens).parse()?;
    info!("Parsed {} statements", statements.len());

    let mut interpreter = Interpreter::with_output(output);
    Resolver::new(&mut interpreter).resolve(&statements)?;

    interpreter.interpret(&statements)
}
