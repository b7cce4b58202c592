//! Demo CLI: reads a JSON-encoded `Module` (as produced by a real parser, or
//! by `verity_core::build` in tests), runs the semantic pipeline over it, and
//! on success prints the fully decorated AST as JSON. No `clap`, no config
//! file, no environment variables — the input path is the only argument.

use std::env;
use std::fmt;
use std::fs;
use std::process::ExitCode;

use verity_core::{compile, Log, Module};

#[derive(Debug)]
enum CliError {
    MissingArgument,
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::MissingArgument => write!(f, "usage: verity <module.json>"),
            CliError::Io(e) => write!(f, "could not read input file: {e}"),
            CliError::Json(e) => write!(f, "could not parse module JSON: {e}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Json(e)
    }
}

fn run() -> Result<bool, CliError> {
    let path = env::args().nth(1).ok_or(CliError::MissingArgument)?;
    let text = fs::read_to_string(path)?;
    let mut module: Module = serde_json::from_str(&text)?;

    let mut log = Log::new();
    let ok = compile(&mut log, &mut module);

    for warning in log.warnings() {
        eprintln!("{warning}");
    }
    for error in log.errors() {
        eprintln!("{error}");
    }

    if ok {
        let dump = serde_json::to_string_pretty(&module).expect("a compiled module always serializes");
        println!("{dump}");
    }

    Ok(ok)
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
