//! Command-line front end for the puzzle compiler.
//!
//! Reads a JSON puzzle document and writes the compiled model text.
//!
//! # Usage
//!
//! ```sh
//! gridcsp puzzle.json -o model.mzn
//! ```
//!
//! Read the document from stdin and print the model without tool comments:
//!
//! ```sh
//! gridcsp --no-comments < puzzle.json
//! ```
//!
//! Report rules that could not be applied:
//!
//! ```sh
//! gridcsp puzzle.json --diagnostics
//! ```
//!
//! Set `RUST_LOG=debug` for compiler logging.

use std::{
    fs,
    io::{self, Read as _, Write as _},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use gridcsp_compiler::{
    AssemblerSettings, CompileError, CompilerRegistry, DocumentError, ModelAssembler,
    PuzzleDocument,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Puzzle document to compile. Reads stdin when omitted or `-`.
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Write the model to this file instead of stdout.
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Omit `% <tool>` comments.
    #[arg(long)]
    no_comments: bool,

    /// Emit constraints for the grid's given digits.
    #[arg(long)]
    givens: bool,

    /// Print skipped rules to stderr.
    #[arg(long)]
    diagnostics: bool,

    /// List the supported tool ids and exit.
    #[arg(long)]
    list_tools: bool,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
enum CliError {
    #[display("I/O error: {_0}")]
    Io(#[from] io::Error),
    #[display("invalid puzzle document: {_0}")]
    Json(#[from] serde_json::Error),
    #[display("invalid puzzle: {_0}")]
    Document(#[from] DocumentError),
    #[display("compilation failed: {_0}")]
    Compile(#[from] CompileError),
}

fn main() -> ExitCode {
    better_panic::install();
    env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), CliError> {
    let registry = CompilerRegistry::with_all_tools();
    if args.list_tools {
        let mut stdout = io::stdout().lock();
        for tool_id in registry.tool_ids() {
            writeln!(stdout, "{tool_id}")?;
        }
        return Ok(());
    }

    let source = read_input(args.input.as_ref())?;
    let document: PuzzleDocument = serde_json::from_str(&source)?;
    let puzzle = document.into_puzzle()?;
    log::debug!(
        "compiling {}x{} puzzle with {} elements",
        puzzle.grid().rows(),
        puzzle.grid().cols(),
        puzzle.elements().count()
    );

    let settings = AssemblerSettings {
        tool_comments: !args.no_comments,
        givens: args.givens,
    };
    let model = ModelAssembler::new(&registry)
        .with_settings(settings)
        .compile(&puzzle)?;

    if args.diagnostics {
        for diagnostic in model.diagnostics() {
            eprintln!("skipped {diagnostic}");
        }
    }

    match &args.output {
        Some(path) => fs::write(path, model.text())?,
        None => io::stdout().lock().write_all(model.text().as_bytes())?,
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> io::Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path),
        _ => {
            let mut source = String::new();
            io::stdin().lock().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}
