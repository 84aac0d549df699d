//! pdfdump - dump the canonical object tree of PDF files
//!
//! Parses each input and prints its canonical textual form, one object per
//! block, references and identifiers included. With `--write`, the dump goes
//! to `<name>.txt` next to each input instead of stdout.

use clap::Parser;
use pdf_structdiff::{Document, PrintOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pdfdump")]
#[command(version, about = "Dump the canonical object tree of PDF files", long_about = None)]
struct Args {
    /// Input files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Write <name>.txt next to each input instead of printing to stdout
    #[arg(short, long)]
    write: bool,

    /// Report the object count per file
    #[arg(short, long)]
    verbose: bool,
}

fn dump(path: &Path, args: &Args) -> pdf_structdiff::Result<()> {
    let document = Document::open(path, PrintOptions::default())?;
    if args.verbose {
        eprintln!("{}: {} objects", path.display(), document.len());
    }
    if args.write {
        let output = path.with_extension("txt");
        fs::write(&output, document.canonical())?;
        log::info!("wrote {}", output.display());
    } else {
        print!("{}", document.canonical());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    for path in &args.files {
        if let Err(err) = dump(path, &args) {
            eprintln!("error: {}: {}", path.display(), err);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
