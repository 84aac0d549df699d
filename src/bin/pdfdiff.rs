//! pdfdiff - structurally compare two PDF files
//!
//! Parses both inputs, pairs their objects by structural similarity and
//! renders the result either as a colored context diff on stdout (`--diff`,
//! `--full`) or as two canonical text files on disk (`--dump`).

use clap::Parser;
use pdf_structdiff::{compare, Comparison};
use std::fs;
use std::process::ExitCode;

/// Lines at least this wide are ignored when sizing dividers.
const MAX_DIVIDER_WIDTH: usize = 300;

/// Context lines shown around each change.
const CONTEXT_LINES: i64 = 5;

#[derive(Parser, Debug)]
#[command(name = "pdfdiff")]
#[command(version, about = "Structurally compare two PDF files", long_about = None)]
struct Args {
    /// Left input file
    #[arg(long)]
    left: std::path::PathBuf,

    /// Right input file
    #[arg(long)]
    right: std::path::PathBuf,

    /// Write the comparable text files to disk next to the inputs
    #[arg(long)]
    dump: bool,

    /// Print the diff to stdout with context elision
    #[arg(long)]
    diff: bool,

    /// Print the full diff without context elision
    #[arg(long)]
    full: bool,

    /// Print match statistics
    #[arg(short, long)]
    verbose: bool,
}

fn print_divider(width: usize) {
    print!("\u{1b}[39m");
    println!("{}", "-".repeat(width));
}

fn print_diff(result: &Comparison, print_all: bool) {
    let difference = result.diff();
    if print_all {
        println!("{}", difference);
        return;
    }

    let lines: Vec<&str> = difference.split('\n').collect();
    let mut max_line_length = 0;
    for line in &lines {
        let tabs = line.matches('\t').count();
        let length = line.len() - tabs + 8 * tabs;
        if length > max_line_length && length < MAX_DIVIDER_WIDTH {
            max_line_length = length;
        }
    }

    let mut show_divider = false;
    print_divider(max_line_length);
    for i in 0..lines.len() {
        if lines[i].is_empty() {
            continue;
        }
        match lines[i].as_bytes()[0] {
            b'+' => {
                println!("\u{1b}[92m{}", lines[i]);
                show_divider = true;
                continue;
            },
            b'-' => {
                println!("\u{1b}[91m{}", lines[i]);
                show_divider = true;
                continue;
            },
            _ => {},
        }

        let mut is_visible = false;
        for j in -CONTEXT_LINES..=CONTEXT_LINES {
            let index = i as i64 + j;
            if index < 0 || index >= lines.len() as i64 {
                continue;
            }
            let line = lines[index as usize];
            if line.is_empty() {
                continue;
            }
            let c = line.as_bytes()[0];
            if c == b'+' || c == b'-' {
                is_visible = true;
                break;
            }
        }
        if is_visible {
            println!("\u{1b}[39m{}", lines[i]);
        } else if show_divider {
            show_divider = false;
            print_divider(max_line_length);
        }
    }
    print_divider(max_line_length);
}

fn write_outputs(result: &Comparison) -> std::io::Result<()> {
    fs::write(result.left_path.with_extension("txt"), &result.left_output)?;
    fs::write(result.right_path.with_extension("txt"), &result.right_output)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    if !args.diff && !args.dump && !args.full {
        eprintln!("error: no action specified");
        return ExitCode::FAILURE;
    }

    let result = match compare(&args.left, &args.right, args.verbose) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        },
    };

    if args.diff || args.full {
        print_diff(&result, args.full);
    }
    if args.dump {
        if let Err(err) = write_outputs(&result) {
            eprintln!("error: {}", err);
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
