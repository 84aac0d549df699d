// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::should_implement_trait)]

//! # pdf_structdiff
//!
//! Structural comparison of PDF files.
//!
//! Instead of diffing bytes or rendered pages, this library parses each
//! document into a normalized tree of tagged objects, pairs objects between
//! the two documents by a recursive similarity score, and emits a canonical
//! textual form in which corresponding objects appear in the same order on
//! both sides. A line-oriented diff of the two strings then surfaces only
//! semantic differences.
//!
//! ## Pipeline
//!
//! 1. [`scanner`] — splits the byte stream into whitespace-separated tokens.
//! 2. [`parser`] — recursive descent into an object graph with resolved
//!    references ([`document::Document`]).
//! 3. [`matcher`] — recursive similarity score over two object trees.
//! 4. [`compare`] — iterated best-mutual-match pairing and ordered output.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdf_structdiff::compare;
//!
//! # fn main() -> pdf_structdiff::Result<()> {
//! let result = compare("left.pdf", "right.pdf", false)?;
//! print!("{}", result.diff());
//! # Ok(())
//! # }
//! ```
//!
//! Dumping a single document:
//!
//! ```no_run
//! use pdf_structdiff::{Document, PrintOptions};
//!
//! # fn main() -> pdf_structdiff::Result<()> {
//! let doc = Document::open("input.pdf", PrintOptions::default())?;
//! print!("{}", doc.canonical());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration records
pub mod options;

// Core parsing
pub mod document;
pub mod object;
pub mod parser;
pub mod scanner;

// Structural comparison
pub mod compare;
pub mod diff;
pub mod matcher;

// Re-exports
pub use compare::{compare, CompareStats, Comparison};
pub use document::Document;
pub use error::{Error, Result};
pub use object::{IndirectObject, KeyValuePair, ObjectId, Value};
pub use options::{MatchOptions, PrintOptions};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
