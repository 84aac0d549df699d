//! Error types for the structural PDF comparison library.
//!
//! All fatal conditions from scanning, parsing and reference resolution are
//! surfaced through [`Error`]; invariant violations inside the matcher and
//! pairing engine are programming errors and panic instead.

use crate::object::ObjectId;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scanning and parsing a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file header did not contain the `%...%` version marker pair.
    #[error("invalid header: no PDF version marker found")]
    InvalidHeader,

    /// The token stream ended while a consumer expected more input.
    #[error("unexpected end of file")]
    UnexpectedEof,

    /// The parser could not dispatch the current token.
    ///
    /// `context` carries the scanner's ring-buffer dump around the offending
    /// position.
    #[error("failed to parse token {token:?}\n{context}")]
    UnexpectedToken {
        /// The token that no sub-parser recognized
        token: String,
        /// Scanner context dump around the failure
        context: String,
    },

    /// An object number or generation was not a non-negative integer.
    #[error("invalid object identifier: {0:?}")]
    InvalidObjectId(String),

    /// A reference points at an object that is neither in the document map
    /// nor redirected by deduplication.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(ObjectId),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
