//! Token scanner for PDF byte streams.
//!
//! This module provides the low-level tokenization the parser consumes. The
//! scanner is deliberately simple: it splits the file into lines on the
//! delimiter byte announced by the header, and splits each line into tokens
//! on ASCII space. PDF's full lexical grammar is not needed for structural
//! comparison, and real-world files in the tolerant subset keep one object
//! element per whitespace-separated token.
//!
//! # Header handling
//!
//! A PDF file opens with `%PDF-<version>` followed by a binary-marker comment
//! line. The scanner reads single bytes until it has seen two `%` markers;
//! the bytes collected between them, minus the trailing byte, form the
//! version string, and that trailing byte becomes the line delimiter for the
//! rest of the file.
//!
//! # Context dumps
//!
//! The scanner keeps a ring buffer of the last lines it produced. On a parse
//! failure, [`Scanner::dump`] renders those lines with a `---->` marker on
//! the current position plus two lines of look-ahead, which ends up in
//! [`Error::UnexpectedToken`](crate::error::Error::UnexpectedToken).

use crate::error::{Error, Result};
use std::io::{BufRead, BufReader, Read};

/// Number of lines retained for context dumps.
const HISTORY_SIZE: usize = 6;

/// Read buffer capacity. Stream objects produce very long lines, so the
/// buffer has to be generous.
const BUFFER_SIZE: usize = 1024 * 1024;

/// A streaming tokenizer over a PDF file.
///
/// Tokens are consumed strictly left to right. [`Scanner::peek`] and
/// [`Scanner::peek_ahead`] return trimmed views of upcoming tokens without
/// consuming them; [`Scanner::next`] returns the raw token text.
pub struct Scanner<R: Read> {
    reader: BufReader<R>,
    delimiter: u8,
    version: String,
    tokens: Vec<String>,
    index: usize,
    history: [String; HISTORY_SIZE],
    history_index: usize,
    end: bool,
}

impl<R: Read> Scanner<R> {
    /// Create a scanner, consuming the file header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the input ends before two `%`
    /// markers are seen, and [`Error::UnexpectedEof`] if no content line
    /// follows the header.
    pub fn new(reader: R) -> Result<Self> {
        let mut reader = BufReader::with_capacity(BUFFER_SIZE, reader);

        let mut header: Vec<u8> = Vec::new();
        let mut count = 0;
        while count < 2 {
            let mut b = [0u8; 1];
            reader.read_exact(&mut b).map_err(|_| Error::InvalidHeader)?;
            if b[0] == b'%' {
                count += 1;
                continue;
            }
            header.push(b[0]);
        }
        if header.is_empty() {
            return Err(Error::InvalidHeader);
        }

        let delimiter = header[header.len() - 1];
        let version = String::from_utf8_lossy(&header[..header.len() - 1]).into_owned();

        let mut scanner = Self {
            reader,
            delimiter,
            version,
            tokens: Vec::new(),
            index: 0,
            history: Default::default(),
            history_index: 0,
            end: false,
        };

        // The second '%' opened the binary-marker comment; skip its remainder.
        scanner.scan()?;
        if !scanner.scan()? {
            return Err(Error::UnexpectedEof);
        }
        Ok(scanner)
    }

    /// The version string extracted from the header (e.g. `PDF-1.7`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// False once the underlying reader is drained and the last token has
    /// been consumed.
    pub fn has_token(&self) -> bool {
        !self.end
    }

    /// The current token, trimmed, without consuming it.
    pub fn peek(&self) -> Result<&str> {
        match self.tokens.get(self.index) {
            Some(token) => Ok(token.trim()),
            None => Err(Error::UnexpectedEof),
        }
    }

    /// The token `offset` positions ahead within the current line, trimmed,
    /// or the empty string if the line has no such token.
    pub fn peek_ahead(&self, offset: usize) -> &str {
        self.tokens
            .get(self.index + offset)
            .map(|token| token.trim())
            .unwrap_or("")
    }

    /// Consume the current token if it equals `token`.
    pub fn pop(&mut self, token: &str) -> Result<bool> {
        if self.peek()? == token {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Consume and return the current token (untrimmed), advancing to the
    /// next line when the current one is exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<String> {
        let token = match self.tokens.get(self.index) {
            Some(token) => token.clone(),
            None => return Err(Error::UnexpectedEof),
        };
        self.index += 1;
        if self.index >= self.tokens.len() && !self.scan()? {
            self.end = true;
        }
        Ok(token)
    }

    /// Render the ring buffer of recent lines with a marker on the current
    /// position, plus up to two lines of look-ahead.
    pub fn dump(&mut self) -> String {
        let mut out = String::new();
        let mut i = self.history_index;
        loop {
            let offset = if self.index == 0 { 1 } else { 0 };
            let marker_slot = (self.history_index + HISTORY_SIZE - 1 - offset) % HISTORY_SIZE;
            if i == marker_slot {
                out.push_str("---->");
            } else {
                out.push_str("#####");
            }
            out.push_str("   ");
            out.push_str(&self.history[i]);
            out.push('\n');
            i = (i + 1) % HISTORY_SIZE;
            if i == self.history_index {
                break;
            }
        }

        let mut line: Vec<u8> = Vec::new();
        for _ in 0..2 {
            line.clear();
            match self.reader.read_until(self.delimiter, &mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    if line.last() == Some(&self.delimiter) {
                        line.pop();
                    }
                    out.push_str("#####   ");
                    out.push_str(&String::from_utf8_lossy(&line));
                    out.push('\n');
                },
            }
        }
        out
    }

    /// Load the next line into the token buffer. Returns false on a clean
    /// end of input.
    fn scan(&mut self) -> Result<bool> {
        let mut line: Vec<u8> = Vec::new();
        let n = self.reader.read_until(self.delimiter, &mut line)?;
        if n == 0 {
            return Ok(false);
        }
        if line.last() == Some(&self.delimiter) {
            line.pop();
        }
        let line = String::from_utf8_lossy(&line).into_owned();
        self.history[self.history_index] = line.clone();
        self.history_index = (self.history_index + 1) % HISTORY_SIZE;
        self.tokens = line.split(' ').map(str::to_string).collect();
        self.index = 0;
        Ok(true)
    }
}
