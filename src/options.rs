//! Configuration records for canonical printing and structural matching.
//!
//! Both option sets are plain `Copy` structs threaded explicitly through the
//! printer and the matcher. Nothing here is global: a document remembers the
//! [`PrintOptions`] it was canonicalized under, and every match call receives
//! its own [`MatchOptions`].

/// Normalization flags applied when rendering canonical strings.
///
/// The flags must be fixed before parsing: dictionary entries are sorted at
/// construction using the normalized key and value strings, so printing a
/// document under different flags than it was parsed with would break the
/// canonical order.
///
/// # Example
///
/// ```
/// use pdf_structdiff::options::PrintOptions;
///
/// // Dump mode - render everything (default)
/// let dump = PrintOptions::default();
/// assert!(!dump.hide_identifiers);
///
/// // Comparison mode - hide volatile and generator-specific data
/// let cmp = PrintOptions::comparison();
/// assert!(cmp.hide_identifiers && cmp.trim_font_prefix);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    /// Suppress object numbers and reference links in output
    pub hide_identifiers: bool,

    /// Render `Stream()` without the byte size
    pub hide_stream_length: bool,

    /// Render dictionary values under `LastModified`, `ModDate`, `Length` and
    /// `CreationDate` keys as `String()`
    pub hide_variable_data: bool,

    /// Render letters-then-digits dictionary keys as `Key( prefix:<letters> )`
    pub hide_random_keys: bool,

    /// Strip the 6-character subset tag from `BaseFont`/`FontName` values
    pub trim_font_prefix: bool,

    /// Omit indentation whitespace
    pub no_indents: bool,
}

impl PrintOptions {
    /// Comparison mode: hide everything volatile so that only semantic
    /// differences survive into the canonical strings.
    pub fn comparison() -> Self {
        Self {
            hide_identifiers: true,
            hide_stream_length: true,
            hide_variable_data: true,
            hide_random_keys: true,
            trim_font_prefix: true,
            no_indents: false,
        }
    }
}

/// Knobs for the recursive structural matcher.
///
/// The default (all off) is the configuration used for exact-match pairing;
/// deduplication and the depth-aware pairing phases enable individual knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchOptions {
    /// Score two indirect objects 0 when their minimal reference depths differ
    pub match_depth: bool,

    /// Compare reference targets by identifier (same 1, different 0.5)
    /// instead of treating references as opaque
    pub match_references: bool,

    /// Require equal payload lengths for two streams to score 1
    pub match_stream: bool,
}

impl MatchOptions {
    /// Configuration used by the post-parse deduplication pass.
    pub fn deduplication() -> Self {
        Self {
            match_depth: false,
            match_references: true,
            match_stream: true,
        }
    }
}
