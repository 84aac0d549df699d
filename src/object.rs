//! PDF object model and canonical printing.
//!
//! Values parsed out of a document form a tree of [`Value`] variants hanging
//! off [`IndirectObject`]s. Each variant has a canonical printed form; two
//! structurally equal values produce byte-identical canonical strings under
//! the same [`PrintOptions`], which is what makes line-oriented diffing of
//! two documents meaningful.
//!
//! String and name variants keep their *raw* literal, delimiters included;
//! normalization happens at print time. References hold the target
//! [`ObjectId`] rather than a pointer into the document, which keeps the
//! object graph free of ownership cycles.

use crate::options::PrintOptions;
use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::fmt;

/// Dictionary keys whose values are volatile between otherwise identical
/// documents (timestamps, stream lengths).
const VARIABLE_DICT_KEYS: [&str; 4] = ["LastModified", "ModDate", "Length", "CreationDate"];

/// Dictionary keys whose values carry a font subset tag.
const FONT_DICT_KEYS: [&str; 2] = ["BaseFont", "FontName"];

/// String literals longer than this render as a length + digest summary.
const STRING_HASH_THRESHOLD: usize = 240;

/// Identifier of an indirect object: object number and generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    /// Object number
    pub number: u32,
    /// Generation number
    pub generation: u16,
}

impl ObjectId {
    /// Create a new object identifier.
    pub fn new(number: u32, generation: u16) -> Self {
        Self { number, generation }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "num:{}, gen:{}", self.number, self.generation)
    }
}

/// A PDF value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Null object
    Null,
    /// Boolean value
    Boolean(bool),
    /// Numeric value; integers and reals are unified as f64
    Number(f64),
    /// Literal string, raw, including the surrounding `(` `)`
    String(String),
    /// Hexadecimal string, raw, including the surrounding `<` `>`
    HexString(String),
    /// Name, raw, including the leading `/`
    Name(String),
    /// Stream payload; only its length is observable
    Stream(Bytes),
    /// Ordered sequence of values
    Array(Vec<Value>),
    /// Key-value pairs in canonical sort order
    Dictionary(Vec<KeyValuePair>),
    /// Reference to an indirect object by identifier
    Reference(ObjectId),
}

/// One dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    /// Entry key (a name in well-formed documents)
    pub key: Value,
    /// Entry value
    pub value: Value,
}

/// An indirect object: identifier, parsed child values, the number of
/// references pointing at it, and its minimal reference depth.
#[derive(Debug, Clone)]
pub struct IndirectObject {
    /// Identifier this object was declared under
    pub id: ObjectId,
    /// Child values in declaration order
    pub children: Vec<Value>,
    /// Number of resolved references targeting this object
    pub refs: usize,
    /// Minimum number of reference hops from any root (0 for roots)
    pub depth: u32,
}

impl IndirectObject {
    /// Create an indirect object with no incoming references at depth 0.
    pub fn new(id: ObjectId, children: Vec<Value>) -> Self {
        Self {
            id,
            children,
            refs: 0,
            depth: 0,
        }
    }

    /// Render the canonical form:
    /// `Object( num:N, gen:M, refs:R ) { children }` followed by a blank
    /// line. The identifier header is suppressed under `hide_identifiers`.
    pub fn canonical(&self, opts: &PrintOptions) -> String {
        let items: Vec<String> = self
            .children
            .iter()
            .map(|child| format!("{}{}", padding(opts, 1), child.render(opts, 1)))
            .collect();
        let header = if opts.hide_identifiers {
            String::new()
        } else {
            format!(" {}, refs:{} ", self.id, self.refs)
        };
        format!("Object({}) {{\n{}\n}}\n\n", header, items.join("\n"))
    }
}

impl Value {
    /// Construct a dictionary in canonical order.
    ///
    /// Entries sort by normalized key string, then by normalized value
    /// string, under the options the document is being parsed with. The
    /// order is fixed here and never recomputed.
    pub fn dictionary(mut pairs: Vec<KeyValuePair>, opts: &PrintOptions) -> Self {
        pairs.sort_by(|a, b| {
            let k1 = a.key_string(opts);
            let k2 = b.key_string(opts);
            if k1 != k2 {
                return k1.cmp(&k2);
            }
            a.value_string(opts, 0).cmp(&b.value_string(opts, 0))
        });
        Value::Dictionary(pairs)
    }

    /// Render the canonical form of this value at top level.
    pub fn canonical(&self, opts: &PrintOptions) -> String {
        self.render(opts, 0)
    }

    /// Render at the given indent level. Composite variants indent their
    /// children one level deeper; one tab per level.
    pub(crate) fn render(&self, opts: &PrintOptions, indent: usize) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Boolean(true) => "true".to_string(),
            Value::Boolean(false) => "false".to_string(),
            Value::Number(v) => format!("{:.6}", v),
            Value::String(raw) => render_string(raw),
            Value::HexString(raw) => raw.clone(),
            Value::Name(raw) => raw[1..].to_string(),
            Value::Stream(data) => {
                if opts.hide_stream_length {
                    "Stream()".to_string()
                } else {
                    format!("Stream( size:{} )", data.len())
                }
            },
            Value::Reference(link) => {
                if opts.hide_identifiers {
                    "Ref()".to_string()
                } else {
                    format!("Ref( {} )", link)
                }
            },
            Value::Array(items) => {
                if items.is_empty() {
                    return "Array( size:0 ) []".to_string();
                }
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| format!("{}{}", padding(opts, indent + 1), item.render(opts, indent + 1)))
                    .collect();
                format!(
                    "Array( size:{} ) [\n{}\n{}]",
                    items.len(),
                    rendered.join(",\n"),
                    padding(opts, indent)
                )
            },
            Value::Dictionary(pairs) => {
                if pairs.is_empty() {
                    return "Dict( size:0 ) {}".to_string();
                }
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|pair| format!("{}{}", padding(opts, indent + 1), pair.entry(opts, indent + 1)))
                    .collect();
                format!(
                    "Dict( size:{} ) {{\n{}\n{}}}",
                    pairs.len(),
                    rendered.join(",\n"),
                    padding(opts, indent)
                )
            },
        }
    }
}

impl KeyValuePair {
    /// Render `key -> value` at the given indent level.
    pub(crate) fn entry(&self, opts: &PrintOptions, indent: usize) -> String {
        format!("{} -> {}", self.key_string(opts), self.value_string(opts, indent))
    }

    /// The normalized key string.
    ///
    /// Under `hide_random_keys`, a key made of letters followed by digits
    /// (a generator counter like `GS1`) renders as `Key( prefix:GS )`.
    /// Pure-letter and pure-digit keys pass through unchanged.
    pub fn key_string(&self, opts: &PrintOptions) -> String {
        let key = self.key.render(opts, 0);
        if opts.hide_random_keys {
            return normalize_random_key(key);
        }
        key
    }

    /// The normalized value string.
    ///
    /// Under `hide_variable_data`, values of volatile keys render as
    /// `String()`. Under `trim_font_prefix`, a 6-character `+`-separated
    /// subset tag is dropped from font name values.
    pub fn value_string(&self, opts: &PrintOptions, indent: usize) -> String {
        let key = self.key.render(opts, 0);
        if opts.hide_variable_data {
            for variable_key in VARIABLE_DICT_KEYS {
                if key.starts_with(variable_key) {
                    return "String()".to_string();
                }
            }
        }
        if opts.trim_font_prefix {
            for font_key in FONT_DICT_KEYS {
                if key.starts_with(font_key) {
                    let rendered = self.value.render(opts, indent);
                    let parts: Vec<&str> = rendered.split('+').collect();
                    if parts.len() == 1 || parts[0].len() != 6 {
                        return rendered;
                    }
                    return parts[1..].join("+");
                }
            }
        }
        self.value.render(opts, indent)
    }
}

fn padding(opts: &PrintOptions, indent: usize) -> String {
    if opts.no_indents {
        String::new()
    } else {
        "\t".repeat(indent)
    }
}

/// Render a raw string literal.
///
/// Short literals lose their parentheses and are re-quoted with `\`,
/// newline, tab and `"` escaped. Long literals (over 240 bytes raw) render
/// as a length + SHA-1 summary so that embedded blobs do not dominate diffs.
fn render_string(raw: &str) -> String {
    if raw.len() > STRING_HASH_THRESHOLD {
        return format!("String( length: {}, hash: {} )", raw.len(), sha1_hex(raw.as_bytes()));
    }
    let inner = &raw[1..raw.len() - 1];
    let escaped = inner
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
        .replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Replace a letters-then-digits key with its letter prefix.
///
/// The last character must be a digit, letters after the first digit
/// disqualify, digits before any letter disqualify, and any other character
/// is ignored by the scan.
fn normalize_random_key(key: String) -> String {
    match key.as_bytes().last() {
        Some(last) if last.is_ascii_digit() => {},
        _ => return key,
    }
    let mut parse_prefix = true;
    let mut has_prefix = false;
    let mut prefix = String::new();
    for c in key.chars() {
        if c.is_ascii_alphabetic() {
            if !parse_prefix {
                return key;
            }
            has_prefix = true;
            prefix.push(c);
        } else if c.is_ascii_digit() {
            if !has_prefix {
                return key;
            }
            parse_prefix = false;
        }
    }
    if !parse_prefix {
        format!("Key( prefix:{} )", prefix)
    } else {
        key
    }
}

/// Lowercase hex of the SHA-1 digest of `bytes`.
fn sha1_hex(bytes: &[u8]) -> String {
    const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    let mut hex = String::with_capacity(40);
    for byte in hasher.finalize() {
        hex.push(HEX_CHARS[(byte >> 4) as usize] as char);
        hex.push(HEX_CHARS[(byte & 0x0F) as usize] as char);
    }
    hex
}
