//! Recursive-descent parser over the token stream.
//!
//! The parser combines tokens from the [`Scanner`](crate::scanner::Scanner)
//! into [`Value`]s and collects indirect objects into a [`Document`]. Each
//! sub-parser either consumes its production or leaves the stream untouched
//! and reports no match, so dispatch is a simple ordered cascade.
//!
//! The cross-reference table is recognized but discarded: references are
//! resolved by identifier after parsing, so byte offsets are never needed.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::object::{IndirectObject, KeyValuePair, ObjectId, Value};
use crate::options::PrintOptions;
use crate::scanner::Scanner;
use bytes::Bytes;
use indexmap::IndexMap;
use std::io::Read;

/// Streaming parser producing a [`Document`].
pub struct Parser<R: Read> {
    scanner: Scanner<R>,
    options: PrintOptions,
    objects: IndexMap<ObjectId, IndirectObject>,
}

impl<R: Read> Parser<R> {
    /// Create a parser over `scanner`. The options are baked into dictionary
    /// canonicalization, so the produced document remembers them.
    pub fn new(scanner: Scanner<R>, options: PrintOptions) -> Self {
        Self {
            scanner,
            options,
            objects: IndexMap::new(),
        }
    }

    /// Parse the whole token stream and run the post-parse passes
    /// (deduplication, reference resolution, depth assignment).
    pub fn parse(mut self) -> Result<Document> {
        while self.scanner.has_token() {
            if self.scanner.peek()?.is_empty() {
                self.scanner.next()?;
                continue;
            }

            if self.parse_object()? {
                continue;
            }

            if self.parse_trailer()? {
                continue;
            }

            let token = self.scanner.next()?;
            let context = self.scanner.dump();
            log::error!("unknown prefix at top level: {:?}", token);
            return Err(Error::UnexpectedToken { token, context });
        }

        let version = self.scanner.version().to_string();
        let mut document = Document::new(version, self.objects, self.options);
        let redirects = document.deduplicate();
        document.resolve_references(&redirects)?;
        document.assign_depths();
        Ok(document)
    }

    /// Parse `N G obj ... endobj` if the stream is positioned on one.
    fn parse_object(&mut self) -> Result<bool> {
        if self.scanner.peek_ahead(2) != "obj" {
            return Ok(false);
        }
        let number = self.parse_id_component::<u32>()?;
        let generation = self.parse_id_component::<u16>()?;
        self.scanner.next()?; // obj
        let id = ObjectId::new(number, generation);

        let mut children = Vec::new();
        loop {
            if self.scanner.pop("endobj")? {
                self.objects.insert(id, IndirectObject::new(id, children));
                return Ok(true);
            }
            let child = self.parse_next()?;
            children.push(child);
        }
    }

    /// Skip the cross-reference table and trailer up to and including
    /// `%%EOF`. The entries are counted but not retained.
    fn parse_trailer(&mut self) -> Result<bool> {
        if !self.scanner.pop("xref")? {
            return Ok(false);
        }
        let mut entries = 0usize;
        loop {
            if self.scanner.pop("%%EOF")? {
                log::debug!("skipped cross-reference section with {} entries", entries);
                return Ok(true);
            }
            entries += 1;
            self.scanner.next()?;
        }
    }

    /// Parse the next value. First matching sub-parser wins; the order
    /// matters because several productions share lead tokens (`<<` before
    /// `<`, keywords before numbers).
    fn parse_next(&mut self) -> Result<Value> {
        if let Some(value) = self.parse_dict()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_array()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_stream()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_boolean()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_null()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_reference()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_name()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_string()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_number()? {
            return Ok(value);
        }
        if let Some(value) = self.parse_hex_string()? {
            return Ok(value);
        }

        let token = self.scanner.next()?;
        let context = self.scanner.dump();
        log::error!("failed to parse token: {:?}", token);
        Err(Error::UnexpectedToken { token, context })
    }

    fn parse_dict(&mut self) -> Result<Option<Value>> {
        if !self.scanner.pop("<<")? {
            return Ok(None);
        }
        let mut pairs = Vec::new();
        loop {
            if self.scanner.pop(">>")? {
                return Ok(Some(Value::dictionary(pairs, &self.options)));
            }
            let key = self.parse_next()?;
            let value = self.parse_next()?;
            pairs.push(KeyValuePair { key, value });
        }
    }

    fn parse_array(&mut self) -> Result<Option<Value>> {
        if !self.scanner.pop("[")? {
            return Ok(None);
        }
        let mut items = Vec::new();
        loop {
            if self.scanner.pop("]")? {
                return Ok(Some(Value::Array(items)));
            }
            items.push(self.parse_next()?);
        }
    }

    /// Collect everything from the `stream` keyword through `endstream` as
    /// the opaque payload. Only its length is ever observed.
    fn parse_stream(&mut self) -> Result<Option<Value>> {
        if !self.scanner.peek()?.starts_with("stream") {
            return Ok(None);
        }
        let mut buffer: Vec<u8> = Vec::new();
        loop {
            let token = self.scanner.next()?;
            buffer.extend_from_slice(token.as_bytes());
            if token == "endstream" {
                return Ok(Some(Value::Stream(Bytes::from(buffer))));
            }
        }
    }

    fn parse_boolean(&mut self) -> Result<Option<Value>> {
        if self.scanner.pop("true")? {
            return Ok(Some(Value::Boolean(true)));
        }
        if self.scanner.pop("false")? {
            return Ok(Some(Value::Boolean(false)));
        }
        Ok(None)
    }

    fn parse_null(&mut self) -> Result<Option<Value>> {
        if self.scanner.pop("null")? {
            return Ok(Some(Value::Null));
        }
        Ok(None)
    }

    fn parse_reference(&mut self) -> Result<Option<Value>> {
        if self.scanner.peek_ahead(2) != "R" {
            return Ok(None);
        }
        let number = self.parse_id_component::<u32>()?;
        let generation = self.parse_id_component::<u16>()?;
        if !self.scanner.pop("R")? {
            let token = self.scanner.next()?;
            let context = self.scanner.dump();
            return Err(Error::UnexpectedToken { token, context });
        }
        Ok(Some(Value::Reference(ObjectId::new(number, generation))))
    }

    fn parse_name(&mut self) -> Result<Option<Value>> {
        if !self.scanner.peek()?.starts_with('/') {
            return Ok(None);
        }
        let token = self.scanner.next()?;
        if !token.starts_with('/') {
            return Err(Error::InvalidObjectId(token));
        }
        Ok(Some(Value::Name(token)))
    }

    /// Accumulate string tokens until one ends with `)`. Token boundaries
    /// inside the literal are lost; the raw value keeps its delimiters.
    fn parse_string(&mut self) -> Result<Option<Value>> {
        if !self.scanner.peek()?.starts_with('(') {
            return Ok(None);
        }
        let mut buffer = String::new();
        loop {
            let token = self.scanner.next()?;
            buffer.push_str(&token);
            if token.ends_with(')') {
                return Ok(Some(Value::String(buffer)));
            }
        }
    }

    fn parse_number(&mut self) -> Result<Option<Value>> {
        let parsed = self.scanner.peek()?.parse::<f64>();
        match parsed {
            Ok(value) => {
                self.scanner.next()?;
                Ok(Some(Value::Number(value)))
            },
            Err(_) => Ok(None),
        }
    }

    fn parse_hex_string(&mut self) -> Result<Option<Value>> {
        if !self.scanner.peek()?.starts_with('<') {
            return Ok(None);
        }
        let mut buffer = String::new();
        loop {
            let token = self.scanner.next()?;
            buffer.push_str(&token);
            if token.ends_with('>') {
                return Ok(Some(Value::HexString(buffer)));
            }
        }
    }

    fn parse_id_component<T: std::str::FromStr>(&mut self) -> Result<T> {
        let token = self.scanner.next()?;
        token
            .trim()
            .parse::<T>()
            .map_err(|_| Error::InvalidObjectId(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(bytes: &[u8]) -> Document {
        let scanner = Scanner::new(Cursor::new(bytes.to_vec())).expect("scanner");
        Parser::new(scanner, PrintOptions::default())
            .parse()
            .expect("parse")
    }

    fn parse_err(bytes: &[u8]) -> Error {
        let scanner = Scanner::new(Cursor::new(bytes.to_vec())).expect("scanner");
        Parser::new(scanner, PrintOptions::default())
            .parse()
            .expect_err("parse should fail")
    }

    #[test]
    fn test_parse_single_object() {
        let doc = parse(b"%PDF-1.4\n%\xe2\xe3\n1 0 obj\n<< /Type /Catalog >>\nendobj\n");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.version(), "PDF-1.4");
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        assert_eq!(object.children.len(), 1);
        assert!(matches!(object.children[0], Value::Dictionary(_)));
    }

    #[test]
    fn test_parse_scalar_children() {
        let doc = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\ntrue false null 3.5 /Name (text) <AB>\nendobj\n");
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        assert_eq!(object.children.len(), 7);
        assert_eq!(object.children[0], Value::Boolean(true));
        assert_eq!(object.children[1], Value::Boolean(false));
        assert_eq!(object.children[2], Value::Null);
        assert_eq!(object.children[3], Value::Number(3.5));
        assert_eq!(object.children[4], Value::Name("/Name".to_string()));
        assert_eq!(object.children[5], Value::String("(text)".to_string()));
        assert_eq!(object.children[6], Value::HexString("<AB>".to_string()));
    }

    #[test]
    fn test_parse_empty_containers() {
        let doc = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\n<< >>\n[ ]\nendobj\n");
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        let opts = PrintOptions::default();
        assert_eq!(object.children[0].canonical(&opts), "Dict( size:0 ) {}");
        assert_eq!(object.children[1].canonical(&opts), "Array( size:0 ) []");
    }

    #[test]
    fn test_parse_reference_in_dict() {
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Count 0 >>\nendobj\n",
        );
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        let Value::Dictionary(pairs) = &object.children[0] else {
            panic!("expected dictionary");
        };
        assert_eq!(pairs[0].value, Value::Reference(ObjectId::new(2, 0)));
        // The target records one incoming reference
        assert_eq!(doc.objects()[&ObjectId::new(2, 0)].refs, 1);
    }

    #[test]
    fn test_parse_multiline_string() {
        // Tokens are concatenated without separators until one closes
        let doc = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\n(Hello World)\nendobj\n");
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        assert_eq!(object.children[0], Value::String("(HelloWorld)".to_string()));
    }

    #[test]
    fn test_parse_stream_payload() {
        let doc = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\nstream\nBT ET\nendstream\nendobj\n");
        let object = &doc.objects()[&ObjectId::new(1, 0)];
        let Value::Stream(data) = &object.children[0] else {
            panic!("expected stream");
        };
        // "stream" + "BT" + "ET" + "endstream", separators lost
        assert_eq!(data.len(), "streamBTETendstream".len());
    }

    #[test]
    fn test_trailer_is_skipped() {
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\nnull\nendobj\nxref\n0 2\n0000000000 65535 f\ntrailer\n<< /Size 2 >>\nstartxref\n9\n%%EOF\n",
        );
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_unknown_token_aborts_with_context() {
        let err = parse_err(b"%PDF-1.4\n%\xe2\n1 0 obj\n}}}\nendobj\n");
        match err {
            Error::UnexpectedToken { token, context } => {
                assert_eq!(token, "}}}");
                assert!(context.contains("---->"));
            },
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_eof_mid_object_is_fatal() {
        let err = parse_err(b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /A\n");
        assert!(matches!(err, Error::UnexpectedEof));
    }

    #[test]
    fn test_unresolved_reference_is_fatal() {
        let err = parse_err(b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Pages 9 0 R >>\nendobj\n");
        assert!(matches!(err, Error::UnresolvedReference(id) if id == ObjectId::new(9, 0)));
    }
}
