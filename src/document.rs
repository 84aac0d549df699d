//! Parsed document: the indirect-object map and the post-parse passes.
//!
//! A [`Document`] owns every indirect object, keyed by identifier in
//! insertion (declaration) order. References inside the value trees hold
//! identifiers, never pointers, so the cyclic reference graph needs no
//! shared ownership.
//!
//! Three passes run after parsing, in order:
//!
//! 1. **Deduplication** — structurally identical objects collapse to one
//!    representative; dropped identifiers go into a redirect table. Real
//!    documents routinely embed the same helper object several times, and
//!    collapsing them improves pairing recall.
//! 2. **Reference resolution** — every reference is rewritten through the
//!    redirect table and its target counts it as incoming. A reference with
//!    no target and no redirect is fatal.
//! 3. **Depth assignment** — objects nothing refers to are roots at depth 0;
//!    crossing a reference edge costs one, structural nesting costs nothing.

use crate::error::{Error, Result};
use crate::matcher::match_objects;
use crate::object::{IndirectObject, ObjectId, Value};
use crate::options::{MatchOptions, PrintOptions};
use crate::parser::Parser;
use crate::scanner::Scanner;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A parsed PDF document frozen after the post-parse passes.
#[derive(Debug)]
pub struct Document {
    version: String,
    objects: IndexMap<ObjectId, IndirectObject>,
    options: PrintOptions,
}

impl Document {
    /// Parse the file at `path`.
    pub fn open(path: impl AsRef<Path>, options: PrintOptions) -> Result<Document> {
        let file = File::open(path)?;
        Self::from_reader(file, options)
    }

    /// Parse a document from any byte source.
    pub fn from_reader<R: Read>(reader: R, options: PrintOptions) -> Result<Document> {
        let scanner = Scanner::new(reader)?;
        Parser::new(scanner, options).parse()
    }

    pub(crate) fn new(
        version: String,
        objects: IndexMap<ObjectId, IndirectObject>,
        options: PrintOptions,
    ) -> Self {
        Self {
            version,
            objects,
            options,
        }
    }

    /// The version string from the file header (e.g. `PDF-1.7`).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The normalization options this document was canonicalized under.
    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    /// The indirect objects in declaration order.
    pub fn objects(&self) -> &IndexMap<ObjectId, IndirectObject> {
        &self.objects
    }

    /// Number of indirect objects (after deduplication).
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True when the document holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Concatenated canonical form of every object, in declaration order.
    /// Dumping the same document twice yields byte-identical output.
    pub fn canonical(&self) -> String {
        let mut buffer = String::new();
        for object in self.objects.values() {
            buffer.push_str(&object.canonical(&self.options));
        }
        buffer
    }

    /// Collapse structurally identical objects.
    ///
    /// Objects are grouped by a full-strength structural match (references
    /// compared by identifier, stream lengths compared). The first member of
    /// a group in declaration order is kept; the rest are dropped and their
    /// identifiers redirected to it.
    pub(crate) fn deduplicate(&mut self) -> IndexMap<ObjectId, ObjectId> {
        let opts = MatchOptions::deduplication();
        let ids: Vec<ObjectId> = self.objects.keys().copied().collect();
        let mut visited: HashSet<ObjectId> = HashSet::new();
        let mut redirects: IndexMap<ObjectId, ObjectId> = IndexMap::new();

        for (position, &keeper) in ids.iter().enumerate() {
            if visited.contains(&keeper) {
                continue;
            }
            visited.insert(keeper);
            for &candidate in &ids[position + 1..] {
                if visited.contains(&candidate) {
                    continue;
                }
                let score = match_objects(
                    &self.objects[&keeper],
                    &self.objects[&candidate],
                    &opts,
                    &self.options,
                );
                if score == 1.0 {
                    visited.insert(candidate);
                    redirects.insert(candidate, keeper);
                }
            }
        }

        for duplicate in redirects.keys() {
            self.objects.shift_remove(duplicate);
        }
        if !redirects.is_empty() {
            log::debug!("deduplicated {} objects", redirects.len());
        }
        redirects
    }

    /// Rewrite every reference through `redirects` and count incoming
    /// references per target.
    ///
    /// # Errors
    ///
    /// [`Error::UnresolvedReference`] when a reference target is neither in
    /// the object map nor redirected.
    pub(crate) fn resolve_references(
        &mut self,
        redirects: &IndexMap<ObjectId, ObjectId>,
    ) -> Result<()> {
        let known: HashSet<ObjectId> = self.objects.keys().copied().collect();
        let mut incoming: HashMap<ObjectId, usize> = HashMap::new();

        for object in self.objects.values_mut() {
            for child in &mut object.children {
                resolve_value(child, &known, redirects, &mut incoming)?;
            }
        }

        for (id, count) in incoming {
            if let Some(object) = self.objects.get_mut(&id) {
                object.refs = count;
            }
        }
        Ok(())
    }

    /// Assign each object the minimum number of reference hops from any
    /// root. Objects only reachable through cycles keep depth 0.
    pub(crate) fn assign_depths(&mut self) {
        let roots: Vec<ObjectId> = self
            .objects
            .values()
            .filter(|object| object.refs == 0)
            .map(|object| object.id)
            .collect();

        let mut depths: HashMap<ObjectId, u32> = HashMap::new();
        for root in roots {
            depths.insert(root, 0);
            self.walk_depth(root, 0, &mut depths);
        }

        for (id, depth) in depths {
            if let Some(object) = self.objects.get_mut(&id) {
                object.depth = depth;
            }
        }
    }

    fn walk_depth(&self, id: ObjectId, depth: u32, depths: &mut HashMap<ObjectId, u32>) {
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        for child in &object.children {
            self.visit_depth(child, depth, depths);
        }
    }

    /// Structural composition keeps the current depth; a reference hop
    /// increments it. A target is re-entered only when its depth strictly
    /// improves, which terminates cyclic graphs.
    fn visit_depth(&self, value: &Value, depth: u32, depths: &mut HashMap<ObjectId, u32>) {
        match value {
            Value::Reference(link) => {
                let next = depth + 1;
                let improved = match depths.get(link) {
                    None => true,
                    Some(&current) => next < current,
                };
                if improved {
                    depths.insert(*link, next);
                    self.walk_depth(*link, next, depths);
                }
            },
            Value::Array(items) => {
                for item in items {
                    self.visit_depth(item, depth, depths);
                }
            },
            Value::Dictionary(pairs) => {
                for pair in pairs {
                    self.visit_depth(&pair.key, depth, depths);
                    self.visit_depth(&pair.value, depth, depths);
                }
            },
            _ => {},
        }
    }
}

fn resolve_value(
    value: &mut Value,
    known: &HashSet<ObjectId>,
    redirects: &IndexMap<ObjectId, ObjectId>,
    incoming: &mut HashMap<ObjectId, usize>,
) -> Result<()> {
    match value {
        Value::Reference(link) => {
            if !known.contains(link) {
                match redirects.get(link) {
                    Some(&target) => *link = target,
                    None => return Err(Error::UnresolvedReference(*link)),
                }
            }
            *incoming.entry(*link).or_insert(0) += 1;
        },
        Value::Array(items) => {
            for item in items {
                resolve_value(item, known, redirects, incoming)?;
            }
        },
        Value::Dictionary(pairs) => {
            for pair in pairs {
                resolve_value(&mut pair.key, known, redirects, incoming)?;
                resolve_value(&mut pair.value, known, redirects, incoming)?;
            }
        },
        _ => {},
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(bytes: &[u8]) -> Document {
        Document::from_reader(Cursor::new(bytes.to_vec()), PrintOptions::default())
            .expect("parse failed")
    }

    #[test]
    fn test_canonical_is_idempotent() {
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Count 0 >>\nendobj\n",
        );
        assert_eq!(doc.canonical(), doc.canonical());
        assert!(doc.canonical().contains("Object( num:1, gen:0, refs:0 )"));
    }

    #[test]
    fn test_deduplication_redirects_references() {
        // Objects 1 and 2 are structurally identical helpers; both are
        // referenced from object 3.
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /W 5 >>\nendobj\n2 0 obj\n<< /W 5 >>\nendobj\n3 0 obj\n<< /Kids [ 1 0 R 2 0 R ] >>\nendobj\n",
        );
        assert_eq!(doc.len(), 2);
        // The surviving helper carries both incoming references
        let keeper = &doc.objects()[&ObjectId::new(1, 0)];
        assert_eq!(keeper.refs, 2);
        assert!(!doc.objects().contains_key(&ObjectId::new(2, 0)));
        // Both references now point at the representative
        let parent = &doc.objects()[&ObjectId::new(3, 0)];
        let Value::Dictionary(pairs) = &parent.children[0] else {
            panic!("expected dictionary");
        };
        let Value::Array(kids) = &pairs[0].value else {
            panic!("expected array");
        };
        assert_eq!(kids[0], Value::Reference(ObjectId::new(1, 0)));
        assert_eq!(kids[1], Value::Reference(ObjectId::new(1, 0)));
    }

    #[test]
    fn test_distinct_objects_survive_dedup() {
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /W 5 >>\nendobj\n2 0 obj\n<< /W 6 >>\nendobj\n",
        );
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_depth_assignment() {
        // 1 -> 2 -> 3, all referenced linearly from the root object 1
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Next 2 0 R >>\nendobj\n2 0 obj\n<< /Next 3 0 R >>\nendobj\n3 0 obj\n<< /Leaf true >>\nendobj\n",
        );
        assert_eq!(doc.objects()[&ObjectId::new(1, 0)].depth, 0);
        assert_eq!(doc.objects()[&ObjectId::new(2, 0)].depth, 1);
        assert_eq!(doc.objects()[&ObjectId::new(3, 0)].depth, 2);
    }

    #[test]
    fn test_depth_takes_shortest_path() {
        // Root 1 references 3 directly and through 2; 3 keeps the direct
        // distance.
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /A 2 0 R /B 3 0 R >>\nendobj\n2 0 obj\n<< /C 3 0 R >>\nendobj\n3 0 obj\nnull\nendobj\n",
        );
        assert_eq!(doc.objects()[&ObjectId::new(3, 0)].depth, 1);
    }

    #[test]
    fn test_cyclic_references_terminate() {
        // 1 -> 2 -> 1 with an external root 3 pointing at 1
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Next 2 0 R >>\nendobj\n2 0 obj\n<< /Back 1 0 R >>\nendobj\n3 0 obj\n<< /Start 1 0 R >>\nendobj\n",
        );
        assert_eq!(doc.objects()[&ObjectId::new(3, 0)].depth, 0);
        assert_eq!(doc.objects()[&ObjectId::new(1, 0)].depth, 1);
        assert_eq!(doc.objects()[&ObjectId::new(2, 0)].depth, 2);
    }

    #[test]
    fn test_depth_monotonic_over_references() {
        let doc = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /A 2 0 R >>\nendobj\n2 0 obj\n<< /B 3 0 R /C 4 0 R >>\nendobj\n3 0 obj\n<< /D 4 0 R >>\nendobj\n4 0 obj\nnull\nendobj\n",
        );
        for object in doc.objects().values() {
            for child in &object.children {
                check_monotonic(&doc, child, object.depth);
            }
        }
    }

    fn check_monotonic(doc: &Document, value: &Value, depth: u32) {
        match value {
            Value::Reference(link) => {
                assert!(doc.objects()[link].depth <= depth + 1);
            },
            Value::Array(items) => {
                for item in items {
                    check_monotonic(doc, item, depth);
                }
            },
            Value::Dictionary(pairs) => {
                for pair in pairs {
                    check_monotonic(doc, &pair.value, depth);
                }
            },
            _ => {},
        }
    }
}
