//! Pairing of top-level objects between two documents and canonical output.
//!
//! Pairing runs in three phases:
//!
//! 1. **Exact** — first pair scoring exactly 1 under default options locks.
//! 2. **Close** — iterated best-mutual-match with `match_depth` enabled.
//! 3. **Distant** — the same iteration with `match_depth` off, catching
//!    objects whose minimal depth differs between the documents.
//!
//! A single greedy pass would bias pairings by left iteration order. The
//! mutual-best rounds only commit a pair when each side is the other's best
//! unresolved candidate, and iterating lets early pairs unblock weaker
//! candidates they were shadowing.
//!
//! The output interleaves paired objects in commit order on both sides, so a
//! line diff of the two strings only surfaces semantic differences.

use crate::diff::render_diff;
use crate::document::Document;
use crate::error::Result;
use crate::matcher::match_objects;
use crate::object::ObjectId;
use crate::options::{MatchOptions, PrintOptions};
use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};

/// Candidates scoring below this are never paired.
const MATCH_THRESHOLD: f64 = 0.1;

/// Safety cap on mutual-best rounds; each round either commits a pair or
/// terminates the loop, so reaching this is a bug.
const MAX_PAIRING_ROUNDS: usize = 100;

/// Result of comparing two documents.
pub struct Comparison {
    /// Path of the left input
    pub left_path: PathBuf,
    /// Path of the right input
    pub right_path: PathBuf,
    /// Canonical output of the left document, pairing-ordered
    pub left_output: String,
    /// Canonical output of the right document, pairing-ordered
    pub right_output: String,
    /// Pairing statistics
    pub stats: CompareStats,
}

impl Comparison {
    /// Render the line-oriented diff of the two canonical outputs.
    pub fn diff(&self) -> String {
        render_diff(&self.left_output, &self.right_output)
    }
}

/// Counters collected while pairing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompareStats {
    /// Objects in the left document after deduplication
    pub left_objects: usize,
    /// Objects in the right document after deduplication
    pub right_objects: usize,
    /// Pairs locked in the exact phase
    pub exact_matches: usize,
    /// Pairs committed in the depth-aware phase
    pub close_matches: usize,
    /// Pairs committed in the depth-blind phase
    pub distant_matches: usize,
    /// Left objects left unpaired
    pub left_unmatched: usize,
    /// Right objects left unpaired
    pub right_unmatched: usize,
}

impl CompareStats {
    /// Fraction of pairable objects that were paired, normalized for the
    /// size difference between the documents.
    pub fn match_rate(&self) -> f64 {
        let n1 = self.left_objects.min(self.right_objects) as f64;
        let n2 = self.left_objects.max(self.right_objects) as f64;
        if n1 == 0.0 {
            return 1.0;
        }
        let unmatched = self.left_unmatched.max(self.right_unmatched) as f64;
        1.0 - (unmatched - (n2 - n1)) / n1
    }
}

/// Parse both files under comparison normalization and pair their objects.
///
/// With `verbose` set, progress lines (object counts, per-phase match
/// counts, overall match rate) are printed to stdout.
pub fn compare(
    left_path: impl AsRef<Path>,
    right_path: impl AsRef<Path>,
    verbose: bool,
) -> Result<Comparison> {
    let options = PrintOptions::comparison();
    let left = Document::open(left_path.as_ref(), options)?;
    let right = Document::open(right_path.as_ref(), options)?;

    let (left_output, right_output, stats) = compare_documents(&left, &right, verbose);

    Ok(Comparison {
        left_path: left_path.as_ref().to_path_buf(),
        right_path: right_path.as_ref().to_path_buf(),
        left_output,
        right_output,
        stats,
    })
}

/// Pair two parsed documents and emit the ordered canonical outputs.
pub fn compare_documents(
    left: &Document,
    right: &Document,
    verbose: bool,
) -> (String, String, CompareStats) {
    let mut stats = CompareStats {
        left_objects: left.len(),
        right_objects: right.len(),
        ..CompareStats::default()
    };

    if verbose {
        println!("comparing {} with {} objects", left.len(), right.len());
    }

    let mut pairs: IndexMap<ObjectId, (ObjectId, f64)> = IndexMap::new();
    let mut left_resolved: IndexSet<ObjectId> = IndexSet::new();
    let mut right_resolved: IndexSet<ObjectId> = IndexSet::new();

    // Phase 1: lock perfect matches
    let exact_opts = MatchOptions::default();
    for (k1, o1) in left.objects() {
        for (k2, o2) in right.objects() {
            if right_resolved.contains(k2) {
                continue;
            }
            let score = match_objects(o1, o2, &exact_opts, left.options());
            if score == 1.0 {
                left_resolved.insert(*k1);
                right_resolved.insert(*k2);
                pairs.insert(*k1, (*k2, score));
                stats.exact_matches += 1;
                break;
            }
        }
    }
    if stats.exact_matches > 0 && verbose {
        println!("exact matches:\t{}", stats.exact_matches);
    }

    // Phase 2: depth-aware approximate matching
    let mut opts = MatchOptions {
        match_depth: true,
        ..MatchOptions::default()
    };
    stats.close_matches = approx_match(
        left,
        right,
        &mut left_resolved,
        &mut right_resolved,
        &mut pairs,
        &opts,
    );
    if stats.close_matches > 0 && verbose {
        println!("close matches:\t{}", stats.close_matches);
    }

    // Phase 3: catch objects whose minimal depth differs between documents
    opts.match_depth = false;
    stats.distant_matches = approx_match(
        left,
        right,
        &mut left_resolved,
        &mut right_resolved,
        &mut pairs,
        &opts,
    );
    if stats.distant_matches > 0 && verbose {
        println!("distant matches:\t{}", stats.distant_matches);
    }

    let mut left_buffer = String::new();
    let mut right_buffer = String::new();

    for (index, (k1, (k2, score))) in pairs.iter().enumerate() {
        let percent = (score * 100.0).round() as i64;
        let header = format!("# Object ({}) ({}%)\n", index, percent);
        left_buffer.push_str(&header);
        right_buffer.push_str(&header);
        left_buffer.push_str(&left.objects()[k1].canonical(left.options()));
        right_buffer.push_str(&right.objects()[k2].canonical(right.options()));
    }

    for (k, object) in left.objects() {
        if !left_resolved.contains(k) {
            left_buffer.push_str("# Object Unmatched\n");
            left_buffer.push_str(&object.canonical(left.options()));
            stats.left_unmatched += 1;
        }
    }
    for (k, object) in right.objects() {
        if !right_resolved.contains(k) {
            right_buffer.push_str("# Object Unmatched\n");
            right_buffer.push_str(&object.canonical(right.options()));
            stats.right_unmatched += 1;
        }
    }

    if verbose {
        println!("match rate:\t{}%", (stats.match_rate() * 100.0).round() as i64);
    }

    (left_buffer, right_buffer, stats)
}

/// One pairing phase: iterate mutual-best rounds until a round commits
/// nothing or everything is resolved.
fn approx_match(
    left: &Document,
    right: &Document,
    left_resolved: &mut IndexSet<ObjectId>,
    right_resolved: &mut IndexSet<ObjectId>,
    pairs: &mut IndexMap<ObjectId, (ObjectId, f64)>,
    opts: &MatchOptions,
) -> usize {
    let mut iteration = 0;
    let mut matched = 0;

    while left_resolved.len() != left.len() || right_resolved.len() != right.len() {
        let mut left_best: IndexMap<ObjectId, f64> = IndexMap::new();
        let mut right_best: IndexMap<ObjectId, f64> = IndexMap::new();
        let mut local_matches: Vec<(ObjectId, ObjectId)> = Vec::new();

        for (k1, o1) in left.objects() {
            if left_resolved.contains(k1) {
                continue;
            }

            let mut best_score = 0.0;
            let mut best_key: Option<ObjectId> = None;
            for (k2, o2) in right.objects() {
                if right_resolved.contains(k2) {
                    continue;
                }
                let score = match_objects(o1, o2, opts, left.options());
                if score < MATCH_THRESHOLD {
                    continue;
                }
                if score > best_score {
                    best_score = score;
                    best_key = Some(*k2);
                }
            }

            if let Some(best_key) = best_key {
                let left_seen = left_best.get(k1).copied().unwrap_or(0.0);
                let right_seen = right_best.get(&best_key).copied().unwrap_or(0.0);
                // First-observed pair wins on score ties
                if left_seen < best_score && right_seen < best_score {
                    local_matches.push((*k1, best_key));
                }
                left_best.insert(*k1, left_seen.max(best_score));
                right_best.insert(best_key, right_seen.max(best_score));
            }
        }

        if local_matches.is_empty() {
            break;
        }

        for (k1, k2) in local_matches {
            if left_best.get(&k1) == right_best.get(&k2) {
                let score = left_best[&k1];
                pairs.insert(k1, (k2, score));
                left_resolved.insert(k1);
                right_resolved.insert(k2);
                matched += 1;
            }
        }

        iteration += 1;
        assert!(
            iteration <= MAX_PAIRING_ROUNDS,
            "pairing failed to converge after {} rounds",
            MAX_PAIRING_ROUNDS
        );
    }

    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(bytes: &[u8]) -> Document {
        Document::from_reader(Cursor::new(bytes.to_vec()), PrintOptions::comparison())
            .expect("parse failed")
    }

    const SIMPLE: &[u8] = b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Count 1 >>\nendobj\n";

    #[test]
    fn test_identical_documents_pair_exactly() {
        let left = parse(SIMPLE);
        let right = parse(SIMPLE);
        let (left_out, right_out, stats) = compare_documents(&left, &right, false);
        assert_eq!(stats.exact_matches, 2);
        assert_eq!(stats.left_unmatched, 0);
        assert_eq!(stats.right_unmatched, 0);
        assert_eq!(stats.match_rate(), 1.0);
        assert_eq!(left_out, right_out);
    }

    #[test]
    fn test_extra_right_object_is_unmatched() {
        let left = parse(SIMPLE);
        let right = parse(
            b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n2 0 obj\n<< /Type /Pages /Count 1 >>\nendobj\n9 0 obj\n<< /Filter /Weird /X [ 1 2 3 ] >>\nendobj\n",
        );
        let (left_out, right_out, stats) = compare_documents(&left, &right, false);
        assert_eq!(stats.exact_matches, 2);
        assert_eq!(stats.left_unmatched, 0);
        assert_eq!(stats.right_unmatched, 1);
        assert_eq!(stats.match_rate(), 1.0);
        assert!(!left_out.contains("# Object Unmatched"));
        assert_eq!(right_out.matches("# Object Unmatched").count(), 1);
    }

    #[test]
    fn test_close_match_on_small_edit() {
        let left = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Type /Page /Rotate 0 /Count 3 >>\nendobj\n");
        let right = parse(b"%PDF-1.4\n%\xe2\n1 0 obj\n<< /Type /Page /Rotate 0 /Count 4 >>\nendobj\n");
        let (_, _, stats) = compare_documents(&left, &right, false);
        assert_eq!(stats.exact_matches, 0);
        assert_eq!(stats.close_matches, 1);
        assert_eq!(stats.left_unmatched, 0);
    }

    #[test]
    fn test_pair_headers_are_aligned() {
        let left = parse(SIMPLE);
        let right = parse(SIMPLE);
        let (left_out, right_out, _) = compare_documents(&left, &right, false);
        assert!(left_out.starts_with("# Object (0) (100%)\n"));
        assert!(right_out.starts_with("# Object (0) (100%)\n"));
        assert!(left_out.contains("# Object (1) (100%)\n"));
    }

    #[test]
    fn test_match_rate_normalizes_size_difference() {
        let stats = CompareStats {
            left_objects: 4,
            right_objects: 5,
            left_unmatched: 0,
            right_unmatched: 1,
            ..CompareStats::default()
        };
        assert_eq!(stats.match_rate(), 1.0);
    }
}
