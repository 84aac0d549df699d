//! Recursive structural similarity between parsed values.
//!
//! A score of 1.0 means two values are structurally identical under the
//! selected [`MatchOptions`]; 0.0 means they share nothing, starting with
//! their variant. Composite variants score as the normalized sum of their
//! children's best matches, so partial overlap degrades smoothly instead of
//! collapsing to zero.
//!
//! The matcher is pure: it never mutates its inputs and carries no state
//! between calls.

use crate::object::{IndirectObject, KeyValuePair, Value};
use crate::options::{MatchOptions, PrintOptions};

/// Score two indirect objects in `[0.0, 1.0]`.
///
/// Children of the first object each claim their best-scoring counterpart in
/// the second (shared counterparts allowed); the sum is normalized by the
/// larger child count. Two gates apply before that: under `match_depth`
/// differing reference depths score 0, and a stream child on exactly one
/// side scores 0 outright.
pub fn match_objects(
    first: &IndirectObject,
    second: &IndirectObject,
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    let score = match_objects_inner(first, second, opts, print);
    assert!(
        (0.0..=1.0).contains(&score),
        "object match score out of range: {}",
        score
    );
    score
}

/// Score two values in `[0.0, 1.0]`. Different variants score 0.
pub fn match_values(
    first: &Value,
    second: &Value,
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    let score = match_values_inner(first, second, opts, print);
    assert!(
        (0.0..=1.0).contains(&score),
        "value match score out of range: {}",
        score
    );
    score
}

fn match_objects_inner(
    first: &IndirectObject,
    second: &IndirectObject,
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    if opts.match_depth && first.depth != second.depth {
        return 0.0;
    }
    if first.children.is_empty() && second.children.is_empty() {
        return 1.0;
    }
    if has_stream(&first.children) != has_stream(&second.children) {
        return 0.0;
    }

    let mut acc = 0.0;
    for c1 in &first.children {
        let mut best = 0.0;
        for c2 in &second.children {
            let score = match_values_inner(c1, c2, opts, print);
            if score > best {
                best = score;
            }
            if score == 1.0 {
                break;
            }
        }
        acc += best;
    }
    acc / first.children.len().max(second.children.len()) as f64
}

fn match_values_inner(
    first: &Value,
    second: &Value,
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    match (first, second) {
        (Value::Null, Value::Null) => 1.0,
        (Value::Boolean(a), Value::Boolean(b)) => {
            // The variant already matched, so a flipped flag is closer than
            // a different type
            if a == b {
                1.0
            } else {
                0.5
            }
        },
        (Value::Number(a), Value::Number(b)) => match_numbers(*a, *b),
        (Value::String(a), Value::String(b)) => {
            if a == b {
                1.0
            } else {
                0.0
            }
        },
        (Value::HexString(_), Value::HexString(_)) => 1.0,
        (Value::Name(a), Value::Name(b)) => {
            if a == b {
                1.0
            } else {
                0.0
            }
        },
        (Value::Stream(a), Value::Stream(b)) => {
            if opts.match_stream && a.len() != b.len() {
                0.0
            } else {
                1.0
            }
        },
        (Value::Reference(a), Value::Reference(b)) => {
            if !opts.match_references {
                1.0
            } else if a == b {
                1.0
            } else {
                0.5
            }
        },
        (Value::Array(a), Value::Array(b)) => match_arrays(a, b, opts, print),
        (Value::Dictionary(a), Value::Dictionary(b)) => match_dictionaries(a, b, opts, print),
        _ => 0.0,
    }
}

/// Equal numbers score 1; zero against nonzero and opposite signs score 0;
/// otherwise the magnitude ratio in `(0, 1)`.
fn match_numbers(a: f64, b: f64) -> f64 {
    if a == b {
        return 1.0;
    }
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    if a.is_sign_positive() != b.is_sign_positive() {
        return 0.0;
    }
    let abs_a = a.abs();
    let abs_b = b.abs();
    abs_a.min(abs_b) / abs_a.max(abs_b)
}

/// Arrays compare with a forward-only cursor: each left element searches for
/// its best match at or beyond the cursor, and a match moves the cursor past
/// it. The cursor never resets, so reordered elements stop matching once
/// passed over.
fn match_arrays(first: &[Value], second: &[Value], opts: &MatchOptions, print: &PrintOptions) -> f64 {
    if first.is_empty() && second.is_empty() {
        return 1.0;
    }
    let mut cursor = 0;
    let mut acc = 0.0;
    for c1 in first {
        let mut best = 0.0;
        let mut best_index = None;
        for (index, c2) in second.iter().enumerate().skip(cursor) {
            let score = match_values_inner(c1, c2, opts, print);
            if score > best {
                best = score;
                best_index = Some(index);
            }
            if score == 1.0 {
                break;
            }
        }
        if let Some(index) = best_index {
            cursor = index + 1;
        }
        acc += best;
    }
    acc / first.len().max(second.len()) as f64
}

/// Dictionary entries only match under equal normalized keys. Each left
/// entry claims its best-scoring unclaimed right entry; printable scalar
/// values with equal printed forms short-circuit to 1.
fn match_dictionaries(
    first: &[KeyValuePair],
    second: &[KeyValuePair],
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    if first.is_empty() && second.is_empty() {
        return 1.0;
    }
    let mut claimed = vec![false; second.len()];
    let mut acc = 0.0;
    for p1 in first {
        let key = p1.key_string(print);
        let mut best = 0.0;
        let mut best_index = None;
        for (index, p2) in second.iter().enumerate() {
            if claimed[index] {
                continue;
            }
            if key != p2.key_string(print) {
                continue;
            }
            let score = match_pair_values(p1, p2, opts, print);
            if score > best {
                best = score;
                best_index = Some(index);
            }
            if score == 1.0 {
                break;
            }
        }
        if let Some(index) = best_index {
            claimed[index] = true;
            acc += best;
        }
    }
    acc / first.len().max(second.len()) as f64
}

fn match_pair_values(
    p1: &KeyValuePair,
    p2: &KeyValuePair,
    opts: &MatchOptions,
    print: &PrintOptions,
) -> f64 {
    if printable_scalar(&p1.value)
        && printable_scalar(&p2.value)
        && p1.value_string(print, 0) == p2.value_string(print, 0)
    {
        return 1.0;
    }
    match_values_inner(&p1.value, &p2.value, opts, print)
}

fn printable_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Name(_))
}

fn has_stream(children: &[Value]) -> bool {
    children.iter().any(|child| matches!(child, Value::Stream(_)))
}
