//! Line-oriented rendering of the difference between two canonical dumps.
//!
//! The character-level diff of the two strings is re-chunked into whole
//! lines: unchanged lines are prefixed `= `, lines with inserted content
//! emit their right-side form prefixed `+ `, and lines with deleted content
//! emit their left-side form prefixed `- `. A line touched on both sides
//! emits its `+` form first, then its `-` form.

use dissimilar::Chunk;

/// Accumulates per-line state while walking the character diff.
#[derive(Default)]
struct LineDiffer {
    buffer: String,
    current_line: String,
    current_remove_line: String,
    current_add_line: String,
    line_has_remove: bool,
    line_has_add: bool,
}

impl LineDiffer {
    fn emit(&mut self) {
        if !self.line_has_add && !self.line_has_remove {
            self.buffer.push_str("= ");
            self.buffer.push_str(&self.current_line);
            self.buffer.push('\n');
        }
        if self.line_has_add {
            for part in self.current_add_line.split('\n') {
                self.buffer.push_str("+ ");
                self.buffer.push_str(part);
                self.buffer.push('\n');
            }
        }
        if self.line_has_remove {
            for part in self.current_remove_line.split('\n') {
                self.buffer.push_str("- ");
                self.buffer.push_str(part);
                self.buffer.push('\n');
            }
        }
    }

    fn push(&mut self, chunk: &Chunk) {
        match chunk {
            Chunk::Equal(text) => {
                for c in text.chars() {
                    if c == '\n' {
                        self.emit();
                        self.line_has_remove = false;
                        self.line_has_add = false;
                        self.current_remove_line.clear();
                        self.current_add_line.clear();
                        self.current_line.clear();
                    } else {
                        self.current_remove_line.push(c);
                        self.current_add_line.push(c);
                        self.current_line.push(c);
                    }
                }
            },
            Chunk::Delete(text) => {
                self.line_has_remove = true;
                self.current_remove_line.push_str(text);
            },
            Chunk::Insert(text) => {
                self.line_has_add = true;
                self.current_add_line.push_str(text);
            },
        }
    }
}

/// Render the `=`/`+`/`-` prefixed line diff of two strings.
pub fn render_diff(left: &str, right: &str) -> String {
    let mut differ = LineDiffer::default();
    for chunk in dissimilar::diff(left, right) {
        differ.push(&chunk);
    }
    differ.emit();
    differ.buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_inputs_are_all_context() {
        let text = "alpha\nbeta\ngamma\n";
        let diff = render_diff(text, text);
        for line in diff.lines() {
            assert!(line.starts_with("= "), "unexpected line: {line:?}");
        }
        assert!(diff.contains("= alpha\n"));
        assert!(diff.contains("= beta\n"));
    }

    #[test]
    fn test_changed_line_emits_both_sides() {
        let left = "alpha\nbeta\ngamma\n";
        let right = "alpha\ndelta\ngamma\n";
        let diff = render_diff(left, right);
        assert!(diff.contains("= alpha\n"));
        assert!(diff.contains("= gamma\n"));
        // The changed line shows up on both sides, insert before delete
        let plus = diff.find("+ ").expect("no insert line");
        let minus = diff.find("- ").expect("no delete line");
        assert!(plus < minus);
        assert!(!diff.contains("= beta"));
        assert!(!diff.contains("= delta"));
    }

    #[test]
    fn test_pure_insertion() {
        let left = "alpha\ngamma\n";
        let right = "alpha\nbeta\ngamma\n";
        let diff = render_diff(left, right);
        assert!(diff.lines().any(|line| line.starts_with("+ ")));
        assert!(diff.contains("= alpha\n"));
    }

    #[test]
    fn test_empty_inputs() {
        let diff = render_diff("", "");
        assert_eq!(diff, "= \n");
    }
}
