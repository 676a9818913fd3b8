//! Line-level diff of two records for review output.
//!
//! Both records are pretty-printed as JSON and compared with the `similar`
//! crate (Myers diff algorithm), producing hunks with context lines.

use std::fmt;

use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::error::{DiffError, DiffResult};

const CONTEXT_LINES: usize = 3;

/// The result of rendering two records line by line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the rendered old record.
    pub old_lines: usize,
    /// Total number of lines in the rendered new record.
    pub new_lines: usize,
}

impl RecordDiff {
    /// Returns `true` if the two records render identically.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Total number of lines added across all hunks.
    pub fn additions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    /// Total number of lines removed across all hunks.
    pub fn deletions(&self) -> usize {
        self.hunks
            .iter()
            .flat_map(|h| &h.lines)
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }
}

impl fmt::Display for RecordDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hunk in &self.hunks {
            writeln!(f, "{}", hunk.header())?;
            for line in &hunk.lines {
                writeln!(f, "{line}")?;
            }
        }
        Ok(())
    }
}

/// A contiguous region of changes in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the old rendering where this hunk starts (1-based).
    pub old_start: usize,
    /// Number of lines from the old rendering in this hunk.
    pub old_count: usize,
    /// Line number in the new rendering where this hunk starts (1-based).
    pub new_start: usize,
    /// Number of lines from the new rendering in this hunk.
    pub new_count: usize,
    /// The individual diff lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// Unified-diff style `@@ -a,b +c,d @@` header.
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_count, self.new_start, self.new_count
        )
    }
}

/// A single line in a diff hunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    /// A line present in both renderings (context).
    Context(String),
    /// A line added in the new rendering.
    Added(String),
    /// A line removed from the old rendering.
    Removed(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(text) => write!(f, " {text}"),
            Self::Added(text) => write!(f, "+{text}"),
            Self::Removed(text) => write!(f, "-{text}"),
        }
    }
}

/// Compute a line-by-line diff between the pretty-printed forms of two records.
pub fn render_record_diff(old: &Value, new: &Value) -> DiffResult<RecordDiff> {
    let old_str = pretty(old)?;
    let new_str = pretty(new)?;
    let old_lines = old_str.lines().count();
    let new_lines = new_str.lines().count();

    if old_str == new_str {
        return Ok(RecordDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        });
    }

    let text_diff = TextDiff::from_lines(&old_str, &new_str);
    let mut hunks = Vec::new();

    for group in text_diff.grouped_ops(CONTEXT_LINES) {
        let Some(first) = group.first() else {
            continue;
        };
        let mut hunk = DiffHunk {
            old_start: first.old_range().start + 1,
            old_count: 0,
            new_start: first.new_range().start + 1,
            new_count: 0,
            lines: Vec::new(),
        };

        for op in &group {
            for change in text_diff.iter_changes(op) {
                let text = change.value().trim_end_matches('\n').to_string();
                match change.tag() {
                    ChangeTag::Equal => {
                        hunk.lines.push(DiffLine::Context(text));
                        hunk.old_count += 1;
                        hunk.new_count += 1;
                    }
                    ChangeTag::Delete => {
                        hunk.lines.push(DiffLine::Removed(text));
                        hunk.old_count += 1;
                    }
                    ChangeTag::Insert => {
                        hunk.lines.push(DiffLine::Added(text));
                        hunk.new_count += 1;
                    }
                }
            }
        }
        hunks.push(hunk);
    }

    Ok(RecordDiff {
        hunks,
        old_lines,
        new_lines,
    })
}

fn pretty(record: &Value) -> DiffResult<String> {
    let mut text =
        serde_json::to_string_pretty(record).map_err(|e| DiffError::Serialization(e.to_string()))?;
    text.push('\n');
    Ok(text)
}
