//! Manual transcripts: one text file holding every page of a volume.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// How pages are delimited in a transcript file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranscriptFormat {
    /// Pages separated by an empty line.
    #[default]
    BlankLine,
    /// Pages introduced by a `[...]` marker line; text before the first
    /// marker is ignored.
    Bracketed,
}

/// What to do when a page has a different number of texts than lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextPolicy {
    /// Write only as many lines as there are texts (and vice versa).
    #[default]
    Truncate,
    /// Keep every line, giving missing texts an empty string.
    Pad,
}

fn page_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| Regex::new(r"\[.+\]").expect("valid page marker pattern"))
}

pub fn split_pages(text: &str, format: TranscriptFormat) -> Vec<String> {
    match format {
        TranscriptFormat::BlankLine => text.split("\n\n").map(str::to_string).collect(),
        TranscriptFormat::Bracketed => page_marker()
            .split(text)
            .skip(1)
            .map(str::to_string)
            .collect(),
    }
}

/// Non-empty lines of one transcript page.
pub fn page_lines(page: &str) -> Vec<String> {
    page.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pairs `line_count` lines with `texts` according to `policy`.
pub fn align_texts(line_count: usize, mut texts: Vec<String>, policy: TextPolicy) -> Vec<String> {
    match policy {
        TextPolicy::Truncate => texts.truncate(line_count),
        TextPolicy::Pad => texts.resize(line_count, String::new()),
    }
    texts
}
