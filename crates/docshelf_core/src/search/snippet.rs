//! Highlighted excerpt extraction for article search hits.
//!
//! # Responsibility
//! - Turn markup-bearing article content into a bounded plain-text excerpt
//!   around the first query match, with every match wrapped in caller-chosen
//!   emphasis markers.
//!
//! # Invariants
//! - Pure: no I/O, no logging.
//! - Without a literal match the excerpt is a plain-text preview, never `None`.
//! - `None` only when the literal match exists but no word contains the
//!   first query word (markup stripping can move word boundaries), or when
//!   the query has no words at all.

use once_cell::sync::Lazy;
use regex::{Captures, Regex, RegexBuilder};
use serde::Deserialize;

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<.*?>").expect("valid markup tag regex"));

const ELLIPSIS: &str = "...";

/// Excerpt shaping options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnippetOptions {
    /// Words kept on each side of the matched phrase.
    pub words_around: usize,
    /// Preview length in characters when the query does not occur literally.
    pub preview_chars: usize,
    pub highlight_open: String,
    pub highlight_close: String,
}

impl Default for SnippetOptions {
    fn default() -> Self {
        Self {
            words_around: 5,
            preview_chars: 150,
            highlight_open: "<strong>".to_string(),
            highlight_close: "</strong>".to_string(),
        }
    }
}

impl SnippetOptions {
    pub fn with_words_around(mut self, words_around: usize) -> Self {
        self.words_around = words_around;
        self
    }
}

/// Replaces every markup tag with a space, decodes entities and trims.
pub fn strip_markup(content: &str) -> String {
    let without_tags = MARKUP_TAG_RE.replace_all(content, " ");
    html_escape::decode_html_entities(&without_tags)
        .trim()
        .to_string()
}

/// Extracts a highlighted excerpt of `content` around `query`.
///
/// See module invariants for when `None` is returned.
pub fn extract_snippet(content: &str, query: &str, options: &SnippetOptions) -> Option<String> {
    let plain_text = strip_markup(content);
    let Ok(matcher) = literal_matcher(query) else {
        return Some(preview(&plain_text, options.preview_chars));
    };

    if !matcher.is_match(&plain_text) {
        return Some(preview(&plain_text, options.preview_chars));
    }

    let words: Vec<&str> = plain_text.split_whitespace().collect();
    let query_words: Vec<&str> = query.split_whitespace().collect();
    let first_query_word = query_words.first()?;
    let match_index = first_word_index(&words, first_query_word)?;

    let (start, end) = window_bounds(
        match_index,
        query_words.len(),
        options.words_around,
        words.len(),
    );
    let excerpt = words[start..=end].join(" ");

    let highlighted = matcher.replace_all(&excerpt, |caps: &Captures<'_>| {
        format!(
            "{}{}{}",
            options.highlight_open, &caps[0], options.highlight_close
        )
    });

    Some(format!("{ELLIPSIS}{highlighted}{ELLIPSIS}"))
}

fn literal_matcher(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
}

fn preview(plain_text: &str, max_chars: usize) -> String {
    if plain_text.chars().count() > max_chars {
        let mut truncated: String = plain_text.chars().take(max_chars).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        plain_text.to_string()
    }
}

fn first_word_index(words: &[&str], query_word: &str) -> Option<usize> {
    let needle = query_word.to_lowercase();
    words
        .iter()
        .position(|word| word.to_lowercase().contains(&needle))
}

/// Inclusive `[start, end]` word range, clamped to `word_count`.
///
/// Callers guarantee `match_index < word_count` and `query_word_count >= 1`.
fn window_bounds(
    match_index: usize,
    query_word_count: usize,
    words_around: usize,
    word_count: usize,
) -> (usize, usize) {
    let start = match_index.saturating_sub(words_around);
    let end = (match_index + query_word_count - 1 + words_around).min(word_count - 1);
    (start, end)
}
