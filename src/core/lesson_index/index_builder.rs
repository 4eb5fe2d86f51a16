// Turns parsed lessons into index entries: a one-line summary plus a few
// keywords per lesson. Both are plain text heuristics, no model calls.

use super::index_models::{IndexEntry, LessonIndex};
use crate::core::docs::DocumentText;
use crate::core::lessons::Lesson;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Longest summary kept, in chars (excluding the ellipsis).
pub const MAX_SUMMARY_CHARS: usize = 200;

/// Keywords kept per lesson.
pub const MAX_KEYWORDS: usize = 8;

const MIN_KEYWORD_CHARS: usize = 4;

// Contraction stems ("didn't" splits into "didn" and "t") are listed too.
const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "aren", "been", "before", "being", "both", "came", "could",
    "couldn", "didn", "does", "doesn", "doing", "done", "down", "each", "from", "going", "good",
    "hadn", "hasn", "have", "haven", "here", "into", "just", "last", "lesson", "like", "made",
    "make", "more", "most", "much", "need", "next", "only", "other", "over", "really", "same",
    "should", "shouldn", "some", "still", "such", "than", "that", "their", "them", "then", "there",
    "these", "they", "this", "those", "time", "today", "very", "want", "wasn", "week", "well",
    "went", "were", "weren", "what", "when", "where", "which", "while", "will", "with", "won",
    "work", "worked", "would", "wouldn", "your",
];

/// Builds the index for one student's document, entries in date order.
pub fn build_index(
    student: &str,
    doc: &DocumentText,
    lessons: &[Lesson],
    generated_at: DateTime<Utc>,
) -> LessonIndex {
    let mut ordered: Vec<&Lesson> = lessons.iter().collect();
    ordered.sort_by_key(|l| l.date);

    let entries = ordered
        .into_iter()
        .map(|lesson| IndexEntry {
            date: lesson.date,
            heading: lesson.heading.clone(),
            summary: summarize(&lesson.heading, &lesson.text),
            keywords: extract_keywords(&lesson.text, MAX_KEYWORDS),
        })
        .collect();

    LessonIndex {
        student: student.to_string(),
        doc_id: doc.id.clone(),
        doc_name: doc.name.clone(),
        generated_at,
        entries,
    }
}

/// First sentence of the body, or the heading when the body is empty.
pub fn summarize(heading: &str, text: &str) -> String {
    let body = text.trim();
    if body.is_empty() {
        return heading.trim().to_string();
    }

    let first_line = body.lines().find(|l| !l.trim().is_empty()).unwrap_or(body);
    truncate_chars(first_sentence(first_line).trim(), MAX_SUMMARY_CHARS)
}

/// Up to the first `.`, `!` or `?` that is followed by whitespace or the end
/// of the line. A `.` after a one or two letter word ("Op. 28", "no. 4") only
/// ends the sentence when a capital letter follows.
fn first_sentence(line: &str) -> &str {
    let mut chars = line.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let rest = &line[end..];
        if rest.chars().next().map_or(false, |next| !next.is_whitespace()) {
            continue;
        }
        if c == '.' && after_short_word(&line[..i]) {
            let next_word = rest.trim_start().chars().next();
            if next_word.map_or(false, |n| !n.is_uppercase()) {
                continue;
            }
        }
        return &line[..end];
    }
    line
}

fn after_short_word(before: &str) -> bool {
    let word = before
        .rsplit(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or("");
    (1..=2).contains(&word.chars().count())
}

/// The most frequent meaningful words, most frequent first, ties alphabetical.
pub fn extract_keywords(text: &str, max: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    // Apostrophes split too, so contractions fall below the length cut.
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        let word = word.to_lowercase();
        if word.chars().count() < MIN_KEYWORD_CHARS
            || word.chars().all(|c| c.is_ascii_digit())
            || STOPWORDS.contains(&word.as_str())
        {
            continue;
        }
        *counts.entry(word).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(max).map(|(word, _)| word).collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
