use crate::core::docs::{DocsError, DocsService};
use serde::Serialize;
use std::sync::Arc;

pub const DEFAULT_CONTENT_LIMIT: usize = 10;
pub const MAX_CONTENT_LIMIT: usize = 50;

const MAX_SNIPPETS_PER_DOC: usize = 3;
const MAX_SNIPPET_CHARS: usize = 300;

/// A document containing the query, with the paragraphs that matched.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub file_id: String,
    pub name: String,
    pub match_count: usize,
    pub snippets: Vec<String>,
}

pub struct ContentSearchService {
    docs: Arc<DocsService>,
}

impl ContentSearchService {
    pub fn new(docs: Arc<DocsService>) -> Self {
        Self { docs }
    }

    /// Case-insensitive full-text search over document paragraphs.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Result<Vec<SearchHit>, DocsError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DocsError::InvalidInput("q must not be empty".to_string()));
        }
        let limit = limit
            .unwrap_or(DEFAULT_CONTENT_LIMIT)
            .clamp(1, MAX_CONTENT_LIMIT);
        let needle = query.to_lowercase();

        let candidates = self.docs.find_by_content(query).await?;
        tracing::debug!(query, candidates = candidates.len(), "Content search candidates");

        let mut hits = Vec::new();
        for summary in candidates {
            let doc = match self.docs.document(&summary.id).await {
                Ok(doc) => doc,
                Err(e) => {
                    tracing::warn!(file_id = %summary.id, "Skipping unreadable document: {}", e);
                    continue;
                }
            };

            let mut match_count = 0;
            let mut snippets = Vec::new();
            for paragraph in &doc.paragraphs {
                let count = paragraph.to_lowercase().matches(needle.as_str()).count();
                if count == 0 {
                    continue;
                }
                match_count += count;
                if snippets.len() < MAX_SNIPPETS_PER_DOC {
                    snippets.push(snippet(paragraph.trim(), &needle));
                }
            }

            if match_count > 0 {
                hits.push(SearchHit {
                    file_id: doc.id.clone(),
                    name: doc.name.clone(),
                    match_count,
                    snippets,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.match_count
                .cmp(&a.match_count)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        hits.truncate(limit);
        Ok(hits)
    }
}

/// The paragraph, or when it is too long, a window of it centred on the first
/// match. The result is at most `MAX_SNIPPET_CHARS` including any `…`.
fn snippet(paragraph: &str, needle: &str) -> String {
    let chars: Vec<char> = paragraph.chars().collect();
    if chars.len() <= MAX_SNIPPET_CHARS {
        return paragraph.to_string();
    }

    // Room for an ellipsis on each side.
    let width = MAX_SNIPPET_CHARS - 2;
    let lower = paragraph.to_lowercase();
    let found_at = lower
        .find(needle)
        .map(|byte| lower[..byte].chars().count())
        .unwrap_or(0);
    let lead = width.saturating_sub(needle.chars().count()) / 2;
    let start = found_at.saturating_sub(lead).min(chars.len() - width);
    let end = start + width;

    let mut out = String::new();
    if start > 0 {
        out.push('…');
    }
    out.extend(&chars[start..end]);
    if end < chars.len() {
        out.push('…');
    }
    out
}
