use crate::core::docs::DocumentText;
use crate::core::lessons::parse_lessons;

/// Soft limit for a paragraph window, in chars.
pub const WINDOW_CHARS: usize = 2000;

/// Longest text sent for embedding, in chars. Lessons above this are split.
pub const MAX_EMBED_CHARS: usize = 24_000;

/// A piece of a document that gets its own embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub file_id: String,
    pub name: String,
    pub heading: Option<String>,
    pub text: String,
}

/// Splits a document into chunks: one per lesson when the document has
/// dated lessons, otherwise windows of whole paragraphs.
pub fn chunk_document(doc: &DocumentText) -> Vec<Chunk> {
    let lessons = parse_lessons(&doc.paragraphs);
    if lessons.is_empty() {
        return windows(doc.paragraphs.iter().map(String::as_str), WINDOW_CHARS)
            .into_iter()
            .map(|text| chunk(doc, None, text))
            .collect();
    }

    let mut chunks = Vec::new();
    for lesson in lessons {
        let whole = format!("{}\n{}", lesson.heading, lesson.text);
        if whole.chars().count() <= MAX_EMBED_CHARS {
            chunks.push(chunk(doc, Some(&lesson.heading), whole));
            continue;
        }

        // Every part repeats the heading so it still ranks as that lesson.
        let budget = MAX_EMBED_CHARS
            .saturating_sub(lesson.heading.chars().count() + 1)
            .max(1);
        for part in windows(lesson.text.lines(), budget) {
            let text = format!("{}\n{}", lesson.heading, part);
            chunks.push(chunk(doc, Some(&lesson.heading), text));
        }
    }
    chunks
}

fn chunk(doc: &DocumentText, heading: Option<&str>, text: String) -> Chunk {
    Chunk {
        file_id: doc.id.clone(),
        name: doc.name.clone(),
        heading: heading.map(str::to_string),
        text,
    }
}

/// Packs non-blank paragraphs into windows of at most `limit` chars.
/// A paragraph longer than `limit` is split across windows.
fn windows<'a>(paragraphs: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut window = String::new();
    let mut window_chars = 0;

    for paragraph in paragraphs.map(str::trim).filter(|p| !p.is_empty()) {
        for piece in split_chars(paragraph, limit) {
            let piece_chars = piece.chars().count();
            if window_chars > 0 && window_chars + 1 + piece_chars > limit {
                out.push(std::mem::take(&mut window));
                window_chars = 0;
            }
            if window_chars > 0 {
                window.push('\n');
                window_chars += 1;
            }
            window.push_str(piece);
            window_chars += piece_chars;
        }
    }

    if !window.is_empty() {
        out.push(window);
    }
    out
}

fn split_chars(text: &str, limit: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some((cut, _)) = rest.char_indices().nth(limit) {
        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }
    pieces.push(rest);
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(paragraphs: Vec<String>) -> DocumentText {
        DocumentText {
            id: "d".to_string(),
            name: "Doc".to_string(),
            paragraphs,
        }
    }

    #[test]
    fn test_one_chunk_per_lesson() {
        let d = doc(vec![
            "intro".to_string(),
            "2025-05-05".to_string(),
            "scales".to_string(),
            "2025-05-12".to_string(),
            "chords".to_string(),
        ]);

        let chunks = chunk_document(&d);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].heading.as_deref(), Some("2025-05-05"));
        assert_eq!(chunks[0].text, "2025-05-05\nscales");
    }

    #[test]
    fn test_plain_document_is_windowed() {
        let para = "x".repeat(900);
        let d = doc(vec![para.clone(), String::new(), para.clone(), para.clone()]);

        let chunks = chunk_document(&d);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n{}", para, para));
        assert_eq!(chunks[1].text, para);
        assert!(chunks.iter().all(|c| c.heading.is_none()));
    }

    #[test]
    fn test_empty_document_has_no_chunks() {
        assert!(chunk_document(&doc(vec![String::new()])).is_empty());
    }

    #[test]
    fn test_long_lesson_is_split_not_truncated() {
        let mut paragraphs = vec!["2025-05-05".to_string()];
        paragraphs.extend((0..30).map(|i| format!("{:04} {}", i, "n".repeat(995))));
        let d = doc(paragraphs);

        let chunks = chunk_document(&d);
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert_eq!(chunk.heading.as_deref(), Some("2025-05-05"));
            assert!(chunk.text.starts_with("2025-05-05\n"));
            assert!(chunk.text.chars().count() <= MAX_EMBED_CHARS);
        }
        assert!(chunks[1].text.contains("0029 "));
    }

    #[test]
    fn test_oversized_paragraph_is_split() {
        let d = doc(vec!["y".repeat(WINDOW_CHARS * 2 + 100)]);
        let chunks = chunk_document(&d);
        let lengths: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        assert_eq!(lengths, vec![WINDOW_CHARS, WINDOW_CHARS, 100]);
    }
}
