use super::lesson_parser::{parse_lessons, Lesson};
use crate::core::docs::{DocsError, DocumentText};
use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use std::borrow::Borrow;

/// Largest `n` accepted by a "last N lessons" query.
pub const MAX_LAST_LESSONS: usize = 50;

/// The lessons selected from one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocLessons {
    pub file_id: String,
    pub name: String,
    pub lessons: Vec<Lesson>,
}

/// Which documents a lesson query looks at.
///
/// Documents are named after the student and their lesson day
/// ("Charlotte - Monday"), so both filters match against the document name.
#[derive(Debug, Clone, Default)]
pub struct LessonFilter {
    weekday: Option<Weekday>,
    student: Option<String>,
}

impl LessonFilter {
    pub fn new(weekday: Option<&str>, student: Option<&str>) -> Result<Self, DocsError> {
        let weekday = match weekday.map(str::trim).filter(|w| !w.is_empty()) {
            Some(w) => Some(
                w.parse::<Weekday>()
                    .map_err(|_| DocsError::InvalidInput(format!("Unknown weekday: {}", w)))?,
            ),
            None => None,
        };

        let student = student
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        Ok(Self { weekday, student })
    }

    pub fn matches(&self, doc_name: &str) -> bool {
        let name = doc_name.to_lowercase();

        if let Some(student) = &self.student {
            if !name.contains(student.as_str()) {
                return false;
            }
        }

        match self.weekday {
            Some(day) => name_mentions_weekday(&name, day),
            None => true,
        }
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// True when a (lowercased) name contains the full weekday name or its
/// three-letter form as a separate word.
fn name_mentions_weekday(name: &str, day: Weekday) -> bool {
    let full = weekday_name(day);
    if name.contains(full) {
        return true;
    }

    let short = &full[..3];
    name.split(|c: char| !c.is_alphanumeric())
        .any(|word| word == short)
}

pub fn check_last_n(n: usize) -> Result<(), DocsError> {
    if n == 0 || n > MAX_LAST_LESSONS {
        return Err(DocsError::InvalidInput(format!(
            "n must be between 1 and {}",
            MAX_LAST_LESSONS
        )));
    }
    Ok(())
}

/// The `n` most recent lessons of each document, newest first.
///
/// Documents without lessons are still listed so the caller can see they
/// were looked at.
pub fn last_lessons(
    docs: &[impl Borrow<DocumentText>],
    n: usize,
) -> Result<Vec<DocLessons>, DocsError> {
    check_last_n(n)?;

    Ok(docs
        .iter()
        .map(|doc| {
            let doc: &DocumentText = doc.borrow();
            let mut lessons = parse_lessons(&doc.paragraphs);
            // Stable sort keeps document order for lessons sharing a date.
            lessons.sort_by(|a, b| b.date.cmp(&a.date));
            lessons.truncate(n);
            DocLessons {
                file_id: doc.id.clone(),
                name: doc.name.clone(),
                lessons,
            }
        })
        .collect())
}

/// Lessons dated within `start..=end`, oldest first. Documents with no
/// lesson in range are left out.
pub fn lessons_in_range(
    docs: &[impl Borrow<DocumentText>],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DocLessons>, DocsError> {
    if start > end {
        return Err(DocsError::InvalidInput(
            "start must not be after end".to_string(),
        ));
    }

    Ok(docs
        .iter()
        .filter_map(|doc| {
            let doc: &DocumentText = doc.borrow();
            let mut lessons: Vec<Lesson> = parse_lessons(&doc.paragraphs)
                .into_iter()
                .filter(|l| l.date >= start && l.date <= end)
                .collect();
            if lessons.is_empty() {
                return None;
            }
            lessons.sort_by(|a, b| a.date.cmp(&b.date));
            Some(DocLessons {
                file_id: doc.id.clone(),
                name: doc.name.clone(),
                lessons,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, name: &str, lines: &[&str]) -> DocumentText {
        DocumentText {
            id: id.to_string(),
            name: name.to_string(),
            paragraphs: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn charlotte() -> DocumentText {
        doc(
            "c1",
            "Charlotte - Monday",
            &[
                "2025-05-19",
                "third",
                "2025-05-05",
                "first",
                "2025-05-12",
                "second",
            ],
        )
    }

    #[test]
    fn test_last_lessons_newest_first() {
        let result = last_lessons(&[charlotte()], 2).unwrap();
        assert_eq!(result.len(), 1);
        let dates: Vec<NaiveDate> = result[0].lessons.iter().map(|l| l.date).collect();
        assert_eq!(dates, vec![date(2025, 5, 19), date(2025, 5, 12)]);
    }

    #[test]
    fn test_last_lessons_ties_keep_document_order() {
        let d = doc(
            "t1",
            "Tie",
            &["2025-05-05", "a", "2025-05-12", "newer", "5 May 2025", "b"],
        );
        let result = last_lessons(&[d], 3).unwrap();
        let texts: Vec<&str> = result[0].lessons.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["newer", "a", "b"]);
    }

    #[test]
    fn test_last_lessons_keeps_empty_documents() {
        let empty = doc("e1", "Empty", &["no lessons yet"]);
        let result = last_lessons(&[charlotte(), empty], 5).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].lessons.len(), 3);
        assert!(result[1].lessons.is_empty());
    }

    #[test]
    fn test_last_lessons_rejects_bad_n() {
        assert!(last_lessons(&[charlotte()], 0).is_err());
        assert!(last_lessons(&[charlotte()], MAX_LAST_LESSONS + 1).is_err());
    }

    #[test]
    fn test_lessons_in_range_oldest_first() {
        let other = doc("o1", "Oliver - Tuesday", &["2024-01-02", "old"]);
        let result =
            lessons_in_range(&[charlotte(), other], date(2025, 5, 6), date(2025, 5, 31)).unwrap();

        assert_eq!(result.len(), 1);
        let texts: Vec<&str> = result[0].lessons.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "third"]);
    }

    #[test]
    fn test_lessons_in_range_rejects_reversed_range() {
        assert!(lessons_in_range(&[charlotte()], date(2025, 6, 1), date(2025, 5, 1)).is_err());
    }

    #[test]
    fn test_filter_by_weekday_and_student() {
        let filter = LessonFilter::new(Some("mon"), None).unwrap();
        assert!(filter.matches("Charlotte - Monday"));
        assert!(filter.matches("Charlotte (Mon)"));
        assert!(!filter.matches("Monica - Tuesday"));

        let filter = LessonFilter::new(Some("Tuesday"), Some("oli")).unwrap();
        assert!(filter.matches("Oliver - Tuesday"));
        assert!(!filter.matches("Charlotte - Tuesday"));

        assert!(LessonFilter::new(Some("someday"), None).is_err());
        assert!(LessonFilter::new(Some(" "), Some("")).unwrap().matches("anything"));
    }
}
