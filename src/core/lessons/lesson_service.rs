use super::lesson_query::{self, DocLessons, LessonFilter};
use crate::core::docs::{DocsError, DocsService};
use chrono::NaiveDate;
use std::sync::Arc;

/// Answers lesson queries across every matching document.
pub struct LessonService {
    docs: Arc<DocsService>,
}

impl LessonService {
    pub fn new(docs: Arc<DocsService>) -> Self {
        Self { docs }
    }

    pub async fn last_lessons(
        &self,
        n: usize,
        weekday: Option<&str>,
        student: Option<&str>,
    ) -> Result<Vec<DocLessons>, DocsError> {
        let filter = LessonFilter::new(weekday, student)?;
        // Fail before reading every document.
        lesson_query::check_last_n(n)?;

        let docs = self.docs.load_documents(|d| filter.matches(&d.name)).await?;
        lesson_query::last_lessons(&docs, n)
    }

    pub async fn lessons_in_range(
        &self,
        start: &str,
        end: &str,
        weekday: Option<&str>,
        student: Option<&str>,
    ) -> Result<Vec<DocLessons>, DocsError> {
        let start = parse_date(start, "start")?;
        let end = parse_date(end, "end")?;
        if start > end {
            return Err(DocsError::InvalidInput(
                "start must not be after end".to_string(),
            ));
        }

        let filter = LessonFilter::new(weekday, student)?;
        let docs = self.docs.load_documents(|d| filter.matches(&d.name)).await?;
        lesson_query::lessons_in_range(&docs, start, end)
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, DocsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        DocsError::InvalidInput(format!("{} must be a date in YYYY-MM-DD form", field))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::docs::DocCache;
    use crate::infra::local::LocalDocsSource;
    use std::time::Duration;
    use tempfile::TempDir;

    fn service(files: &[(&str, &str)]) -> (TempDir, LessonService) {
        let dir = TempDir::new().unwrap();
        for (name, text) in files {
            std::fs::write(dir.path().join(format!("{}.txt", name)), text).unwrap();
        }
        let source = Arc::new(LocalDocsSource::new(dir.path()));
        let docs = DocsService::new(source, DocCache::new(Duration::from_secs(60), 16), 50);
        (dir, LessonService::new(Arc::new(docs)))
    }

    #[tokio::test]
    async fn test_last_lessons_filters_by_weekday() {
        let (_dir, lessons) = service(&[
            ("Charlotte - Monday", "2025-05-05\nscales\n2025-05-12\nchords"),
            ("Oliver - Tuesday", "2025-05-06\nrhythm"),
        ]);

        let result = lessons.last_lessons(1, Some("monday"), None).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Charlotte - Monday");
        assert_eq!(result[0].lessons[0].text, "chords");
    }

    #[tokio::test]
    async fn test_lessons_in_range_parses_dates() {
        let (_dir, lessons) = service(&[("Oliver - Tuesday", "2025-05-06\nrhythm\n2025-06-03\nmelody")]);

        let result = lessons
            .lessons_in_range("2025-06-01", "2025-06-30", None, Some("oliver"))
            .await
            .unwrap();
        assert_eq!(result[0].lessons.len(), 1);
        assert_eq!(result[0].lessons[0].text, "melody");

        assert!(matches!(
            lessons.lessons_in_range("June", "2025-06-30", None, None).await,
            Err(DocsError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_n_rejected() {
        let (_dir, lessons) = service(&[]);
        assert!(matches!(
            lessons.last_lessons(0, None, None).await,
            Err(DocsError::InvalidInput(_))
        ));
    }
}
