pub mod lesson_parser;
pub mod lesson_query;
pub mod lesson_service;

pub use lesson_parser::{parse_lessons, Lesson};
pub use lesson_query::DocLessons;
pub use lesson_service::LessonService;
