// The core module contains all business logic.
// Each feature gets its own submodule.

#[path = "docs/mod.rs"]
pub mod docs;

#[path = "lessons/mod.rs"]
pub mod lessons;

#[path = "lesson_index/mod.rs"]
pub mod lesson_index;

#[path = "search/mod.rs"]
pub mod search;
