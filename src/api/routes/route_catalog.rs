// HTTP routes, one file per feature area.

pub mod docs;
pub mod health;
pub mod index;
pub mod lessons;
pub mod search;
