pub mod index_builder;
pub mod index_models;
pub mod index_service;

pub use index_models::IndexUpdate;
pub use index_service::IndexService;
