//! Document records: domain, repository and service.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use models::document::DocumentCategory;
pub use service::DocumentService;
