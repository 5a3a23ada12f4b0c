//! Service layer: business workflows on top of `models`.
//! - Auth (login, token codec, session evaluation) is independent of the web framework.
//! - Employees and documents are reached through repository traits with
//!   sea-orm and in-memory implementations.
//! - Blob storage sits behind [`storage::ObjectStore`].

pub mod errors;
pub mod auth;
pub mod employee;
pub mod document;
pub mod storage;
pub mod upload;
