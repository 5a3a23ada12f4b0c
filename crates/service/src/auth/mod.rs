//! Auth module: three-layer architecture (domain, repository, service) plus
//! the token codec and the session state machine used by the HTTP middleware.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;
pub mod session;

pub use service::AuthService;
pub use session::{evaluate_session, SessionOutcome};
pub use token::{TokenCodec, TokenKind};
