//! Auth module: domain, repository, hasher, token issuer, notifier, service.
//!
//! Registration and login business logic lives here, independent of the web
//! framework. The HTTP layer maps `AuthError` kinds to status codes.

pub mod domain;
pub mod errors;
pub mod hasher;
pub mod notifier;
pub mod repo;
pub mod repository;
pub mod service;
pub mod token;

pub use service::AuthService;
