//! Service layer providing the authentication business logic on top of models.
//! - Separates business logic from data access and transport.
//! - Keeps persistence and the profile collaborator behind traits.
//! - Provides clear error types and documented interfaces.

pub mod auth;
