//! Domain layer for the Cats Management API.
//!
//! Holds everything that does not depend on HTTP or PostgreSQL: shared types,
//! the [`error::CoreError`] taxonomy, roles, the partial-update extractor, and
//! the [`auth`] seams that the service layer is wired against.

pub mod auth;
pub mod error;
pub mod patch;
pub mod roles;
pub mod types;
pub mod validation;
