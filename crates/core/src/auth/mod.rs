//! Seams of the authentication flow.
//!
//! - [`store`] -- the [`CredentialStore`] trait and the user/session records it persists.
//! - [`tokens`] -- the [`TokenIssuer`] trait and the claims carried by every token.
//! - [`memory`] -- an in-process [`CredentialStore`] for tests and local runs.

pub mod memory;
pub mod store;
pub mod tokens;

pub use memory::InMemoryCredentialStore;
pub use store::{CredentialStore, NewSession, NewUser, SessionRecord, UserRecord, UserView};
pub use tokens::{hash_refresh_token, IssuedTokens, TokenClaims, TokenIssuer, TokenKind};
