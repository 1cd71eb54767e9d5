use std::sync::Arc;

use cats_core::auth::{CredentialStore, TokenIssuer};

use crate::auth::password::PasswordPolicy;
use crate::auth::service::AuthService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (everything is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    /// Credential store, shared with `auth`; used directly for health checks.
    pub store: Arc<dyn CredentialStore>,
    /// Token issuer, shared with `auth`; used by the [`AuthUser`](crate::middleware::auth::AuthUser) extractor.
    pub tokens: Arc<dyn TokenIssuer>,
}

impl AppState {
    /// Wire the service from its collaborators.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<dyn TokenIssuer>,
        policy: PasswordPolicy,
    ) -> Self {
        let auth = Arc::new(AuthService::new(store.clone(), tokens.clone(), policy));
        Self {
            auth,
            store,
            tokens,
        }
    }
}
