//! Periodic removal of expired refresh-token sessions.
//!
//! Every refresh inserts a session row and revokes the old one. Revoked rows
//! are kept until they expire so replays stay detectable; this job deletes
//! them once they have.

use std::sync::Arc;
use std::time::Duration;

use cats_core::auth::CredentialStore;
use tokio_util::sync::CancellationToken;

/// How often the cleanup job runs.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Run the session cleanup loop until `cancel` is triggered.
///
/// The first pass runs immediately.
pub async fn run(store: Arc<dyn CredentialStore>, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Session cleanup job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session cleanup job stopping");
                break;
            }
            _ = interval.tick() => {
                match store.delete_expired_sessions().await {
                    Ok(0) => tracing::debug!("Session cleanup: nothing to delete"),
                    Ok(deleted) => tracing::info!(deleted, "Session cleanup: deleted expired sessions"),
                    Err(e) => tracing::error!(error = %e, "Session cleanup failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cats_core::auth::{InMemoryCredentialStore, NewSession, NewUser};
    use cats_core::roles::Role;
    use chrono::Utc;

    use super::*;

    #[tokio::test]
    async fn test_first_pass_deletes_expired_and_stops_on_cancel() {
        let store = Arc::new(InMemoryCredentialStore::new());
        let user = store
            .create_user(NewUser {
                email: "tom@cats.io".to_string(),
                name: "Tom".to_string(),
                password_hash: "hash".to_string(),
                role: Role::Owner,
            })
            .await
            .unwrap();
        store
            .create_session(NewSession {
                user_id: user.id,
                refresh_token_hash: "lapsed".to_string(),
                expires_at: Utc::now() - chrono::Duration::seconds(5),
            })
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(store.clone(), CLEANUP_INTERVAL, cancel.clone()));

        let mut deleted = false;
        for _ in 0..50 {
            if store.find_session("lapsed").await.unwrap().is_none() {
                deleted = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(deleted, "expired session should be removed on the first tick");

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("job should stop after cancel")
            .unwrap();
    }
}
