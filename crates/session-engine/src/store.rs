//! Session store: the single source of truth for the signed-in user.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

/// Reference to the current user as known to the provider. Not itself
/// proof of authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityHandle {
    /// User ID assigned by the provider
    pub user_id: String,
    /// Username the identity was created for
    pub username: String,
    /// User email, when known
    pub email: Option<String>,
}

/// Time-bounded token bundle proving successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the access token has passed its expiry.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// The (identity, session) pair held by the store. A provisionally
/// promoted registration has an identity but no session yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub identity: IdentityHandle,
    pub session: Option<Session>,
}

/// Mutable cell holding the current user, with subscriber notification
/// on change.
///
/// Mutations replace the whole value; there is no read-modify-write.
/// Concurrent operations are not deduplicated: whichever completion
/// writes last determines the store content.
pub struct SessionStore {
    tx: watch::Sender<Option<CurrentUser>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    /// Replace the current user.
    pub fn set(&self, user: CurrentUser) {
        self.tx.send_replace(Some(user));
    }

    /// Clear the current user.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Snapshot of the current user.
    pub fn current(&self) -> Option<CurrentUser> {
        self.tx.borrow().clone()
    }

    /// Subscribe to store changes. The presentation layer re-renders
    /// whenever the receiver observes a new value.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.tx.subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn test_user(user_id: &str) -> CurrentUser {
        CurrentUser {
            identity: IdentityHandle {
                user_id: user_id.to_string(),
                username: "alice".to_string(),
                email: Some("alice@example.com".to_string()),
            },
            session: Some(Session {
                access_token: "access".to_string(),
                refresh_token: "refresh".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            }),
        }
    }

    #[test]
    fn test_store_starts_empty() {
        let store = SessionStore::new();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let store = SessionStore::new();

        store.set(test_user("user-1"));
        assert_eq!(store.current().unwrap().identity.user_id, "user-1");

        store.clear();
        assert!(store.current().is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let store = SessionStore::new();

        store.set(test_user("user-1"));
        store.set(test_user("user-2"));
        assert_eq!(store.current().unwrap().identity.user_id, "user-2");
    }

    #[test]
    fn test_subscriber_observes_change() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        assert!(rx.borrow_and_update().is_none());

        store.set(test_user("user-1"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(
            rx.borrow_and_update().as_ref().unwrap().identity.user_id,
            "user-1"
        );

        store.clear();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_session_expiry() {
        let live = Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!live.is_expired());

        let stale = Session {
            expires_at: Utc::now() - Duration::seconds(1),
            ..live
        };
        assert!(stale.is_expired());
    }
}
