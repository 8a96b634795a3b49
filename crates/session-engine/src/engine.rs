//! The session engine: registration, authentication, session
//! retrieval with cold-start restoration, password change, logout.
//!
//! The engine owns the session store, the outcome notifier, and an
//! internal FSM tracking transient auth states. Session tokens are
//! persisted to the credential vault so a new process can restore the
//! session without re-prompting for credentials.

use crate::fsm::{RefreshConfig, SessionMachine, SessionMachineInput, SessionState};
use crate::notify::Notifier;
use crate::store::{CurrentUser, IdentityHandle, Session, SessionStore};
use crate::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use credential_vault::{CredentialVault, SessionMeta};
use provider_client::{AttributeEntry, Credentials, ProviderApi, ProviderError, RegisteredAccount};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// What to do with the store after a successful registration.
///
/// Registration does not yield tokens, so a promoted user has an
/// identity but no session until they authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Leave the store untouched; the user signs in explicitly.
    #[default]
    KeepSignedOut,
    /// Place the unverified identity in the store with no session.
    PromoteUnverified,
}

/// Session plus freshly fetched profile attributes.
///
/// Attributes are derived per call and never cached; two calls can
/// observe different values.
#[derive(Debug, Clone)]
pub struct SessionBundle {
    pub session: Session,
    pub attributes: HashMap<String, String>,
}

/// Point-in-time snapshot of authentication state for status reporting.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSnapshot {
    pub state: SessionState,
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub expires_at: Option<String>,
}

/// Client-side authentication session manager.
///
/// All operations return typed errors; provider failures are
/// additionally surfaced to the UI through the notifier, but the
/// caller always gets the `Err` too.
pub struct SessionEngine {
    provider: Arc<dyn ProviderApi>,
    vault: CredentialVault,
    store: SessionStore,
    notifier: Notifier,
    /// Internal FSM for tracking auth state transitions.
    fsm: Mutex<SessionMachine>,
    /// Mirror of the FSM state for subscribers.
    state_tx: watch::Sender<SessionState>,
    registration_policy: RegistrationPolicy,
    refresh_config: RefreshConfig,
}

impl SessionEngine {
    /// Create a new engine with default policies.
    pub fn new(provider: Arc<dyn ProviderApi>, vault: CredentialVault) -> Self {
        let (state_tx, _rx) = watch::channel(SessionState::SignedOut);
        Self {
            provider,
            vault,
            store: SessionStore::new(),
            notifier: Notifier::new(),
            fsm: Mutex::new(SessionMachine::new()),
            state_tx,
            registration_policy: RegistrationPolicy::default(),
            refresh_config: RefreshConfig::default(),
        }
    }

    /// Override the registration promotion policy.
    pub fn with_registration_policy(mut self, policy: RegistrationPolicy) -> Self {
        self.registration_policy = policy;
        self
    }

    /// Override the refresh retry configuration.
    pub fn with_refresh_config(mut self, config: RefreshConfig) -> Self {
        self.refresh_config = config;
        self
    }

    /// Snapshot of the current user, if any.
    pub fn current_user(&self) -> Option<CurrentUser> {
        self.store.current()
    }

    /// Subscribe to store changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<CurrentUser>> {
        self.store.subscribe()
    }

    /// Subscribe to auth state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to outcome notifications.
    pub fn notifications(&self) -> broadcast::Receiver<crate::OutcomeNotification> {
        self.notifier.subscribe()
    }

    /// The current auth state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().clone()
    }

    /// Transition the FSM and publish the new state if it changed.
    fn transition(&self, input: &SessionMachineInput) -> AuthResult<SessionState> {
        let mut fsm = self.fsm.lock().unwrap();
        let old_state = SessionState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = SessionState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Session state transition"
            );
            self.state_tx.send_replace(new_state.clone());
        }

        Ok(new_state)
    }

    /// Register a new account with the provider.
    ///
    /// One provider round trip carrying the email as a signup
    /// attribute. Success emits a success notification; failure emits
    /// an error notification with the provider's message and returns
    /// the error. Whether the new identity lands in the store is
    /// controlled by the registration policy.
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<RegisteredAccount> {
        let attributes = [AttributeEntry::new("email", email)];

        debug!(email = %email, "Registering new account");

        let account = match self.provider.register(email, password, &attributes).await {
            Ok(account) => account,
            Err(e) => {
                warn!(email = %email, error = %e, "Registration failed");
                self.notifier.error(e.message());
                return Err(e.into());
            }
        };

        info!(user_id = %account.user_id, "Registration successful");
        self.notifier
            .success("You have been successfully signed up");

        if self.registration_policy == RegistrationPolicy::PromoteUnverified {
            self.store.set(CurrentUser {
                identity: IdentityHandle {
                    user_id: account.user_id.clone(),
                    username: email.to_string(),
                    email: account.email.clone().or_else(|| Some(email.to_string())),
                },
                session: None,
            });
        }

        Ok(account)
    }

    /// Authenticate with username and password.
    ///
    /// On success the identity and session are placed in the store and
    /// the tokens persisted to the vault. On failure the store is left
    /// untouched, an error notification is emitted, and the error is
    /// returned. Concurrent calls are not deduplicated; the last
    /// completion determines the store content.
    pub async fn authenticate(&self, username: &str, password: &str) -> AuthResult<()> {
        self.transition(&SessionMachineInput::AuthenticateRequested)?;

        debug!(username = %username, "Authenticating");

        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };

        let grant = match self.provider.authenticate(&credentials).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(username = %username, error = %e, "Authentication failed");
                self.transition(&SessionMachineInput::AuthenticationFailed)?;
                self.notifier.error(e.message());
                return Err(match e {
                    ProviderError::Request { status, message } if status < 500 => {
                        AuthError::InvalidCredentials(message)
                    }
                    other => other.into(),
                });
            }
        };

        let expires_at = Utc::now() + Duration::seconds(grant.expires_in);
        let identity = IdentityHandle {
            user_id: grant.user.id.clone(),
            username: username.to_string(),
            email: grant.user.email.clone(),
        };

        if let Err(e) = self.vault.set_session(
            &grant.access_token,
            &grant.refresh_token,
            &SessionMeta {
                user_id: identity.user_id.clone(),
                username: identity.username.clone(),
                email: identity.email.clone(),
                expires_at: expires_at.to_rfc3339(),
            },
        ) {
            self.transition(&SessionMachineInput::AuthenticationFailed)?;
            return Err(e.into());
        }

        self.store.set(CurrentUser {
            identity: identity.clone(),
            session: Some(Session {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
                expires_at,
            }),
        });
        self.transition(&SessionMachineInput::AuthenticationSucceeded)?;

        info!(user_id = %identity.user_id, "Authentication successful");
        Ok(())
    }

    /// Restore a persisted session on process start.
    ///
    /// Derives engine state from the vault: a valid session lands in
    /// the store directly, an expired one is refreshed with backoff,
    /// and a non-restorable one is cleared.
    ///
    /// Returns:
    /// - `Ok(true)` if a session was restored or refreshed
    /// - `Ok(false)` if no restorable session exists
    /// - `Err(...)` if refresh failed and the session has been cleared
    pub async fn restore_session(&self) -> AuthResult<bool> {
        self.transition(&SessionMachineInput::RestoreRequested)?;

        if !self.vault.has_session()? {
            info!("No persisted session found");
            self.transition(&SessionMachineInput::RestoreFailed)?;
            return Ok(false);
        }

        let meta = match self.vault.get_session_meta()? {
            Some(m) => m,
            None => {
                info!("Session tokens exist but metadata is missing, clearing session");
                self.vault.clear_session()?;
                self.transition(&SessionMachineInput::RestoreFailed)?;
                return Ok(false);
            }
        };

        let (access_token, refresh_token) =
            match (self.vault.get_access_token()?, self.vault.get_refresh_token()?) {
                (Some(a), Some(r)) => (a, r),
                _ => {
                    info!("Session metadata exists but tokens are missing, clearing session");
                    self.vault.clear_session()?;
                    self.transition(&SessionMachineInput::RestoreFailed)?;
                    return Ok(false);
                }
            };

        let expires_at = DateTime::parse_from_rfc3339(&meta.expires_at)
            .map(|t| t.with_timezone(&Utc))
            .ok();

        match expires_at {
            Some(expires_at) if expires_at > Utc::now() => {
                info!(user_id = %meta.user_id, "Session restored from vault");
                self.store.set(CurrentUser {
                    identity: IdentityHandle {
                        user_id: meta.user_id,
                        username: meta.username,
                        email: meta.email,
                    },
                    session: Some(Session {
                        access_token,
                        refresh_token,
                        expires_at,
                    }),
                });
                self.transition(&SessionMachineInput::RestoreSucceeded)?;
                Ok(true)
            }
            _ => {
                // Expired (or unparseable expiry) - attempt refresh
                info!(user_id = %meta.user_id, "Persisted session expired, attempting refresh");
                self.transition(&SessionMachineInput::SessionExpired)?;
                self.refresh_with_backoff(&refresh_token).await?;
                Ok(true)
            }
        }
    }

    /// Retrieve the current session and freshly fetched attributes.
    ///
    /// Resolution order: the in-memory store, then a cold restore from
    /// the vault, else `NotSignedIn` without any provider call. An
    /// expired session is refreshed through the provider before the
    /// attribute fetch; refresh or fetch failures are returned to the
    /// caller, never swallowed.
    pub async fn get_session(&self) -> AuthResult<SessionBundle> {
        let user = match self.store.current() {
            Some(user) => user,
            None => {
                let user = self.restorable_user()?.ok_or(AuthError::NotSignedIn)?;
                self.transition(&SessionMachineInput::RestoreRequested)?;
                user
            }
        };

        let session = match user.session {
            Some(ref session) if !session.is_expired() => {
                // Cold restore with a still-valid session
                if self.state() == SessionState::Restoring {
                    self.store.set(user.clone());
                    self.transition(&SessionMachineInput::RestoreSucceeded)?;
                }
                session.clone()
            }
            Some(ref session) => {
                debug!(user_id = %user.identity.user_id, "Session expired, refreshing");
                self.transition(&SessionMachineInput::SessionExpired)?;
                let refreshed = self.refresh_with_backoff(&session.refresh_token).await?;
                match refreshed.session {
                    Some(s) => s,
                    None => return Err(AuthError::SessionRefresh(
                        "Refresh completed without a session".to_string(),
                    )),
                }
            }
            None => {
                // Identity without tokens (unverified promotion)
                return Err(AuthError::NotSignedIn);
            }
        };

        let attributes = self.provider.fetch_attributes(&session.access_token).await?;
        let attributes = shape_attributes(attributes);

        Ok(SessionBundle {
            session,
            attributes,
        })
    }

    /// Build a `CurrentUser` from the vault without touching the
    /// provider. The session may be expired; the caller decides.
    fn restorable_user(&self) -> AuthResult<Option<CurrentUser>> {
        if !self.vault.has_session()? {
            return Ok(None);
        }

        let meta = match self.vault.get_session_meta()? {
            Some(m) => m,
            None => return Ok(None),
        };
        let (access_token, refresh_token) =
            match (self.vault.get_access_token()?, self.vault.get_refresh_token()?) {
                (Some(a), Some(r)) => (a, r),
                _ => return Ok(None),
            };

        // Unparseable expiry restores as already-expired
        let expires_at = DateTime::parse_from_rfc3339(&meta.expires_at)
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now() - Duration::seconds(1));

        Ok(Some(CurrentUser {
            identity: IdentityHandle {
                user_id: meta.user_id,
                username: meta.username,
                email: meta.email,
            },
            session: Some(Session {
                access_token,
                refresh_token,
                expires_at,
            }),
        }))
    }

    /// Refresh the session with exponential backoff retry.
    ///
    /// On success the new tokens are persisted and the store updated.
    /// On non-transient failure or retry exhaustion the vault and store
    /// are cleared and the error is returned.
    async fn refresh_with_backoff(&self, refresh_token: &str) -> AuthResult<CurrentUser> {
        let mut last_error = None;

        for attempt in 0..self.refresh_config.max_retries {
            match self.try_refresh(refresh_token).await {
                Ok(user) => {
                    self.transition(&SessionMachineInput::RefreshSucceeded)?;
                    return Ok(user);
                }
                Err(e) if e.is_transient() => {
                    last_error = Some(e);

                    if attempt + 1 < self.refresh_config.max_retries {
                        // Stays in Refreshing state
                        let _ = self.transition(&SessionMachineInput::RefreshRetry);

                        let delay = self.refresh_config.delay_for_attempt(attempt);
                        debug!(
                            attempt = attempt + 1,
                            max_retries = self.refresh_config.max_retries,
                            delay_ms = delay.as_millis(),
                            "Refresh failed with transient error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                }
                Err(e) => {
                    warn!("Refresh failed with non-transient error: {}", e);
                    self.vault.clear_session()?;
                    self.store.clear();
                    self.transition(&SessionMachineInput::RefreshFailed)?;
                    return Err(e);
                }
            }
        }

        warn!(
            "Refresh failed after {} attempts",
            self.refresh_config.max_retries
        );
        self.vault.clear_session()?;
        self.store.clear();
        self.transition(&SessionMachineInput::RefreshFailed)?;

        Err(match last_error {
            Some(e) => AuthError::SessionRefresh(e.to_string()),
            None => AuthError::RefreshExhausted(self.refresh_config.max_retries),
        })
    }

    /// Single refresh attempt. Persists and publishes the new session
    /// on success; leaves cleanup to the caller on failure.
    async fn try_refresh(&self, refresh_token: &str) -> AuthResult<CurrentUser> {
        let grant = self
            .provider
            .refresh_session(refresh_token)
            .await
            .map_err(|e| match e {
                e if e.is_transient() => AuthError::Provider(e),
                e => AuthError::SessionRefresh(e.message()),
            })?;

        let expires_at = Utc::now() + Duration::seconds(grant.expires_in);

        // The provider does not echo the username; keep the persisted one
        let username = self
            .vault
            .get_session_meta()?
            .map(|m| m.username)
            .unwrap_or_else(|| grant.user.email.clone().unwrap_or_default());

        self.vault.set_session(
            &grant.access_token,
            &grant.refresh_token,
            &SessionMeta {
                user_id: grant.user.id.clone(),
                username: username.clone(),
                email: grant.user.email.clone(),
                expires_at: expires_at.to_rfc3339(),
            },
        )?;

        let user = CurrentUser {
            identity: IdentityHandle {
                user_id: grant.user.id.clone(),
                username,
                email: grant.user.email,
            },
            session: Some(Session {
                access_token: grant.access_token,
                refresh_token: grant.refresh_token,
                expires_at,
            }),
        };
        self.store.set(user.clone());

        info!(user_id = %user.identity.user_id, "Session refreshed");
        Ok(user)
    }

    /// Change the signed-in user's password.
    ///
    /// Requires a signed-in identity with a session; returns
    /// `NotSignedIn` otherwise, without emitting a notification. The
    /// provider's confirmation or error message is surfaced through
    /// the notifier.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<String> {
        let user = self.store.current().ok_or(AuthError::NotSignedIn)?;
        let access_token = match user.session {
            Some(session) => session.access_token,
            None => return Err(AuthError::NotSignedIn),
        };

        match self
            .provider
            .change_password(&access_token, current_password, new_password)
            .await
        {
            Ok(message) => {
                info!(user_id = %user.identity.user_id, "Password changed");
                self.notifier.success(message.clone());
                Ok(message)
            }
            Err(e) => {
                warn!(user_id = %user.identity.user_id, error = %e, "Password change failed");
                self.notifier.error(e.message());
                Err(e.into())
            }
        }
    }

    /// Sign out by clearing the vault and the store.
    ///
    /// Local-only: the provider is never contacted. Persisted tokens
    /// are cleared even when no user is in memory, so a fresh process
    /// can sign out without restoring (and possibly refreshing) the
    /// session first. Idempotent.
    pub fn logout(&self) -> AuthResult<()> {
        self.vault.clear_session()?;

        if self.store.current().is_none() {
            debug!("Logout requested while signed out");
            return Ok(());
        }

        // Lenient transitions: clear local state even if the FSM is
        // mid-operation.
        let _ = self.transition(&SessionMachineInput::SignOutRequested);
        self.store.clear();
        let _ = self.transition(&SessionMachineInput::SignOutComplete);

        info!("Signed out");
        Ok(())
    }

    /// Point-in-time status snapshot.
    pub fn status(&self) -> AuthResult<AuthSnapshot> {
        let state = self.state();

        if let Some(user) = self.store.current() {
            let authenticated = user
                .session
                .as_ref()
                .map(|s| !s.is_expired())
                .unwrap_or(false);
            return Ok(AuthSnapshot {
                state,
                authenticated,
                user_id: Some(user.identity.user_id),
                username: Some(user.identity.username),
                email: user.identity.email,
                expires_at: user.session.map(|s| s.expires_at.to_rfc3339()),
            });
        }

        // Not in memory; report what the vault knows without restoring
        if let Some(meta) = self.vault.get_session_meta()? {
            return Ok(AuthSnapshot {
                state,
                authenticated: false,
                user_id: Some(meta.user_id),
                username: Some(meta.username),
                email: meta.email,
                expires_at: Some(meta.expires_at),
            });
        }

        Ok(AuthSnapshot {
            state,
            authenticated: false,
            user_id: None,
            username: None,
            email: None,
            expires_at: None,
        })
    }
}

/// Shape an attribute list into a name -> value map. The last entry
/// wins on duplicate names.
fn shape_attributes(attributes: Vec<AttributeEntry>) -> HashMap<String, String> {
    let mut map = HashMap::with_capacity(attributes.len());
    for entry in attributes {
        map.insert(entry.name, entry.value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_attributes_basic() {
        let shaped = shape_attributes(vec![
            AttributeEntry::new("email", "a@x.com"),
            AttributeEntry::new("name", "Bob"),
        ]);

        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped.get("email").map(String::as_str), Some("a@x.com"));
        assert_eq!(shaped.get("name").map(String::as_str), Some("Bob"));
    }

    #[test]
    fn test_shape_attributes_last_duplicate_wins() {
        let shaped = shape_attributes(vec![
            AttributeEntry::new("email", "old@x.com"),
            AttributeEntry::new("name", "Bob"),
            AttributeEntry::new("email", "new@x.com"),
        ]);

        assert_eq!(shaped.len(), 2);
        assert_eq!(shaped.get("email").map(String::as_str), Some("new@x.com"));
    }

    #[test]
    fn test_shape_attributes_empty() {
        assert!(shape_attributes(Vec::new()).is_empty());
    }
}
