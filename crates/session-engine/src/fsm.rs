//! Session state machine using rust-fsm.
//!
//! The machine makes auth state explicit instead of deriving it from
//! store/vault checks.
//!
//! ```text
//! SignedOut --AuthenticateRequested--> Authenticating
//! SignedOut --RestoreRequested-------> Restoring
//! Authenticating --AuthenticateRequested--> Authenticating   (re-entrant)
//! Authenticating --AuthenticationSucceeded--> SignedIn
//! Authenticating --AuthenticationFailed-----> SignedOut
//! Restoring --RestoreSucceeded--> SignedIn
//! Restoring --SessionExpired----> Refreshing
//! Restoring --RestoreFailed-----> SignedOut
//! SignedIn --SessionExpired------------> Refreshing
//! SignedIn --AuthenticateRequested-----> Authenticating
//! SignedIn --SignOutRequested----------> SigningOut
//! Refreshing --RefreshRetry-----> Refreshing
//! Refreshing --RefreshSucceeded-> SignedIn
//! Refreshing --RefreshFailed----> SignedOut
//! SigningOut --SignOutComplete--> SignedOut
//! ```
//!
//! `AuthenticateRequested` is a permitted self-transition from
//! `Authenticating`: concurrent authenticate calls are never rejected,
//! and whichever completion lands last determines the final store
//! content.

use rust_fsm::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Generates a module `session_machine` with State, Input and
// StateMachine types.
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub session_machine(SignedOut)

    SignedOut => {
        AuthenticateRequested => Authenticating,
        RestoreRequested => Restoring
    },
    Authenticating => {
        AuthenticateRequested => Authenticating,
        AuthenticationSucceeded => SignedIn,
        AuthenticationFailed => SignedOut
    },
    Restoring => {
        RestoreSucceeded => SignedIn,
        SessionExpired => Refreshing,
        RestoreFailed => SignedOut
    },
    SignedIn => {
        AuthenticateRequested => Authenticating,
        SessionExpired => Refreshing,
        SignOutRequested => SigningOut
    },
    Refreshing => {
        RefreshRetry => Refreshing,
        RefreshSucceeded => SignedIn,
        RefreshFailed => SignedOut
    },
    SigningOut => {
        SignOutComplete => SignedOut
    }
}

// Re-export the generated types with clearer names
pub use session_machine::Input as SessionMachineInput;
pub use session_machine::State as SessionMachineState;
pub use session_machine::StateMachine as SessionMachine;

/// User-facing session state for subscriptions and status reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No identity in memory.
    SignedOut,
    /// Credential challenge in flight.
    Authenticating,
    /// Restoring a persisted session (cold start).
    Restoring,
    /// Signed in with a session.
    SignedIn,
    /// Refreshing an expired token.
    Refreshing,
    /// Sign-out in progress.
    SigningOut,
}

impl SessionState {
    /// Returns true if the user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::SignedIn)
    }

    /// Returns true if the state is a transient/in-progress state.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticating
                | SessionState::Restoring
                | SessionState::Refreshing
                | SessionState::SigningOut
        )
    }
}

impl From<&SessionMachineState> for SessionState {
    fn from(state: &SessionMachineState) -> Self {
        match state {
            SessionMachineState::SignedOut => SessionState::SignedOut,
            SessionMachineState::Authenticating => SessionState::Authenticating,
            SessionMachineState::Restoring => SessionState::Restoring,
            SessionMachineState::SignedIn => SessionState::SignedIn,
            SessionMachineState::Refreshing => SessionState::Refreshing,
            SessionMachineState::SigningOut => SessionState::SigningOut,
        }
    }
}

/// Configuration for retry behavior during token refresh.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Maximum number of attempts.
    pub max_retries: u32,
    /// Initial delay between retries in milliseconds.
    pub initial_delay_ms: u64,
    /// Maximum delay between retries in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 5000,
        }
    }
}

impl RefreshConfig {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay_ms = self.initial_delay_ms.saturating_mul(2u64.pow(attempt));
        Duration::from_millis(delay_ms.min(self.max_delay_ms))
    }
}
