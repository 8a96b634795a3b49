//! Session orchestration for the userpool client.
//!
//! This crate converts the provider's request/response API into a
//! coherent local session state machine:
//! - [`SessionStore`]: single source of truth for "who is signed in",
//!   with watch-based subscriptions for the presentation layer
//! - [`Notifier`]: broadcast channel of per-operation outcome
//!   notifications (success/error toasts)
//! - [`SessionEngine`]: registration, authentication, session
//!   retrieval with cold-start restoration, password change, logout
//! - An explicit auth state machine tracking transient states

mod engine;
mod error;
mod fsm;
mod notify;
mod store;

pub use engine::{AuthSnapshot, RegistrationPolicy, SessionBundle, SessionEngine};
pub use error::{AuthError, AuthResult};
pub use fsm::session_machine;
pub use fsm::{
    RefreshConfig, SessionMachine, SessionMachineInput, SessionMachineState, SessionState,
};
pub use notify::{Notifier, OutcomeNotification, Severity};
pub use store::{CurrentUser, IdentityHandle, Session, SessionStore};
