//! Authentication module: session state and its lifecycle.
//!
//! This module provides:
//! - `Session`: the signed-in state (token, flag, profile)
//! - `SessionCoordinator`: login, refresh, logout and refresh scheduling
//! - `RefreshTimer`: the single pending refresh
//! - `Credentials`: login form input validation
//!
//! Access tokens are refreshed one minute before they expire.

pub mod coordinator;
pub mod credentials;
pub mod scheduler;
pub mod session;
pub mod token;

pub use coordinator::{LoginError, SessionCoordinator, DEFAULT_REFRESH_LEAD};
pub use credentials::{Credentials, CredentialsError};
pub use scheduler::RefreshTimer;
pub use session::Session;
