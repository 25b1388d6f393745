//! REST API client module for the AuthSuite auth service.
//!
//! This module provides the `ApiClient` for the login, refresh and logout
//! endpoints and for reading and updating the shared theme settings.
//!
//! Login returns a short-lived JWT access token in the body and sets the
//! long-lived refresh credential as an HTTP-only cookie, which the client's
//! cookie store replays on `/refresh` and `/logout`.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthResponse};
pub use error::ApiError;
