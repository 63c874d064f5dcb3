//! REST API client module for the headache journal service.
//!
//! This module provides the `ApiClient` (the shared request gateway) for
//! signing in, verifying sessions, and reading and writing journal data.
//!
//! Domain endpoints use bearer token authentication; the token is taken
//! from the client's `SessionContext`.

pub mod client;
pub mod endpoints;
pub mod error;

pub use client::{ApiClient, ConsumptionOptions, SignInResponse};
pub use error::{user_message, ApiError, GENERIC_ERROR_MESSAGE};
