//! Core library for headlog, a client for a personal headache journal.
//!
//! The interesting part is the session lifecycle in [`auth`]: a persisted
//! bearer token is verified at launch, and the shared [`api::ApiClient`]
//! carries the resulting Authorization header for every journal request.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use auth::{CredentialStore, SessionContext, SessionState};
pub use config::Config;
