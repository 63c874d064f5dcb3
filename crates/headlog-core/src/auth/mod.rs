//! Authentication module for the session token lifecycle.
//!
//! This module provides:
//! - `CredentialStore`: durable single-slot token storage (keychain, file, memory)
//! - `SessionContext`: the shared Authorization header slot
//! - `bootstrap`: the launch-time verification pass
//! - `sign_in` / `sign_out`: establishing and dropping a session

pub mod bootstrap;
pub mod credentials;
pub mod session;
pub mod sign_in;
pub mod token_file;

pub use bootstrap::{bootstrap, Bootstrap, Route, SessionState, SignedOutReason, VerifiedToken};
pub use credentials::{CredentialError, CredentialStore, KeyringStore, MemoryStore, TOKEN_KEY};
pub use session::SessionContext;
pub use sign_in::{sign_in, sign_out};
pub use token_file::FileTokenStore;
