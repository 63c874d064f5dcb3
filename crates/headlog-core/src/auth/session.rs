use std::sync::Arc;

use anyhow::{Context, Result};
use arc_swap::ArcSwapOption;
use reqwest::header::HeaderValue;

/// Process-wide Authorization slot shared by every request issued through
/// an [`ApiClient`](crate::api::ApiClient).
///
/// Clones share the same slot. A request that races with an update sees
/// either the old or the new header, never a torn value.
#[derive(Clone, Default)]
pub struct SessionContext {
    auth_header: Arc<ArcSwapOption<HeaderValue>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) the `Authorization: Bearer <token>` header used by
    /// subsequent requests. Requests already in flight keep the value they read.
    pub fn set_auth_header(&self, token: &str) -> Result<()> {
        let value = Self::bearer(token)?;
        self.install(value);
        Ok(())
    }

    /// Build the sensitive `Bearer <token>` value without touching the slot
    pub(crate) fn bearer(token: &str) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .context("Token contains characters not allowed in an HTTP header")?;
        value.set_sensitive(true);
        Ok(value)
    }

    pub(crate) fn install(&self, value: HeaderValue) {
        self.auth_header.store(Some(Arc::new(value)));
    }

    pub fn clear_auth_header(&self) {
        self.auth_header.store(None);
    }

    /// Snapshot of the current header value
    pub fn auth_header(&self) -> Option<HeaderValue> {
        self.auth_header.load_full().map(|value| (*value).clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth_header.load().is_some()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_auth_header_formats_bearer() {
        let session = SessionContext::new();
        assert!(!session.is_authenticated());

        session.set_auth_header("abc").unwrap();
        let header = session.auth_header().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let session = SessionContext::new();
        let shared = session.clone();

        session.set_auth_header("first").unwrap();
        assert_eq!(shared.auth_header().unwrap().to_str().unwrap(), "Bearer first");

        shared.set_auth_header("second").unwrap();
        assert_eq!(session.auth_header().unwrap().to_str().unwrap(), "Bearer second");

        session.clear_auth_header();
        assert!(!shared.is_authenticated());
    }

    #[test]
    fn test_rejects_token_with_newline() {
        let session = SessionContext::new();
        session.set_auth_header("ok").unwrap();

        assert!(session.set_auth_header("bad\ntoken").is_err());
        // Failed update leaves the previous header in place
        assert_eq!(session.auth_header().unwrap().to_str().unwrap(), "Bearer ok");
    }

    #[test]
    fn test_debug_does_not_leak_token() {
        let session = SessionContext::new();
        session.set_auth_header("secret-token").unwrap();
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
    }
}
