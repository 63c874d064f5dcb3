//! Launch-time session bootstrap.
//!
//! One pass reads the stored token, asks the server to verify it, and ends in
//! either `Authenticated` (header set from the verified token) or
//! `Unauthenticated` (stored token and header cleared). Verification failures
//! of any kind end the pass as `Unauthenticated` and are not retried.

use tracing::{debug, info, warn};

use crate::api::ApiClient;

use super::credentials::CredentialStore;

/// A token the server vouched for, by verifying it or by issuing it at sign-in.
/// Only this crate can construct one.
#[derive(Clone, PartialEq, Eq)]
pub struct VerifiedToken(String);

impl VerifiedToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for VerifiedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("VerifiedToken(..)")
    }
}

/// Why a pass ended without a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignedOutReason {
    /// Nothing was stored; the expected signed-out state
    NoStoredToken,
    /// The server said the token is no longer valid
    Rejected,
    /// The verification call itself failed (network, timeout, non-2xx)
    VerificationFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unverified,
    Verifying { token: String },
    Authenticated(VerifiedToken),
    Unauthenticated(SignedOutReason),
}

/// Where the client goes once a pass is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Main,
    SignIn,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Authenticated(_) | SessionState::Unauthenticated(_)
        )
    }

    pub fn route(&self) -> Option<Route> {
        match self {
            SessionState::Authenticated(_) => Some(Route::Main),
            SessionState::Unauthenticated(_) => Some(Route::SignIn),
            SessionState::Unverified | SessionState::Verifying { .. } => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            SessionState::Unverified => "unverified",
            SessionState::Verifying { .. } => "verifying",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Unauthenticated(_) => "unauthenticated",
        }
    }
}

/// A single bootstrap pass over a credential store and the shared client
pub struct Bootstrap<'a> {
    api: &'a ApiClient,
    store: &'a dyn CredentialStore,
    state: SessionState,
}

impl<'a> Bootstrap<'a> {
    pub fn new(api: &'a ApiClient, store: &'a dyn CredentialStore) -> Self {
        Self {
            api,
            store,
            state: SessionState::Unverified,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Advance by one transition. Terminal states do not move.
    pub async fn step(&mut self) -> &SessionState {
        let next = match &self.state {
            SessionState::Unverified => match self.store.read() {
                Some(token) => SessionState::Verifying { token },
                None => self.sign_out_locally(SignedOutReason::NoStoredToken),
            },
            SessionState::Verifying { token } => self.verify(token.clone()).await,
            SessionState::Authenticated(_) | SessionState::Unauthenticated(_) => {
                return &self.state
            }
        };

        debug!(from = self.state.name(), to = next.name(), "Session transition");
        self.state = next;
        &self.state
    }

    /// Drive the pass to a terminal state
    pub async fn run(mut self) -> SessionState {
        while !self.state.is_terminal() {
            self.step().await;
        }

        match &self.state {
            SessionState::Authenticated(_) => info!("Stored session verified"),
            SessionState::Unauthenticated(reason) => info!(?reason, "Sign-in required"),
            _ => {}
        }
        self.state
    }

    async fn verify(&self, token: String) -> SessionState {
        match self.api.verify_token(&token).await {
            Ok(true) => match self.api.session().set_auth_header(&token) {
                Ok(()) => SessionState::Authenticated(VerifiedToken::new(token)),
                Err(e) => {
                    warn!(error = %e, "Verified token cannot be used as a header");
                    self.sign_out_locally(SignedOutReason::VerificationFailed)
                }
            },
            Ok(false) => self.sign_out_locally(SignedOutReason::Rejected),
            Err(e) => {
                // Fail closed: a token we could not verify is not trusted
                warn!(error = %e, "Session verification failed");
                self.sign_out_locally(SignedOutReason::VerificationFailed)
            }
        }
    }

    /// Clear the stored token and the header, then report `Unauthenticated`
    fn sign_out_locally(&self, reason: SignedOutReason) -> SessionState {
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        self.api.session().clear_auth_header();
        SessionState::Unauthenticated(reason)
    }
}

/// Run one bootstrap pass. Never fails: every failure ends `Unauthenticated`.
pub async fn bootstrap(api: &ApiClient, store: &dyn CredentialStore) -> SessionState {
    Bootstrap::new(api, store).run().await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use mockito::{Matcher, Server};

    use super::*;
    use crate::auth::MemoryStore;

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap()
    }

    fn header_of(api: &ApiClient) -> Option<String> {
        api.session()
            .auth_header()
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn test_empty_store_skips_verification() {
        let mut server = Server::new_async().await;
        let verify = server
            .mock("POST", "/sessions/verify")
            .expect(0)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::new();
        let state = bootstrap(&api, &store).await;

        assert_eq!(
            state,
            SessionState::Unauthenticated(SignedOutReason::NoStoredToken)
        );
        assert_eq!(state.route(), Some(Route::SignIn));
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_valid_token_authenticates_and_sets_header() {
        let mut server = Server::new_async().await;
        let verify = server
            .mock("POST", "/sessions/verify")
            .match_body(Matcher::Json(serde_json::json!({"token": "T"})))
            .with_status(200)
            .with_body(r#"{"isValid": true}"#)
            .expect(1)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        match &state {
            SessionState::Authenticated(token) => assert_eq!(token.as_str(), "T"),
            other => panic!("expected Authenticated, got {:?}", other),
        }
        assert_eq!(state.route(), Some(Route::Main));
        assert_eq!(header_of(&api).as_deref(), Some("Bearer T"));
        assert_eq!(store.read().as_deref(), Some("T"));
        verify.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_token_clears_store() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/verify")
            .with_status(200)
            .with_body(r#"{"isValid": false}"#)
            .create_async()
            .await;

        let api = client_for(&server);
        api.session().set_auth_header("stale").unwrap();
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        assert_eq!(state, SessionState::Unauthenticated(SignedOutReason::Rejected));
        assert_eq!(store.read(), None);
        assert_eq!(header_of(&api), None);
    }

    #[tokio::test]
    async fn test_server_error_fails_closed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/verify")
            .with_status(500)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        assert_eq!(
            state,
            SessionState::Unauthenticated(SignedOutReason::VerificationFailed)
        );
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_closed() {
        // Nothing listens on port 9 of the loopback interface
        let api = ApiClient::with_base_url("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        assert_eq!(
            state,
            SessionState::Unauthenticated(SignedOutReason::VerificationFailed)
        );
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_verification_timeout_fails_closed() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let api =
            ApiClient::with_base_url(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        assert_eq!(
            state,
            SessionState::Unauthenticated(SignedOutReason::VerificationFailed)
        );
        assert_eq!(store.read(), None);
        assert_eq!(header_of(&api), None);
    }

    #[tokio::test]
    async fn test_malformed_verify_body_fails_closed() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/verify")
            .with_status(200)
            .with_body(r#"{"valid": "yes"}"#)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::with_token("T");
        let state = bootstrap(&api, &store).await;

        assert_eq!(
            state,
            SessionState::Unauthenticated(SignedOutReason::VerificationFailed)
        );
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_expired_token_scenario_routes_to_sign_in() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/verify")
            .match_body(Matcher::Json(serde_json::json!({"token": "expired"})))
            .with_status(200)
            .with_body(r#"{"isValid": false}"#)
            .expect(1)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::with_token("expired");
        let state = bootstrap(&api, &store).await;

        assert_eq!(state.route(), Some(Route::SignIn));
        assert_eq!(store.read(), None);
    }

    #[tokio::test]
    async fn test_step_walks_each_state() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/sessions/verify")
            .with_status(200)
            .with_body(r#"{"isValid": true}"#)
            .create_async()
            .await;

        let api = client_for(&server);
        let store = MemoryStore::with_token("T");
        let mut pass = Bootstrap::new(&api, &store);
        assert_eq!(pass.state(), &SessionState::Unverified);

        let state = pass.step().await.clone();
        assert_eq!(
            state,
            SessionState::Verifying {
                token: "T".to_string()
            }
        );
        // Header stays untouched until the server confirms
        assert_eq!(header_of(&api), None);

        assert!(pass.step().await.is_terminal());
        // Terminal states do not move
        let before = pass.state().clone();
        assert_eq!(pass.step().await, &before);
    }

    #[test]
    fn test_verified_token_debug_is_redacted() {
        let token = VerifiedToken::new("secret".to_string());
        assert!(!format!("{:?}", token).contains("secret"));
    }
}
