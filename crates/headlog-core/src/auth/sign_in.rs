use anyhow::Result;
use tracing::{error, info};

use crate::api::{ApiClient, ApiError};

use super::bootstrap::VerifiedToken;
use super::credentials::CredentialStore;
use super::session::SessionContext;

/// Exchange credentials for a new session.
///
/// On success the token is persisted and then set as the header. On failure,
/// including a failed write to `store`, the stored token and the header are
/// left as they were.
pub async fn sign_in(
    api: &ApiClient,
    store: &dyn CredentialStore,
    email: &str,
    password: &str,
) -> Result<VerifiedToken> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::InvalidRequest("Email and password required".to_string()).into());
    }

    let response = match api.sign_in(email, password).await {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "Sign-in failed");
            return Err(e);
        }
    };

    // Store first: the header only changes once the token is durable
    let header = SessionContext::bearer(&response.token)?;
    if let Err(e) = store.write(&response.token) {
        error!(error = %e, "Failed to persist session token");
        return Err(anyhow::Error::new(e).context("Failed to save session token"));
    }
    api.session().install(header);

    info!("Sign-in successful");
    Ok(VerifiedToken::new(response.token))
}

/// Forget the session locally. Safe to call when already signed out.
pub fn sign_out(api: &ApiClient, store: &dyn CredentialStore) -> Result<()> {
    api.session().clear_auth_header();
    store.clear()?;
    info!("Signed out");
    Ok(())
}
