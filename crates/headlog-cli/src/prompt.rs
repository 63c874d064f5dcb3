use std::io::{self, Write};

use anyhow::Result;
use tracing::warn;

use headlog_core::api::user_message;
use headlog_core::auth::{self, CredentialStore, VerifiedToken};
use headlog_core::{ApiClient, Config};

/// Sign-in attempts before giving up
const MAX_SIGN_IN_ATTEMPTS: usize = 3;

const EMAIL_ENV: &str = "HEADLOG_EMAIL";
const PASSWORD_ENV: &str = "HEADLOG_PASSWORD";

/// Interactive sign-in. Credentials from the environment are tried first
/// and only once, so a wrong password there does not loop.
pub async fn sign_in(
    api: &ApiClient,
    store: &dyn CredentialStore,
    config: &mut Config,
) -> Result<VerifiedToken> {
    if let (Ok(email), Ok(password)) = (std::env::var(EMAIL_ENV), std::env::var(PASSWORD_ENV)) {
        let token = auth::sign_in(api, store, &email, &password).await?;
        remember_email(config, &email);
        return Ok(token);
    }

    println!("\n=== Headache Journal Sign In ===\n");

    let mut attempt = 1;
    loop {
        let email = prompt_email(config.last_email.as_deref())?;
        let password = rpassword::prompt_password("Password: ")?;

        println!("\nSigning in...");
        match auth::sign_in(api, store, &email, &password).await {
            Ok(token) => {
                remember_email(config, &email);
                println!("You have successfully signed in.\n");
                return Ok(token);
            }
            Err(e) if attempt < MAX_SIGN_IN_ATTEMPTS => {
                println!("Sign-in failed: {}\n", user_message(&e));
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

fn prompt_email(last_email: Option<&str>) -> Result<String> {
    match last_email {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match (input.is_empty(), last_email) {
        (true, Some(last)) => last.to_string(),
        _ => input.to_string(),
    })
}

fn remember_email(config: &mut Config, email: &str) {
    if config.last_email.as_deref() == Some(email) {
        return;
    }
    config.last_email = Some(email.to_string());
    if let Err(e) = config.save() {
        warn!(error = %e, "Failed to save config");
    }
}
