//! Authentication commands.

use crate::output::{self, OutputFormat};
use anyhow::Result;
use session_engine::{AuthError, SessionEngine};
use std::io::{self, Write};

/// Prompt for a line of input on stdout.
fn prompt_line(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}

/// Register a new account.
pub async fn signup(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    let email = prompt_line("Email")?;
    if email.is_empty() {
        output::print_error("Email is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    let confirmation = rpassword::prompt_password("Confirm password: ")?;
    if password != confirmation {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    println!("Signing up...");

    match engine.register(&email, &password).await {
        Ok(account) => {
            output::print_success(
                &format!(
                    "Account created for {}. You can now log in.",
                    account.email.as_deref().unwrap_or(&email)
                ),
                format,
            );
        }
        Err(e) => {
            output::print_error(&format!("Signup failed: {}", e), format);
        }
    }

    Ok(())
}

/// Login with username and password.
pub async fn login(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    // Reuse a restorable session instead of prompting again
    if engine.restore_session().await.unwrap_or(false) {
        if let Some(user) = engine.current_user() {
            output::print_success(
                &format!(
                    "Already logged in as {}",
                    user.identity.email.as_deref().unwrap_or(&user.identity.username)
                ),
                format,
            );
            return Ok(());
        }
    }

    let username = prompt_line("Username")?;
    if username.is_empty() {
        output::print_error("Username is required", format);
        return Ok(());
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        output::print_error("Password is required", format);
        return Ok(());
    }

    println!("Logging in...");

    match engine.authenticate(&username, &password).await {
        Ok(()) => {
            let display = engine
                .current_user()
                .map(|u| u.identity.email.unwrap_or(u.identity.username))
                .unwrap_or(username);
            output::print_success(&format!("Logged in as {}", display), format);
        }
        Err(e) => {
            output::print_error(&format!("Login failed: {}", e), format);
        }
    }

    Ok(())
}

/// Show the current session and profile attributes.
pub async fn session(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    match engine.get_session().await {
        Ok(bundle) => match format {
            OutputFormat::Text => {
                output::print_heading("Session");
                output::print_row("Expires", &bundle.session.expires_at.to_rfc3339());

                output::print_heading("Attributes");
                let mut names: Vec<_> = bundle.attributes.keys().collect();
                names.sort();
                for name in names {
                    output::print_row(name, &bundle.attributes[name]);
                }
            }
            OutputFormat::Json => {
                output::print_json(&serde_json::json!({
                    "expires_at": bundle.session.expires_at.to_rfc3339(),
                    "attributes": bundle.attributes,
                }));
            }
        },
        Err(AuthError::NotSignedIn) => {
            output::print_error("Not logged in. Log in with 'userpool login'", format);
        }
        Err(e) => {
            output::print_error(&format!("Could not retrieve session: {}", e), format);
        }
    }

    Ok(())
}

/// Change the signed-in user's password.
pub async fn change_password(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    // Fresh process: bring the persisted session into memory first
    let _ = engine.restore_session().await;

    if engine.current_user().is_none() {
        output::print_error("Not logged in. Log in with 'userpool login'", format);
        return Ok(());
    }

    let current = rpassword::prompt_password("Current password: ")?;
    let new = rpassword::prompt_password("New password: ")?;
    let confirmation = rpassword::prompt_password("Confirm new password: ")?;

    if new != confirmation {
        output::print_error("Passwords do not match", format);
        return Ok(());
    }

    match engine.change_password(&current, &new).await {
        Ok(message) => output::print_success(&message, format),
        Err(e) => output::print_error(&format!("Password change failed: {}", e), format),
    }

    Ok(())
}

/// Logout and clear the persisted session.
pub async fn logout(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    engine.logout()?;
    output::print_success("Logged out", format);

    Ok(())
}

/// Check authentication status.
pub async fn status(engine: &SessionEngine, format: &OutputFormat) -> Result<()> {
    let snapshot = engine.status()?;

    match format {
        OutputFormat::Text => {
            if let Some(user_id) = &snapshot.user_id {
                println!(
                    "Auth:     {}",
                    if snapshot.authenticated {
                        "logged in"
                    } else {
                        "session on disk (not restored)"
                    }
                );
                println!("User ID:  {}", user_id);
                if let Some(username) = &snapshot.username {
                    println!("Username: {}", username);
                }
                if let Some(email) = &snapshot.email {
                    println!("Email:    {}", email);
                }
                if let Some(expires_at) = &snapshot.expires_at {
                    println!("Expires:  {}", expires_at);
                }
            } else {
                println!("Auth:     not logged in");
            }
        }
        OutputFormat::Json => output::print_json(&snapshot),
    }

    Ok(())
}
