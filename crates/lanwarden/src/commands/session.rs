//! Login / logout command handlers.
//!
//! The CLI is stateless across invocations (the session cookie dies
//! with the process), so `login` is a credential check with an
//! optional keyring store, and protected commands authenticate at the
//! start of each run.

use owo_colors::OwoColorize;
use secrecy::ExposeSecret;

use lanwarden_config as config;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::error::CliError;
use crate::output;

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = super::connect(global).await?;

    let state = ctx.gate.state();
    if let lanwarden_core::SessionState::Authed { username } = &state {
        let msg = format!("Logged in as {username}");
        if output::should_color(&global.color) {
            output::print_output(&msg.green().to_string(), global.quiet);
        } else {
            output::print_output(&msg, global.quiet);
        }
    }

    if args.store {
        store_current_password(global)?;
        output::print_output("Password stored in system keyring", global.quiet);
    }
    Ok(())
}

pub async fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    // Best effort: clear the server session if we can reach it.
    if let Ok(ctx) = super::connect(global).await {
        let _ = ctx.gate.logout().await;
    }

    // Always remove the stored password.
    let cfg = config::load_config_or_default();
    if let Ok((name, _)) = cfg.profile(global.profile.as_deref()) {
        if let Ok(entry) = keyring_entry(name) {
            let _ = entry.delete_credential();
        }
    }

    output::print_output("Logged out", global.quiet);
    Ok(())
}

fn store_current_password(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let (name, profile) = cfg.profile(global.profile.as_deref())?;
    let (_, password) = config::resolve_credentials(profile, name)?;
    config::store_password(name, password.expose_secret())?;
    Ok(())
}

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new("lanwarden", &format!("{profile_name}/password"))
}
