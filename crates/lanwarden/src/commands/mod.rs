//! Command handlers and connection plumbing.

pub mod config_cmd;
pub mod devices;
pub mod scans;
pub mod session;

use std::io::IsTerminal;
use std::sync::Arc;

use secrecy::SecretString;

use lanwarden_api::ApiClient;
use lanwarden_config as config;
use lanwarden_core::{BusySet, DeviceLists, ScheduleBoard, SessionGate};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Everything a protected command needs: an authenticated session plus
/// the two synchronizers sharing one busy set.
pub struct Context {
    pub gate: SessionGate,
    pub lists: DeviceLists,
    pub board: ScheduleBoard,
}

/// Build the API client from config + flag overrides.
pub fn build_client(global: &GlobalOpts) -> Result<(Arc<ApiClient>, String, SecretString), CliError> {
    let cfg = config::load_config_or_default();

    // Profile path: config file entry with flag overrides.
    if let Ok((name, profile)) = cfg.profile(global.profile.as_deref()) {
        let url = match global.backend {
            Some(ref raw) => parse_backend(raw)?,
            None => config::backend_url(profile)?,
        };
        let mut transport = config::profile_transport(profile, &cfg.defaults);
        if global.insecure {
            transport.tls = lanwarden_api::TlsMode::DangerAcceptInvalid;
        }
        transport.timeout = std::time::Duration::from_secs(global.timeout);

        let (username, password) = resolve_credentials(profile, name, global)?;
        let api = ApiClient::new(url, &transport)?;
        return Ok((Arc::new(api), username, password));
    }

    // No profile: flags and env vars alone.
    let raw = global.backend.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config::config_path().display().to_string(),
    })?;
    let url = parse_backend(raw)?;

    let username = global
        .username
        .clone()
        .ok_or_else(|| CliError::NoCredentials {
            profile: "default".into(),
        })?;
    let password = std::env::var("LANWARDEN_PASSWORD")
        .map(SecretString::from)
        .or_else(|_| prompt_password(&username))?;

    let transport = lanwarden_api::TransportConfig {
        tls: if global.insecure {
            lanwarden_api::TlsMode::DangerAcceptInvalid
        } else {
            lanwarden_api::TlsMode::System
        },
        timeout: std::time::Duration::from_secs(global.timeout),
        cookie_jar: None,
    };

    let api = ApiClient::new(url, &transport)?;
    Ok((Arc::new(api), username, password))
}

/// Build the client, authenticate, and assemble the synchronizers.
pub async fn connect(global: &GlobalOpts) -> Result<Context, CliError> {
    let (api, username, password) = build_client(global)?;

    let gate = SessionGate::new(Arc::clone(&api));
    gate.login(&username, &password).await?;

    let busy = Arc::new(BusySet::new());
    Ok(Context {
        lists: DeviceLists::new(Arc::clone(&api), Arc::clone(&busy)),
        board: ScheduleBoard::new(api, busy),
        gate,
    })
}

/// Dispatch a protected command to its handler.
pub async fn dispatch(cmd: Command, ctx: &Context, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(ctx, args, global).await,
        Command::Scan(args) => scans::handle(ctx, args, global).await,
        // Handled in main before a context exists.
        Command::Login(_) | Command::Logout | Command::Config(_) | Command::Completions(_) => {
            Ok(())
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn parse_backend(raw: &str) -> Result<url::Url, CliError> {
    raw.parse().map_err(|_| CliError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

fn resolve_credentials(
    profile: &config::Profile,
    name: &str,
    global: &GlobalOpts,
) -> Result<(String, SecretString), CliError> {
    match config::resolve_credentials(profile, name) {
        Ok((username, password)) => Ok((
            global.username.clone().unwrap_or(username),
            password,
        )),
        Err(config::ConfigError::NoCredentials { .. }) => {
            let username = global
                .username
                .clone()
                .or_else(|| profile.username.clone())
                .ok_or_else(|| CliError::NoCredentials {
                    profile: name.into(),
                })?;
            let password = prompt_password(&username)?;
            Ok((username, password))
        }
        Err(e) => Err(e.into()),
    }
}

/// Interactive fallback when no password is configured anywhere.
fn prompt_password(username: &str) -> Result<SecretString, CliError> {
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NoCredentials {
            profile: username.into(),
        });
    }
    let pw = rpassword::prompt_password(format!("Password for {username}: "))?;
    Ok(SecretString::from(pw))
}
