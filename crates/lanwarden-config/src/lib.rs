//! Shared configuration for the lanwarden CLI and TUI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to the API client's transport settings. Both
//! binaries depend on this crate.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use lanwarden_api::{TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{profile}'")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by explicit name, falling back to the
    /// configured default profile.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })?;
        Ok((name, profile))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://192.168.1.5:5000/api/v1").
    pub backend: String,

    /// Username for session login.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification for this profile.
    pub insecure: Option<bool>,

    /// Override request timeout in seconds.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "lanwarden", "lanwarden").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lanwarden");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LANWARDEN_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve login credentials for a profile.
///
/// Username comes from the profile or `LANWARDEN_USERNAME`. Password
/// resolution order: named env var, `LANWARDEN_PASSWORD`, system
/// keyring, plaintext in the config file.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("LANWARDEN_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Named env var from the profile
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 2. Well-known env var
    if let Ok(pw) = std::env::var("LANWARDEN_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 3. System keyring
    if let Ok(entry) = keyring::Entry::new("lanwarden", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for a profile.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new("lanwarden", &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Transport translation ───────────────────────────────────────────

/// Parse the profile's backend URL.
pub fn backend_url(profile: &Profile) -> Result<Url, ConfigError> {
    profile.backend.parse().map_err(|_| ConfigError::Validation {
        field: "backend".into(),
        reason: format!("invalid URL: {}", profile.backend),
    })
}

/// Build a `TransportConfig` from a profile, applying global defaults
/// where the profile has no override.
pub fn profile_transport(profile: &Profile, defaults: &Defaults) -> TransportConfig {
    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        cookie_jar: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn bare_profile() -> Profile {
        Profile {
            backend: "http://192.168.1.5:5000/api/v1".into(),
            username: Some("admin".into()),
            password: Some("plaintext-pw".into()),
            password_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }

    #[test]
    fn profile_lookup_falls_back_to_default() {
        let mut config = Config::default();
        config.profiles.insert("default".into(), bare_profile());

        let (name, _) = config.profile(None).unwrap();
        assert_eq!(name, "default");
        assert!(matches!(
            config.profile(Some("missing")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn transport_applies_profile_overrides() {
        let mut profile = bare_profile();
        profile.insecure = Some(true);
        profile.timeout = Some(5);

        let transport = profile_transport(&profile, &Defaults::default());
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn transport_uses_defaults_without_overrides() {
        let transport = profile_transport(&bare_profile(), &Defaults::default());
        assert!(matches!(transport.tls, TlsMode::System));
        assert_eq!(transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn credentials_prefer_env_over_plaintext() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LANWARDEN_PASSWORD", "env-pw");

            let (user, pw) = resolve_credentials(&bare_profile(), "default").unwrap();
            assert_eq!(user, "admin");
            assert_eq!(secrecy::ExposeSecret::expose_secret(&pw), "env-pw");
            Ok(())
        });
    }

    #[test]
    fn backend_url_rejects_garbage() {
        let mut profile = bare_profile();
        profile.backend = "not a url".into();
        assert!(matches!(
            backend_url(&profile),
            Err(ConfigError::Validation { .. })
        ));
    }
}
