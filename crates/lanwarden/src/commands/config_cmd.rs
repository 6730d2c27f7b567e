//! Configuration command handlers.

use dialoguer::{Confirm, Input};

use lanwarden_config as config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Init => init(global),
        ConfigCommand::Show => show(global),
        ConfigCommand::SetPassword => set_password(global),
    }
}

/// Interactively create or update a profile.
fn init(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();

    let name: String = Input::new()
        .with_prompt("Profile name")
        .default(
            global
                .profile
                .clone()
                .unwrap_or_else(|| "default".into()),
        )
        .interact_text()
        .map_err(io_err)?;

    let backend: String = Input::new()
        .with_prompt("Backend base URL")
        .default(
            cfg.profiles
                .get(&name)
                .map(|p| p.backend.clone())
                .unwrap_or_else(|| "http://127.0.0.1:5000/api/v1".into()),
        )
        .interact_text()
        .map_err(io_err)?;

    let username: String = Input::new()
        .with_prompt("Username")
        .interact_text()
        .map_err(io_err)?;

    let profile = config::Profile {
        backend,
        username: Some(username),
        password: None,
        password_env: None,
        ca_cert: None,
        insecure: None,
        timeout: None,
    };
    cfg.profiles.insert(name.clone(), profile);
    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(name.clone());
    }
    config::save_config(&cfg)?;

    let store = Confirm::new()
        .with_prompt("Store a password in the system keyring now?")
        .default(true)
        .interact()
        .map_err(io_err)?;
    if store {
        let pw = rpassword::prompt_password("Password: ")?;
        config::store_password(&name, &pw)?;
    }

    output::print_output(
        &format!("Profile '{name}' saved to {}", config::config_path().display()),
        global.quiet,
    );
    Ok(())
}

/// Show the active configuration. Passwords never appear: the Profile
/// struct serializes the plaintext field, so it is blanked first.
fn show(global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = config::load_config_or_default();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("<redacted>".into());
        }
    }
    let rendered = toml::to_string_pretty(&cfg).map_err(|e| CliError::Config {
        message: e.to_string(),
    })?;
    output::print_output(&rendered, global.quiet);
    Ok(())
}

fn set_password(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let (name, _) = cfg.profile(global.profile.as_deref())?;

    let pw = rpassword::prompt_password(format!("Password for profile '{name}': "))?;
    config::store_password(name, &pw)?;
    output::print_output("Password stored in system keyring", global.quiet);
    Ok(())
}

fn io_err(e: dialoguer::Error) -> CliError {
    match e {
        dialoguer::Error::IO(io) => CliError::Io(io),
    }
}
