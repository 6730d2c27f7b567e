//! Clap derive structures for the `lanwarden` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lanwarden -- console for a network-scanning backend
#[derive(Debug, Parser)]
#[command(
    name = "lanwarden",
    version,
    about = "Manage scanned network devices from the command line",
    long_about = "Console for a lanwarden network-scanning backend.\n\n\
        Review devices the scanner has found, approve or revoke them,\n\
        trigger scans, and manage recurring scan schedules.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend profile to use
    #[arg(long, short = 'p', env = "LANWARDEN_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 'b', env = "LANWARDEN_BACKEND", global = true)]
    pub backend: Option<String>,

    /// Username (overrides profile)
    #[arg(long, short = 'u', env = "LANWARDEN_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "LANWARDEN_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "LANWARDEN_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LANWARDEN_TIMEOUT", default_value = "30", global = true)]
    pub timeout: u64,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify credentials against the backend
    Login(LoginArgs),

    /// Clear the server session and any stored password
    Logout,

    /// Manage the approved / unapproved device lists
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Trigger scans and manage the scan schedule
    #[command(alias = "s")]
    Scan(ScanArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Session ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Store the password in the system keyring on success
    #[arg(long)]
    pub store: bool,
}

// ── Devices ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices (approved by default)
    #[command(alias = "ls")]
    List(DevicesListArgs),

    /// Move a device from unapproved to approved
    Approve {
        /// Device MAC address
        mac: String,
        /// Device IP address
        ip: String,
    },

    /// Move a device from approved back to unapproved
    Revoke {
        /// Device MAC address
        mac: String,
        /// Device IP address
        ip: String,
    },

    /// Manually add a device
    Add(DeviceAddArgs),

    /// Update a device's descriptive fields
    Update(DeviceUpdateArgs),
}

#[derive(Debug, Args)]
pub struct DevicesListArgs {
    /// Show the unapproved list instead of the approved one
    #[arg(long, conflicts_with = "all")]
    pub unapproved: bool,

    /// Show both lists
    #[arg(long)]
    pub all: bool,
}

#[derive(Debug, Args)]
pub struct DeviceAddArgs {
    /// Device MAC address
    pub mac: String,
    /// Device IP address
    pub ip: String,
    /// Hostname
    #[arg(long)]
    pub hostname: Option<String>,
    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,
    /// Add to the unapproved list instead of approved
    #[arg(long)]
    pub unapproved: bool,
}

#[derive(Debug, Args)]
pub struct DeviceUpdateArgs {
    /// Device MAC address
    pub mac: String,
    /// Device IP address
    pub ip: String,
    /// New hostname
    #[arg(long)]
    pub hostname: Option<String>,
    /// New description
    #[arg(long)]
    pub description: Option<String>,
    /// The device lives in the unapproved list
    #[arg(long)]
    pub unapproved: bool,
}

// ── Scans ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(subcommand)]
    pub command: ScanCommand,
}

#[derive(Debug, Subcommand)]
pub enum ScanCommand {
    /// Trigger an immediate scan
    Start {
        /// Target range (e.g. 192.168.1.0/24); backend default if omitted
        target: Option<String>,
    },

    /// Create a recurring scan schedule
    Plan {
        /// Interval between scans, in minutes
        #[arg(long, short = 'i')]
        interval: i64,
        /// Target range to scan
        #[arg(long, short = 't')]
        target: String,
    },

    /// List scan schedules
    #[command(alias = "ls")]
    List,

    /// Run a schedule's scan immediately and advance its timestamps
    RunNow {
        /// Target of the schedule to run
        target: String,
    },

    /// Pause a schedule (clears its next-scan time)
    Pause {
        /// Target of the schedule to pause
        target: String,
    },

    /// Delete a schedule by its interval
    Delete {
        /// Interval of the schedule to delete, in minutes
        interval: i64,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Interactively create or update a profile
    Init,

    /// Show the active configuration (passwords redacted)
    Show,

    /// Store a password in the system keyring for a profile
    SetPassword,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
