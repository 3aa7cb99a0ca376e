//! Clap derive structures for the `muxlink` CLI.
//!
//! Defines the command tree, global flags and shared value enums. This file
//! is also compiled by `build.rs` for man page generation, so it may only
//! depend on `clap` and `clap_complete`.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// muxlink -- route and manage Muxlab KVM-over-IP endpoints
#[derive(Debug, Parser)]
#[command(
    name = "muxlink",
    version,
    about = "Control a Muxlab KVM matrix from the command line",
    long_about = "Route transmitters to receivers, manage presets and endpoint\n\
        attributes on a Muxlab KVM-over-IP matrix appliance.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "MUXLINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Appliance host or IP address (overrides profile)
    #[arg(long, env = "MUXLINK_HOST", global = true)]
    pub host: Option<String>,

    /// Appliance username (overrides profile)
    #[arg(long, short = 'u', env = "MUXLINK_USERNAME", global = true)]
    pub username: Option<String>,

    /// Numeric system id sent with every request
    #[arg(long, env = "MUXLINK_SYSTEM_ID", global = true)]
    pub system_id: Option<u32>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "MUXLINK_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "MUXLINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
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

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum RoleFilter {
    /// Every endpoint
    #[default]
    All,
    /// Transmitters only
    Tx,
    /// Receivers only
    Rx,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Route a transmitter to a receiver
    #[command(alias = "c")]
    Connect(ConnectArgs),

    /// Stop a receiver from showing any transmitter
    Disconnect(DisconnectArgs),

    /// Reboot an endpoint
    Reboot(RebootArgs),

    /// Apply, save or create routing presets
    Preset(PresetArgs),

    /// Change endpoint attributes
    #[command(alias = "dev")]
    Device(DeviceArgs),

    /// List endpoints known to the appliance
    #[command(alias = "ls", alias = "d")]
    Devices(DevicesArgs),

    /// Keep polling the appliance and print every operation as it happens
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Routing ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Transmitter MAC or custom name
    #[arg(long)]
    pub tx: String,

    /// Receiver MAC or custom name
    #[arg(long)]
    pub rx: String,
}

#[derive(Debug, Args)]
pub struct DisconnectArgs {
    /// Receiver MAC or custom name
    #[arg(long)]
    pub rx: String,
}

#[derive(Debug, Args)]
pub struct RebootArgs {
    /// Endpoint MAC or custom name
    pub device: String,
}

// ── Presets ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PresetArgs {
    #[command(subcommand)]
    pub command: PresetCommand,
}

#[derive(Debug, Subcommand)]
pub enum PresetCommand {
    /// Apply a stored preset
    Apply {
        /// Preset number
        preset: String,
    },

    /// Overwrite a preset with the current routing
    Save {
        /// Preset number
        preset: String,
    },

    /// Create a new preset from the current routing
    New {
        /// Preset name
        name: String,
    },
}

// ── Device attributes ────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DeviceArgs {
    #[command(subcommand)]
    pub command: DeviceCommand,
}

#[derive(Debug, Subcommand)]
pub enum DeviceCommand {
    /// Set an endpoint's custom name
    SetName {
        /// Endpoint MAC or current custom name
        device: String,
        /// New custom name
        name: String,
    },

    /// Turn automatic compression on or off
    AutoCompression {
        /// Endpoint MAC or custom name
        device: String,
        state: Toggle,
    },

    /// Turn 60 fps output on or off
    #[command(name = "60fps")]
    SixtyFps {
        /// Endpoint MAC or custom name
        device: String,
        state: Toggle,
    },
}

// ── Listing ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Which endpoints to show
    #[arg(long, short = 'r', value_enum, default_value_t)]
    pub role: RoleFilter,

    /// Show the selection list (id and label) instead of device details
    #[arg(long)]
    pub choices: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (overrides profile)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a value on the active profile
    Set {
        /// Profile key (host, username, system_id, polling, poll_interval_secs,
        /// timeout_secs, password_env)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a profile's password in the system keyring
    SetPassword {
        /// Profile to update (defaults to the active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
