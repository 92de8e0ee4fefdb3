//! Clap derive structures for the `tesyctl` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tesyctl -- control Tesy smart water heaters from the command line
#[derive(Debug, Parser)]
#[command(
    name = "tesyctl",
    version,
    about = "Monitor and control Tesy smart water heaters on your LAN",
    long_about = "Talks directly to the heater's local HTTP API -- no cloud\n\
        account required. Supports both the current `/api` firmware and\n\
        the older `/api.cgi` WiFi modules.",
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
    /// Heater profile to use
    #[arg(long, short = 'p', env = "TESY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Heater host or IP (overrides profile)
    #[arg(long, short = 'H', env = "TESY_HOST", global = true)]
    pub host: Option<String>,

    /// API generation: modern (/api) or legacy (/api.cgi)
    #[arg(long, env = "TESY_API", global = true)]
    pub api: Option<ApiFlag>,

    /// Nominal element power in watts, for energy estimation
    #[arg(long, env = "TESY_HEATER_POWER", global = true)]
    pub heater_power: Option<u32>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TESY_OUTPUT",
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

    /// Request timeout in seconds (default 15, or the profile's value)
    #[arg(long, env = "TESY_TIMEOUT", global = true)]
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

/// CLI-facing mirror of [`tesyctl_core::ApiVariant`].
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ApiFlag {
    Modern,
    Legacy,
}

impl From<ApiFlag> for tesyctl_core::ApiVariant {
    fn from(flag: ApiFlag) -> Self {
        match flag {
            ApiFlag::Modern => Self::Modern,
            ApiFlag::Legacy => Self::Legacy,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the heater's current state
    #[command(alias = "st")]
    Status(StatusArgs),

    /// Poll continuously and print each state change
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Change a heater setting
    Set(SetArgs),

    /// Query the WiFi module's diagnostic endpoints
    Probe(ProbeArgs),

    /// Manage configuration profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── status ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Also print every raw field the device reported
    #[arg(long)]
    pub raw: bool,
}

// ── watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in seconds (clamped to 10..=300)
    #[arg(long, short = 'i', default_value = "30")]
    pub interval: u64,

    /// Stop after this many successful updates
    #[arg(long, short = 'n')]
    pub count: Option<u32>,
}

// ── set ──────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Target temperature in °C (or showers on BelliSlimo models)
    Temp {
        value: u8,
    },
    /// Standby on/off; off leaves only antifreeze protection
    Power {
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// One-shot boost to maximum
    Boost {
        #[arg(value_parser = parse_on_off, action = clap::ArgAction::Set)]
        state: bool,
    },
    /// Operating mode: manual, p1, p2, p3, eco, eco-comfort, eco-night
    Mode {
        mode: ModeFlag,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeFlag {
    Manual,
    P1,
    P2,
    P3,
    Eco,
    EcoComfort,
    EcoNight,
}

impl From<ModeFlag> for tesyctl_core::Mode {
    fn from(flag: ModeFlag) -> Self {
        match flag {
            ModeFlag::Manual => Self::Manual,
            ModeFlag::P1 => Self::Program1,
            ModeFlag::P2 => Self::Program2,
            ModeFlag::P3 => Self::Program3,
            ModeFlag::Eco => Self::Eco,
            ModeFlag::EcoComfort => Self::EcoComfort,
            ModeFlag::EcoNight => Self::EcoNight,
        }
    }
}

fn parse_on_off(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        other => Err(format!("expected 'on' or 'off', got '{other}'")),
    }
}

// ── probe ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProbeArgs {
    #[command(subcommand)]
    pub command: ProbeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProbeCommand {
    /// Sweep the full diagnostic endpoint catalog
    Discover,
    /// Fetch the system-information endpoints
    System,
    /// Fetch the WiFi endpoints
    Wifi,
    /// Fetch the filesystem endpoints
    Fs,
    /// Fetch one arbitrary path verbatim
    Endpoint {
        /// Path to fetch, e.g. /heap
        path: String,
    },
}

// ── config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,
    /// Show the resolved configuration
    Show,
    /// Create or update a profile
    Set {
        /// Profile name
        #[arg(long, default_value = "default")]
        name: String,

        /// Heater host or IP
        #[arg(long)]
        host: String,

        /// API generation
        #[arg(long, default_value = "modern")]
        api: ApiFlag,

        /// Nominal element power in watts
        #[arg(long)]
        heater_power: Option<u32>,

        /// Poll interval in seconds
        #[arg(long)]
        poll_interval: Option<u64>,

        /// Refresh fully after every write instead of merging the ack
        #[arg(long)]
        refresh_after_write: bool,

        /// Make this the default profile
        #[arg(long)]
        default: bool,
    },
    /// Remove a profile
    Remove {
        /// Profile name
        name: String,
    },
}

// ── completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
