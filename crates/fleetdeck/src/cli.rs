//! Clap derive structures for the `fleetdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fleetdeck -- browse, edit, and locate the fleet from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "fleetdeck",
    version,
    about = "Browse and edit your boat fleet from the command line",
    long_about = "A terminal dashboard for the boat data service.\n\n\
        Search and inline-edit boats, follow a selected boat's reviews,\n\
        and list the boats around a position.",
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
    /// Service profile to use
    #[arg(long, short = 'p', env = "FLEETDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Data service base URL (overrides profile)
    #[arg(long, env = "FLEETDECK_SERVICE_URL", global = true)]
    pub service_url: Option<String>,

    /// API token (overrides profile, keyring, and env lookup)
    #[arg(long, env = "FLEETDECK_API_TOKEN", global = true, hide_env = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FLEETDECK_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FLEETDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FLEETDECK_TIMEOUT", global = true)]
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
    /// Search, edit, and select boats
    #[command(alias = "b")]
    Boats(BoatsArgs),

    /// Show the reviews of one boat
    #[command(alias = "r")]
    Reviews(ReviewsArgs),

    /// List boats around a position as map markers
    #[command(alias = "near")]
    NearMe(NearMeArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Boats ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct BoatsArgs {
    #[command(subcommand)]
    pub command: BoatsCommand,
}

#[derive(Debug, Subcommand)]
pub enum BoatsCommand {
    /// List boats, optionally of one type
    #[command(alias = "ls")]
    List {
        /// Boat type ID (omit for all boats)
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Edit a boat's columns and save
    Edit {
        /// Boat ID
        id: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New length
        #[arg(long)]
        length: Option<f64>,

        /// New price
        #[arg(long)]
        price: Option<f64>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Boat type ID of the list to refresh after saving
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },

    /// Select a boat and show its details and reviews
    Show {
        /// Boat ID
        id: String,

        /// Boat type ID of the list to select from
        #[arg(long, short = 'f')]
        filter: Option<String>,
    },
}

// ── Reviews ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReviewsArgs {
    /// Boat ID
    pub id: String,

    /// Fetch a second time after the first load completes
    #[arg(long)]
    pub refresh: bool,
}

// ── Near me ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NearMeArgs {
    /// Boat type ID (omit for all boats)
    #[arg(long, short = 'f')]
    pub filter: Option<String>,

    /// Latitude of the current position
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the current position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
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

    /// Print the config file path
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (service_url, api_token_env, timeout, default_filter, ...)
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

    /// Store the active profile's API token in the system keyring
    SetToken,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
