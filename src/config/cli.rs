use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

use crate::domain::types::SortOption;

/// Command-line arguments for the roster binary.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Football player roster browser")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "ROSTER_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Page through players in the chosen order.
    Players(PlayersArgs),
    /// List followed players.
    Followed,
    /// Follow or unfollow a player by id.
    Toggle(ToggleArgs),
    /// List leagues in feed order.
    Leagues,
}

#[derive(Debug, Args, Clone, Default)]
pub struct PlayersArgs {
    /// Sort order (name-asc, name-desc, goals-asc, goals-desc, team-rank-asc, team-rank-desc).
    #[arg(long, default_value_t = SortOption::default())]
    pub sort: SortOption,

    /// Zero-based page to print.
    #[arg(long, default_value_t = 0)]
    pub page: usize,

    /// Print every page instead of a single one.
    #[arg(long, action = clap::ArgAction::SetTrue, conflicts_with = "page")]
    pub all: bool,
}

#[derive(Debug, Args, Clone)]
pub struct ToggleArgs {
    /// Player id, e.g. `premier_league_lionel_messi_barcelona`.
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the base URL of the remote roster feed.
    #[arg(long = "source-url", value_name = "URL", global = true, value_hint = ValueHint::Url)]
    pub source_url: Option<String>,

    /// Read the roster feed from a JSON file instead of the network.
    #[arg(long = "source-file", value_name = "PATH", global = true, value_hint = ValueHint::FilePath)]
    pub source_file: Option<PathBuf>,

    /// Override the remote request timeout.
    #[arg(long = "source-timeout-seconds", value_name = "SECONDS", global = true)]
    pub source_timeout_seconds: Option<u64>,

    /// Override the number of players per page.
    #[arg(long = "page-size", value_name = "COUNT", global = true)]
    pub page_size: Option<usize>,

    /// Override the preferences file holding followed players.
    #[arg(long = "prefs-path", value_name = "PATH", global = true, value_hint = ValueHint::FilePath)]
    pub prefs_path: Option<PathBuf>,
}
