//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jayzone_types::PeriodKind;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parse a period name such as `daily`, `week` or `"this month"`.
pub fn parse_period(s: &str) -> Result<PeriodKind, String> {
    s.parse::<PeriodKind>().map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "jayzone")]
#[command(author, version, about = "Heart-rate zone time and goal tracking", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for a JSON default format)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Database file (overrides config)
    #[arg(long, global = true, env = "JAYZONE_DB")]
    pub db: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "JAYZONE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show time spent in each zone for a period
    Summary(SummaryArgs),

    /// Import heart-rate samples from CSV (timestamp,bpm)
    Import {
        /// CSV file to read (stdin if omitted)
        input: Option<PathBuf>,
    },

    /// View or edit heart-rate zones
    Zones {
        #[command(subcommand)]
        action: ZonesAction,
    },

    /// View or edit zone goals
    Goals {
        #[command(subcommand)]
        action: GoalsAction,
    },

    /// Inspect the local sample cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments for the summary command
#[derive(Debug, Clone, Args)]
pub struct SummaryArgs {
    /// Period to summarize (daily, weekly, monthly)
    #[arg(short, long, value_parser = parse_period, conflicts_with = "all")]
    pub period: Option<PeriodKind>,

    /// Summarize every period
    #[arg(short, long)]
    pub all: bool,

    /// Reference instant in RFC 3339 (defaults to now)
    #[arg(long)]
    pub at: Option<String>,

    /// Report time that fell outside every zone
    #[arg(long)]
    pub coverage: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Zone subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ZonesAction {
    /// List the zone table
    List,

    /// Change a zone's BPM range
    Set {
        /// Zone id
        zone: u32,
        /// Lowest BPM in the zone (inclusive)
        min: u16,
        /// Highest BPM in the zone (inclusive)
        max: u16,
    },

    /// Restore the default zone table
    Reset,
}

/// Goal subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum GoalsAction {
    /// List goals
    List {
        /// Only goals for this period
        #[arg(short, long, value_parser = parse_period)]
        period: Option<PeriodKind>,
    },

    /// Set a goal for a zone and period
    Set {
        /// Zone id
        zone: u32,
        /// Period (daily, weekly, monthly)
        #[arg(value_parser = parse_period)]
        period: PeriodKind,
        /// Target time in minutes
        minutes: u32,
    },

    /// Remove a goal
    Remove {
        /// Zone id
        zone: u32,
        /// Period (daily, weekly, monthly)
        #[arg(value_parser = parse_period)]
        period: PeriodKind,
    },
}

/// Cache subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum CacheAction {
    /// Show sample count and time span
    Stats,

    /// Delete every cached sample
    Clear,
}

/// Configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    /// First day of the week
    FirstWeekday,
    /// UTC offset (e.g. +02:00, UTC or local)
    UtcOffset,
    /// Database file
    Database,
    /// Default output format
    Format,
    /// Default summary period
    Period,
    /// Disable colored output
    NoColor,
}

/// Configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        #[arg(value_enum)]
        key: ConfigKey,
        /// Configuration value
        value: String,
    },

    /// Remove a configuration value
    Unset {
        /// Configuration key to remove
        #[arg(value_enum)]
        key: ConfigKey,
    },

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_period_aliases() {
        assert_eq!(parse_period("week"), Ok(PeriodKind::Weekly));
        assert_eq!(parse_period("Today"), Ok(PeriodKind::Daily));
        assert!(parse_period("yearly").is_err());
    }

    #[test]
    fn test_summary_period_conflicts_with_all() {
        let result = Cli::try_parse_from(["jayzone", "summary", "--period", "daily", "--all"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_goal_set_arguments() {
        let cli = Cli::try_parse_from(["jayzone", "goals", "set", "3", "weekly", "90"]).unwrap();
        match cli.command {
            Commands::Goals {
                action:
                    GoalsAction::Set {
                        zone,
                        period,
                        minutes,
                    },
            } => {
                assert_eq!(zone, 3);
                assert_eq!(period, PeriodKind::Weekly);
                assert_eq!(minutes, 90);
            }
            _ => panic!("expected goals set"),
        }
    }
}
