use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Restricts a command to sessions that started within a date range
#[derive(Debug, Clone, Args)]
pub struct DateRange {
    /// First day to include (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Efficiency, consumption, SoC distribution and session counts
    #[command(alias = "summary")]
    Stats {
        file: PathBuf,

        #[command(flatten)]
        range: DateRange,
    },

    /// Battery capacity estimates and the fitted degradation trend
    Health {
        file: PathBuf,

        #[command(flatten)]
        range: DateRange,
    },

    /// Providers grouped by name similarity, with success rates
    Providers {
        file: PathBuf,

        #[command(flatten)]
        range: DateRange,

        /// Also show unknown providers and every merge decision
        #[arg(short, long)]
        debug: bool,
    },

    /// List normalized sessions
    #[command(alias = "ls")]
    Sessions {
        file: PathBuf,

        #[command(flatten)]
        range: DateRange,

        /// Show a single session by id
        #[arg(long)]
        id: Option<String>,
    },

    /// Charging locations with per-location counts
    Locations { file: PathBuf },

    /// Content fingerprint of an export
    Fingerprint { file: PathBuf },

    Config {
        #[arg(long)]
        path: bool,

        #[arg(long)]
        reset: bool,
    },
}

/// Analyse EV charging session exports
#[derive(Debug, Parser)]
#[command(name = "chargeview", version, verbatim_doc_comment)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}
