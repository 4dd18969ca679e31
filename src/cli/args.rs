//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Rebuild org-group and reporting-line hierarchies and summarize fiscal-year earnings from HRIS records
#[derive(Parser, Debug)]
#[command(name = "hris-forest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding a local .hris-forest.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show org-group hierarchies, one forest per group type
    Groups {
        /// Groups JSON (array, page object, or array of pages)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Only show these group types (repeatable)
        #[arg(short = 't', long = "type")]
        types: Vec<String>,
        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show the manager hierarchy
    Employees {
        /// Employees JSON (array, page object, or array of pages)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Summarize earnings for the current and the previous fiscal year
    Earnings {
        /// Employee payroll runs JSON (array, page object, or array of pages)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Only consider runs of this employee id
        #[arg(short, long)]
        employee: Option<String>,
        /// Fiscal year start, YYYY-MM-DD (default: Jan 1 of this year)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Fiscal year end, YYYY-MM-DD (default: Dec 31 of this year)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Select runs by check date instead of period end date
        #[arg(long)]
        check_date: bool,
        /// Earning code → label table
        #[arg(long, value_hint = ValueHint::FilePath)]
        labels: Option<PathBuf>,
        /// Earning code → category table
        #[arg(long, value_hint = ValueHint::FilePath)]
        categories: Option<PathBuf>,
        /// Emit JSON instead of a text report
        #[arg(long)]
        json: bool,
        /// Write output to file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
