//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

/// PM2.5 roll-ups and station RFM scoring over an air-quality CSV.
///
/// Without a subcommand the interactive menu starts.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input CSV with station, year, month, day, hour, PM2.5 and CO columns
    #[arg(
        short,
        long,
        global = true,
        default_value = "all_data.csv",
        env = "AQ_DATA",
        value_name = "FILE"
    )]
    pub data: PathBuf,

    /// Directory the CSV/JSON reports are written to
    #[arg(long, global = true, default_value = ".", env = "AQ_OUT_DIR", value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Rows shown per table preview
    #[arg(long, global = true, default_value = "5", value_name = "COUNT")]
    pub preview_rows: usize,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate every report for one date range
    Report {
        /// Range start, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` [default: first reading]
        #[arg(short, long)]
        start: Option<String>,

        /// Range end, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` [default: last reading]
        #[arg(short, long)]
        end: Option<String>,
    },

    /// Print load diagnostics and the dataset's date span
    Info,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::INFO
        }
    }
}
