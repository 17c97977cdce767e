//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// EcoTrack - local carbon footprint ledger
///
/// Examples:
///   ecotrack record --user alice --category food --impact 2.5
///   ecotrack transport --user alice --mode train --km 42 --from Leeds --to York
///   ecotrack summary --user alice --period 3months
///   ecotrack scan --user alice --image receipt.jpg
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", default_value = "ecotrack.toml")]
    pub config: PathBuf,

    /// Override the SQLite database path
    #[arg(long, value_name = "FILE")]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record one carbon event
    Record {
        #[arg(short, long)]
        user: String,
        /// transport | food | energy | shopping | other
        #[arg(long)]
        category: String,
        /// Impact in kg CO2e; estimated from --amount when omitted
        #[arg(long, required_unless_present = "amount")]
        impact: Option<f64>,
        /// Spend or quantity the event is about
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        subcategory: Option<String>,
        #[arg(long)]
        quantity: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        /// Day of the event (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Record a journey as a transport event
    Transport {
        #[arg(short, long)]
        user: String,
        /// car | electric-car | bus | train | bike | walk | plane
        #[arg(long)]
        mode: String,
        #[arg(long)]
        km: f64,
        #[arg(long, default_value = "")]
        from: String,
        #[arg(long, default_value = "")]
        to: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// This month against last month, plus the chart for a lookback period
    Summary {
        #[arg(short, long)]
        user: String,
        /// 7days | 30days | 3months | 6months | 1year
        #[arg(long)]
        period: Option<String>,
        /// Explicit bounds: start,end,previous_start,previous_end
        #[arg(long, value_delimiter = ',')]
        between: Option<Vec<String>>,
    },
    /// Daily chart series for a lookback period
    Chart {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        period: Option<String>,
    },
    /// Event history, newest first
    Events {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        category: Option<String>,
        /// Only events on or after this day (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long, default_value = "0")]
        offset: u32,
    },
    /// Analyze a receipt photo and record it as a purchase
    Scan {
        #[arg(short, long)]
        user: String,
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::{Args, Command};
    use clap::{CommandFactory, Parser};

    #[test]
    fn definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn record_requires_impact_or_amount() {
        assert!(Args::try_parse_from(["ecotrack", "record", "-u", "a", "--category", "food"]).is_err());
        let args = Args::try_parse_from([
            "ecotrack", "record", "-u", "a", "--category", "food", "--amount", "12",
        ])
        .unwrap();
        assert!(matches!(args.command, Command::Record { impact: None, .. }));
    }

    #[test]
    fn between_takes_four_dates() {
        let args = Args::try_parse_from([
            "ecotrack",
            "summary",
            "-u",
            "a",
            "--between",
            "2025-05-01,2025-05-31,2025-04-01,2025-04-30",
        ])
        .unwrap();
        match args.command {
            Command::Summary { between, .. } => assert_eq!(between.map(|v| v.len()), Some(4)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
