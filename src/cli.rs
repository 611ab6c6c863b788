use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cropwater",
    version,
    about = "Crop irrigation scheduler driven by a daily soil-water balance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override SQLite data directory
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute an irrigation schedule (the default command)
    Schedule(ScheduleArgs),
    /// Estimate crop water demand over the forecast without a soil simulation
    Demand(DemandArgs),
    /// List known soil types
    Soils {
        #[arg(long)]
        json: bool,
    },
    /// List known crops
    Crops {
        #[arg(long)]
        json: bool,
    },
    /// List saved reports
    History {
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,
        #[arg(long)]
        json: bool,
    },
    /// Print a saved report
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete a saved report
    Delete { id: String },
    /// Delete reports past their retention period
    Purge,
    /// Show or change how long reports are kept
    Retention {
        /// New retention period in days
        #[arg(long)]
        set: Option<u32>,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config and test connections
    Check,
}

/// Per-run overrides of the configured farm.
#[derive(Args, Default)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub soil: Option<String>,
    #[arg(long)]
    pub crop: Option<String>,
    /// Growth stage: 0 initial, 1 development, 2 mid, 3 late
    #[arg(long)]
    pub stage: Option<u8>,
    #[arg(long)]
    pub area: Option<f64>,
    /// hectares or acres
    #[arg(long)]
    pub unit: Option<String>,
    /// drip, sprinkler, flood or furrow
    #[arg(long)]
    pub method: Option<String>,
    /// Place name, "lat,lon" or "GPS: lat, lon"
    #[arg(long)]
    pub location: Option<String>,
    /// fao56 or rule_based
    #[arg(long)]
    pub strategy: Option<String>,
    /// Use the synthetic forecast only
    #[arg(long)]
    pub offline: bool,
    #[arg(long)]
    pub json: bool,
    /// Do not store the report
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Args)]
pub struct DemandArgs {
    #[arg(long)]
    pub crop: Option<String>,
    #[arg(long)]
    pub stage: Option<u8>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub offline: bool,
    #[arg(long)]
    pub json: bool,
}
