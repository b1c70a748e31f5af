use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::utils::constants::DEFAULT_DAILY_VARS;

#[derive(Parser, Debug)]
#[command(name = "openmeteo-history")]
#[command(about = "Chunked downloader for Open-Meteo historical weather")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Settings file (TOML, YAML or JSON); OPENMETEO_* variables override it"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download a date range for one location into a CSV file
    Fetch {
        #[arg(long, allow_negative_numbers = true, help = "Latitude of location")]
        lat: f64,

        #[arg(long, allow_negative_numbers = true, help = "Longitude of location")]
        lon: f64,

        #[arg(long, help = "Start date YYYY-MM-DD")]
        start_date: String,

        #[arg(long, help = "End date YYYY-MM-DD")]
        end_date: String,

        #[arg(
            short,
            long,
            help = "CSV output file [default: output/openmeteo-{lat}_{lon}-{YYMMDD}.csv]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, default_value_t = DEFAULT_DAILY_VARS.join(","), help = "Comma-separated daily variables")]
        daily_vars: String,

        #[arg(long, default_value = "", help = "Comma-separated hourly variables")]
        hourly_vars: String,

        #[arg(long, help = "Timezone sent to the archive [default: auto]")]
        timezone: Option<String>,

        #[arg(long, help = "Maximum days per request [default: 365]")]
        chunk_days: Option<i64>,

        #[arg(long, help = "Attempts per chunk before giving up [default: 3]")]
        retries: Option<u32>,

        #[arg(long, help = "Delay between attempts in milliseconds [default: 1000]")]
        retry_delay_ms: Option<u64>,

        #[arg(long, help = "Per-request timeout in seconds [default: 60]")]
        timeout_secs: Option<u64>,

        #[arg(long, help = "Pause between chunks in milliseconds [default: 1000]")]
        pause_ms: Option<u64>,

        #[arg(long, help = "Continue after the last date already in the output file")]
        resume: bool,

        #[arg(short, long, help = "Hide the progress bar")]
        quiet: bool,
    },

    /// Print the chunk plan for a date range without downloading
    Chunks {
        #[arg(long, help = "Start date YYYY-MM-DD")]
        start_date: String,

        #[arg(long, help = "End date YYYY-MM-DD")]
        end_date: String,

        #[arg(long, help = "Maximum days per request [default: 365]")]
        chunk_days: Option<i64>,
    },
}
