use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::{warn, Level};
use validator::Validate;

use crate::cli::args::{Cli, Commands};
use crate::config::Settings;
use crate::error::{FetchError, Result};
use crate::models::{DateRange, Location, VariableSet};
use crate::processors::{chunk_range, ChunkedFetcher, FetchRequest};
use crate::utils::generate_default_csv_filename;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Fetch {
            lat,
            lon,
            start_date,
            end_date,
            output_file,
            daily_vars,
            hourly_vars,
            timezone,
            chunk_days,
            retries,
            retry_delay_ms,
            timeout_secs,
            pause_ms,
            resume,
            quiet,
        } => {
            if let Some(timezone) = timezone {
                settings.timezone = timezone;
            }
            if let Some(days) = chunk_days {
                settings.chunk_days = days;
            }
            if let Some(attempts) = retries {
                settings.max_attempts = attempts;
            }
            if let Some(ms) = retry_delay_ms {
                settings.retry_delay_ms = ms;
            }
            if let Some(secs) = timeout_secs {
                settings.timeout_secs = secs;
            }
            if let Some(ms) = pause_ms {
                settings.pause_ms = ms;
            }
            settings.validate()?;

            let location = Location::new(lat, lon)?;
            let range = DateRange::parse(&start_date, &end_date)?;
            let variables = VariableSet::parse(&daily_vars, &hourly_vars)?;
            let explicit_output = output_file.is_some();
            let output = output_file.unwrap_or_else(|| generate_default_csv_filename(&location));
            if let Some(note) = resume_note(resume, explicit_output, &output) {
                warn!("{}", note);
                println!("Note: {}", note);
            }

            println!(
                "Fetching historical weather for lat={}, lon={}, from {} to {} ...",
                location.latitude,
                location.longitude,
                range.start(),
                range.end()
            );
            println!("Output file: {}", output.display());

            let request = FetchRequest {
                location,
                range,
                variables,
                output,
                resume,
            };

            let summary = ChunkedFetcher::new(settings)
                .with_progress(!quiet)
                .run(&request)
                .await?;

            if let Some(last) = summary.resumed_from {
                println!("Resumed after {}", last);
            }
            for warning in &summary.warnings {
                println!("Warning: {} (cells left empty)", warning);
            }
            println!(
                "Done. Saved {} rows from {} chunk(s) to {}",
                summary.rows_written,
                summary.chunks_written,
                summary.output.display()
            );
        }

        Commands::Chunks {
            start_date,
            end_date,
            chunk_days,
        } => {
            let range = DateRange::parse(&start_date, &end_date)?;
            let span = chunk_days.unwrap_or(settings.chunk_days);

            let chunks = chunk_range(&range, span)?;
            println!("{} chunk(s) of at most {} days for {}", chunks.len(), span, range);
            for chunk in chunks {
                println!(
                    "{:>4}  {}  {}  ({} days)",
                    chunk.index,
                    chunk.start(),
                    chunk.end(),
                    chunk.range.days()
                );
            }
        }
    }

    Ok(())
}

/// Generated names carry today's date, so resuming without `-o` only finds
/// a file written earlier the same day.
fn resume_note(resume: bool, explicit_output: bool, output: &Path) -> Option<String> {
    if !resume || explicit_output {
        return None;
    }
    let existing = if output.exists() {
        "resuming it"
    } else {
        "it does not exist yet, so the download starts from the beginning"
    };
    Some(format!(
        "--resume without -o uses the generated name {} ({}); pass -o to continue an older file",
        output.display(),
        existing
    ))
}

/// Stderr gets warnings (debug with `--verbose`); a log file gets info and up.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let result = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_max_level(if verbose { Level::DEBUG } else { Level::WARN })
            .with_writer(std::io::stderr)
            .try_init(),
    };

    result.map_err(|e| FetchError::Logging(e.to_string()))
}
