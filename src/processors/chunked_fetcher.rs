use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::client::{build_http_client, ArchiveClient};
use crate::config::Settings;
use crate::error::{FetchError, Result};
use crate::models::{Chunk, DateRange, Location, VariableSet};
use crate::processors::chunker::chunk;
use crate::processors::flattener::{flatten, missing_variables, PartialDataWarning};
use crate::readers::{ResumePoint, ResumeReader};
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvSink;

/// Everything needed to download one location's history into one file.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub location: Location,
    pub range: DateRange,
    pub variables: VariableSet,
    pub output: PathBuf,
    pub resume: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Chunking,
    Fetching,
    Flattening,
    Writing,
    Done,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub chunks_written: usize,
    pub rows_written: usize,
    /// Last date already present in the output when resuming.
    pub resumed_from: Option<NaiveDate>,
    pub warnings: Vec<PartialDataWarning>,
}

/// Sequential chunk loop: fetch, flatten, append, pause, repeat.
pub struct ChunkedFetcher {
    settings: Settings,
    silent: bool,
}

impl ChunkedFetcher {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            silent: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.silent = !show_progress;
        self
    }

    pub async fn run(&self, request: &FetchRequest) -> Result<RunSummary> {
        let mut state = RunState::Idle;
        let result = self.run_chunks(request, &mut state).await;

        match &result {
            Ok(summary) => {
                transition(&mut state, RunState::Done);
                info!(
                    chunks = summary.chunks_written,
                    rows = summary.rows_written,
                    path = %summary.output.display(),
                    "download complete"
                );
            }
            Err(e) => {
                let failed_in = state;
                transition(&mut state, RunState::Failed);
                error!(
                    ?failed_in,
                    error = %e,
                    path = %request.output.display(),
                    "download aborted; chunks already written are kept"
                );
            }
        }

        result
    }

    async fn run_chunks(&self, request: &FetchRequest, state: &mut RunState) -> Result<RunSummary> {
        transition(state, RunState::Chunking);

        let sink = CsvSink::new(&request.variables);
        let mut summary = RunSummary {
            output: request.output.clone(),
            chunks_written: 0,
            rows_written: 0,
            resumed_from: None,
            warnings: Vec::new(),
        };

        let mut start = request.range.start();
        let mut header_pending = true;

        if request.resume {
            if let ResumePoint::After(last) =
                ResumeReader::new(sink.columns()).resume_point(&request.output)?
            {
                summary.resumed_from = Some(last);
                header_pending = false;

                if last >= request.range.end() {
                    info!(%last, "output already covers the requested range");
                    return Ok(summary);
                }
                // last < end, so the successor exists
                start = last.succ_opt().map_or(start, |next| next.max(start));
                info!(%last, %start, "resuming after last written date");
            }
        }

        let chunks = chunk(start, request.range.end(), self.settings.chunk_days)?;
        let total = chunks.len();
        info!(
            chunks = total,
            latitude = request.location.latitude,
            longitude = request.location.longitude,
            "fetching {} to {}",
            start,
            request.range.end()
        );

        // one session for the whole run, dropped on every exit path
        let http = build_http_client(self.settings.timeout())?;
        let client = ArchiveClient::new(&http, &self.settings.base_url)?
            .with_timezone(&self.settings.timezone)
            .with_retry(self.settings.retry_policy());

        let progress = ProgressReporter::new(total as u64, self.silent);

        for chunk in chunks {
            progress.chunk_started(&chunk);
            info!(chunk = chunk.index, "fetching chunk {} to {}", chunk.start(), chunk.end());

            transition(state, RunState::Fetching);
            let response = client
                .fetch(&request.location, &chunk.range, &request.variables)
                .await
                .map_err(|e| in_chunk(&chunk, e))?;

            transition(state, RunState::Flattening);
            for warning in missing_variables(&response, &request.variables) {
                if !summary.warnings.contains(&warning) {
                    warn!(chunk = chunk.index, "{}", warning);
                    summary.warnings.push(warning);
                }
            }
            let rows = flatten(&response, &request.variables);
            drop(response);

            transition(state, RunState::Writing);
            let written = sink
                .write(&rows, &request.output, header_pending)
                .map_err(|e| in_chunk(&chunk, e))?;
            header_pending = false;

            summary.chunks_written += 1;
            summary.rows_written += written;
            progress.chunk_finished();

            if chunk.index + 1 < total {
                tokio::time::sleep(self.settings.pause()).await;
            }
        }

        progress.finish_with_message("done");
        Ok(summary)
    }
}

fn transition(state: &mut RunState, next: RunState) {
    let from = *state;
    if from != next {
        debug!(?from, to = ?next, "state change");
        *state = next;
    }
}

fn in_chunk(chunk: &Chunk, source: FetchError) -> FetchError {
    FetchError::ChunkFailed {
        index: chunk.index,
        range: chunk.range,
        source: Box::new(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(output: PathBuf, resume: bool) -> FetchRequest {
        FetchRequest {
            location: Location::new(51.5, -0.12).unwrap(),
            range: DateRange::new(date(2020, 1, 1), date(2020, 1, 10)).unwrap(),
            variables: VariableSet::parse("rain_sum", "").unwrap(),
            output,
            resume,
        }
    }

    fn offline_settings() -> Settings {
        Settings {
            // nothing listens on the discard port
            base_url: "http://127.0.0.1:9/v1/archive".to_string(),
            max_attempts: 1,
            retry_delay_ms: 0,
            timeout_secs: 1,
            pause_ms: 0,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_resume_when_already_complete_is_noop() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("weather.csv");
        std::fs::write(&output, "time,timezone,rain_sum\n2020-01-10,GMT,0.0\n")?;

        let summary = ChunkedFetcher::new(offline_settings())
            .run(&request(output.clone(), true))
            .await?;

        assert_eq!(summary.chunks_written, 0);
        assert_eq!(summary.resumed_from, Some(date(2020, 1, 10)));
        assert_eq!(
            std::fs::read_to_string(&output)?,
            "time,timezone,rain_sum\n2020-01-10,GMT,0.0\n"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_unreachable_archive_reports_chunk() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("weather.csv");

        let err = ChunkedFetcher::new(offline_settings())
            .run(&request(output.clone(), false))
            .await
            .unwrap_err();

        match err {
            FetchError::ChunkFailed { index, range, source } => {
                assert_eq!(index, 0);
                assert_eq!(range.start(), date(2020, 1, 1));
                assert!(matches!(*source, FetchError::FetchExhausted { attempts: 1, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!output.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_chunk_span_fails_before_network() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let settings = Settings {
            chunk_days: 0,
            ..offline_settings()
        };

        let err = ChunkedFetcher::new(settings)
            .run(&request(temp_dir.path().join("weather.csv"), false))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidRange { .. }));
        Ok(())
    }
}
