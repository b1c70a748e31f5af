use chrono::NaiveDate;
use csv::StringRecord;
use std::path::Path;

use crate::error::{FetchError, Result};

/// Where an interrupted run left off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumePoint {
    /// No usable output yet: start from scratch and write the header.
    Fresh,
    /// Output has rows up to and including this date.
    After(NaiveDate),
}

/// Reads back an existing output file to find the last written date.
pub struct ResumeReader<'a> {
    expected_columns: &'a [String],
}

impl<'a> ResumeReader<'a> {
    pub fn new(expected_columns: &'a [String]) -> Self {
        Self { expected_columns }
    }

    pub fn resume_point(&self, path: &Path) -> Result<ResumePoint> {
        if !path.exists() {
            return Ok(ResumePoint::Fresh);
        }

        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Ok(ResumePoint::Fresh);
        }
        if !headers.iter().eq(self.expected_columns.iter().map(String::as_str)) {
            return Err(resume_error(
                path,
                format!(
                    "columns [{}] do not match requested [{}]",
                    headers.iter().collect::<Vec<_>>().join(","),
                    self.expected_columns.join(",")
                ),
            ));
        }

        // stream to the end so memory stays at one record
        let mut last = StringRecord::new();
        let mut record = StringRecord::new();
        let mut seen = false;
        while reader.read_record(&mut record)? {
            std::mem::swap(&mut last, &mut record);
            seen = true;
        }
        if !seen {
            return Ok(ResumePoint::Fresh);
        }

        let time = last.get(0).unwrap_or_default();
        let date = time
            .get(..10)
            .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
            .ok_or_else(|| resume_error(path, format!("last row has unreadable time '{}'", time)))?;

        Ok(ResumePoint::After(date))
    }
}

fn resume_error(path: &Path, reason: String) -> FetchError {
    FetchError::Resume {
        path: path.display().to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn columns() -> Vec<String> {
        ["time", "timezone", "rain_sum"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_missing_file_is_fresh() -> Result<()> {
        let cols = columns();
        let point = ResumeReader::new(&cols).resume_point(Path::new("does/not/exist.csv"))?;
        assert_eq!(point, ResumePoint::Fresh);
        Ok(())
    }

    #[test]
    fn test_header_only_is_fresh() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "time,timezone,rain_sum")?;

        let cols = columns();
        assert_eq!(
            ResumeReader::new(&cols).resume_point(temp_file.path())?,
            ResumePoint::Fresh
        );
        Ok(())
    }

    #[test]
    fn test_last_daily_row() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "time,timezone,rain_sum")?;
        writeln!(temp_file, "2020-01-01,GMT,0.0")?;
        writeln!(temp_file, "2020-01-02,GMT,")?;

        let cols = columns();
        assert_eq!(
            ResumeReader::new(&cols).resume_point(temp_file.path())?,
            ResumePoint::After(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
        );
        Ok(())
    }

    #[test]
    fn test_last_hourly_row() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "time,timezone,rain_sum")?;
        writeln!(temp_file, "2020-03-31 23:00:00,GMT,0.1")?;

        let cols = columns();
        assert_eq!(
            ResumeReader::new(&cols).resume_point(temp_file.path())?,
            ResumePoint::After(NaiveDate::from_ymd_opt(2020, 3, 31).unwrap())
        );
        Ok(())
    }

    #[test]
    fn test_column_mismatch_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "time,timezone,snowfall_sum")?;
        writeln!(temp_file, "2020-01-01,GMT,0.0")?;

        let cols = columns();
        assert!(matches!(
            ResumeReader::new(&cols).resume_point(temp_file.path()),
            Err(FetchError::Resume { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_unreadable_time_rejected() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        writeln!(temp_file, "time,timezone,rain_sum")?;
        writeln!(temp_file, "yesterday,GMT,0.0")?;

        let cols = columns();
        assert!(ResumeReader::new(&cols).resume_point(temp_file.path()).is_err());
        Ok(())
    }
}
