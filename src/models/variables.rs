use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FetchError, Result};
use crate::utils::constants::{TIMEZONE_COLUMN, TIME_COLUMN};

/// Time resolution of an archive series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Hourly,
}

impl Granularity {
    pub const ALL: [Granularity; 2] = [Granularity::Daily, Granularity::Hourly];

    /// Query parameter name and JSON key used by the archive.
    pub fn key(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily",
            Granularity::Hourly => "hourly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Requested variable codes, split by granularity.
///
/// The two lists are disjoint and at least one is non-empty. Order is kept
/// because it decides the column order of the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawVariableSet")]
pub struct VariableSet {
    daily: Vec<String>,
    hourly: Vec<String>,
}

#[derive(Deserialize)]
struct RawVariableSet {
    #[serde(default)]
    daily: Vec<String>,
    #[serde(default)]
    hourly: Vec<String>,
}

impl TryFrom<RawVariableSet> for VariableSet {
    type Error = FetchError;

    fn try_from(raw: RawVariableSet) -> Result<Self> {
        Self::new(raw.daily, raw.hourly)
    }
}

impl VariableSet {
    pub fn new<D, H>(daily: D, hourly: H) -> Result<Self>
    where
        D: IntoIterator,
        D::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        let daily = normalize(daily)?;
        let hourly = normalize(hourly)?;

        if daily.is_empty() && hourly.is_empty() {
            return Err(FetchError::InvalidVariables(
                "at least one daily or hourly variable is required".to_string(),
            ));
        }

        if let Some(shared) = daily.iter().find(|code| hourly.contains(code)) {
            return Err(FetchError::InvalidVariables(format!(
                "'{}' is requested as both daily and hourly",
                shared
            )));
        }

        Ok(Self { daily, hourly })
    }

    /// Parse two comma-separated lists such as `"temperature_2m_max, rain_sum"`.
    pub fn parse(daily: &str, hourly: &str) -> Result<Self> {
        Self::new(split_codes(daily), split_codes(hourly))
    }

    pub fn daily(&self) -> &[String] {
        &self.daily
    }

    pub fn hourly(&self) -> &[String] {
        &self.hourly
    }

    pub fn get(&self, granularity: Granularity) -> &[String] {
        match granularity {
            Granularity::Daily => &self.daily,
            Granularity::Hourly => &self.hourly,
        }
    }

    /// All variable codes, daily first.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.daily.iter().chain(self.hourly.iter()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.daily.len() + self.hourly.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of the first column belonging to `granularity` among the
    /// variable cells of a row.
    pub fn offset(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Daily => 0,
            Granularity::Hourly => self.daily.len(),
        }
    }

    /// Output header: `time`, `timezone`, then every variable code.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns = Vec::with_capacity(self.len() + 2);
        columns.push(TIME_COLUMN);
        columns.push(TIMEZONE_COLUMN);
        columns.extend(self.codes());
        columns
    }
}

fn split_codes(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize<I>(codes: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for code in codes {
        let code: String = code.into();
        let code = code.trim();
        if code.is_empty() {
            return Err(FetchError::InvalidVariables(
                "empty variable code".to_string(),
            ));
        }
        if code.contains(',') {
            return Err(FetchError::InvalidVariables(format!(
                "variable code '{}' contains a comma",
                code
            )));
        }
        if !out.iter().any(|existing| existing == code) {
            out.push(code.to_string());
        }
    }
    Ok(out)
}
