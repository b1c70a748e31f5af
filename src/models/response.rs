use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::models::Granularity;

/// Body returned by the archive endpoint.
///
/// Only the fields the downloader reads are modelled; metadata such as
/// `elevation` or the `*_units` blocks is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveResponse {
    #[serde(default)]
    pub timezone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<SeriesBlock>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly: Option<SeriesBlock>,
}

impl ArchiveResponse {
    pub fn block(&self, granularity: Granularity) -> Option<&SeriesBlock> {
        match granularity {
            Granularity::Daily => self.daily.as_ref(),
            Granularity::Hourly => self.hourly.as_ref(),
        }
    }
}

/// One granularity's co-indexed arrays: `time` plus one array per variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesBlock {
    #[serde(default)]
    pub time: Vec<String>,

    #[serde(flatten)]
    pub series: HashMap<String, Value>,
}

impl SeriesBlock {
    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn has(&self, code: &str) -> bool {
        matches!(self.series.get(code), Some(Value::Array(_)))
    }

    /// Value of `code` at `index`; `None` when the series is absent, shorter
    /// than `time`, or the archive reported `null`.
    pub fn value(&self, code: &str, index: usize) -> Option<&Value> {
        match self.series.get(code) {
            Some(Value::Array(values)) => values.get(index).filter(|v| !v.is_null()),
            _ => None,
        }
    }
}
