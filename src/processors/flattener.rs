use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

use crate::models::{ArchiveResponse, Granularity, Row, VariableSet};

/// A requested variable the archive did not return. Not an error: the
/// affected cells are left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialDataWarning {
    pub granularity: Granularity,
    pub code: String,
}

impl fmt::Display for PartialDataWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variable '{}' missing from archive response",
            self.granularity, self.code
        )
    }
}

/// Turn one archive response into output rows.
///
/// Daily rows come first, then hourly rows, each in the archive's time order.
/// Never fails: absent series and short arrays produce empty cells.
pub fn flatten(response: &ArchiveResponse, variables: &VariableSet) -> Vec<Row> {
    let mut rows = Vec::new();

    for granularity in Granularity::ALL {
        let codes = variables.get(granularity);
        if codes.is_empty() {
            continue;
        }
        let Some(block) = response.block(granularity) else {
            continue;
        };

        let offset = variables.offset(granularity);
        rows.reserve(block.len());

        for (index, time) in block.time.iter().enumerate() {
            let mut values = vec![None; variables.len()];
            for (slot, code) in values[offset..offset + codes.len()].iter_mut().zip(codes) {
                *slot = block.value(code, index).cloned();
            }

            rows.push(Row {
                granularity,
                time: normalize_time(time),
                timezone: response.timezone.clone(),
                values,
            });
        }
    }

    rows
}

/// Requested codes that are absent from the response, including every code
/// of a requested granularity whose block is missing altogether.
pub fn missing_variables(
    response: &ArchiveResponse,
    variables: &VariableSet,
) -> Vec<PartialDataWarning> {
    Granularity::ALL
        .iter()
        .flat_map(|&granularity| {
            let block = response.block(granularity);
            variables
                .get(granularity)
                .iter()
                .filter(move |code| !block.is_some_and(|b| b.has(code)))
                .map(move |code| PartialDataWarning {
                    granularity,
                    code: code.clone(),
                })
        })
        .collect()
}

/// Dates stay `YYYY-MM-DD`; ISO timestamps become `YYYY-MM-DD HH:MM:SS`.
/// Anything unrecognised passes through untouched.
pub fn normalize_time(raw: &str) -> String {
    if NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok() {
        return raw.to_string();
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}
