use serde::Serialize;
use serde_json::Value;

use crate::models::Granularity;

/// One flattened output line.
///
/// `values` is aligned with the variable columns of the request's
/// `VariableSet` (daily codes, then hourly codes); cells that belong to the
/// other granularity or were missing from the response are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub granularity: Granularity,
    pub time: String,
    pub timezone: String,
    pub values: Vec<Option<Value>>,
}

impl Row {
    /// Cell text in output column order: time, timezone, then every value.
    pub fn record(&self) -> Vec<String> {
        let mut record = Vec::with_capacity(self.values.len() + 2);
        record.push(self.time.clone());
        record.push(self.timezone.clone());
        record.extend(self.values.iter().map(|cell| cell_text(cell.as_ref())));
        record
    }
}

/// Render a JSON cell the way the archive sent it; strings lose their quotes.
pub fn cell_text(cell: Option<&Value>) -> String {
    match cell {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
