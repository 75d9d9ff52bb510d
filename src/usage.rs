//! Token usage and cost derived from the session history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Usage of the most recent assistant turn. Only `cost` is summed across turns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageSnapshot {
    pub input: u64,
    pub cache_read: u64,
    pub cache_write: u64,
    pub cost: f64,
}

impl UsageSnapshot {
    pub fn cached(&self) -> u64 {
        self.cache_read.saturating_add(self.cache_write)
    }
}

/// One entry of the session log, as supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default, deserialize_with = "lenient_number")]
    pub input: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub output: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cache_read: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub cache_write: f64,
    #[serde(default)]
    pub cost: Option<UsageCost>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageCost {
    #[serde(default, deserialize_with = "lenient_number")]
    pub total: f64,
}

/// Accept numbers, numeric strings, or anything else as 0.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(to_number(&value))
}

/// Like `lenient_number`, but `null` or an absent field stays `None`.
pub(crate) fn lenient_opt_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(to_number(&other)),
    })
}

/// Entry list that never fails as a whole; see [`entries_from_values`].
pub(crate) fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<SessionEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_array().map(|values| entries_from_values(values)).unwrap_or_default())
}

pub fn to_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(true) => 1.0,
        _ => 0.0,
    };
    if n.is_finite() { n } else { 0.0 }
}

/// Decode entries one by one; an entry that does not fit the schema becomes a default (skipped) entry.
pub fn entries_from_values(values: &[Value]) -> Vec<SessionEntry> {
    values
        .iter()
        .map(|value| SessionEntry::deserialize(value).unwrap_or_default())
        .collect()
}

fn non_negative_tokens(n: f64) -> u64 {
    if n > 0.0 { n as u64 } else { 0 }
}

/// Result of replaying the session history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsageData {
    pub latest: Option<UsageSnapshot>,
    pub total_cost: f64,
    pub started_at: Option<DateTime<Utc>>,
}

impl UsageData {
    /// Milliseconds since the first entry, or 0 when its timestamp is unknown.
    pub fn elapsed_ms(&self, now: DateTime<Utc>) -> u64 {
        self.started_at
            .map(|start| (now - start).num_milliseconds().max(0) as u64)
            .unwrap_or(0)
    }
}

/// Walk `entries` in order and keep the last assistant usage plus the summed cost.
pub fn usage_data(entries: &[SessionEntry]) -> UsageData {
    let mut latest = None;
    let mut total_cost = 0.0;

    for entry in entries {
        if entry.kind != "message" {
            continue;
        }
        let Some(message) = &entry.message else { continue };
        if message.role != "assistant" {
            continue;
        }
        let Some(usage) = &message.usage else { continue };

        let snapshot = UsageSnapshot {
            input: non_negative_tokens(usage.input),
            cache_read: non_negative_tokens(usage.cache_read),
            cache_write: non_negative_tokens(usage.cache_write),
            cost: usage.cost.as_ref().map_or(0.0, |c| c.total.max(0.0)),
        };
        total_cost += snapshot.cost;
        latest = Some(snapshot);
    }

    let started_at = entries
        .first()
        .and_then(|entry| entry.timestamp.as_deref())
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc));

    UsageData {
        latest,
        total_cost,
        started_at,
    }
}
