//! CSV export of daily totals and log entries.

use std::collections::BTreeMap;

use crate::format::format_hms;
use crate::totals::DailyTotals;
use crate::types::DayKey;

/// Free-text notes per local day.
pub type DailyLog = BTreeMap<DayKey, String>;

/// Decodes a stored log record entry by entry.
///
/// Entries whose key is not a valid day or whose value is not a string are
/// dropped with a warning; the rest are kept. Fails only when the record is
/// not a JSON object.
pub fn decode_daily_log(raw: &str) -> Result<DailyLog, serde_json::Error> {
    let entries: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
    let logs = entries
        .into_iter()
        .filter_map(|(key, value)| {
            let day = match key.parse::<DayKey>() {
                Ok(day) => day,
                Err(e) => {
                    tracing::warn!(%key, error = %e, "dropping log entry with invalid day");
                    return None;
                }
            };
            match value {
                serde_json::Value::String(text) => Some((day, text)),
                other => {
                    tracing::warn!(%day, value = %other, "dropping non-text log entry");
                    None
                }
            }
        })
        .collect();
    Ok(logs)
}

pub const CSV_HEADER: &str = "Date,Activity Log,Time Tracked (HH:MM:SS)";

/// Days that produce an export row: those with positive tracked time.
pub fn tracked_days(totals: &DailyTotals) -> impl Iterator<Item = (&DayKey, i64)> {
    totals
        .iter()
        .filter(|&(_, &ms)| ms > 0)
        .map(|(day, &ms)| (day, ms))
}

/// Renders one row per day with tracked time, ascending by day.
///
/// Every field is quoted with embedded quotes doubled. Days that only have a
/// log entry are left out. The header is always followed by `\n`; rows are
/// joined by `\n` with none after the last, so an export without tracked
/// days is the header line alone.
pub fn export_csv(totals: &DailyTotals, logs: &DailyLog) -> String {
    let rows: Vec<String> = tracked_days(totals)
        .map(|(day, ms)| {
            let log = logs.get(day).map_or("", String::as_str);
            format!(
                "{},{},{}",
                quote(&day.to_string()),
                quote(log),
                quote(&format_hms(ms))
            )
        })
        .collect();

    format!("{CSV_HEADER}\n{}", rows.join("\n"))
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
