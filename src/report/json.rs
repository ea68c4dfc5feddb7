//! JSON output for scripting and piping.

use crate::scan::HistoryEntry;

pub fn render_result(entry: &HistoryEntry) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entry)
}

pub fn render_history(entries: &[HistoryEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}
