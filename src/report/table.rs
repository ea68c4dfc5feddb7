//! Terminal rendering for scan results and history.
//!
//! - Result card: risk badge, summary, product, reasoning, flagged ingredients
//! - History: one row per entry, newest first

use crate::scan::{HistoryEntry, Variant};

fn badge(entry: &HistoryEntry) -> String {
    let marker = match entry.result.variant() {
        Variant::Alert => "[!]",
        Variant::Info => "[i]",
        Variant::Success => "[ok]",
    };

    format!("{marker} {}", entry.result.risk_level.as_str().to_uppercase())
}

fn local_time(entry: &HistoryEntry) -> String {
    entry
        .created_at()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub fn render_result(entry: &HistoryEntry) -> String {
    let result = &entry.result;
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", badge(entry)));
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!("{}\n", result.summary));
    output.push_str(&format!("{}\n\n", result.product_name));
    output.push_str(&format!("{}\n", result.reasoning));

    if !result.highlight_ingredients.is_empty() {
        output.push_str("\nflagged ingredients:\n");
        for ingredient in &result.highlight_ingredients {
            output.push_str(&format!("  - {ingredient}\n"));
        }
    }

    output.push_str(&format!("\nimage: {}\n", result.image));
    output.push_str(&format!("scanned: {} (#{})\n", local_time(entry), entry.id));

    output
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return String::from("No scans yet.\n");
    }

    let mut output = String::new();

    output.push_str(&format!(
        "{:<15} {:<20} {:<10} {:<24} {}\n",
        "ID", "Date", "Risk", "Product", "Summary"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    for entry in entries {
        output.push_str(&format!(
            "{:<15} {:<20} {:<10} {:<24} {}\n",
            entry.id,
            local_time(entry),
            entry.result.risk_level.as_str(),
            truncate(&entry.result.product_name, 24),
            truncate(&entry.result.summary, 30)
        ));
    }

    output
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}
