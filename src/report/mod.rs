pub mod table;
pub mod json;

use crate::scan::HistoryEntry;

pub fn print_result(entry: &HistoryEntry, json_output: bool) -> serde_json::Result<()> {
    if json_output {
        println!("{}", json::render_result(entry)?);
    } else {
        print!("{}", table::render_result(entry));
    }

    Ok(())
}

pub fn print_history(entries: &[HistoryEntry], json_output: bool) -> serde_json::Result<()> {
    if json_output {
        println!("{}", json::render_history(entries)?);
    } else {
        print!("{}", table::render_history(entries));
    }

    Ok(())
}
