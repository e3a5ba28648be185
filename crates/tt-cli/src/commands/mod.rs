pub mod character;
pub mod encounter;
pub mod instance;
pub mod sweep;

use comfy_table::{ContentArrangement, Table};

use tt_store::JsonFileStore;
use tt_tracker::Tracker;

/// The tracker every command runs against.
pub type Session = Tracker<JsonFileStore>;

/// A table with the shared layout and the given header.
fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Placeholder for an empty optional field.
fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "—".to_string(),
    }
}

/// Pluralise a count for summary lines.
fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}
