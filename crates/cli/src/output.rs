//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use fmc_provider::{Diagnostic, Severity};
use serde::Serialize;
use serde_json::Value;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a single item
pub fn print_item<T: Serialize + TableDisplay>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let mut table = table();
            table.set_header(T::headers());
            table.add_row(item.row());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).unwrap_or_default());
        }
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
                return;
            }
            let mut table = table();
            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// One tracked item of a resource state
#[derive(Debug, Serialize)]
pub struct ItemDisplay {
    pub name: String,
    pub id: String,
    pub r#type: String,
}

impl TableDisplay for ItemDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Name", "ID", "Type"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.name.clone(), self.id.clone(), self.r#type.clone()]
    }
}

/// Items of a resource state, in name order
pub fn state_items(state: &Value) -> Vec<ItemDisplay> {
    let text = |item: &Value, key: &str| item.get(key).and_then(Value::as_str).unwrap_or("-").to_string();

    state
        .get("items")
        .and_then(Value::as_object)
        .map(|items| {
            items
                .iter()
                .map(|(name, item)| ItemDisplay {
                    name: name.clone(),
                    id: text(item, "id"),
                    r#type: text(item, "type"),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Print the items of a resource state
pub fn print_state(state: Option<&Value>, format: OutputFormat) {
    match (state, format) {
        (Some(state), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(state).unwrap_or_default());
        }
        (Some(state), OutputFormat::Table) => print_list(&state_items(state), format),
        (None, OutputFormat::Json) => println!("null"),
        (None, OutputFormat::Table) => print_info("No state left"),
    }
}

/// Print provider diagnostics to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity {
            Severity::Error => print_error(&format!("{}: {}", diagnostic.summary, diagnostic.detail)),
            Severity::Warning => print_warning(&format!("{}: {}", diagnostic.summary, diagnostic.detail)),
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// Print warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "!".yellow().bold(), message.yellow());
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "i".blue().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_items_in_name_order() {
        let state = json!({
            "id": "res-1",
            "items": {
                "reply": {"id": "6", "type": "ICMPV4Object"},
                "echo": {"id": null}
            }
        });

        let rows: Vec<Vec<String>> = state_items(&state).iter().map(TableDisplay::row).collect();
        assert_eq!(rows[0], vec!["echo", "-", "-"]);
        assert_eq!(rows[1], vec!["reply", "6", "ICMPV4Object"]);
    }

    #[test]
    fn test_state_without_items() {
        assert!(state_items(&json!({"id": "x"})).is_empty());
    }
}
