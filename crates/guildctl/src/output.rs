//! Output formatting: table, JSON, plain.
//!
//! Table uses `tabled`, structured formats use serde, plain emits one
//! `name id` pair per line for scripting.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use guildctl_core::ReconciliationResult;

use crate::cli::OutputFormat;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
}

fn rows(result: &ReconciliationResult) -> Vec<EntityRow> {
    let mut all = Vec::new();
    for (kind, map) in [
        ("role", &result.roles),
        ("category", &result.categories),
        ("channel", &result.channels),
    ] {
        for (name, id) in map {
            all.push(EntityRow {
                kind,
                name: name.clone(),
                id: id.clone(),
            });
        }
    }
    all
}

// ── Render dispatch ─────────────────────────────────────────────────

/// Render the resolved mapping in the chosen format.
pub fn render_result(format: &OutputFormat, result: &ReconciliationResult) -> String {
    match format {
        OutputFormat::Table => Table::new(rows(result)).with(Style::rounded()).to_string(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(result).expect("serialization should not fail")
        }
        OutputFormat::JsonCompact => {
            serde_json::to_string(result).expect("serialization should not fail")
        }
        OutputFormat::Plain => rows(result)
            .iter()
            .map(|r| format!("{} {}", r.name, r.id))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

/// One-line adopted/created/failed summary plus per-failure detail.
pub fn render_summary(result: &ReconciliationResult) -> String {
    let color = io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err();

    let mut out = if color {
        format!(
            "{} adopted, {} created, {} failed",
            result.adopted.green(),
            result.created.green(),
            if result.failed() == 0 {
                result.failed().green().to_string()
            } else {
                result.failed().red().to_string()
            },
        )
    } else {
        format!(
            "{} adopted, {} created, {} failed",
            result.adopted,
            result.created,
            result.failed(),
        )
    };

    for failure in &result.failures {
        let line = format!("\n  ✗ {} {:?}: {}", failure.stage, failure.name, failure.reason);
        out.push_str(&line);
    }
    out
}

/// Print rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}
