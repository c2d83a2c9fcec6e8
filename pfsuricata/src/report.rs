use std::collections::BTreeSet;

use colored::Colorize;
use serde_json::json;

use crate::reconcile::{Outcome, Record};

/// Quote a value for the pseudo-CLI command log.
pub fn quote_value(value: &str) -> String {
    format!("'{}'", value.replace('\'', "\\'"))
}

/// `, field='value'` for every non-empty field except `key`.
pub fn format_created_fields(after: &Record, key: &str) -> String {
    after
        .iter()
        .filter(|(field, value)| field.as_str() != key && !value.is_empty())
        .map(|(field, value)| format!(", {field}={}", quote_value(value)))
        .collect()
}

/// `field='new'` for every field that differs between the two snapshots,
/// `field=none` for fields that disappeared.
pub fn format_updated_fields(before: &Record, after: &Record) -> String {
    let fields: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    fields
        .into_iter()
        .filter_map(|field| match (before.get(field), after.get(field)) {
            (old, Some(new)) if old != Some(new) => Some(format!("{field}={}", quote_value(new))),
            (Some(_), None) => Some(format!("{field}=none")),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render an outcome for terminal output.
pub fn render_text(outcome: &Outcome) -> String {
    let mut out = Vec::new();
    let status = format!("module={} changed={}", outcome.module, outcome.changed);
    out.push(if outcome.changed {
        status.yellow().to_string()
    } else {
        status.green().to_string()
    });

    for command in &outcome.commands {
        out.push(format!("  {}", command.cyan()));
    }
    if let Some(before) = &outcome.diff.before {
        for line in render_record(before) {
            out.push(format!("- {line}").red().to_string());
        }
    }
    if let Some(after) = &outcome.diff.after {
        for line in render_record(after) {
            out.push(format!("+ {line}").green().to_string());
        }
    }
    out.join("\n")
}

/// Render an outcome as the JSON result object.
pub fn render_json(outcome: &Outcome) -> serde_json::Value {
    json!({
        "module": outcome.module,
        "changed": outcome.changed,
        "commands": outcome.commands,
        "diff": {
            "before": outcome.diff.before,
            "after": outcome.diff.after,
        },
        "reload": outcome.reload,
    })
}

fn render_record(record: &Record) -> Vec<String> {
    record
        .iter()
        .map(|(field, value)| format!("{field}={}", value.escape_debug()))
        .collect()
}
