//! Plain-text rendering of snapshots for the terminal.
//!
//! Renderers only read snapshots and return strings; printing is left to the
//! commands.

use chrono::{DateTime, NaiveDateTime};
use console::style;
use std::fmt::Write;

use super::icons::{CHECK, CROSS, FOLDER, PENDING};
use crate::generation::{AdvertorialVariant, GenerationPhase, GenerationState, Slot};
use crate::research::{ResearchRecord, ResearchSnapshot};

const DEFAULT_WIDTH: usize = 80;
const MAX_WIDTH: usize = 100;

/// Current terminal width, clamped for readability.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
        .min(MAX_WIDTH)
}

/// Format a service timestamp as `YYYY-MM-DD HH:MM`. Unparseable values are
/// returned unchanged.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.to_string()
}

pub fn research_list(snapshot: &ResearchSnapshot) -> String {
    let mut out = String::new();
    if let Some(err) = &snapshot.error {
        let _ = writeln!(out, "{} {}", style("Error:").red().bold(), err.message);
    }
    if snapshot.records.is_empty() {
        if snapshot.loaded {
            let _ = writeln!(out, "No research yet. Run `marketlens research analyze <url>`.");
        }
        return out;
    }
    let _ = writeln!(out, "{}", style("Research").bold().cyan());
    for record in snapshot.records.iter() {
        let _ = writeln!(
            out,
            "  {}{}  {}  {}",
            FOLDER,
            style(record.id.as_str()).dim(),
            record.name,
            style(format_timestamp(&record.created_at)).dim()
        );
    }
    out
}

/// A JSON insight is either a bare string or an object; show strings as-is.
fn value_line(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn research_detail(record: &ResearchRecord, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", style(&record.name).bold().cyan());
    let _ = writeln!(out, "  id:      {}", record.id);
    if !record.source.is_empty() {
        let _ = writeln!(out, "  source:  {}", record.source);
    }
    if !record.created_at.is_empty() {
        let _ = writeln!(out, "  created: {}", format_timestamp(&record.created_at));
    }
    if !record.urls.is_empty() {
        let _ = writeln!(out, "\n{}", style("URLs").bold());
        for url in &record.urls {
            let _ = writeln!(out, "  - {}", url);
        }
    }
    let sections = [
        ("Community insights", &record.community_analysis.insights),
        ("Market opportunities", &record.market_analysis.opportunities),
    ];
    let options = textwrap::Options::new(width.saturating_sub(2).max(20))
        .initial_indent("  - ")
        .subsequent_indent("    ");
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{}", style(title).bold());
        for item in items {
            let _ = writeln!(out, "{}", textwrap::fill(&value_line(item), &options));
        }
    }
    out
}

pub fn phase_label(phase: GenerationPhase) -> String {
    match phase {
        GenerationPhase::Idle => style("idle").dim().to_string(),
        GenerationPhase::Generating => style("generating").yellow().to_string(),
        GenerationPhase::PartiallyReady => style("partially ready").yellow().to_string(),
        GenerationPhase::Ready => style("ready").green().to_string(),
        GenerationPhase::Failed => style("failed").red().to_string(),
    }
}

pub fn generation_summary(state: &GenerationState, width: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        style("Generation:").bold(),
        phase_label(state.phase)
    );
    if let Some(err) = &state.error {
        let _ = writeln!(out, "{}{}", CROSS, err);
    }
    let options = textwrap::Options::new(width.max(20))
        .initial_indent("    ")
        .subsequent_indent("    ");
    for variant in AdvertorialVariant::ALL {
        match state.set.slot(variant) {
            Slot::Absent => {}
            Slot::Pending => {
                let _ = writeln!(out, "\n{}{}", PENDING, style(variant.title()).bold());
            }
            Slot::Loaded(artifact) => {
                let _ = writeln!(out, "\n{}{}", CHECK, style(variant.title()).bold());
                let _ = writeln!(out, "{}", textwrap::fill(artifact.text(), &options));
            }
            Slot::Failed(err) => {
                let _ = writeln!(
                    out,
                    "\n{}{} {}",
                    CROSS,
                    style(variant.title()).bold(),
                    style(&err.message).red()
                );
            }
        }
    }
    out
}
