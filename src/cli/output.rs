//! Output formatting helpers for CLI commands

use crate::api::{JoinCommand, ProbeOutcome, ProbeSummary, PullJob, Server, ServerStatus};
use crate::archive::{format_bytes, ImageDetails, ProcessingStats, RecentFile, StorageStats};
use crate::registry::RegistryView;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde::Serialize;
use serde_json::json;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);
    table
}

/// Colored status label
pub fn status_label(status: ServerStatus) -> String {
    match status {
        ServerStatus::Online => "online".green().to_string(),
        ServerStatus::Offline => "offline".red().to_string(),
        ServerStatus::Error => "error".red().bold().to_string(),
        ServerStatus::Unknown => "unknown".yellow().to_string(),
    }
}

/// Get status icon for server status
pub fn status_icon(status: ServerStatus) -> &'static str {
    match status {
        ServerStatus::Online => "✓",
        ServerStatus::Offline => "✗",
        ServerStatus::Error => "!",
        ServerStatus::Unknown => "?",
    }
}

/// Header line: online/total, or the loading indicator before the first
/// successful fetch. A failed refresh adds an error line; the table below
/// keeps showing the last good snapshot.
pub fn format_banner(view: &RegistryView) -> String {
    let mut lines = Vec::new();
    if view.is_loading() {
        lines.push("Loading servers...".dimmed().to_string());
    } else {
        lines.push(format!(
            "{} {}/{} online",
            "Compute servers".bold(),
            view.online_count(),
            view.total_count()
        ));
    }
    if let Some(error) = &view.error {
        lines.push(format!("{} {}", "⚠ Refresh failed:".red(), error));
    }
    lines.join("\n")
}

/// Format servers as a table
pub fn format_servers_table(servers: &[Server]) -> String {
    if servers.is_empty() {
        return "No compute servers registered. Add one with `fleet servers add`.".to_string();
    }

    let mut table = new_table(vec![
        "ID", "Name", "URL", "Status", "Priority", "Workers", "Models",
    ]);
    for s in servers {
        let name = if s.enabled {
            s.name.clone()
        } else {
            format!("{} (disabled)", s.name)
        };
        table.add_row(vec![
            Cell::new(&s.id),
            Cell::new(name),
            Cell::new(&s.url),
            Cell::new(format!("{} {}", status_icon(s.status), status_label(s.status))),
            Cell::new(s.priority),
            Cell::new(s.worker_count),
            Cell::new(s.models_available.len()),
        ]);
    }

    table.to_string()
}

/// Expanded card for one server.
pub fn format_server_detail(server: &Server) -> String {
    let mut out = vec![format!(
        "{} {} [{}]",
        server.name.bold(),
        server.url.dimmed(),
        status_label(server.status)
    )];

    if !server.enabled {
        out.push(format!("  {}", "Disabled".yellow()));
    }
    if let Some(message) = server.status_message.as_deref().filter(|m| !m.is_empty()) {
        out.push(format!("  Status: {}", message));
    }

    let capabilities: Vec<&str> = server.active_capabilities().collect();
    if !capabilities.is_empty() {
        out.push(format!("  Capabilities: {}", capabilities.join(", ")));
    }
    if !server.models_available.is_empty() {
        out.push(format!("  Models: {}", server.models_available.join(", ")));
    }
    out.push(format!("  Workers: {}", server.worker_count));
    if let Some(checked) = server.last_health_check {
        out.push(format!(
            "  Last check: {}",
            checked.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    if let Some(reason) = server.delete_blocked_reason() {
        out.push(format!("  {} {}", "Delete disabled:".dimmed(), reason.dimmed()));
    }

    out.join("\n")
}

/// Format servers as JSON
pub fn format_servers_json(servers: &[Server]) -> String {
    to_json(&json!({
        "online": servers.iter().filter(|s| s.is_online()).count(),
        "total": servers.len(),
        "servers": servers,
    }))
}

/// An empty reply body decodes as "not connected, no error"; that only
/// means the probe was accepted.
pub fn format_probe(id: &str, outcome: &ProbeOutcome) -> String {
    match (outcome.connected, outcome.error.as_deref()) {
        (true, _) => format!("{} Server {} is reachable", "✓".green(), id),
        (false, Some(error)) => format!("{} Server {}: {}", "✗".red(), id, error),
        (false, None) => format!("{} Health probe sent to server {}", "✓".green(), id),
    }
}

pub fn format_probe_summary(summary: &ProbeSummary) -> String {
    if summary.total == 0 {
        return format!("{} Health probes sent to all servers", "✓".green());
    }
    format!(
        "{} Probed all servers: {}/{} online",
        "✓".green(),
        summary.online,
        summary.total
    )
}

pub fn format_pull_job(id: &str, job: &PullJob) -> String {
    let model = job.model.as_deref().unwrap_or("model");
    format!(
        "{} Pulling {} on server {} (job {})",
        "✓".green(),
        model,
        id,
        job.job_id
    )
}

pub fn format_join_command(command: &JoinCommand) -> String {
    let mut out = vec![command.command.clone()];
    if !command.notes.is_empty() {
        out.push(String::new());
        out.extend(command.notes.iter().map(|note| format!("  • {}", note)));
    }
    out.join("\n")
}

pub fn format_stats(stats: &ProcessingStats, storage: &StorageStats) -> String {
    let mut table = new_table(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Files"),
        Cell::new(format!(
            "{} / {} processed ({:.1}%)",
            stats.files.processed,
            stats.files.total,
            stats.processed_percent()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Entries"),
        Cell::new(format!(
            "{} total, {} enriched, {} embedded",
            stats.entries.total, stats.entries.enriched, stats.entries.embedded
        )),
    ]);
    table.add_row(vec![
        Cell::new("Storage"),
        Cell::new(format_bytes(storage.total_bytes)),
    ]);
    table.to_string()
}

pub fn format_stats_json(stats: &ProcessingStats, storage: &StorageStats) -> String {
    to_json(&json!({ "counts": stats, "storage": storage }))
}

pub fn format_recent_table(files: &[RecentFile]) -> String {
    if files.is_empty() {
        return "No files ingested yet.".to_string();
    }
    let mut table = new_table(vec!["ID", "File", "Status", "Added"]);
    for f in files {
        let added = f
            .created_at
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&f.id),
            Cell::new(&f.filename),
            Cell::new(&f.status),
            Cell::new(added),
        ]);
    }
    table.to_string()
}

pub fn format_image(image: &ImageDetails) -> String {
    let mut out = vec![format!("{} (#{})", image.filename.bold(), image.id)];
    if let Some((w, h)) = image.dimensions() {
        out.push(format!("  Dimensions: {}×{}", w, h));
    }
    if let Some(size) = image.size_bytes {
        out.push(format!("  Size: {}", format_bytes(size)));
    }
    match image.vision_description.as_deref() {
        Some(text) if !image.needs_analysis() => {
            let model = image.vision_model.as_deref().unwrap_or("unknown model");
            out.push(format!("  Description ({}): {}", model, text));
        }
        _ => out.push(format!(
            "  {} run `fleet images analyze {}`",
            "No AI description yet;".dimmed(),
            image.id
        )),
    }
    if let Some(ocr) = image.ocr_text.as_deref().filter(|t| !t.trim().is_empty()) {
        out.push(format!("  OCR: {}", ocr.trim()));
    }
    out.join("\n")
}

/// Pretty JSON; serializing plain data into a `String` cannot fail.
pub fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
