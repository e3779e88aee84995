//! Human-readable match report, oldest event first.

use tagging::MatchExport;

const HEADER_RULE: &str = "================================================";
const ENTRY_RULE: &str = "------------------------------------------------";

pub fn render(export: &MatchExport) -> String {
    let info = &export.info;
    let mut lines = vec![
        "MATCH REPORT".to_string(),
        format!("Title: {}", info.title),
        format!("Sport: {}", info.sport),
        format!("Date: {}", info.created_at.format("%Y-%m-%d %H:%M:%S")),
        format!("Competition: {}", info.competition),
        format!("Teams: {} vs {}", info.team_a, info.team_b),
        format!("Total Events: {}", export.entries.len()),
        HEADER_RULE.to_string(),
        String::new(),
    ];

    if export.is_empty() {
        lines.push("No events recorded.".to_string());
    }
    for e in &export.entries {
        lines.push(format!("[{} - {}] {}", e.game_clock, e.period_name, e.label));
        lines.push(format!("Team: {}", e.team));
        if let Some(note) = &e.notes {
            lines.push(format!("Note: {}", note));
        }
        lines.push(ENTRY_RULE.to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
