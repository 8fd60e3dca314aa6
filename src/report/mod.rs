use std::io;
use std::path::Path;

use chrono::Local;

use crate::analysis::{AnalysisSummary, OverspendingDay, RankedTotal, WindowSummary};

/// Served when no analysis has run yet, and written at startup if the report
/// file is missing.
pub const PLACEHOLDER: &str = "<h1>Budget Insight Report</h1><p>No analysis yet.</p>";

const CURRENCY: &str = "OMR";

const STYLE_SHEET: &str = "\
body { font-family: Arial, sans-serif; background: #f4f4f4; color: #222; padding: 20px; }
.container { max-width: 700px; margin: auto; background: #fff; padding: 20px; border-radius: 10px; box-shadow: 0 2px 6px rgba(0,0,0,0.1); }
h1 { color: #355c7d; }
.success { color: green; font-weight: bold; }
.fail { color: red; font-weight: bold; }
.amount { color: #333; font-weight: bold; }
.overspent { color: red; font-weight: bold; }
.date, .compare { color: #888; font-size: 0.9em; }";

/// Render the analysis summary into the report fragment. Sections are always
/// present; empty aggregates render their "no data" line instead.
pub fn render_fragment(summary: &AnalysisSummary) -> String {
    let mut html = String::new();
    html.push_str(&render_savings_section(summary));
    html.push_str("<hr>");
    html.push_str(&render_insights_section(summary));
    html
}

/// Wrap a fragment into the full report document.
pub fn render_document(fragment: &str, filename: &str, generated_at: &str) -> String {
    format!(
        r#"<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Budget Insight Report</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        <h1>Budget Insight Report</h1>
        {fragment}
        <hr>
        <div class="footer">
            <b>Last uploaded DB:</b> {filename}<br>
            <b>Generated:</b> {generated_at}
        </div>
    </div>
</body>
</html>"#,
        css = STYLE_SHEET,
        fragment = fragment,
        filename = html_escape(filename),
        generated_at = generated_at,
    )
}

/// Full document for an upload, stamped with the current local time.
pub fn build_report(summary: &AnalysisSummary, filename: &str) -> String {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    render_document(&render_fragment(summary), filename, &generated_at)
}

/// Write the startup placeholder unless a report already exists.
pub fn ensure_placeholder(path: &Path) -> io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    std::fs::write(path, PLACEHOLDER)
}

fn render_savings_section(summary: &AnalysisSummary) -> String {
    format!(
        r#"<section class="goal">
  <h2>Savings Overview</h2>
  <ul>
    <li><strong>Target: Save 20% of Planned Budget</strong></li>
    {all_time}
    {recent}
  </ul>
</section>"#,
        all_time = render_savings_line("All-Time Savings", &summary.all_time),
        recent = render_savings_line("Last 7 Days Savings", &summary.recent),
    )
}

fn render_savings_line(label: &str, window: &WindowSummary) -> String {
    if window.days == 0 {
        return format!("<li>{}: No budget data available.</li>", label);
    }
    let (class, verdict) = if window.goal_met() {
        ("success", "Goal achieved!")
    } else {
        ("fail", "Target not met")
    };
    format!(
        r#"<li>{label} <span class="date">({days} days)</span>: <span class="amount">{saved}</span>
      Target: <span class="amount">{goal}</span>
      <span class="{class}">{verdict}</span>
      <span class="compare">({saved} vs {goal})</span></li>"#,
        label = label,
        days = window.days,
        saved = format_amount(window.total_saving),
        goal = format_amount(window.goal_saving),
        class = class,
        verdict = verdict,
    )
}

fn render_insights_section(summary: &AnalysisSummary) -> String {
    format!(
        r#"<section class="insights">
  <h2>Insights &amp; Highlights</h2>
  <ol>
    <li><b>Top Spending Categories (all time):</b> {cats_all}</li>
    <li><b>Top Spending Categories (last 7 days):</b> {cats_recent}</li>
    <li><b>Top Sub-tasks (all time):</b> {subs_all}</li>
    <li><b>Top Sub-tasks (last 7 days):</b> {subs_recent}</li>
    {overspending}
  </ol>
</section>"#,
        cats_all = render_ranked(&summary.all_time.top_categories, "No spending category data available."),
        cats_recent = render_ranked(&summary.recent.top_categories, "No spending category data available."),
        subs_all = render_ranked(&summary.all_time.top_subtasks, "No sub-task data available."),
        subs_recent = render_ranked(&summary.recent.top_subtasks, "No sub-task data available."),
        overspending = render_overspending(&summary.overspending_days),
    )
}

fn render_ranked(items: &[RankedTotal], empty_message: &str) -> String {
    if items.is_empty() {
        return empty_message.to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                r#"{label} <span class="amount">({total})</span>"#,
                label = html_escape(&item.label),
                total = format_amount(item.total),
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn render_overspending(days: &[OverspendingDay]) -> String {
    if days.is_empty() {
        return "<li>No days of overspending detected.</li>".to_string();
    }
    let mut html = String::from("<li><b>Days Exceeding Budget:</b><ul>");
    for day in days {
        html.push_str(&format!(
            r#"<li>{date}: <span class="amount overspent">{total}</span> <span class="compare">(planned {plan})</span></li>"#,
            date = html_escape(&day.date),
            total = format_amount(day.total),
            plan = format_amount(day.plan_budget),
        ));
    }
    html.push_str("</ul></li>");
    html
}

fn format_amount(value: f64) -> String {
    format!("{:.2} {}", value, CURRENCY)
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
