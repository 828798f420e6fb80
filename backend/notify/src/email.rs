//! HTML email rendering.

use cronpilot_core::EmailConfig;

use crate::render::{escape_html, Summary};

const SUCCESS_COLOR: &str = "#28a745";
const FAILURE_COLOR: &str = "#dc3545";

/// The configured subject, or one tagged with the outcome.
pub fn subject(config: &EmailConfig, summary: &Summary) -> String {
    match config.subject.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ if summary.success => format!("[SUCCESS] Job succeeded - {}", summary.job_name),
        _ => format!("[FAILURE] Job failed - {}", summary.job_name),
    }
}

fn row(label: &str, value: &str) -> String {
    format!(
        "<tr><td style=\"padding: 10px; border-bottom: 1px solid #eee; font-weight: bold; width: 120px;\">{}</td>\
         <td style=\"padding: 10px; border-bottom: 1px solid #eee;\">{}</td></tr>\n",
        label, value
    )
}

fn pre_row(label: &str, value: &str, color: Option<&str>) -> String {
    let color = color.map(|c| format!(" color: {};", c)).unwrap_or_default();
    format!(
        "<tr><td style=\"padding: 10px; border-bottom: 1px solid #eee; font-weight: bold; vertical-align: top;\">{}</td>\
         <td style=\"padding: 10px; border-bottom: 1px solid #eee;{}\">\
         <pre style=\"background-color: #f8f9fa; padding: 10px; border-radius: 4px; overflow-x: auto; white-space: pre-wrap;\">{}</pre></td></tr>\n",
        label,
        color,
        escape_html(value)
    )
}

/// Fixed HTML template: colored header, a details table, and output/error
/// blocks when present.
pub fn html_body(summary: &Summary) -> String {
    let color = if summary.success { SUCCESS_COLOR } else { FAILURE_COLOR };
    let status = if summary.success { "Success" } else { "Failure" };

    let mut rows = String::new();
    rows.push_str(&row("Job:", &escape_html(&summary.job_name)));
    rows.push_str(&row(
        "Status:",
        &format!("<span style=\"color: {}; font-weight: bold;\">{}</span>", color, status),
    ));
    rows.push_str(&row("Started:", &summary.started));
    rows.push_str(&row("Finished:", &summary.finished));
    rows.push_str(&row("Duration:", &summary.duration));
    if !summary.output.is_empty() {
        rows.push_str(&pre_row("Output:", &summary.output, None));
    }
    if !summary.error.is_empty() {
        rows.push_str(&pre_row("Error:", &summary.error, Some(FAILURE_COLOR)));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>Job execution report</title></head>
<body style="font-family: Arial, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5;">
<div style="max-width: 600px; margin: 0 auto; background-color: white; border-radius: 8px;">
<div style="background-color: {color}; color: white; padding: 20px; border-radius: 8px 8px 0 0;">
<h2 style="margin: 0;">Job execution report</h2>
</div>
<div style="padding: 20px;">
<table style="width: 100%; border-collapse: collapse;">
{rows}</table>
</div>
<div style="padding: 20px; background-color: #f8f9fa; text-align: center; color: #6c757d; font-size: 12px;">
Sent automatically by cronpilot. Do not reply.
</div>
</div>
</body>
</html>"#
    )
}
