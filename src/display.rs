use chrono::{DateTime, Utc};
use owo_colors::{OwoColorize, Stream, Style};
use serde::Serialize;

use crate::suite::SuiteReport;
use crate::types::RankedResult;

// Style constants
fn style_position() -> Style {
    Style::new().cyan().bold()
}

fn style_dim_italic() -> Style {
    Style::new().dimmed().italic()
}

/// Millisecond value with enough precision for sub-microsecond operations.
fn format_ms(value: f64) -> String {
    format!("{value:.4}ms")
}

/// Percentage column: the fastest entry is marked rather than showing 0%.
fn format_percent(entry: &RankedResult) -> String {
    if entry.position == 0 {
        "fastest".to_string()
    } else {
        format!("{:+.1}%", entry.percent_vs_fastest)
    }
}

fn format_memory(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1}MiB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{}KiB", bytes / 1024)
    }
}

/// Default format: one block per suite with header and aligned columns.
pub fn format_default(reports: &[SuiteReport]) -> String {
    let mut out = String::new();

    let pos_style = style_position();
    let dim_it = style_dim_italic();

    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let header = format!("{} ({} results):", report.suite, report.ranked.len());
        out.push_str(
            &header
                .if_supports_color(Stream::Stdout, |s| s.dimmed())
                .to_string(),
        );
        out.push('\n');

        let max_name_width = report
            .ranked
            .iter()
            .map(|r| r.result.name.len())
            .max()
            .unwrap_or(0);

        for entry in &report.ranked {
            let pos_colored = format!("{}", entry.position)
                .if_supports_color(Stream::Stdout, |s| s.style(pos_style))
                .to_string();

            let name_padded = format!("{:<width$}", entry.result.name, width = max_name_width);
            let name_colored = name_padded
                .if_supports_color(Stream::Stdout, |s| s.green())
                .to_string();

            let avg = format!("{:>12}", format_ms(entry.result.average_time_ms))
                .if_supports_color(Stream::Stdout, |s| s.yellow())
                .to_string();

            let range = format!(
                "[{} .. {}]",
                format_ms(entry.result.min_time_ms),
                format_ms(entry.result.max_time_ms)
            );

            let iters = format!("{} iters", entry.result.iterations);

            let percent = match entry.position {
                0 => format_percent(entry)
                    .if_supports_color(Stream::Stdout, |s| s.style(dim_it))
                    .to_string(),
                _ => format_percent(entry),
            };

            out.push_str(&format!(
                "  {}  {}  {}  {}  {}  {}",
                pos_colored, name_colored, avg, range, iters, percent
            ));

            if let Some(bytes) = entry.result.memory_usage_bytes {
                out.push_str(&format!("  rss {}", format_memory(bytes)));
            }
            out.push('\n');
        }
    }

    out
}

/// Short format: one line per result, no headers.
pub fn format_short(reports: &[SuiteReport]) -> String {
    let mut out = String::new();

    let pos_style = style_position();

    for report in reports {
        for entry in &report.ranked {
            let pos_colored = format!("{}", entry.position)
                .if_supports_color(Stream::Stdout, |s| s.style(pos_style))
                .to_string();
            let name_colored = entry
                .result
                .name
                .if_supports_color(Stream::Stdout, |s| s.green())
                .to_string();

            out.push_str(&format!(
                "{} {}/{} {} ({} iters)\n",
                pos_colored,
                report.suite,
                name_colored,
                format_ms(entry.result.average_time_ms),
                entry.result.iterations
            ));
        }
    }

    out
}

/// JSON output format.
#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    suites: &'a [SuiteReport],
}

pub fn format_json(reports: &[SuiteReport], now: DateTime<Utc>) -> String {
    let report = JsonReport {
        generated_at: now.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        suites: reports,
    };

    serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
}
