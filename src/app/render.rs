//! Text, CSV and JSON renderings of query results.

use crate::core::metrics::Ranked;
use crate::domain::model::Sex;
use crate::utils::error::{NamesError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

/// One display row. Per-sex ranks are blank when that sex has no
/// registrations, since the rank would only reflect tie order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameRow {
    pub rank: usize,
    pub name: String,
    pub gender_score: f64,
    pub girls_rank: Option<usize>,
    pub boys_rank: Option<usize>,
    pub overall_rank: usize,
    pub girls: f64,
    pub boys: f64,
    pub total: f64,
}

pub fn rows(entries: &[Ranked<'_>]) -> Vec<NameRow> {
    entries
        .iter()
        .enumerate()
        .map(|(i, (entity, ranks))| NameRow {
            rank: i + 1,
            name: entity.name.clone(),
            gender_score: entity.gender_score(),
            girls_rank: (entity.total(Sex::Girls) > 0.0).then_some(ranks.girls),
            boys_rank: (entity.total(Sex::Boys) > 0.0).then_some(ranks.boys),
            overall_rank: ranks.overall,
            girls: entity.girls_total,
            boys: entity.boys_total,
            total: entity.total_count(),
        })
        .collect()
}

/// Whole-number count with comma thousands separators.
pub fn format_count(value: f64) -> String {
    let digits = format!("{}", value.trunc().abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0.0 {
        out.insert(0, '-');
    }
    out
}

const HEADERS: [&str; 9] = [
    "Rank",
    "Name",
    "Gender Score",
    "Girls Rank",
    "Boys Rank",
    "Overall Rank",
    "Girls",
    "Boys",
    "Total Count",
];

fn opt_rank(rank: Option<usize>) -> String {
    rank.map_or_else(|| "-".to_string(), |r| r.to_string())
}

pub fn render_table(title: &str, entries: &[Ranked<'_>]) -> String {
    let cells: Vec<[String; 9]> = rows(entries)
        .into_iter()
        .map(|row| {
            [
                row.rank.to_string(),
                row.name,
                format!("{:+.4}", row.gender_score),
                opt_rank(row.girls_rank),
                opt_rank(row.boys_rank),
                row.overall_rank.to_string(),
                format_count(row.girls),
                format_count(row.boys),
                format_count(row.total),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |values: &[String]| -> String {
        values
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(col, (value, width))| {
                // the name column reads left-aligned, numbers right-aligned
                if col == 1 {
                    format!("{:<width$}", value, width = width)
                } else {
                    format!("{:>width$}", value, width = width)
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    let header_line = line(header.as_slice());
    let rule = "-".repeat(header_line.chars().count());

    let mut out = vec![title.to_string(), rule.clone(), header_line, rule];
    out.extend(cells.iter().map(|row| line(&row[..])));
    out.join("\n")
}

pub fn render_csv(entries: &[Ranked<'_>]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows(entries) {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| NamesError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn render_json(title: &str, entries: &[Ranked<'_>]) -> Result<String> {
    let value = serde_json::json!({
        "title": title,
        "names": rows(entries),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Renders one titled list in the requested format.
pub fn render_list(format: OutputFormat, title: &str, entries: &[Ranked<'_>]) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(title, entries)),
        OutputFormat::Csv => render_csv(entries),
        OutputFormat::Json => render_json(title, entries),
    }
}

/// Year/value listing for a time series.
pub fn render_series(title: &str, series: &[(i32, f64)], score: bool) -> String {
    let mut out = vec![title.to_string()];
    for (year, value) in series {
        if score {
            out.push(format!("  {}  {:+.4}", year, value));
        } else {
            out.push(format!("  {}  {:>10}", year, format_count(*value)));
        }
    }
    out.join("\n")
}
