use crate::utils::error::{NamesError, Result};
use regex::Regex;
use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

/// Metadata rows sitting above the real header in the published tables.
pub const DEFAULT_SKIP_ROWS: usize = 4;

const SUPPRESSED_TOKENS: [&str; 2] = ["[x]", "S"];

/// Parses one count cell. Suppression placeholders, blanks and anything that
/// is not a finite number after removing quotes and thousands separators all
/// mean "no data", which is different from zero.
pub fn parse_count(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() || SUPPRESSED_TOKENS.contains(&token) {
        return None;
    }

    let cleaned: String = token.chars().filter(|c| *c != '"' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn year_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{4})\b").expect("year pattern is valid"))
}

/// Extracts the year from a column label such as `"1996 Count"`.
pub fn parse_year_label(label: &str) -> Option<i32> {
    year_pattern()
        .captures(label)
        .and_then(|caps| caps[1].parse().ok())
}

#[derive(Debug, Clone, PartialEq)]
pub struct YearColumn {
    /// Position in the raw header row.
    pub index: usize,
    pub label: String,
    pub year: i32,
}

/// One named row; `counts` lines up with [`SourceTable::year_columns`].
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    pub name: String,
    /// Cell text as read, before count parsing.
    pub raw: Vec<String>,
    pub counts: Vec<Option<f64>>,
}

/// A single parse attempt: one name against one year column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedCell<'a> {
    pub name: &'a str,
    pub column: &'a YearColumn,
    pub raw: &'a str,
    pub value: Option<f64>,
}

/// One raw source table (boys or girls) reduced to typed numeric rows.
#[derive(Debug, Clone)]
pub struct SourceTable {
    label: String,
    name_column: String,
    year_columns: Vec<YearColumn>,
    rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn from_path<P: AsRef<Path>>(path: P, skip_rows: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_reader(&path.display().to_string(), file, skip_rows)
    }

    /// Reads a table whose first `skip_rows` records are metadata. The next
    /// record is the header: column 0 holds names and every column labelled
    /// with "Count" holds one year of counts. Other columns are ignored.
    pub fn from_reader<R: Read>(label: &str, reader: R, skip_rows: usize) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = rdr.records();

        for _ in 0..skip_rows {
            if records.next().transpose()?.is_none() {
                return Err(structure_error(label, "file ends inside the metadata rows"));
            }
        }

        let header = records
            .next()
            .transpose()?
            .ok_or_else(|| structure_error(label, "missing header row"))?;

        let name_column = header
            .get(0)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| structure_error(label, "missing name column"))?
            .to_string();

        let mut year_columns = Vec::new();
        for (index, column) in header.iter().enumerate().skip(1) {
            if !column.contains("Count") {
                continue;
            }
            let year = parse_year_label(column).ok_or_else(|| {
                structure_error(label, &format!("column '{}' does not name a year", column))
            })?;
            year_columns.push(YearColumn {
                index,
                label: column.to_string(),
                year,
            });
        }

        if year_columns.is_empty() {
            return Err(structure_error(label, "no '<year> Count' columns in header"));
        }

        let mut rows = Vec::new();
        for record in records {
            let record = record?;
            let name = match record.get(0).map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => continue,
            };

            let raw: Vec<String> = year_columns
                .iter()
                .map(|column| record.get(column.index).unwrap_or_default().to_string())
                .collect();
            let counts = raw.iter().map(|token| parse_count(token)).collect();

            rows.push(SourceRow { name, raw, counts });
        }

        tracing::debug!(
            "Parsed '{}': {} names across {} year columns",
            label,
            rows.len(),
            year_columns.len()
        );

        Ok(Self {
            label: label.to_string(),
            name_column,
            year_columns,
            rows,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn name_column(&self) -> &str {
        &self.name_column
    }

    pub fn year_columns(&self) -> &[YearColumn] {
        &self.year_columns
    }

    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    /// Every (name, column) parse attempt in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = ParsedCell<'_>> + '_ {
        self.rows.iter().flat_map(move |row| {
            self.year_columns
                .iter()
                .zip(row.raw.iter().zip(row.counts.iter()))
                .map(move |(column, (raw, value))| ParsedCell {
                    name: &row.name,
                    column,
                    raw,
                    value: *value,
                })
        })
    }
}

fn structure_error(table: &str, reason: &str) -> NamesError {
    NamesError::SourceStructureError {
        table: table.to_string(),
        reason: reason.to_string(),
    }
}
