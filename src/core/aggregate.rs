//! Reshapes parsed source tables into the two forms the catalog consumes:
//! per-name totals and long-form (name, year, count) rows.

use crate::core::parser::SourceTable;
use crate::domain::model::{normalize_name, YearlyCount};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct NameTotal {
    /// Display casing of the first row seen for this name.
    pub name: String,
    pub key: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub name: String,
    pub key: String,
    pub year: i32,
    pub count: f64,
}

/// Sums every year column per distinct name, skipping "no data" cells.
/// Rows whose names differ only by case fold into one total. A name whose
/// cells are all missing still gets a total of exactly 0.
pub fn totals(table: &SourceTable) -> Vec<NameTotal> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut result: Vec<NameTotal> = Vec::new();

    for cell in table.cells() {
        let key = normalize_name(cell.name);
        let pos = match positions.get(&key) {
            Some(&pos) => pos,
            None => {
                positions.insert(key.clone(), result.len());
                result.push(NameTotal {
                    name: cell.name.to_string(),
                    key,
                    total: 0.0,
                });
                result.len() - 1
            }
        };
        if let Some(count) = cell.value {
            result[pos].total += count;
        }
    }

    result
}

/// Wide-to-long reshape. Cells without data are dropped and the rows come
/// back stably sorted by normalized name so equal keys sit next to each other.
pub fn long_form(table: &SourceTable) -> Vec<LongRow> {
    let mut rows: Vec<LongRow> = table
        .cells()
        .filter_map(|cell| {
            cell.value.map(|count| LongRow {
                name: cell.name.to_string(),
                key: normalize_name(cell.name),
                year: cell.column.year,
                count,
            })
        })
        .collect();

    rows.sort_by(|a, b| a.key.cmp(&b.key));
    rows
}

/// Collapses runs of consecutive equal keys into year-ascending series.
/// Input must already be sorted by key, as [`long_form`] returns it.
/// Repeated years inside a run are summed.
pub fn group_yearly(rows: &[LongRow]) -> HashMap<String, Vec<YearlyCount>> {
    let mut result = HashMap::new();

    for run in rows.chunk_by(|a, b| a.key == b.key) {
        let mut series: Vec<YearlyCount> = run
            .iter()
            .map(|row| YearlyCount::new(row.year, row.count))
            .collect();
        series.sort_by_key(|yc| yc.year);
        series.dedup_by(|later, earlier| {
            if later.year == earlier.year {
                earlier.count += later.count;
                true
            } else {
                false
            }
        });

        result.insert(run[0].key.clone(), series);
    }

    result
}
