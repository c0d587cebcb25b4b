use super::loader::{LAYER_COLUMN, PCA_COLUMN};
use super::model::{CellValue, RecordSet};

/// Ordered metric column names, fixed once per run.
pub type MetricSet = Vec<String>;

/// Discover the numeric, non-grouping columns of the regular partition.
///
/// A column counts as numeric when at least one regular run holds a number
/// in it, or when it holds no values at all. Stray text cells in a numeric
/// column read as missing; a column of text only is not a metric.
/// Order follows first appearance across the input files.
pub fn discover_metrics(records: &RecordSet) -> MetricSet {
    records
        .columns
        .iter()
        .filter(|col| col.as_str() != LAYER_COLUMN && col.as_str() != PCA_COLUMN)
        .filter(|col| is_numeric(records, col))
        .cloned()
        .collect()
}

fn is_numeric(records: &RecordSet, col: &str) -> bool {
    let mut has_text = false;
    for run in &records.regular {
        match run.cells.get(col) {
            Some(CellValue::Number(_)) => return true,
            Some(CellValue::Text(_)) => has_text = true,
            Some(CellValue::Null) | None => {}
        }
    }
    !has_text
}
