use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// PcaKey – the grouping value of the `pca` column
// ---------------------------------------------------------------------------

/// How a run was reduced before evaluation.
///
/// Ordering matters: the summary table sorts `Baseline` first, then rows whose
/// `pca` cell could not be coerced, then numeric settings ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PcaKey {
    /// No PCA applied (`pca` was empty or `none`).
    Baseline,
    /// A regular run whose `pca` cell was not an integer.
    Missing,
    /// Number of retained principal components.
    Components(i64),
}

impl PcaKey {
    /// Numeric component count, if any.
    pub fn components(&self) -> Option<i64> {
        match self {
            PcaKey::Components(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for PcaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PcaKey::Baseline | PcaKey::Missing => write!(f, "None"),
            PcaKey::Components(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// CellValue – a single metric cell
// ---------------------------------------------------------------------------

/// Tokens read as "no value", mirroring what common dataframe readers treat
/// as NA by default.
const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

/// Whether a raw CSV field denotes a missing value.
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// A parsed cell. A column is numeric when none of its cells are `Text`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Guess the cell type from raw CSV text.
    pub fn parse(raw: &str) -> Self {
        if is_na(raw) {
            return CellValue::Null;
        }
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_nan() => CellValue::Null,
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(v) => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RunRecord – one row of an input file
// ---------------------------------------------------------------------------

/// One evaluation run (one CSV row).
#[derive(Debug, Clone)]
pub struct RunRecord {
    /// `None` when the `layer` cell failed integer coercion.
    pub layer: Option<i64>,
    pub pca: PcaKey,
    /// Every column except `layer` and `pca`: column_name → value.
    pub cells: BTreeMap<String, CellValue>,
}

impl RunRecord {
    /// Numeric value of `column`, or `None` when absent, empty or text.
    pub fn metric(&self, column: &str) -> Option<f64> {
        self.cells.get(column).and_then(CellValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// RecordSet – baseline and regular runs of one or more files
// ---------------------------------------------------------------------------

/// Runs split into baseline (no PCA) and regular (PCA-reduced) partitions.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub baseline: Vec<RunRecord>,
    pub regular: Vec<RunRecord>,
    /// Column names in first-seen order (includes `layer` and `pca`).
    pub columns: Vec<String>,
}

impl RecordSet {
    /// Append another set, keeping row order and extending the column list
    /// with names not seen so far.
    pub fn extend(&mut self, other: RecordSet) {
        for col in other.columns {
            if !self.columns.contains(&col) {
                self.columns.push(col);
            }
        }
        self.baseline.extend(other.baseline);
        self.regular.extend(other.regular);
    }

    /// Distinct non-null layers of the regular partition, ascending.
    pub fn regular_layers(&self) -> Vec<i64> {
        let mut layers: Vec<i64> = self.regular.iter().filter_map(|r| r.layer).collect();
        layers.sort_unstable();
        layers.dedup();
        layers
    }

    /// Total number of runs.
    pub fn len(&self) -> usize {
        self.baseline.len() + self.regular.len()
    }
}
