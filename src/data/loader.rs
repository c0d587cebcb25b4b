use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use super::model::{is_na, CellValue, PcaKey, RecordSet, RunRecord};

pub const LAYER_COLUMN: &str = "layer";
pub const PCA_COLUMN: &str = "pca";

/// Errors that abort loading. Cell-level problems never end up here.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

type Result<T> = core::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every file in order and concatenate the baseline and regular
/// partitions. The first failing file aborts the whole load.
pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> Result<RecordSet> {
    let mut all = RecordSet::default();
    for path in paths {
        all.extend(load_file(path.as_ref())?);
    }
    Ok(all)
}

/// Load one CSV file and split its rows into baseline and regular runs.
///
/// Required columns: `layer`, `pca`. All other columns are parsed as metric
/// cells; whether a column is numeric is decided later over the combined data.
pub fn load_file(path: &Path) -> Result<RecordSet> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let column_index = |column: &'static str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
    };
    let layer_idx = column_index(LAYER_COLUMN)?;
    let pca_idx = column_index(PCA_COLUMN)?;

    let mut set = RecordSet {
        columns: headers.clone(),
        ..Default::default()
    };

    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let raw_pca = record.get(pca_idx).unwrap_or("");
        let layer = coerce_int(record.get(layer_idx).unwrap_or(""));

        let mut cells = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == layer_idx || col_idx == pca_idx {
                continue;
            }
            cells.insert(headers[col_idx].clone(), CellValue::parse(value));
        }

        if is_baseline(raw_pca) {
            set.baseline.push(RunRecord {
                layer,
                pca: PcaKey::Baseline,
                cells,
            });
        } else {
            let pca = coerce_int(raw_pca).map_or(PcaKey::Missing, PcaKey::Components);
            set.regular.push(RunRecord { layer, pca, cells });
        }
    }

    debug!(
        "{}: {} baseline rows, {} regular rows",
        path.display(),
        set.baseline.len(),
        set.regular.len()
    );
    Ok(set)
}

// ---------------------------------------------------------------------------
// Row classification and coercion
// ---------------------------------------------------------------------------

/// A row is a baseline run when its raw `pca` cell is missing or reads
/// `none` in any casing.
pub fn is_baseline(raw_pca: &str) -> bool {
    is_na(raw_pca) || raw_pca.to_lowercase() == "none"
}

/// Lenient integer coercion: integers parse directly, finite floats are
/// truncated, anything else becomes `None`.
pub fn coerce_int(raw: &str) -> Option<i64> {
    if is_na(raw) {
        return None;
    }
    let s = raw.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn classification_is_case_insensitive_none_or_empty() {
        for raw in ["none", "None", "NONE", "nOnE", "", "NaN", "null"] {
            assert!(is_baseline(raw), "{raw:?} should be baseline");
        }
        for raw in ["4", "0", "abc", "nonee", " none"] {
            assert!(!is_baseline(raw), "{raw:?} should be regular");
        }
    }

    #[test]
    fn coercion_degrades_silently_to_null() {
        assert_eq!(coerce_int("12"), Some(12));
        assert_eq!(coerce_int(" 7 "), Some(7));
        assert_eq!(coerce_int("4.0"), Some(4));
        assert_eq!(coerce_int("4.9"), Some(4));
        assert_eq!(coerce_int("-3.5"), Some(-3));
        assert_eq!(coerce_int("abc"), None);
        assert_eq!(coerce_int(""), None);
        assert_eq!(coerce_int("inf"), None);
    }

    #[test]
    fn splits_baseline_and_regular_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            dir.path(),
            "41.csv",
            "layer,pca,val_loss\n1,none,0.5\n1,4,0.3\n2,,0.9\n2,abc,0.8\nx,8,0.1\n",
        );

        let set = load_file(&path).unwrap();
        assert_eq!(set.columns, vec!["layer", "pca", "val_loss"]);

        assert_eq!(set.baseline.len(), 2);
        assert!(set.baseline.iter().all(|r| r.pca == PcaKey::Baseline));
        assert_eq!(set.baseline[0].layer, Some(1));
        assert_eq!(set.baseline[1].layer, Some(2));

        assert_eq!(set.regular.len(), 3);
        assert_eq!(set.regular[0].pca, PcaKey::Components(4));
        assert_eq!(set.regular[0].metric("val_loss"), Some(0.3));
        // "abc" is not "none", so the row stays regular with a missing key
        assert_eq!(set.regular[1].pca, PcaKey::Missing);
        assert_eq!(set.regular[1].layer, Some(2));
        // unparseable layer becomes null rather than an error
        assert_eq!(set.regular[2].layer, None);
        assert_eq!(set.regular[2].pca, PcaKey::Components(8));
    }

    #[test]
    fn load_all_concatenates_in_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_csv(dir.path(), "a.csv", "layer,pca,val_loss\n1,4,0.3\n");
        let b = write_csv(dir.path(), "b.csv", "layer,pca,bleu\n2,4,12.0\n");

        let set = load_all(&[a, b]).unwrap();
        assert_eq!(set.columns, vec!["layer", "pca", "val_loss", "bleu"]);
        assert_eq!(set.regular[0].layer, Some(1));
        assert_eq!(set.regular[1].layer, Some(2));
        assert_eq!(set.regular[1].metric("val_loss"), None);
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let ok = write_csv(dir.path(), "ok.csv", "layer,pca\n1,4\n");
        let result = load_all(&[ok, dir.path().join("missing.csv")]);
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn ragged_rows_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "bad.csv", "layer,pca,val_loss\n1,4\n");
        assert!(matches!(load_file(&path), Err(LoadError::Csv { .. })));
    }

    #[test]
    fn missing_grouping_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(dir.path(), "nopca.csv", "layer,val_loss\n1,0.5\n");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::MissingColumn { column: "pca", .. })
        ));
    }
}
