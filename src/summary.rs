//! Per-group medians of every metric, written as `medians.csv`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::data::model::{PcaKey, RecordSet, RunRecord};
use crate::data::stats;

/// One (layer, pca) group of the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub layer: i64,
    pub pca: PcaKey,
    /// Median per metric, aligned with [`SummaryTable::metrics`].
    pub medians: Vec<Option<f64>>,
}

/// Baseline and regular group medians, sorted by layer then pca.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    pub metrics: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    /// Group regular runs by (layer, pca) and baseline runs by layer, then
    /// take the median of each metric. Runs without a layer are dropped.
    pub fn build(records: &RecordSet, metrics: &[String]) -> Self {
        let mut groups: BTreeMap<(i64, PcaKey), Vec<Vec<f64>>> = BTreeMap::new();
        let mut dropped = 0usize;

        let all_runs = records.baseline.iter().chain(records.regular.iter());
        for run in all_runs {
            let Some(layer) = run.layer else {
                dropped += 1;
                continue;
            };
            let samples = groups
                .entry((layer, run.pca))
                .or_insert_with(|| vec![Vec::new(); metrics.len()]);
            push_metrics(samples, run, metrics);
        }

        if dropped > 0 {
            warn!("{dropped} runs have no integer layer and were left out of the summary");
        }

        // BTreeMap order is the table order: layer, then Baseline < Missing < Components(n).
        let rows = groups
            .into_iter()
            .map(|((layer, pca), samples)| SummaryRow {
                layer,
                pca,
                medians: samples.iter().map(|s| stats::median(s)).collect(),
            })
            .collect();

        SummaryTable {
            metrics: metrics.to_vec(),
            rows,
        }
    }

    /// Write the table as CSV, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;

        let mut header = vec!["layer".to_string(), "pca".to_string()];
        header.extend(self.metrics.iter().cloned());
        writer.write_record(&header).context("writing summary header")?;

        for row in &self.rows {
            let mut record = vec![row.layer.to_string(), row.pca.to_string()];
            record.extend(row.medians.iter().map(|m| format_value(*m)));
            writer
                .write_record(&record)
                .with_context(|| format!("writing summary row for layer {}", row.layer))?;
        }
        writer.flush().context("flushing summary")?;

        info!("Saved medians to {}", path.display());
        Ok(())
    }
}

fn push_metrics(samples: &mut [Vec<f64>], run: &RunRecord, metrics: &[String]) {
    for (slot, metric) in samples.iter_mut().zip(metrics) {
        if let Some(v) = run.metric(metric) {
            slot.push(v);
        }
    }
}

/// Shortest round-trip form; integral values keep a trailing `.0` so the
/// column reads back as floating point. Missing values are empty fields.
fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => format!("{v:.1}"),
        Some(v) => v.to_string(),
    }
}
