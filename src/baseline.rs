use std::collections::BTreeMap;

use crate::data::model::RecordSet;
use crate::data::stats::Quartiles;

/// Baseline quartiles per layer and metric; drives the chart reference lines.
#[derive(Debug, Clone, Default)]
pub struct BaselineIndex {
    stats: BTreeMap<i64, BTreeMap<String, Quartiles>>,
}

impl BaselineIndex {
    /// Only layers with baseline runs, and metrics with at least one value
    /// among them, get an entry.
    pub fn build(records: &RecordSet, metrics: &[String]) -> Self {
        let mut by_layer: BTreeMap<i64, Vec<_>> = BTreeMap::new();
        for run in &records.baseline {
            if let Some(layer) = run.layer {
                by_layer.entry(layer).or_default().push(run);
            }
        }

        let stats = by_layer
            .into_iter()
            .map(|(layer, runs)| {
                let per_metric = metrics
                    .iter()
                    .filter_map(|metric| {
                        let values: Vec<f64> =
                            runs.iter().filter_map(|r| r.metric(metric)).collect();
                        Quartiles::from_values(&values).map(|q| (metric.clone(), q))
                    })
                    .collect();
                (layer, per_metric)
            })
            .collect();

        BaselineIndex { stats }
    }

    pub fn get(&self, layer: i64, metric: &str) -> Option<&Quartiles> {
        self.stats.get(&layer)?.get(metric)
    }
}
