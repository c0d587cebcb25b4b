use std::collections::BTreeMap;

use plotters::style::RGBColor;

use crate::baseline::BaselineIndex;
use crate::color::LayerColors;
use crate::config::MetricLabel;
use crate::data::model::RecordSet;
use crate::data::stats::Quartiles;

// ---------------------------------------------------------------------------
// Chart data, independent of drawing
// ---------------------------------------------------------------------------

/// One error bar: median with IQR at a PCA setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBarPoint {
    pub pca: i64,
    pub stats: Quartiles,
}

/// Everything drawn for one layer.
#[derive(Debug, Clone)]
pub struct LayerSeries {
    pub layer: i64,
    pub color: RGBColor,
    /// Sorted by `pca`.
    pub points: Vec<ErrorBarPoint>,
    pub baseline: Option<Quartiles>,
}

/// A fully computed chart for one metric.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub metric: String,
    pub label: String,
    pub series: Vec<LayerSeries>,
}

impl ChartSpec {
    pub fn title(&self) -> String {
        format!("{} vs PCA Components (Median with IQR)", self.label)
    }

    /// Range covered by the PCA settings, if any point exists.
    pub fn x_bounds(&self) -> Option<(f64, f64)> {
        bounds(
            self.series
                .iter()
                .flat_map(|s| s.points.iter().map(|p| p.pca as f64)),
        )
    }

    /// Range covered by error bars and baseline lines.
    pub fn y_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.series.iter().flat_map(|s| {
            s.points
                .iter()
                .flat_map(|p| [p.stats.q1, p.stats.q3])
                .chain(s.baseline.iter().flat_map(|b| [b.q1, b.q3]))
        }))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Configured metrics that exist in the discovered metric set, in
/// configured order.
pub fn charted_metrics<'a>(
    configured: &'a [MetricLabel],
    metrics: &[String],
) -> Vec<&'a MetricLabel> {
    configured
        .iter()
        .filter(|m| metrics.contains(&m.key))
        .collect()
}

/// Group each layer's regular runs by PCA setting and compute the error bars
/// for `metric`. Runs with an unparsed pca and groups with no values for the
/// metric produce no point.
pub fn build_chart(
    records: &RecordSet,
    baseline: &BaselineIndex,
    colors: &LayerColors,
    metric: &MetricLabel,
) -> ChartSpec {
    let series = records
        .regular_layers()
        .into_iter()
        .map(|layer| {
            let mut by_pca: BTreeMap<i64, Vec<f64>> = BTreeMap::new();
            for run in records.regular.iter().filter(|r| r.layer == Some(layer)) {
                let Some(pca) = run.pca.components() else {
                    continue;
                };
                let values = by_pca.entry(pca).or_default();
                if let Some(v) = run.metric(&metric.key) {
                    values.push(v);
                }
            }

            let points = by_pca
                .into_iter()
                .filter_map(|(pca, values)| {
                    Quartiles::from_values(&values).map(|stats| ErrorBarPoint { pca, stats })
                })
                .collect();

            LayerSeries {
                layer,
                color: colors.color_for(layer),
                points,
                baseline: baseline.get(layer, &metric.key).copied(),
            }
        })
        .collect();

    ChartSpec {
        metric: metric.key.clone(),
        label: metric.label.clone(),
        series,
    }
}
