//! PNG rendering of [`ChartSpec`]s with the [`plotters`] bitmap backend.

use std::path::Path;

use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;
use thiserror::Error;

use super::series::{ChartSpec, LayerSeries};

/// Errors that can occur during chart generation
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, ChartError>;

/// Dash and gap as fractions of the x-axis span.
const DASH_FRACTION: f64 = 0.015;

/// Heading entry placed above the per-layer legend entries.
const LEGEND_TITLE: &str = "Layers";

/// Draw `spec` and save it as a PNG at `output_path`, replacing any file
/// already there.
pub fn render_chart(spec: &ChartSpec, output_path: &Path, size: (u32, u32)) -> Result<()> {
    let root = BitMapBackend::new(output_path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| ChartError::DrawingArea(e.to_string()))?;

    let (x_min, x_max) = padded(spec.x_bounds().unwrap_or((0.0, 1.0)));
    let (y_min, y_max) = padded(spec.y_bounds().unwrap_or((0.0, 1.0)));

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title(), ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| ChartError::ChartConfig(e.to_string()))?;

    chart
        .configure_mesh()
        .x_desc("PCA Components")
        .y_desc(spec.label.as_str())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .label_style(("sans-serif", 16))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    // plotters has no legend title; an element-less entry drawn first takes its place
    if let Some(title) = legend_title(spec) {
        chart
            .draw_series(std::iter::empty::<PathElement<(f64, f64)>>())
            .map_err(|e| ChartError::Drawing(e.to_string()))?
            .label(title);
    }

    for series in &spec.series {
        draw_layer(&mut chart, series, (x_min, x_max))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .label_font(("sans-serif", 16))
        .draw()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    root.present()
        .map_err(|e| ChartError::Drawing(e.to_string()))?;
    Ok(())
}

type Chart<'a, 'b> =
    ChartContext<'a, BitMapBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_layer(chart: &mut Chart<'_, '_>, series: &LayerSeries, x_span: (f64, f64)) -> Result<()> {
    let color = series.color;
    let line_style = color.stroke_width(1);

    // Baseline reference lines go underneath the error bars.
    if let Some(base) = &series.baseline {
        for (y, style) in [
            (base.q1, color.mix(0.3).stroke_width(1)),
            (base.q3, color.mix(0.3).stroke_width(1)),
            (base.median, color.mix(0.7).stroke_width(2)),
        ] {
            chart
                .draw_series(dashed_hline(y, x_span, style))
                .map_err(|e| ChartError::Drawing(e.to_string()))?;
        }
    }

    let medians: Vec<(f64, f64)> = series
        .points
        .iter()
        .map(|p| (p.pca as f64, p.stats.median))
        .collect();

    chart
        .draw_series(LineSeries::new(medians.iter().copied(), line_style))
        .map_err(|e| ChartError::Drawing(e.to_string()))?
        .label(format!("Layer {}", series.layer))
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));

    chart
        .draw_series(series.points.iter().map(|p| {
            ErrorBar::new_vertical(
                p.pca as f64,
                p.stats.q1,
                p.stats.median,
                p.stats.q3,
                line_style,
                6,
            )
        }))
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    chart
        .draw_series(
            medians
                .iter()
                .map(|&point| Circle::new(point, 3, color.filled())),
        )
        .map_err(|e| ChartError::Drawing(e.to_string()))?;

    Ok(())
}

fn legend_title(spec: &ChartSpec) -> Option<&'static str> {
    (!spec.series.is_empty()).then_some(LEGEND_TITLE)
}

/// Horizontal line at `y` across the x span, broken into dashes.
fn dashed_hline(
    y: f64,
    (x_min, x_max): (f64, f64),
    style: ShapeStyle,
) -> Vec<PathElement<(f64, f64)>> {
    let dash = (x_max - x_min) * DASH_FRACTION;
    if dash.is_nan() || dash <= 0.0 || !y.is_finite() {
        return Vec::new();
    }
    let mut segments = Vec::new();
    let mut x = x_min;
    while x < x_max {
        let end = (x + dash).min(x_max);
        segments.push(PathElement::new(vec![(x, y), (end, y)], style));
        x += dash * 2.0;
    }
    segments
}

/// Widen a range by 5% on each side; a degenerate range becomes ±1 or ±5%.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    let span = hi - lo;
    if span > 0.0 {
        (lo - span * 0.05, hi + span * 0.05)
    } else {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.05 };
        (lo - pad, hi + pad)
    }
}

/// Whether the `sans-serif` family resolves on this machine. Rendering tests
/// return early without it.
#[cfg(test)]
pub(crate) fn fonts_available() -> bool {
    let (w, h) = (64u32, 32u32);
    let mut buf = vec![0u8; (w * h * 3) as usize];
    let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
    root.draw(&Text::new("Ag", (0, 0), ("sans-serif", 12)))
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::series::ErrorBarPoint;
    use crate::data::stats::Quartiles;

    fn spec() -> ChartSpec {
        let q = |q1, median, q3| Quartiles { q1, median, q3 };
        ChartSpec {
            metric: "val_loss".into(),
            label: "Validation Loss".into(),
            series: vec![LayerSeries {
                layer: 41,
                color: RGBColor(0x1f, 0x77, 0xb4),
                points: vec![
                    ErrorBarPoint { pca: 4, stats: q(0.3, 0.35, 0.4) },
                    ErrorBarPoint { pca: 8, stats: q(0.25, 0.3, 0.32) },
                ],
                baseline: Some(q(0.5, 0.6, 0.7)),
            }],
        }
    }

    #[test]
    fn padded_ranges() {
        assert_eq!(padded((0.0, 10.0)), (-0.5, 10.5));
        assert_eq!(padded((0.0, 0.0)), (-1.0, 1.0));
        let (lo, hi) = padded((2.0, 2.0));
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn dashes_stay_inside_the_span() {
        let style = BLACK.stroke_width(1);
        let dashes = dashed_hline(0.5, (0.0, 1.0), style);
        // dash + gap = 3% of the span
        assert_eq!(dashes.len(), 34);
        assert!(dashed_hline(f64::NAN, (0.0, 1.0), style).is_empty());
        assert!(dashed_hline(0.5, (1.0, 1.0), style).is_empty());
    }

    #[test]
    fn legend_is_headed_by_layers() {
        assert_eq!(legend_title(&spec()), Some("Layers"));

        let empty = ChartSpec { series: Vec::new(), ..spec() };
        assert_eq!(legend_title(&empty), None);
    }

    #[test]
    fn renders_png_of_requested_size() {
        if !fonts_available() {
            eprintln!("skipping: no sans-serif font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("val_loss_vs_pca_median.png");

        render_chart(&spec(), &path, (1200, 750)).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 750));

        // Overwrites in place
        render_chart(&spec(), &path, (600, 400)).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (600, 400));
    }
}
