//! One comparison chart per metric: median with IQR error bars per layer
//! across PCA settings, plus dashed baseline reference lines.
//!
//! `series` computes the chart data, `render` draws it.

pub mod render;
pub mod series;

pub use render::render_chart;
pub use series::{build_chart, charted_metrics};
