use std::collections::BTreeMap;

use log::warn;
use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// The ten-colour categorical palette used by default for layers.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            RGBColor(rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

/// Parse `#rrggbb` entries, skipping (and logging) malformed ones.
pub fn parse_palette(hex: &[String]) -> Vec<RGBColor> {
    hex.iter()
        .filter_map(|h| match h.parse::<Srgb<u8>>() {
            Ok(rgb) => Some(RGBColor(rgb.red, rgb.green, rgb.blue)),
            Err(e) => {
                warn!("Ignoring palette entry {h:?}: {e}");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: layer → RGBColor
// ---------------------------------------------------------------------------

/// Assigns each layer a colour, stable for every chart of a run.
#[derive(Debug, Clone)]
pub struct LayerColors {
    mapping: BTreeMap<i64, RGBColor>,
}

impl LayerColors {
    /// Cycle through `palette` over the sorted `layers`. With no usable
    /// palette entries, one evenly spaced hue per layer is generated instead.
    pub fn new(layers: &[i64], palette: &[String]) -> Self {
        let mut colors = parse_palette(palette);
        if colors.is_empty() {
            colors = generate_palette(layers.len());
        }
        let mapping = layers
            .iter()
            .enumerate()
            .map(|(i, &layer)| (layer, colors[i % colors.len()]))
            .collect();
        LayerColors { mapping }
    }

    /// Look up the colour for a layer.
    pub fn color_for(&self, layer: i64) -> RGBColor {
        self.mapping
            .get(&layer)
            .copied()
            .unwrap_or(RGBColor(128, 128, 128))
    }
}
