use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline configuration
// ---------------------------------------------------------------------------

/// Optional override file, looked up in the working directory.
pub const CONFIG_FILE: &str = "pca-medians.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A metric column that gets a chart, with its human-readable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricLabel {
    pub key: String,
    pub label: String,
}

impl MetricLabel {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// Everything a run needs. Passed explicitly into each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input CSV files, read in this order.
    pub csv_paths: Vec<PathBuf>,
    /// Directory receiving `medians.csv` and the chart images.
    pub out_dir: PathBuf,
    /// Write chart images; when false the charts are only computed.
    pub save_plots: bool,
    /// Metrics to chart, in chart order.
    pub metrics: Vec<MetricLabel>,
    /// Layer colours as `#rrggbb`. Empty → evenly spaced hues.
    pub palette: Vec<String>,
    /// Chart image size in pixels.
    pub chart_size: (u32, u32),
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            csv_paths: ["in/41.csv", "in/43.csv", "in/45.csv", "in/47.csv", "in/49.csv"]
                .iter()
                .map(PathBuf::from)
                .collect(),
            out_dir: PathBuf::from("./out"),
            save_plots: true,
            metrics: vec![
                MetricLabel::new("val_loss", "Validation Loss"),
                MetricLabel::new("rouge1", "ROUGE-1"),
                MetricLabel::new("rougeL", "ROUGE-L"),
                MetricLabel::new("sentencebert", "Sentence-BERT"),
                MetricLabel::new("bleu", "BLEU Score"),
            ],
            palette: crate::color::CATEGORY10
                .iter()
                .map(|hex| hex.to_string())
                .collect(),
            // 8x5 inches at 150 dpi
            chart_size: (1200, 750),
        }
    }
}

impl PipelineConfig {
    /// The built-in defaults, overridden by `path` when that file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No {} found, using built-in configuration", path.display());
            return Ok(Self::default());
        }
        Self::from_json_file(path)
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn summary_path(&self) -> PathBuf {
        self.out_dir.join("medians.csv")
    }

    pub fn chart_path(&self, metric_key: &str) -> PathBuf {
        self.out_dir.join(format!("{metric_key}_vs_pca_median.png"))
    }
}
