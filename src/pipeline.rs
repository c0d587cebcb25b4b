use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::baseline::BaselineIndex;
use crate::chart::{build_chart, charted_metrics, render_chart};
use crate::color::LayerColors;
use crate::config::PipelineConfig;
use crate::data::loader::load_all;
use crate::data::schema::discover_metrics;
use crate::summary::SummaryTable;

// ---------------------------------------------------------------------------
// End-to-end run
// ---------------------------------------------------------------------------

/// What a run wrote to disk.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary_path: PathBuf,
    pub metrics: Vec<String>,
    /// Charts written, in metric order. Empty on a dry run.
    pub chart_paths: Vec<PathBuf>,
}

/// Load → discover metrics → summary → baseline index → charts.
///
/// Any load failure aborts before the summary is written. Charts already
/// saved stay on disk if a later chart fails.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    let records = load_all(&config.csv_paths).context("loading input files")?;
    info!(
        "Loaded {} runs ({} baseline) from {} files",
        records.len(),
        records.baseline.len(),
        config.csv_paths.len()
    );

    let metrics = discover_metrics(&records);
    debug!("Metric columns: {metrics:?}");

    std::fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("creating output directory {}", config.out_dir.display()))?;

    let summary = SummaryTable::build(&records, &metrics);
    let summary_path = config.summary_path();
    summary.write_csv(&summary_path)?;

    let baseline = BaselineIndex::build(&records, &metrics);
    let colors = LayerColors::new(&records.regular_layers(), &config.palette);

    let mut chart_paths = Vec::new();
    for metric in charted_metrics(&config.metrics, &metrics) {
        let spec = build_chart(&records, &baseline, &colors, metric);
        if !config.save_plots {
            debug!(
                "{}: {} layer series (not saved)",
                spec.metric,
                spec.series.len()
            );
            continue;
        }

        let path = config.chart_path(&metric.key);
        render_chart(&spec, &path, config.chart_size)
            .with_context(|| format!("rendering {}", path.display()))?;
        info!("Saved {}", path.display());
        chart_paths.push(path);
    }

    Ok(RunReport {
        summary_path,
        metrics,
        chart_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn config_for(dir: &Path, files: &[(&str, &str)], save_plots: bool) -> PipelineConfig {
        let csv_paths = files
            .iter()
            .map(|(name, content)| {
                let path = dir.join(name);
                fs::write(&path, content).unwrap();
                path
            })
            .collect();
        PipelineConfig {
            csv_paths,
            out_dir: dir.join("out"),
            save_plots,
            ..Default::default()
        }
    }

    const FILE_A: &str = "layer,pca,val_loss,bleu,run\n1,none,0.5,10,a\n1,4,0.3,12,a\n2,8,0.2,9,a\n";
    const FILE_B: &str = "layer,pca,val_loss,extra\n1,None,0.7,1\n1,4,0.4,2\n2,8,0.25,3\n";

    #[test]
    fn dry_run_writes_summary_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &[("41.csv", FILE_A), ("43.csv", FILE_B)], false);

        let report = run(&config).unwrap();
        assert_eq!(report.metrics, vec!["val_loss", "bleu", "extra"]);
        assert!(report.chart_paths.is_empty());
        assert!(report.summary_path.exists());
        assert!(!config.chart_path("val_loss").exists());

        let text = fs::read_to_string(&report.summary_path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("layer,pca,val_loss,bleu,extra"));
        assert!(lines.next().unwrap().starts_with("1,None,"));
        assert!(lines.next().unwrap().starts_with("1,4,"));
        assert!(lines.next().unwrap().starts_with("2,8,"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn rerun_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &[("41.csv", FILE_A), ("43.csv", FILE_B)], false);

        let first = run(&config).unwrap();
        let before = fs::read(&first.summary_path).unwrap();
        let second = run(&config).unwrap();
        assert_eq!(before, fs::read(&second.summary_path).unwrap());
        assert_eq!(fs::read_dir(&config.out_dir).unwrap().count(), 1);
    }

    #[test]
    fn missing_input_aborts_without_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path(), &[("41.csv", FILE_A)], false);
        config.csv_paths.push(dir.path().join("45.csv"));

        assert!(run(&config).is_err());
        assert!(!config.summary_path().exists());
    }

    #[test]
    fn saves_one_chart_per_present_metric() {
        if !crate::chart::render::fonts_available() {
            eprintln!("skipping: no sans-serif font available");
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &[("41.csv", FILE_A), ("43.csv", FILE_B)], true);

        let report = run(&config).unwrap();
        assert_eq!(
            report.chart_paths,
            vec![config.chart_path("val_loss"), config.chart_path("bleu")]
        );
        for path in &report.chart_paths {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), config.chart_size);
        }

        run(&config).unwrap();
        assert_eq!(fs::read_dir(&config.out_dir).unwrap().count(), 3);
    }
}
