use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::cli::RunArgs;
use crate::commands::clean::remove_empty_dirs;
use crate::commands::dedup::{DedupOptions, dedup_collections, validate_threshold};
use crate::commands::extract::{ExtractOptions, build_dataset, save_dataset};
use crate::commands::ingest::{IngestOptions, ingest_tree};
use crate::commands::title_dedup::{TitleDedupOptions, dedup_titles};
use crate::model::{PipelineCounts, PipelinePaths, PipelineRunManifest};
use crate::util::{now_utc_string, sha256_file, utc_compact_string, write_json_pretty};


#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub dataset_path: PathBuf,
    pub extension: String,
    pub marker_label: String,
    pub threshold: f64,
    pub delimiter: char,
}

impl From<&RunArgs> for PipelineOptions {
    fn from(args: &RunArgs) -> Self {
        Self {
            source_root: args.source_root.clone(),
            output_root: args.output_root.clone(),
            dataset_path: args.dataset_path.clone(),
            extension: args.extension.clone(),
            marker_label: args.marker_label.clone(),
            threshold: args.threshold,
            delimiter: args.delimiter,
        }
    }
}

pub fn run(args: RunArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(run_id = %run_id, source_root = %args.source_root.display(), "starting pipeline");

    let options = PipelineOptions::from(&args);
    let counts = run_pipeline(&options)?;

    let Some(report_path) = args.report_path else {
        return Ok(());
    };

    let manifest = PipelineRunManifest {
        manifest_version: 1,
        run_id,
        started_at,
        completed_at: now_utc_string(),
        threshold: options.threshold,
        marker_label: options.marker_label.clone(),
        paths: PipelinePaths {
            source_root: options.source_root.display().to_string(),
            output_root: options.output_root.display().to_string(),
            dataset_path: options.dataset_path.display().to_string(),
        },
        counts,
        dataset_sha256: sha256_file(&options.dataset_path)?,
    };

    write_json_pretty(&report_path, &manifest)?;
    info!(path = %report_path.display(), "wrote pipeline run report");

    Ok(())
}

/// Ingest, cross-collection dedup, clean, title dedup, clean, extract.
///
/// Each stage assumes the tree left behind by the previous one.
pub fn run_pipeline(options: &PipelineOptions) -> Result<PipelineCounts> {
    validate_threshold(options.threshold)?;

    let ingest = ingest_tree(&IngestOptions {
        source_root: options.source_root.clone(),
        output_root: options.output_root.clone(),
        extension: options.extension.clone(),
        marker_label: options.marker_label.clone(),
    })?;
    info!(errors = ingest.skipped, "ingest processing errors");
    info!(successes = ingest.written, "ingest successful documents");

    let dedup = dedup_collections(&DedupOptions {
        output_root: options.output_root.clone(),
        extension: options.extension.clone(),
        threshold: options.threshold,
    })?;
    info!(
        comparisons = dedup.comparisons,
        removed = dedup.removed,
        failed = dedup.failed,
        "cross-collection dedup completed"
    );

    let clean_before = remove_empty_dirs(&options.output_root)?;

    let title_dedup = dedup_titles(&TitleDedupOptions {
        output_root: options.output_root.clone(),
        extension: options.extension.clone(),
        delimiter: options.delimiter,
    })?;
    info!(
        removed = title_dedup.removed,
        failed = title_dedup.failed,
        "title dedup completed"
    );

    let clean = clean_before.merge(remove_empty_dirs(&options.output_root)?);
    info!(removed = clean.removed, failed = clean.failed, "empty directory cleanup completed");

    let (records, extract) = build_dataset(&ExtractOptions {
        output_root: options.output_root.clone(),
        extension: options.extension.clone(),
    })?;
    save_dataset(&options.dataset_path, &records)?;
    info!(path = %options.dataset_path.display(), "wrote dataset");
    info!(records = extract.records, "dataset items");

    Ok(PipelineCounts {
        ingest,
        dedup,
        clean,
        title_dedup,
        extract,
    })
}
