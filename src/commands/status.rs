use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::DatasetRecord;
use crate::util::{list_collections, list_documents};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub collections: usize,
    pub empty_collections: usize,
    pub documents: usize,
}

pub fn run(args: StatusArgs) -> Result<()> {
    info!(output_root = %args.output_root.display(), "status requested");

    if args.output_root.is_dir() {
        let summary = summarize_tree(&args.output_root, &args.extension)?;
        info!(
            collections = summary.collections,
            empty_collections = summary.empty_collections,
            documents = summary.documents,
            "output tree status"
        );
    } else {
        warn!(path = %args.output_root.display(), "output root missing");
    }

    if args.dataset_path.exists() {
        let records = load_dataset(&args.dataset_path)?;
        info!(
            path = %args.dataset_path.display(),
            records = records.len(),
            "loaded dataset"
        );
    } else {
        warn!(path = %args.dataset_path.display(), "dataset file missing");
    }

    Ok(())
}

pub fn summarize_tree(root: &Path, extension: &str) -> Result<TreeSummary> {
    let mut summary = TreeSummary::default();

    for collection in list_collections(root)? {
        let documents = list_documents(&collection, extension)?.len();
        summary.collections += 1;
        summary.documents += documents;
        if documents == 0 {
            summary.empty_collections += 1;
        }
    }

    Ok(summary)
}

pub fn load_dataset(path: &Path) -> Result<Vec<DatasetRecord>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
