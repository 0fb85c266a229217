use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::ExtractArgs;
use crate::model::{DatasetRecord, ExtractCounts};
use crate::util::{has_extension, read_document, write_json_indented};

/// Opening delimiter of every section marker.
const MARKER_OPEN: char = '[';

/// Markers that make up the `text` half; the rest is the `summary`.
const TEXT_SECTIONS: usize = 2;

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub output_root: PathBuf,
    pub extension: String,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let options = ExtractOptions {
        output_root: args.output_root,
        extension: args.extension,
    };

    let (records, counts) = build_dataset(&options)?;
    save_dataset(&args.dataset_path, &records)?;

    info!(path = %args.dataset_path.display(), "wrote dataset");
    info!(
        records = counts.records,
        excluded = counts.excluded,
        "dataset extraction completed"
    );

    Ok(())
}

/// Splits a document before its third section marker.
///
/// Documents with fewer than three markers have no record.
pub fn extract_record(content: &str) -> Option<DatasetRecord> {
    let (split_at, _) = content.match_indices(MARKER_OPEN).nth(TEXT_SECTIONS)?;

    Some(DatasetRecord {
        text: content[..split_at].trim().to_string(),
        summary: content[split_at..].trim().to_string(),
    })
}

/// Records for every document under the output root, in walk order.
pub fn build_dataset(options: &ExtractOptions) -> Result<(Vec<DatasetRecord>, ExtractCounts)> {
    let mut counts = ExtractCounts::default();
    let mut records = Vec::new();

    if !options.output_root.is_dir() {
        warn!(
            path = %options.output_root.display(),
            "output root does not exist, dataset is empty"
        );
        return Ok((records, counts));
    }

    for entry in WalkDir::new(&options.output_root) {
        let entry = entry
            .with_context(|| format!("failed to walk {}", options.output_root.display()))?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), &options.extension) {
            continue;
        }

        counts.documents += 1;
        match extract_record(&read_document(entry.path())?) {
            Some(record) => records.push(record),
            None => counts.excluded += 1,
        }
    }

    counts.records = records.len();
    Ok((records, counts))
}

pub fn save_dataset(path: &Path, records: &[DatasetRecord]) -> Result<()> {
    write_json_indented(path, &records)
}
