use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::TitleDedupArgs;
use crate::model::TitleDedupCounts;
use crate::util::{list_documents, remove_file_if_exists};

#[derive(Debug, Clone)]
pub struct TitleDedupOptions {
    pub output_root: PathBuf,
    pub extension: String,
    pub delimiter: char,
}

impl From<TitleDedupArgs> for TitleDedupOptions {
    fn from(args: TitleDedupArgs) -> Self {
        Self {
            output_root: args.output_root,
            extension: args.extension,
            delimiter: args.delimiter,
        }
    }
}

pub fn run(args: TitleDedupArgs) -> Result<()> {
    let options = TitleDedupOptions::from(args);
    let counts = dedup_titles(&options)?;

    info!(
        directories = counts.directories,
        kept = counts.kept,
        removed = counts.removed,
        failed = counts.failed,
        "title dedup completed"
    );

    Ok(())
}

/// Lowercased filename stem up to the first `delimiter`:
/// `Intro_feat_X.txt` has the key `intro`.
pub fn title_key(path: &Path, delimiter: char) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let first = stem.split(delimiter).next().unwrap_or(stem);
    Some(first.to_lowercase())
}

/// Keeps the alphabetically first document per title key in every directory.
/// Directories are grouped on their own, never merged with descendants.
pub fn dedup_titles(options: &TitleDedupOptions) -> Result<TitleDedupCounts> {
    let mut counts = TitleDedupCounts::default();

    if !options.output_root.is_dir() {
        warn!(
            path = %options.output_root.display(),
            "output root does not exist, nothing to deduplicate"
        );
        return Ok(counts);
    }

    for entry in WalkDir::new(&options.output_root) {
        let entry = entry.with_context(|| {
            format!("failed to walk {}", options.output_root.display())
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }

        counts.directories += 1;
        dedup_directory(entry.path(), options, &mut counts)?;
    }

    Ok(counts)
}

fn dedup_directory(
    dir: &Path,
    options: &TitleDedupOptions,
    counts: &mut TitleDedupCounts,
) -> Result<()> {
    let mut seen = HashSet::new();

    for document in list_documents(dir, &options.extension)? {
        let Some(key) = title_key(&document, options.delimiter) else {
            continue;
        };

        if seen.insert(key) {
            counts.kept += 1;
            continue;
        }

        remove_duplicate(&document, counts);
    }

    Ok(())
}

fn remove_duplicate(document: &Path, counts: &mut TitleDedupCounts) {
    match remove_file_if_exists(document) {
        Ok(true) => {
            counts.removed += 1;
            info!(path = %document.display(), "removed duplicate title");
        }
        Ok(false) => {}
        Err(err) => {
            counts.failed += 1;
            warn!(path = %document.display(), error = %err, "failed to remove document");
        }
    }
}
