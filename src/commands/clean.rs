use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::cli::CleanArgs;
use crate::model::CleanCounts;

pub fn run(args: CleanArgs) -> Result<()> {
    let counts = remove_empty_dirs(&args.output_root)?;

    info!(
        removed = counts.removed,
        failed = counts.failed,
        "empty directory cleanup completed"
    );

    Ok(())
}

/// Removes directories without entries, children first, `root` included.
///
/// Emptiness is checked when a directory is visited, after its children, so
/// a chain of empty directories disappears in a single pass.
pub fn remove_empty_dirs(root: &Path) -> Result<CleanCounts> {
    let mut counts = CleanCounts::default();

    if !root.is_dir() {
        return Ok(counts);
    }

    for entry in WalkDir::new(root).contents_first(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        if !is_empty_dir(path)? {
            continue;
        }

        remove_dir_counted(path, &mut counts);
    }

    Ok(counts)
}

fn remove_dir_counted(path: &Path, counts: &mut CleanCounts) {
    match fs::remove_dir(path) {
        Ok(()) => {
            counts.removed += 1;
            info!(path = %path.display(), "removed empty directory");
        }
        Err(err) => {
            counts.failed += 1;
            warn!(path = %path.display(), error = %err, "failed to remove directory");
        }
    }
}

fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries =
        fs::read_dir(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(entries.next().is_none())
}
