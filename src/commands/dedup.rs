use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use tracing::{debug, info, warn};

use crate::cli::DedupArgs;
use crate::model::DedupCounts;
use crate::normalize::ContentNormalizer;
use crate::similarity::similarity_ratio;
use crate::util::{list_collections, list_documents, read_document, remove_file_if_exists};

/// Deliberately low: loosely similar lyrics already count as duplicates.
pub const DEFAULT_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct DedupOptions {
    pub output_root: PathBuf,
    pub extension: String,
    pub threshold: f64,
}

impl From<DedupArgs> for DedupOptions {
    fn from(args: DedupArgs) -> Self {
        Self {
            output_root: args.output_root,
            extension: args.extension,
            threshold: args.threshold,
        }
    }
}

pub fn run(args: DedupArgs) -> Result<()> {
    let options = DedupOptions::from(args);
    let counts = dedup_collections(&options)?;

    info!(
        collections = counts.collections,
        comparisons = counts.comparisons,
        removed = counts.removed,
        failed = counts.failed,
        "cross-collection dedup completed"
    );

    Ok(())
}

pub fn validate_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        bail!("similarity threshold must be within [0, 1], got {threshold}");
    }
    Ok(())
}

struct CachedDocument {
    path: PathBuf,
    normalized: String,
}

/// Removes every document of a later collection that is at least
/// `threshold`-similar to some document of an earlier collection.
///
/// Collections are visited in discovery order. Each pass over `Ci` finishes
/// its deletions before `Ci+1` is cached, so a document removed by an earlier
/// pass never takes part in a later one. Documents of earlier collections are
/// never removed in favor of later ones.
pub fn dedup_collections(options: &DedupOptions) -> Result<DedupCounts> {
    validate_threshold(options.threshold)?;

    let mut counts = DedupCounts::default();

    if !options.output_root.is_dir() {
        warn!(
            path = %options.output_root.display(),
            "output root does not exist, nothing to deduplicate"
        );
        return Ok(counts);
    }

    let normalizer = ContentNormalizer::new()?;
    let collections = list_collections(&options.output_root)?;
    counts.collections = collections.len();

    for (index, collection) in collections.iter().enumerate() {
        let cached = cache_collection(collection, &options.extension, &normalizer)?;
        if cached.is_empty() {
            continue;
        }

        let mut marked = BTreeSet::new();
        for later in &collections[index + 1..] {
            sweep_collection(
                later,
                &cached,
                options,
                &normalizer,
                &mut marked,
                &mut counts,
            )?;
        }

        counts.marked += marked.len();
        remove_marked(&marked, &mut counts);
    }

    Ok(counts)
}

fn cache_collection(
    collection: &Path,
    extension: &str,
    normalizer: &ContentNormalizer,
) -> Result<Vec<CachedDocument>> {
    if !collection.is_dir() {
        return Ok(Vec::new());
    }

    list_documents(collection, extension)?
        .into_iter()
        .map(|path| {
            let normalized = normalizer.normalize(&read_document(&path)?);
            Ok(CachedDocument { path, normalized })
        })
        .collect()
}

fn sweep_collection(
    collection: &Path,
    cached: &[CachedDocument],
    options: &DedupOptions,
    normalizer: &ContentNormalizer,
    marked: &mut BTreeSet<PathBuf>,
    counts: &mut DedupCounts,
) -> Result<()> {
    if !collection.is_dir() {
        return Ok(());
    }

    for candidate in list_documents(collection, &options.extension)? {
        let normalized = normalizer.normalize(&read_document(&candidate)?);

        for original in cached {
            counts.comparisons += 1;
            let ratio = similarity_ratio(&original.normalized, &normalized);
            if ratio >= options.threshold {
                debug!(
                    path = %candidate.display(),
                    original = %original.path.display(),
                    ratio,
                    "marked similar document for removal"
                );
                marked.insert(candidate);
                break;
            }
        }
    }

    Ok(())
}

fn remove_marked(marked: &BTreeSet<PathBuf>, counts: &mut DedupCounts) {
    for path in marked {
        match remove_file_if_exists(path) {
            Ok(true) => {
                counts.removed += 1;
                info!(path = %path.display(), "removed similar document");
            }
            Ok(false) => {}
            Err(err) => {
                counts.failed += 1;
                warn!(path = %path.display(), error = %err, "failed to remove document");
            }
        }
    }
}
