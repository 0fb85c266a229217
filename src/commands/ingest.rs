use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::{NoExpand, Regex};
use tracing::{info, warn};

use crate::cli::IngestArgs;
use crate::model::IngestCounts;
use crate::util::{ensure_directory, list_collections, list_documents, read_document};

pub const DEFAULT_MARKER_LABEL: &str = "Verse 1";

#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub source_root: PathBuf,
    pub output_root: PathBuf,
    pub extension: String,
    pub marker_label: String,
}

impl From<IngestArgs> for IngestOptions {
    fn from(args: IngestArgs) -> Self {
        Self {
            source_root: args.source_root,
            output_root: args.output_root,
            extension: args.extension,
            marker_label: args.marker_label,
        }
    }
}

pub fn run(args: IngestArgs) -> Result<()> {
    let options = IngestOptions::from(args);
    let counts = ingest_tree(&options)?;

    info!(
        errors = counts.skipped,
        successes = counts.written,
        collections = counts.collections,
        "ingest completed"
    );

    Ok(())
}

/// Section-start marker, e.g. `[Verse 1]`.
///
/// Qualified forms such as `[Verse 1: Artist]` are collapsed to the bare
/// label before searching.
#[derive(Debug, Clone)]
pub struct SectionMarker {
    canonical: String,
    qualified: Regex,
}

impl SectionMarker {
    pub fn new(label: &str) -> Result<Self> {
        let qualified = Regex::new(&format!(r"\[{}:.*?\]", regex::escape(label)))
            .with_context(|| format!("failed to compile marker regex for label: {label}"))?;

        Ok(Self {
            canonical: format!("[{label}]"),
            qualified,
        })
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Content from the first canonical marker onward, or `None` when absent.
    pub fn trim_to_marker(&self, content: &str) -> Option<String> {
        let canonicalized = self
            .qualified
            .replace_all(content, NoExpand(&self.canonical));
        canonicalized
            .find(&self.canonical)
            .map(|index| canonicalized[index..].to_string())
    }
}

pub fn ingest_tree(options: &IngestOptions) -> Result<IngestCounts> {
    let mut counts = IngestCounts::default();

    if !options.source_root.is_dir() {
        warn!(
            path = %options.source_root.display(),
            "source root does not exist, nothing to ingest"
        );
        return Ok(counts);
    }

    let marker = SectionMarker::new(&options.marker_label)?;

    for collection in list_collections(&options.source_root)? {
        counts.collections += 1;

        let Some(name) = collection.file_name() else {
            continue;
        };
        let output_collection = options.output_root.join(name);
        ensure_directory(&output_collection)?;

        let documents = list_documents(&collection, &options.extension)?;
        if documents.is_empty() {
            counts.empty_collections += 1;
            warn!(path = %collection.display(), "collection has no documents");
            continue;
        }

        for document in documents {
            ingest_document(&document, &output_collection, &marker, &mut counts)?;
        }
    }

    Ok(counts)
}

fn ingest_document(
    document: &Path,
    output_collection: &Path,
    marker: &SectionMarker,
    counts: &mut IngestCounts,
) -> Result<()> {
    let content = read_document(document)?;

    let Some(trimmed) = marker.trim_to_marker(&content) else {
        warn!(
            path = %document.display(),
            marker = marker.canonical(),
            "skipped document without section marker"
        );
        counts.skipped += 1;
        return Ok(());
    };

    let Some(file_name) = document.file_name() else {
        counts.skipped += 1;
        return Ok(());
    };
    let output_path = output_collection.join(file_name);
    fs::write(&output_path, trimmed)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    counts.written += 1;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker() -> SectionMarker {
        SectionMarker::new(DEFAULT_MARKER_LABEL).expect("marker")
    }

    fn options(source_root: &Path, output_root: &Path) -> IngestOptions {
        IngestOptions {
            source_root: source_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            extension: "txt".to_string(),
            marker_label: DEFAULT_MARKER_LABEL.to_string(),
        }
    }

    #[test]
    fn qualified_marker_is_canonicalized() {
        let trimmed = marker().trim_to_marker("[Verse 1: X]\nhello");
        assert_eq!(trimmed.as_deref(), Some("[Verse 1]\nhello"));
    }

    #[test]
    fn content_before_marker_is_dropped_and_rest_kept_verbatim() {
        let content = "Song Title Lyrics\n[Intro]\nooh\n[Verse 1: A & B]\nline one\n[Chorus]\n  la\n";
        let trimmed = marker().trim_to_marker(content);
        assert_eq!(
            trimmed.as_deref(),
            Some("[Verse 1]\nline one\n[Chorus]\n  la\n")
        );
    }

    #[test]
    fn qualified_marker_does_not_span_lines() {
        let trimmed = marker().trim_to_marker("[Verse 1:\nnot closed] text");
        assert_eq!(trimmed, None);
    }

    #[test]
    fn other_labels_are_left_alone() {
        assert_eq!(marker().trim_to_marker("[Verse 2: X]\nhello"), None);
        let trimmed = marker().trim_to_marker("[Chorus: Y]\n[Verse 1]\nhi");
        assert_eq!(trimmed.as_deref(), Some("[Verse 1]\nhi"));
    }

    #[test]
    fn custom_label_is_escaped() {
        let marker = SectionMarker::new("Part (1)").expect("marker");
        let trimmed = marker.trim_to_marker("x [Part (1): Solo] y");
        assert_eq!(trimmed.as_deref(), Some("[Part (1)] y"));
    }

    #[test]
    fn ingest_tree_writes_trimmed_documents_and_counts_skips() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let source = tmp.path().join("data_init");
        let output = tmp.path().join("data_processed");
        fs::create_dir_all(source.join("album")).expect("mkdir");
        fs::write(source.join("album/song.txt"), "Header\n[Verse 1: X]\nhello").expect("write");
        fs::write(source.join("album/broken.txt"), "no marker here").expect("write");
        fs::write(source.join("album/cover.jpg"), "binary").expect("write");

        let counts = ingest_tree(&options(&source, &output)).expect("ingest");

        assert_eq!(counts.written, 1);
        assert_eq!(counts.skipped, 1);
        assert_eq!(counts.collections, 1);
        assert_eq!(
            fs::read_to_string(output.join("album/song.txt")).expect("read"),
            "[Verse 1]\nhello"
        );
        assert!(!output.join("album/broken.txt").exists());
        assert!(!output.join("album/cover.jpg").exists());
    }

    #[test]
    fn empty_collection_still_gets_output_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let source = tmp.path().join("src");
        let output = tmp.path().join("out");
        fs::create_dir_all(source.join("empty_album")).expect("mkdir");

        let counts = ingest_tree(&options(&source, &output)).expect("ingest");

        assert_eq!(counts.empty_collections, 1);
        assert_eq!(counts.written + counts.skipped, 0);
        assert!(output.join("empty_album").is_dir());
    }

    #[test]
    fn missing_source_root_is_a_no_op() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let output = tmp.path().join("out");

        let counts =
            ingest_tree(&options(&tmp.path().join("missing"), &output)).expect("ingest");

        assert_eq!(counts, IngestCounts::default());
        assert!(!output.exists());
    }

    #[test]
    fn invalid_utf8_document_is_fatal() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let source = tmp.path().join("src");
        fs::create_dir_all(source.join("album")).expect("mkdir");
        fs::write(source.join("album/bad.txt"), [0xff, 0xfe, 0x00]).expect("write");

        let result = ingest_tree(&options(&source, &tmp.path().join("out")));
        assert!(result.is_err());
    }
}
