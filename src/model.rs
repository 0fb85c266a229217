use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub text: String,
    pub summary: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestCounts {
    pub collections: usize,
    pub empty_collections: usize,
    pub written: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupCounts {
    pub collections: usize,
    pub comparisons: usize,
    pub marked: usize,
    pub removed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TitleDedupCounts {
    pub directories: usize,
    pub kept: usize,
    pub removed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanCounts {
    pub removed: usize,
    pub failed: usize,
}

impl CleanCounts {
    pub fn merge(self, other: CleanCounts) -> CleanCounts {
        CleanCounts {
            removed: self.removed + other.removed,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtractCounts {
    pub documents: usize,
    pub records: usize,
    pub excluded: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelinePaths {
    pub source_root: String,
    pub output_root: String,
    pub dataset_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineCounts {
    pub ingest: IngestCounts,
    pub dedup: DedupCounts,
    pub clean: CleanCounts,
    pub title_dedup: TitleDedupCounts,
    pub extract: ExtractCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub threshold: f64,
    pub marker_label: String,
    pub paths: PipelinePaths,
    pub counts: PipelineCounts,
    pub dataset_sha256: String,
}
