use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::dedup::DEFAULT_THRESHOLD;

#[derive(Parser, Debug)]
#[command(
    name = "lyricprep",
    version,
    about = "Lyrics corpus cleanup, deduplication and dataset extraction"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy documents into the output tree, trimmed to the first verse marker.
    Ingest(IngestArgs),
    /// Remove documents similar to a document of an earlier collection.
    Dedup(DedupArgs),
    /// Remove documents sharing a title key within one directory.
    TitleDedup(TitleDedupArgs),
    /// Remove empty directories bottom-up.
    Clean(CleanArgs),
    /// Build the text/summary dataset from the output tree.
    Extract(ExtractArgs),
    /// Run every stage in order.
    Run(RunArgs),
    /// Report collection, document and dataset record counts.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = "data_init")]
    pub source_root: PathBuf,

    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value = "Verse 1")]
    pub marker_label: String,
}

#[derive(Args, Debug, Clone)]
pub struct DedupArgs {
    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
}

#[derive(Args, Debug, Clone)]
pub struct TitleDedupArgs {
    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value_t = '_')]
    pub delimiter: char,
}

#[derive(Args, Debug, Clone)]
pub struct CleanArgs {
    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value = "dataset_processed.json")]
    pub dataset_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long, default_value = "data_init")]
    pub source_root: PathBuf,

    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "dataset_processed.json")]
    pub dataset_path: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value = "Verse 1")]
    pub marker_label: String,

    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    #[arg(long, default_value_t = '_')]
    pub delimiter: char,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "data_processed")]
    pub output_root: PathBuf,

    #[arg(long, default_value = "txt")]
    pub extension: String,

    #[arg(long, default_value = "dataset_processed.json")]
    pub dataset_path: PathBuf,
}
