pub mod clean;
pub mod dedup;
pub mod extract;
pub mod ingest;
pub mod pipeline;
pub mod status;
pub mod title_dedup;
