use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Immediate subdirectories of `root`, sorted by name. Hidden entries are skipped.
pub fn list_collections(root: &Path) -> Result<Vec<PathBuf>> {
    let mut collections = Vec::new();

    let entries =
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", root.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_dir()
        {
            continue;
        }

        if is_hidden(&path) {
            continue;
        }

        collections.push(path);
    }

    collections.sort();
    Ok(collections)
}

/// Regular files directly inside `dir` carrying `extension`, sorted by name.
/// Hidden files are skipped.
pub fn list_documents(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut documents = Vec::new();

    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        if has_extension(&path, extension) && !is_hidden(&path) {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

pub fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == extension)
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Removes `path`, returning `Ok(false)` when it is already gone.
pub fn remove_file_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;
    write_json_bytes(path, &data)
}

/// Like [`write_json_pretty`] but with four-space indentation.
pub fn write_json_indented<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut data = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    value
        .serialize(&mut serializer)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;
    write_json_bytes(path, &data)
}

fn write_json_bytes(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_collections_skips_files_and_hidden_directories() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::create_dir(tmp.path().join("b_album")).expect("mkdir");
        fs::create_dir(tmp.path().join("a_album")).expect("mkdir");
        fs::create_dir(tmp.path().join(".git")).expect("mkdir");
        fs::write(tmp.path().join("notes.txt"), "x").expect("write");

        let collections = list_collections(tmp.path()).expect("list");
        let names: Vec<_> = collections
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a_album", "b_album"]);
    }

    #[test]
    fn list_documents_matches_extension_exactly() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join("b.txt"), "x").expect("write");
        fs::write(tmp.path().join("a.txt"), "x").expect("write");
        fs::write(tmp.path().join("c.TXT"), "x").expect("write");
        fs::write(tmp.path().join("d.md"), "x").expect("write");
        fs::create_dir(tmp.path().join("e.txt")).expect("mkdir");

        let documents = list_documents(tmp.path(), "txt").expect("list");
        assert_eq!(
            documents,
            vec![tmp.path().join("a.txt"), tmp.path().join("b.txt")]
        );
    }

    #[test]
    fn list_documents_skips_hidden_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        fs::write(tmp.path().join(".draft.txt"), "x").expect("write");
        fs::write(tmp.path().join("song.txt"), "x").expect("write");

        let documents = list_documents(tmp.path(), "txt").expect("list");
        assert_eq!(documents, vec![tmp.path().join("song.txt")]);
    }

    #[test]
    fn remove_file_if_exists_is_idempotent() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("gone.txt");
        fs::write(&path, "x").expect("write");

        assert!(remove_file_if_exists(&path).expect("first removal"));
        assert!(!remove_file_if_exists(&path).expect("second removal"));
    }

    #[test]
    fn write_json_indented_uses_four_spaces_and_keeps_unicode() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("out").join("data.json");

        write_json_indented(&path, &vec![serde_json::json!({ "text": "Żółć ñ" })])
            .expect("write json");

        let raw = fs::read_to_string(&path).expect("read json");
        assert!(raw.contains("Żółć ñ"));
        assert!(raw.contains("\n    {\n        \"text\""));
        assert!(raw.ends_with("]\n"));
    }
}
