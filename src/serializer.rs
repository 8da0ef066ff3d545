//! Serialization and file output.
//!
//! Every artifact of a run is written through [`write_atomic`]: the content goes to
//! a temporary sibling file first and is then renamed over the target, so an
//! interrupted run never leaves a half-written document behind.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Serializes a value to JSON, pretty-printed with four-space indentation.
///
/// Map keys keep their insertion order.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .context("Failed to serialize document to JSON")?;
    String::from_utf8(buf).context("Serialized JSON is not valid UTF-8")
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes content to a file atomically.
///
/// Parent directories are created when missing. The file is replaced in one
/// rename, so readers see either the old or the new content.
///
/// # Errors
///
/// Returns an error if the directory, the temporary file or the rename fails.
pub fn write_atomic(content: impl AsRef<[u8]>, path: &Path) -> Result<()> {
    let content = content.as_ref();
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp = temp_path(path);
    fs::write(&temp, content)
        .with_context(|| format!("Failed to write to file: {}", temp.display()))?;
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(e).with_context(|| format!("Failed to replace file: {}", path.display()));
    }

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Copies a file, replacing the target atomically.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    let content =
        fs::read(from).with_context(|| format!("Failed to read file: {}", from.display()))?;
    write_atomic(content, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_serialize_json_four_space_indent() {
        let json = serialize_json(&json!({"openapi": "3.0.0", "info": {"title": "Test API"}})).unwrap();
        assert_eq!(
            json,
            "{\n    \"openapi\": \"3.0.0\",\n    \"info\": {\n        \"title\": \"Test API\"\n    }\n}"
        );
    }

    #[test]
    fn test_serialize_json_keeps_insertion_order() {
        let mut map = IndexMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        let json = serialize_json(&map).unwrap();
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
    }

    #[test]
    fn test_write_atomic() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("index.md");

        write_atomic("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
        assert!(!temp_path(&file_path).exists());
    }

    #[test]
    fn test_write_atomic_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("docs").join("source").join("index.md");

        write_atomic("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_atomic_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("collection.json");

        write_atomic("initial content", &file_path).unwrap();
        write_atomic("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_write_atomic_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("source");
        fs::write(&blocker, "not a directory").unwrap();

        assert!(write_atomic("x", &blocker.join("index.md")).is_err());
    }

    #[test]
    fn test_copy_file() {
        let temp_dir = TempDir::new().unwrap();
        let from = temp_dir.path().join("logo-src.png");
        fs::write(&from, [0x89, b'P', b'N', b'G']).unwrap();
        let to = temp_dir.path().join("images").join("logo.png");

        copy_file(&from, &to).unwrap();

        assert_eq!(fs::read(&to).unwrap(), vec![0x89, b'P', b'N', b'G']);
        assert!(copy_file(&temp_dir.path().join("missing.png"), &to).is_err());
    }
}
