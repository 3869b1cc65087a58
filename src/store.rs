// 💾 Record Store - JSON files between pipeline stages
//
// Every stage reads and writes plain JSON under the base directory so an
// operator can inspect (and, for the error file, edit) it between runs.
// Writes go to a sibling temp file first and are renamed into place.

use crate::error::PipelineError;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct RecordStore {
    base_dir: PathBuf,

    /// Per-run backup folder; None disables backups
    backup_dir: Option<PathBuf>,
}

impl RecordStore {
    pub fn new(base_dir: &Path) -> Self {
        RecordStore {
            base_dir: base_dir.to_path_buf(),
            backup_dir: None,
        }
    }

    /// Builder pattern: copy every `write_and_backup` into `dir`
    pub fn with_backup_dir(mut self, dir: PathBuf) -> Self {
        self.backup_dir = Some(dir);
        self
    }

    pub fn path(&self, relative: &Path) -> PathBuf {
        self.base_dir.join(relative)
    }

    pub fn exists(&self, relative: &Path) -> bool {
        self.path(relative).is_file()
    }

    /// Exists and is not empty
    pub fn is_usable(&self, relative: &Path) -> bool {
        fs::metadata(self.path(relative))
            .map(|meta| meta.is_file() && meta.len() > 0)
            .unwrap_or(false)
    }

    pub fn load<T: DeserializeOwned>(&self, relative: &Path) -> Result<T> {
        if !self.is_usable(relative) {
            return Err(PipelineError::InputUnusable(self.path(relative)).into());
        }

        let path = self.path(relative);
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON in {:?}", path))
    }

    /// Pretty JSON (4-space indent), as every stage file is written
    pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
        value
            .serialize(&mut serializer)
            .context("Failed to serialize JSON")?;
        Ok(bytes)
    }

    /// Write one file and return its sha256
    pub fn write<T: Serialize>(&self, relative: &Path, value: &T) -> Result<String> {
        let bytes = RecordStore::encode(value)?;
        write_atomic(&self.path(relative), &bytes)?;
        Ok(sha256_hex(&bytes))
    }

    /// `write`, plus a `backup_<file name>` copy in the run's backup folder
    pub fn write_and_backup<T: Serialize>(&self, relative: &Path, value: &T) -> Result<String> {
        let bytes = RecordStore::encode(value)?;
        let mut digests = self.write_all_and_backup(&[(relative, bytes)])?;
        Ok(digests.remove(0))
    }

    /// Put several encoded files in place together, returning their sha256 in order
    ///
    /// Every temp file is written before the first rename, so a failed write
    /// leaves all targets as they were.
    pub fn write_all_and_backup(&self, files: &[(&Path, Vec<u8>)]) -> Result<Vec<String>> {
        let mut staged = Vec::with_capacity(files.len());
        for (relative, bytes) in files {
            let target = self.path(relative);
            match write_temp(&target, bytes) {
                Ok(tmp_path) => staged.push((tmp_path, target)),
                Err(e) => {
                    for (tmp_path, _) in &staged {
                        let _ = fs::remove_file(tmp_path);
                    }
                    return Err(e);
                }
            }
        }

        for (tmp_path, target) in &staged {
            commit(tmp_path, target)?;
        }

        let mut digests = Vec::with_capacity(files.len());
        for (relative, bytes) in files {
            self.backup(relative, bytes)?;
            digests.push(sha256_hex(bytes));
        }
        Ok(digests)
    }

    fn backup(&self, relative: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(backup_dir) = &self.backup_dir {
            let file_name = relative
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("output.json");
            let backup_path = backup_dir.join(format!("backup_{}", file_name));
            write_atomic(&backup_path, bytes)?;
            debug!(path = %backup_path.display(), "backup written");
        }
        Ok(())
    }

    /// sha256 of the file as it is on disk now
    pub fn digest(&self, relative: &Path) -> Result<Option<String>> {
        let path = self.path(relative);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("Failed to read file: {:?}", path))?;
        Ok(Some(sha256_hex(&bytes)))
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp_path = write_temp(path, bytes)?;
    commit(&tmp_path, path)
}

/// Write `.<name>.tmp` next to `path`
fn write_temp(path: &Path, bytes: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("output");
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name));

    fs::write(&tmp_path, bytes).with_context(|| format!("Failed to write file: {:?}", tmp_path))?;
    Ok(tmp_path)
}

fn commit(tmp_path: &Path, path: &Path) -> Result<()> {
    fs::rename(tmp_path, path).with_context(|| format!("Failed to move {:?} into place", tmp_path))
}

fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CleanRecord;

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let records = vec![CleanRecord::new("A", "d", "Apply", "SE")];
        let relative = Path::new("data/2_clean_competencies.json");

        store.write(relative, &records).unwrap();
        let loaded: Vec<CleanRecord> = store.load(relative).unwrap();

        assert_eq!(loaded, records);
        assert!(!dir.path().join("data/.2_clean_competencies.json.tmp").exists());
    }

    #[test]
    fn test_output_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        store.write(Path::new("run_info.json"), &serde_json::json!({"number": 1})).unwrap();

        let content = fs::read_to_string(dir.path().join("run_info.json")).unwrap();
        assert_eq!(content, "{\n    \"number\": 1\n}");
    }

    #[test]
    fn test_empty_or_missing_file_is_unusable() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        fs::write(dir.path().join("empty.json"), "").unwrap();

        assert!(store.exists(Path::new("empty.json")));
        assert!(!store.is_usable(Path::new("empty.json")));
        assert!(!store.is_usable(Path::new("missing.json")));

        let err = store.load::<Vec<CleanRecord>>(Path::new("empty.json")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InputUnusable(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        fs::write(dir.path().join("broken.json"), "[{\"title\": ").unwrap();

        let err = store.load::<Vec<CleanRecord>>(Path::new("broken.json")).unwrap_err();

        assert!(err.to_string().contains("Failed to parse JSON"));
    }

    #[test]
    fn test_backup_copy_and_digest() {
        let dir = tempfile::tempdir().unwrap();
        let backup_dir = dir.path().join("data/previous_runs/3");
        let store = RecordStore::new(dir.path()).with_backup_dir(backup_dir.clone());
        let relative = Path::new("data/3_error_competencies.json");

        let digest = store.write_and_backup(relative, &Vec::<CleanRecord>::new()).unwrap();

        let backup = backup_dir.join("backup_3_error_competencies.json");
        assert_eq!(fs::read_to_string(backup).unwrap(), "[]");
        assert_eq!(store.digest(relative).unwrap(), Some(digest));
        assert_eq!(store.digest(Path::new("nope.json")).unwrap(), None);
    }

    #[test]
    fn test_write_all_leaves_targets_untouched_when_one_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let first = Path::new("data/3_correct_competencies.json");
        let second = Path::new("data/3_error_competencies.json");
        store.write(first, &vec!["old"]).unwrap();
        // A directory where the temp file should go makes the second write fail
        fs::create_dir_all(dir.path().join("data/.3_error_competencies.json.tmp")).unwrap();

        let files = [
            (first, RecordStore::encode(&vec!["new"]).unwrap()),
            (second, RecordStore::encode(&Vec::<String>::new()).unwrap()),
        ];
        let result = store.write_all_and_backup(&files);

        assert!(result.is_err());
        let kept: Vec<String> = store.load(first).unwrap();
        assert_eq!(kept, vec!["old".to_string()]);
        assert!(!store.exists(second));
        assert!(!dir.path().join("data/.3_correct_competencies.json.tmp").exists());
    }

    #[test]
    fn test_write_all_returns_digests_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        let files = [
            (Path::new("a.json"), RecordStore::encode(&vec![1]).unwrap()),
            (Path::new("b.json"), RecordStore::encode(&vec![2]).unwrap()),
        ];

        let digests = store.write_all_and_backup(&files).unwrap();

        assert_eq!(digests.len(), 2);
        assert_eq!(store.digest(Path::new("a.json")).unwrap().as_ref(), Some(&digests[0]));
        assert_eq!(store.digest(Path::new("b.json")).unwrap().as_ref(), Some(&digests[1]));
    }
}
