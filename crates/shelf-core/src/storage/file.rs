//! File-backed slot store
//!
//! Each key maps to `<dir>/<key>.json`. Writes are atomic (write to a temp
//! file, sync, then rename) so a slot is never left partially written.
//!
//! Storage location: `~/.local/share/shelf/` (configurable via `Config`)

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Access, SlotStore, StorageError, StorageResult};

/// Slot store that keeps one JSON file per key in a directory
#[derive(Debug, Clone)]
pub struct FileSlotStore {
    dir: PathBuf,
}

impl FileSlotStore {
    /// Create a store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the slot files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }

    /// Size in bytes of the file backing `key`, if it exists
    pub fn size_of(&self, key: &str) -> StorageResult<Option<u64>> {
        let path = self.path_for(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io(e, path, Access::Read)),
        }
    }
}

impl SlotStore for FileSlotStore {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Read slot '{}' ({} bytes)", key, content.len());
                Ok(Some(content))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::from_io(e, path, Access::Read)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        atomic_write(&path, value.as_bytes())?;
        debug!("Wrote slot '{}' ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::from_io(e, path, Access::Write)),
        }
    }
}

/// True when `key` can be used as a slot file name
///
/// Keys become file names, so they must not escape the directory.
pub fn is_valid_key(key: &str) -> bool {
    !(key.is_empty()
        || key == "."
        || key == ".."
        || key.contains(['/', '\\'])
        || key.chars().any(char::is_control))
}

fn validate_key(key: &str) -> StorageResult<()> {
    if !is_valid_key(key) {
        return Err(StorageError::InvalidKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDirectory {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path = path.with_extension("json.tmp");

    let write_err = |e: io::Error| StorageError::from_io(e, temp_path.clone(), Access::Write);

    let mut file = File::create(&temp_path).map_err(write_err)?;
    file.write_all(data).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    fs::rename(&temp_path, path).map_err(|source| StorageError::ReplaceFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        assert!(store.get_item("library-books").unwrap().is_none());

        store.set_item("library-books", "[]").unwrap();
        assert_eq!(
            store.get_item("library-books").unwrap().as_deref(),
            Some("[]")
        );
        assert!(temp_dir.path().join("library-books.json").exists());
        assert!(!temp_dir.path().join("library-books.json.tmp").exists());
    }

    #[test]
    fn test_overwrite_replaces_whole_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        store.set_item("k", "a much longer first value").unwrap();
        store.set_item("k", "short").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a").join("b").join("c");
        let store = FileSlotStore::new(&nested);

        store.set_item("books", "test data").unwrap();

        let content = fs::read_to_string(nested.join("books.json")).unwrap();
        assert_eq!(content, "test data");
    }

    #[test]
    fn test_remove_item() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        store.set_item("k", "v").unwrap();
        store.remove_item("k").unwrap();
        assert!(store.get_item("k").unwrap().is_none());

        // Removing again is fine
        store.remove_item("k").unwrap();
    }

    #[test]
    fn test_size_of() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        assert_eq!(store.size_of("k").unwrap(), None);
        store.set_item("k", "12345").unwrap();
        assert_eq!(store.size_of("k").unwrap(), Some(5));
    }

    #[test]
    fn test_rejects_keys_that_escape_the_directory() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileSlotStore::new(temp_dir.path());

        for key in ["", ".", "..", "../books", "a/b", "a\\b", "tab\tkey"] {
            let err = store.set_item(key, "[]").unwrap_err();
            assert!(matches!(err, StorageError::InvalidKey { .. }), "key {:?}", key);
        }
    }
}
