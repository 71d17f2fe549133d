use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use crate::core::error::{Error, Result};
use crate::storage::backend::StorageBackend;

/// One `<key>.json` file per key under `base_dir`
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;
        Ok(FileStorage { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
            .collect();
        self.base_dir.join(format!("{}.json", file_name))
    }
}

impl StorageBackend for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    /// Written to a temp file in the same directory, then renamed over the
    /// target, so readers see either the old or the new blob.
    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let mut tmp = NamedTempFile::new_in(&self.base_dir)
            .map_err(|e| Error::storage(format!("temp file in {}: {}", self.base_dir.display(), e)))?;
        tmp.write_all(value.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| Error::storage(format!("writing {}: {}", path.display(), e)))?;
        tmp.persist(&path)
            .map_err(|e| Error::storage(format!("replacing {}: {}", path.display(), e.error)))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.read("mop-mounts.v2.owned").unwrap(), None);
        storage.write("mop-mounts.v2.owned", "[\"a\"]").unwrap();
        storage.write("mop-mounts.v2.owned", "[\"b\"]").unwrap();
        assert_eq!(storage.read("mop-mounts.v2.owned").unwrap().as_deref(), Some("[\"b\"]"));
        assert!(dir.path().join("mop-mounts.v2.owned.json").exists());

        storage.remove("mop-mounts.v2.owned").unwrap();
        assert_eq!(storage.read("mop-mounts.v2.owned").unwrap(), None);
    }

    #[test]
    fn keys_cannot_escape_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let path = storage.path_for("../evil/key");
        assert_eq!(path.parent(), Some(dir.path()));
    }
}
