use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Photo blobs stored under a root directory.
pub struct BlobStorage {
    root: PathBuf,
}

impl BlobStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes `content` at `relative_path` under the root and returns the
    /// path actually written, relative to the root. An existing file is never
    /// overwritten; a numbered variant is used instead.
    pub fn store(&self, relative_path: &str, content: &[u8]) -> Result<String, StorageError> {
        let relative = validate_relative(relative_path)?;
        let full_path = self.root.join(relative);

        let dir_path = full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        self.ensure_directory(&dir_path)?;

        let filename = full_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidPath(relative_path.to_string()))?;

        let written = self.store_with_atomic_creation(&dir_path, filename, content)?;

        let relative_written = written
            .strip_prefix(&self.root)
            .map_err(|_| StorageError::InvalidPath(written.display().to_string()))?;
        Ok(relative_written.to_string_lossy().replace('\\', "/"))
    }

    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_relative(relative_path)?))
    }

    /// Stores content using exclusive creation so concurrent writers never
    /// clobber each other.
    fn store_with_atomic_creation(
        &self,
        dir_path: &Path,
        filename: &str,
        content: &[u8],
    ) -> Result<PathBuf, StorageError> {
        use std::io::Write;

        let (base, ext) = match filename.rfind('.') {
            Some(dot_pos) if dot_pos > 0 => (&filename[..dot_pos], Some(&filename[dot_pos..])),
            _ => (filename, None),
        };

        for counter in 1..=1000 {
            let try_filename = if counter == 1 {
                filename.to_string()
            } else {
                match ext {
                    Some(ext) => format!("{}_{}{}", base, counter, ext),
                    None => format!("{}_{}", base, counter),
                }
            };

            let try_path = dir_path.join(&try_filename);

            match std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&try_path)
            {
                Ok(mut file) => {
                    file.write_all(content)
                        .map_err(|e| StorageError::WriteFile {
                            path: try_path.clone(),
                            source: e,
                        })?;
                    return Ok(try_path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(StorageError::WriteFile {
                        path: try_path,
                        source: e,
                    });
                }
            }
        }

        Err(StorageError::FileExists(dir_path.join(filename)))
    }

    fn ensure_directory(&self, path: &Path) -> Result<(), StorageError> {
        if !path.exists() {
            std::fs::create_dir_all(path).map_err(|e| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// Rejects absolute paths and anything that could escape the root.
fn validate_relative(relative_path: &str) -> Result<&Path, StorageError> {
    let path = Path::new(relative_path);
    let is_plain = !relative_path.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if is_plain {
        Ok(path)
    } else {
        Err(StorageError::InvalidPath(relative_path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_creates_nested_directories() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        let stored = storage
            .store("user-1/attempt-1/item.jpg", b"jpeg bytes")
            .unwrap();

        assert_eq!(stored, "user-1/attempt-1/item.jpg");
        let content = std::fs::read(storage.resolve(&stored).unwrap()).unwrap();
        assert_eq!(content, b"jpeg bytes");
    }

    #[test]
    fn test_store_never_overwrites() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        let first = storage.store("u/proof.jpg", b"one").unwrap();
        let second = storage.store("u/proof.jpg", b"two").unwrap();
        let third = storage.store("u/proof.jpg", b"three").unwrap();

        assert_eq!(first, "u/proof.jpg");
        assert_eq!(second, "u/proof_2.jpg");
        assert_eq!(third, "u/proof_3.jpg");
        assert_eq!(
            std::fs::read(temp.path().join("u/proof.jpg")).unwrap(),
            b"one"
        );
    }

    #[test]
    fn test_store_without_extension() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        storage.store("blob", b"a").unwrap();
        assert_eq!(storage.store("blob", b"b").unwrap(), "blob_2");
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let temp = TempDir::new().unwrap();
        let storage = BlobStorage::new(temp.path());

        for bad in ["", "../outside.jpg", "/etc/passwd", "a/../../b.jpg", "./x.jpg"] {
            assert!(
                matches!(storage.store(bad, b"x"), Err(StorageError::InvalidPath(_))),
                "accepted {:?}",
                bad
            );
        }
    }
}
