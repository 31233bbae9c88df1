use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Where generated artifacts are kept. Keys are `/`-separated paths relative to the store root.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn write(&self, key: &str, content: &[u8]) -> Result<()>;
    /// Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
    /// Filesystem location of a key, for reporting to the user.
    fn locate(&self, key: &str) -> PathBuf;
}

pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn write(&self, key: &str, content: &[u8]) -> Result<()> {
        let path = self.locate(key);
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.locate(key);
        if tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    fn locate(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_parent_directories() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let storage = FsStorage::new(temp_dir.path());

        storage.write("story/nested/file.txt", b"hello").await?;
        let path = temp_dir.path().join("story").join("nested").join("file.txt");
        assert_eq!(storage.locate("story/nested/file.txt"), path);
        assert_eq!(std::fs::read(&path)?, b"hello");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_ok() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let storage = FsStorage::new(temp_dir.path());

        storage.delete("nothing/here.wav").await?;
        storage.write("a.wav", b"x").await?;
        storage.delete("a.wav").await?;
        assert!(!temp_dir.path().join("a.wav").exists());
        Ok(())
    }
}
