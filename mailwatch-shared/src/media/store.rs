/// On-disk avatar storage
///
/// Processed avatars live under the media root as `avatars/{user_id}.png`.
/// The database stores that relative path; the store resolves it back to a
/// file. One file per user means re-uploads overwrite in place.

use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// Stores and serves avatar files under a media root directory
#[derive(Debug, Clone)]
pub struct AvatarStore {
    root: PathBuf,
}

impl AvatarStore {
    /// Creates a store rooted at `root` (created lazily on first save)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The relative path an avatar for `user_id` is stored at
    pub fn relative_path(user_id: Uuid) -> String {
        format!("avatars/{user_id}.png")
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Writes the processed PNG for a user, returning the relative path
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or written
    pub async fn save(&self, user_id: Uuid, png: &[u8]) -> std::io::Result<String> {
        let relative = Self::relative_path(user_id);
        let path = self.resolve(&relative);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, png).await?;

        Ok(relative)
    }

    /// Reads a stored avatar by its relative path
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file is missing or unreadable
    pub async fn load(&self, relative: &str) -> std::io::Result<Vec<u8>> {
        fs::read(self.resolve(relative)).await
    }

    /// Removes a stored avatar; missing files are not an error
    ///
    /// # Errors
    ///
    /// Returns an I/O error for failures other than the file not existing
    pub async fn remove(&self, relative: &str) -> std::io::Result<()> {
        match fs::remove_file(self.resolve(relative)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// The media root this store writes under
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> AvatarStore {
        let dir = std::env::temp_dir().join(format!("mailwatch-store-{}", Uuid::new_v4()));
        AvatarStore::new(dir)
    }

    #[tokio::test]
    async fn test_save_load_remove_roundtrip() {
        let store = temp_store();
        let user_id = Uuid::new_v4();

        let relative = store.save(user_id, b"png bytes").await.unwrap();
        assert_eq!(relative, format!("avatars/{user_id}.png"));

        let loaded = store.load(&relative).await.unwrap();
        assert_eq!(loaded, b"png bytes");

        store.remove(&relative).await.unwrap();
        assert!(store.load(&relative).await.is_err());
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = temp_store();
        let user_id = Uuid::new_v4();

        store.save(user_id, b"first").await.unwrap();
        let relative = store.save(user_id, b"second").await.unwrap();

        assert_eq!(store.load(&relative).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let store = temp_store();
        store.remove("avatars/does-not-exist.png").await.unwrap();
    }
}
