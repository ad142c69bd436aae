use imdg_utils::{sanitize_file_name, ImdgResult, StorageConfig};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Where uploaded PDFs land on disk.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
    per_user_dirs: bool,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, per_user_dirs: bool) -> Self {
        Self {
            root: root.into(),
            per_user_dirs,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.upload_dir, config.per_user_dirs)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir_for(&self, user_id: Uuid) -> PathBuf {
        if self.per_user_dirs {
            self.root.join(user_id.to_string())
        } else {
            self.root.clone()
        }
    }

    /// Writes the upload, replacing a previous file of the same name.
    pub async fn save(&self, user_id: Uuid, file_name: &str, bytes: &[u8]) -> ImdgResult<PathBuf> {
        let file_name = sanitize_file_name(file_name)?;
        let dir = self.dir_for(user_id);
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(file_name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "Replacing existing upload");
            tokio::fs::remove_file(&path).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::info!(path = %path.display(), size = bytes.len(), "Upload saved");
        Ok(path)
    }

    pub async fn remove(&self, path: &Path) -> ImdgResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
