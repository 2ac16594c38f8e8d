use std::path::{Path, PathBuf};

use tokio::fs;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::utils::upload::UploadedFile;

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Images,
    Resumes,
}

impl Folder {
    fn as_str(&self) -> &'static str {
        match self {
            Folder::Images => "images",
            Folder::Resumes => "resumes",
        }
    }
}

/// Stores uploads on local disk and hands out the URL they are served from.
#[derive(Clone)]
pub struct StorageService {
    root: PathBuf,
}

impl StorageService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn store(&self, folder: Folder, file: &UploadedFile) -> Result<String> {
        let dir = self.root.join(folder.as_str());
        fs::create_dir_all(&dir).await?;

        let name = format!("{}.{}", Uuid::new_v4(), file.kind.extension());
        fs::write(dir.join(&name), &file.data).await.map_err(|e| {
            tracing::error!(error = %e, folder = folder.as_str(), "failed to store upload");
            Error::Internal(format!("Failed to save file: {}", e))
        })?;

        Ok(format!("{}/{}/{}", PUBLIC_PREFIX, folder.as_str(), name))
    }

    /// Deletes a file previously returned by [`StorageService::store`].
    /// Unknown URLs and already missing files are ignored.
    pub async fn remove(&self, url: &str) -> Result<()> {
        let Some(path) = self.path_for(url) else {
            tracing::warn!(url, "refusing to delete file outside uploads");
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort cleanup used after database changes are committed.
    pub async fn remove_all<I, S>(&self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            if let Err(e) = self.remove(url.as_ref()).await {
                tracing::warn!(error = %e, url = url.as_ref(), "failed to delete stored file");
            }
        }
    }

    fn path_for(&self, url: &str) -> Option<PathBuf> {
        let rest = url.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;
        let (folder, name) = rest.split_once('/')?;
        if !matches!(folder, "images" | "resumes")
            || name.is_empty()
            || name.contains('/')
            || name.contains("..")
        {
            return None;
        }
        Some(self.root.join(folder).join(name))
    }
}
