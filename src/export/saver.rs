//! Save targets for exported files.

use std::path::{Path, PathBuf};

use super::{ExportError, ExportedFile};

/// Trait abstracting the "save file" action for testability.
///
/// `DirectorySaver` writes to disk. Tests substitute an in-memory recorder.
#[allow(async_fn_in_trait)]
pub trait FileSaver {
    /// Persist `file` and return where it ended up.
    async fn save(&self, file: &ExportedFile) -> Result<PathBuf, ExportError>;
}

/// Saves exported files into one directory, creating it if needed.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    async fn save(&self, file: &ExportedFile) -> Result<PathBuf, ExportError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&file.file_name);
        tokio::fs::write(&path, &file.bytes).await?;
        log::info!(
            "Saved {} ({}, {} bytes)",
            path.display(),
            file.mime_type,
            file.bytes.len()
        );
        Ok(path)
    }
}
