//! JSON document backend with crash-safe writes.
//!
//! Each save serializes to `<file>.<ext>.tmp` next to the target and renames
//! it into place, so a crash mid-write leaves the previous document intact.

use super::DatasetBackend;
use crate::domain::Dataset;
use crate::error::Result;
use crate::layout::PinnedPosition;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Backend storing `data.json` and `layout.json`.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    data_path: PathBuf,
    layout_path: PathBuf,
}

impl JsonFileBackend {
    /// Create a backend for the given document paths. Nothing is read yet.
    pub fn new(data_path: impl Into<PathBuf>, layout_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            layout_path: layout_path.into(),
        }
    }

    /// Path of the dataset document.
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Path of the layout pins document.
    pub fn layout_path(&self) -> &Path {
        &self.layout_path
    }
}

#[async_trait]
impl DatasetBackend for JsonFileBackend {
    async fn load(&self) -> Result<Dataset> {
        let data = read_json_or_default(&self.data_path).await?;
        info!(path = %self.data_path.display(), "Loaded dataset document");
        Ok(data)
    }

    async fn save(&mut self, data: &Dataset) -> Result<()> {
        write_json_atomic(&self.data_path, data).await?;
        info!(
            path = %self.data_path.display(),
            records = data.len(),
            "Saved dataset document"
        );
        Ok(())
    }

    async fn load_layout(&self) -> Result<Vec<PinnedPosition>> {
        read_json_or_default(&self.layout_path).await
    }

    async fn save_layout(&mut self, pins: &[PinnedPosition]) -> Result<()> {
        write_json_atomic(&self.layout_path, pins).await?;
        debug!(path = %self.layout_path.display(), pins = pins.len(), "Saved layout pins");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json ({})", self.data_path.display())
    }
}

async fn read_json_or_default<T>(path: &Path) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if !tokio::fs::try_exists(path).await? {
        debug!(path = %path.display(), "Document missing, starting empty");
        return Ok(T::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails and `Error::Io` if the
/// temporary file cannot be written or renamed. On failure the temporary
/// file is removed on a best-effort basis.
pub async fn write_json_atomic<T>(path: &Path, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');

    let temp_path = make_temp_path(path);
    if let Err(e) = tokio::fs::write(&temp_path, content).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(e.into());
    }
    tokio::fs::rename(&temp_path, path).await?;
    Ok(())
}

fn make_temp_path(path: &Path) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => {
            let mut ext = ext.to_os_string();
            ext.push(".tmp");
            ext
        }
        None => OsString::from("tmp"),
    };
    path.with_extension(extension)
}
