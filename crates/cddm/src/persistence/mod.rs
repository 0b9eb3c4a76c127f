//! Pluggable persistence for the dataset and layout pins.
//!
//! The entity store itself is purely in-memory. A [`DatasetBackend`] loads a
//! [`Dataset`] document before a session and saves it afterwards; layout
//! coordinates are presentation state and travel separately as a list of
//! [`PinnedPosition`]s.
//!
//! Two backends exist:
//!
//! - **Memory**: nothing survives the process, matching the source app
//! - **JSON file**: `data.json` plus `layout.json`, written atomically
//!
//! # Example
//!
//! ```no_run
//! use cddm::persistence::{create_backend, StorageBackend};
//! use cddm::store::Store;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut backend = create_backend(StorageBackend::Memory);
//!     let (store, warnings) = Store::load(backend.load().await?);
//!     assert!(warnings.is_empty());
//!
//!     backend.save(store.snapshot()).await?;
//!     Ok(())
//! }
//! ```

mod json_file;
mod memory;

pub use json_file::{write_json_atomic, JsonFileBackend};
pub use memory::MemoryBackend;

use crate::domain::Dataset;
use crate::error::Result;
use crate::layout::PinnedPosition;
use async_trait::async_trait;
use std::path::PathBuf;

/// Storage for a dataset document and its layout pins.
#[async_trait]
pub trait DatasetBackend: Send + Sync {
    /// Load the dataset. A backend with nothing stored yields an empty one.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the underlying file cannot be read
    /// - `Error::Json` if the document is malformed
    async fn load(&self) -> Result<Dataset>;

    /// Replace the stored dataset.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` or `Error::Json` if writing fails. The previous
    /// document is left intact on failure.
    async fn save(&mut self, data: &Dataset) -> Result<()>;

    /// Load saved node coordinates. Missing pins yield an empty list.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetBackend::load`].
    async fn load_layout(&self) -> Result<Vec<PinnedPosition>>;

    /// Replace the saved node coordinates.
    ///
    /// # Errors
    ///
    /// Same as [`DatasetBackend::save`].
    async fn save_layout(&mut self, pins: &[PinnedPosition]) -> Result<()>;

    /// Short human-readable description, e.g. for `cddm info`.
    fn describe(&self) -> String;
}

/// Which backend to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Ephemeral in-process storage
    Memory,

    /// JSON documents on disk
    JsonFile {
        /// Dataset document path
        data: PathBuf,
        /// Layout pins document path
        layout: PathBuf,
    },
}

/// Create a backend.
pub fn create_backend(backend: StorageBackend) -> Box<dyn DatasetBackend> {
    match backend {
        StorageBackend::Memory => Box::new(MemoryBackend::new()),
        StorageBackend::JsonFile { data, layout } => Box::new(JsonFileBackend::new(data, layout)),
    }
}
