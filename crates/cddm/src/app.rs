//! Application context for CLI command execution.
//!
//! [`App`] finds the repository, reads its configuration, loads the dataset
//! and saved layout pins through the configured backend, and hands out the
//! resulting [`Workspace`]. Commands mutate the workspace and call
//! [`App::save`] afterwards.
//!
//! # Example
//!
//! ```no_run
//! use cddm::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     println!("{} tasks", app.workspace().store().tasks().len());
//!     Ok(())
//! }
//! ```

use crate::config::{find_cddm_root, CddmConfig, CDDM_DIR_NAME, CONFIG_FILE_NAME};
use crate::error::{Error, Result};
use crate::persistence::{create_backend, DatasetBackend};
use crate::store::{LoadWarning, Store};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Application context for CLI operations.
pub struct App {
    backend: Box<dyn DatasetBackend>,
    workspace: Workspace,
    config: CddmConfig,
    cddm_dir: PathBuf,
    warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("cddm_dir", &self.cddm_dir)
            .field("company_name", &self.config.company_name)
            .field("backend", &self.backend.describe())
            .field("warnings", &self.warnings.len())
            .finish()
    }
}

impl App {
    /// Create an App from `working_dir` or any of its ancestors.
    ///
    /// # Errors
    ///
    /// - `Error::Config` if no `.cddm/` directory is found or the config is
    ///   invalid
    /// - `Error::Io` / `Error::Json` if the dataset or pins cannot be read
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_cddm_root(working_dir).ok_or_else(|| {
            Error::Config(
                "Not a cddm repository (or any parent). Run 'cddm init' first".to_string(),
            )
        })?;

        let cddm_dir = root_dir.join(CDDM_DIR_NAME);
        let config = CddmConfig::load(&cddm_dir.join(CONFIG_FILE_NAME)).await?;
        let backend = create_backend(config.storage.to_backend(&root_dir));

        Self::open(backend, config, cddm_dir).await
    }

    /// Create an App over an already constructed backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to load.
    pub async fn open(
        backend: Box<dyn DatasetBackend>,
        config: CddmConfig,
        cddm_dir: PathBuf,
    ) -> Result<Self> {
        let (store, warnings) = Store::load(backend.load().await?);
        let mut workspace = Workspace::new(store).with_palette(config.palette());

        let pins = backend.load_layout().await?;
        let restored = workspace.restore_pins(&pins);
        debug!(
            backend = %backend.describe(),
            pins = pins.len(),
            restored,
            "Opened workspace"
        );

        Ok(Self {
            backend,
            workspace,
            config,
            cddm_dir,
            warnings,
        })
    }

    /// Get the loaded workspace.
    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Get the loaded workspace for mutation.
    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Get the repository configuration.
    pub fn config(&self) -> &CddmConfig {
        &self.config
    }

    /// Get the path to the .cddm directory.
    pub fn cddm_dir(&self) -> &Path {
        &self.cddm_dir
    }

    /// Problems found while loading the dataset.
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Number of stored records that failed to load and would be lost by a
    /// write.
    pub fn dropped_records(&self) -> usize {
        self.warnings.iter().filter(|w| w.is_lossy()).count()
    }

    /// Human-readable backend description.
    pub fn backend_description(&self) -> String {
        self.backend.describe()
    }

    /// Persist the dataset and the current node coordinates.
    ///
    /// # Errors
    ///
    /// - `Error::Storage` if records were skipped at load time; writing
    ///   would delete them from the stored dataset
    /// - Any error the backend reports while writing either document
    pub async fn save(&mut self) -> Result<()> {
        let dropped = self.dropped_records();
        if dropped > 0 {
            warn!(dropped, "Refusing to overwrite dataset with skipped records");
            return Err(Error::Storage(format!(
                "{dropped} stored record(s) could not be loaded and would be lost by this write; \
                 fix them by hand first (see 'cddm info')"
            )));
        }
        self.backend.save(self.workspace.store().snapshot()).await?;
        self.backend.save_layout(&self.workspace.pins()).await
    }
}
