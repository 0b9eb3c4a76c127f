//! Repository configuration and the `init` command.
//!
//! A cddm repository is a directory containing `.cddm/` with:
//!
//! - `config.yaml`: company name shown in the UI chrome and storage settings
//! - `data.json`: the dataset document
//! - `layout.json`: saved node coordinates (created on first save)
//! - `.gitignore`

use crate::domain::Dataset;
use crate::error::{Error, Result};
use crate::persistence::{write_json_atomic, StorageBackend};
use crate::render::Palette;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Company name used when none is given.
pub const DEFAULT_COMPANY_NAME: &str = "Editable Company Name";

/// Name of the cddm directory
pub const CDDM_DIR_NAME: &str = ".cddm";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the dataset document
pub const DATA_FILE_NAME: &str = "data.json";

/// Name of the layout pins document
pub const LAYOUT_FILE_NAME: &str = "layout.json";

/// Name of the gitignore file within .cddm
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum company name length, in characters
pub const MAX_COMPANY_NAME_LENGTH: usize = 60;

/// Maximum directory depth to traverse when searching for the cddm root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CddmConfig {
    /// Title shown in the UI chrome and SVG exports
    #[serde(rename = "company-name")]
    pub company_name: String,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Optional colour overrides for the graph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
}

/// Storage backend type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// JSON documents under `.cddm/`
    #[default]
    Json,

    /// Nothing is persisted between runs
    Memory,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Backend type
    pub backend: BackendType,

    /// Dataset document path, relative to the repository root
    pub data_file: String,

    /// Layout pins document path, relative to the repository root
    pub layout_file: String,
}

impl StorageConfig {
    /// Resolve the configured backend against the repository root.
    pub fn to_backend(&self, root_dir: &Path) -> StorageBackend {
        match self.backend {
            BackendType::Memory => StorageBackend::Memory,
            BackendType::Json => StorageBackend::JsonFile {
                data: root_dir.join(&self.data_file),
                layout: root_dir.join(&self.layout_file),
            },
        }
    }
}

impl CddmConfig {
    /// Create a new configuration with the given company name
    pub fn new(company_name: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            storage: StorageConfig {
                backend: BackendType::Json,
                data_file: format!("{CDDM_DIR_NAME}/{DATA_FILE_NAME}"),
                layout_file: format!("{CDDM_DIR_NAME}/{LAYOUT_FILE_NAME}"),
            },
            palette: None,
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if
    /// it is not valid configuration.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        validate_company_name(&config.company_name)?;
        Ok(config)
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if the
    /// file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Colours to draw with.
    pub fn palette(&self) -> Palette {
        self.palette.clone().unwrap_or_default()
    }
}

impl Default for CddmConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COMPANY_NAME)
    }
}

/// Validate a company name.
///
/// Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `Error::Config` if the name is empty or longer than
/// [`MAX_COMPANY_NAME_LENGTH`] characters.
pub fn validate_company_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config("Company name cannot be empty".to_string()));
    }
    if name.chars().count() > MAX_COMPANY_NAME_LENGTH {
        return Err(Error::Config(format!(
            "Company name cannot exceed {MAX_COMPANY_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Options for [`init`].
#[derive(Debug, Clone, Default)]
pub struct InitOptions<'a> {
    /// Company name (defaults to [`DEFAULT_COMPANY_NAME`])
    pub company_name: Option<&'a str>,

    /// Seed the demo dataset instead of an empty one
    pub sample: bool,
}

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created .cddm directory
    pub cddm_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created dataset document
    pub data_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// The company name written to the config
    pub company_name: String,
    /// Number of records seeded
    pub records: usize,
}

/// Initialize a new cddm repository in `base_dir`.
///
/// # Errors
///
/// - `Error::Config` if `.cddm/` already exists or the company name is invalid
/// - `Error::Io` if file system operations fail
pub async fn init(base_dir: &Path, options: InitOptions<'_>) -> Result<InitResult> {
    let company_name = options.company_name.unwrap_or(DEFAULT_COMPANY_NAME).trim();
    validate_company_name(company_name)?;

    let cddm_dir = base_dir.join(CDDM_DIR_NAME);
    if fs::try_exists(&cddm_dir).await? {
        return Err(Error::Config(format!(
            "cddm is already initialized in this directory. Found existing '{CDDM_DIR_NAME}'"
        )));
    }
    fs::create_dir_all(&cddm_dir).await?;

    let config_file = cddm_dir.join(CONFIG_FILE_NAME);
    CddmConfig::new(company_name).save(&config_file).await?;

    let data = if options.sample {
        Dataset::sample()
    } else {
        Dataset::default()
    };
    let data_file = cddm_dir.join(DATA_FILE_NAME);
    write_json_atomic(&data_file, &data).await?;

    let gitignore_file = cddm_dir.join(GITIGNORE_FILE_NAME);
    fs::write(
        &gitignore_file,
        "# Temporary files from interrupted saves\n*.tmp\n",
    )
    .await?;

    info!(path = %cddm_dir.display(), records = data.len(), "Initialized repository");

    Ok(InitResult {
        cddm_dir,
        config_file,
        data_file,
        gitignore_file,
        company_name: company_name.to_string(),
        records: data.len(),
    })
}

/// Check if a directory has been initialized with cddm.
pub fn is_initialized(base_dir: &Path) -> bool {
    base_dir.join(CDDM_DIR_NAME).exists()
}

/// Find the cddm root directory by searching up the directory tree.
///
/// Returns the directory containing `.cddm/`, or `None` if none is found
/// within [`MAX_TRAVERSAL_DEPTH`] levels.
pub fn find_cddm_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(CDDM_DIR_NAME).exists() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case::short("A")]
    #[case::default_name(DEFAULT_COMPANY_NAME)]
    #[case::max_length("x".repeat(60))]
    #[case::unicode("Ünïcødé GmbH")]
    fn test_validate_company_name_valid(#[case] name: impl AsRef<str>) {
        assert!(validate_company_name(name.as_ref()).is_ok());
    }

    #[rstest]
    #[case::empty("", "cannot be empty")]
    #[case::too_long("x".repeat(61), "cannot exceed 60")]
    fn test_validate_company_name_invalid(#[case] name: impl AsRef<str>, #[case] expected: &str) {
        let err = validate_company_name(name.as_ref()).unwrap_err().to_string();
        assert!(err.contains(expected), "got: {err}");
    }

    #[tokio::test]
    async fn test_config_yaml_format() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);

        CddmConfig::new("Acme").save(&path).await.unwrap();
        let content = tokio::fs::read_to_string(&path).await.unwrap();

        assert!(content.contains("company-name: Acme"));
        assert!(content.contains("backend: json"));
        assert!(content.contains("data-file: .cddm/data.json"));
        assert!(!content.contains("palette"));
        assert_eq!(CddmConfig::load(&path).await.unwrap(), CddmConfig::new("Acme"));
    }

    #[tokio::test]
    async fn test_palette_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE_NAME);
        tokio::fs::write(
            &path,
            "company-name: Acme\nstorage:\n  backend: memory\n  data-file: d.json\n  layout-file: l.json\npalette:\n  fallback-color: \"#000000\"\n",
        )
        .await
        .unwrap();

        let config = CddmConfig::load(&path).await.unwrap();
        assert_eq!(config.storage.to_backend(temp_dir.path()), StorageBackend::Memory);
        assert_eq!(config.palette().fallback_color, "#000000");
        assert_eq!(config.palette().blocks_color, Palette::default().blocks_color);
    }

    #[tokio::test]
    async fn test_init_creates_directory_structure() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(temp_dir.path(), InitOptions::default()).await.unwrap();

        assert!(result.cddm_dir.exists());
        assert!(result.config_file.exists());
        assert!(result.data_file.exists());
        assert!(result.gitignore_file.exists());
        assert_eq!(result.company_name, DEFAULT_COMPANY_NAME);
        assert_eq!(result.records, 0);
    }

    #[tokio::test]
    async fn test_init_with_sample() {
        let temp_dir = TempDir::new().unwrap();
        let result = init(
            temp_dir.path(),
            InitOptions {
                company_name: Some("  Acme  "),
                sample: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.company_name, "Acme");
        assert_eq!(result.records, Dataset::sample().len());
    }

    #[tokio::test]
    async fn test_init_fails_if_already_initialized() {
        let temp_dir = TempDir::new().unwrap();
        init(temp_dir.path(), InitOptions::default()).await.unwrap();

        let err = init(temp_dir.path(), InitOptions::default())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("already initialized"));
    }

    #[test]
    fn test_find_cddm_root_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join(CDDM_DIR_NAME)).unwrap();
        let sub_dir = temp_dir.path().join("sub").join("nested");
        std::fs::create_dir_all(&sub_dir).unwrap();

        assert_eq!(find_cddm_root(&sub_dir), Some(temp_dir.path().to_path_buf()));
        assert!(is_initialized(temp_dir.path()));
    }

    #[test]
    fn test_find_cddm_root_not_found() {
        let temp_dir = TempDir::new().unwrap();
        assert!(find_cddm_root(temp_dir.path()).is_none());
    }
}
