//! Alias registry persistence - load and save the registry document.
//!
//! The document is a JSON object mapping each standard name to its list of
//! aliases. By default it lives in the platform-specific config folder:
//! - macOS: ~/Library/Application Support/com.datamerger.DataMerger/
//! - Windows: %APPDATA%/datamerger/DataMerger/config/
//! - Linux: ~/.config/datamerger/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Serialize;

use crate::error::{MapError, Result};
use crate::registry::AliasRegistry;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "datamerger";
const APP_NAME: &str = "DataMerger";
/// File name of the registry document.
pub const REGISTRY_FILENAME: &str = "column_mappings.json";

/// Where a loaded registry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryOrigin {
    /// Read from the registry document.
    File,
    /// Built-in defaults (document missing, unreadable, or malformed).
    Default,
}

/// Outcome of [`RegistryStore::load`].
#[derive(Debug)]
pub struct RegistryLoad {
    pub registry: AliasRegistry,
    pub origin: RegistryOrigin,
    /// Set when a document existed but defaults had to be substituted.
    pub warning: Option<MapError>,
}

/// File-backed storage for an [`AliasRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform config folder, or the working directory when no
    /// config folder can be determined.
    pub fn default_location() -> Self {
        let path = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(REGISTRY_FILENAME))
            .unwrap_or_else(|| {
                tracing::warn!("Could not determine config directory, using working directory");
                PathBuf::from(REGISTRY_FILENAME)
            });
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the registry document.
    ///
    /// Never fails. Returns the built-in defaults if:
    /// - The document doesn't exist
    /// - The document cannot be read
    /// - The document is not a mapping of string to list-of-strings
    ///
    /// In the last two cases the cause is logged and returned as a warning.
    pub fn load(&self) -> RegistryLoad {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No alias registry found, using defaults");
                return RegistryLoad {
                    registry: AliasRegistry::builtin(),
                    origin: RegistryOrigin::Default,
                    warning: None,
                };
            }
            Err(source) => {
                return self.fallback(MapError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<AliasRegistry>(&content) {
            Ok(registry) => {
                tracing::info!(
                    path = %self.path.display(),
                    entries = registry.len(),
                    "Loaded alias registry"
                );
                RegistryLoad {
                    registry,
                    origin: RegistryOrigin::File,
                    warning: None,
                }
            }
            Err(source) => self.fallback(MapError::Malformed {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn fallback(&self, warning: MapError) -> RegistryLoad {
        tracing::warn!("{warning}, using defaults");
        RegistryLoad {
            registry: AliasRegistry::builtin(),
            origin: RegistryOrigin::Default,
            warning: Some(warning),
        }
    }

    /// Persists the full registry, creating the parent directory if needed.
    ///
    /// Failures are logged and returned; nothing panics.
    pub fn save(&self, registry: &AliasRegistry) -> Result<()> {
        let result = write_json(&self.path, registry);
        match &result {
            Ok(()) => tracing::info!(path = %self.path.display(), "Saved alias registry"),
            Err(e) => tracing::warn!("{e}"),
        }
        result
    }
}

#[derive(Serialize)]
struct Template<'a> {
    #[serde(rename = "_说明")]
    note: &'a str,
    #[serde(rename = "_示例")]
    example: &'a AliasRegistry,
    #[serde(flatten)]
    defaults: &'a AliasRegistry,
}

const TEMPLATE_NOTE: &str =
    "这是列名映射配置文件，格式为 '标准列名': ['别名1', '别名2', ...]";

/// Writes a commented template holding the built-in defaults.
///
/// The `_`-prefixed keys are skipped on load, so the template can be used as
/// a registry document directly.
pub fn export_template(path: &Path) -> Result<()> {
    let mut example = AliasRegistry::new();
    example.add(
        "商品条码",
        vec!["条形码".to_string(), "条码".to_string(), "barcode".to_string()],
    );
    let defaults = AliasRegistry::builtin();
    let template = Template {
        note: TEMPLATE_NOTE,
        example: &example,
        defaults: &defaults,
    };
    write_json(path, &template)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| MapError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    let content = serde_json::to_string_pretty(value).map_err(MapError::Serialize)?;
    fs::write(path, content).map_err(|source| MapError::Write {
        path: path.to_path_buf(),
        source,
    })
}
