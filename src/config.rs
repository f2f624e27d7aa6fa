//! Run configuration.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional `importprep.toml` in the working directory (or an explicit file),
//! then `IMPORTPREP__*` environment variables where `__` separates sections:
//!
//! ```text
//! IMPORTPREP__OUTPUT__ENCODING=utf-8
//! IMPORTPREP__OUTPUT__ADD_BOM=false
//! IMPORTPREP__REGISTRY__PATH=/srv/import/データ項目一覧.md
//! ```

use crate::encoding::{EncodingPolicy, OutputEncoding};
use crate::error::PrepError;
use crate::export::{DEFAULT_FILENAME_PREFIX, ExportOptions, LineEnding};
use crate::io::LoadOptions;
use crate::replace::{ColumnPreset, default_presets};
use crate::schema::{DEFAULT_REGISTRY_FILE, RegistryFormat, SchemaResolver};
use config::{Config, ConfigError, Environment, File, Map};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Base name of the optional configuration file (any format `config` reads).
pub const DEFAULT_CONFIG_FILE: &str = "importprep";
pub const ENV_PREFIX: &str = "IMPORTPREP";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    pub path: PathBuf,
    pub header_marker: String,
    pub separator_marker: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        let format = RegistryFormat::default();
        Self {
            path: PathBuf::from(DEFAULT_REGISTRY_FILE),
            header_marker: format.header_marker,
            separator_marker: format.separator_marker,
        }
    }
}

impl RegistrySettings {
    #[must_use]
    pub fn format(&self) -> RegistryFormat {
        RegistryFormat {
            header_marker: self.header_marker.clone(),
            separator_marker: self.separator_marker.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub encoding: OutputEncoding,
    /// Ignored unless `encoding` is UTF-8.
    pub add_bom: bool,
    pub filename_prefix: String,
    pub line_ending: LineEnding,
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            encoding: OutputEncoding::ShiftJis,
            add_bom: true,
            filename_prefix: DEFAULT_FILENAME_PREFIX.to_owned(),
            line_ending: LineEnding::Lf,
            directory: PathBuf::from("."),
        }
    }
}

/// Complete settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub registry: RegistrySettings,
    pub output: OutputSettings,
    pub source: LoadOptions,
    pub presets: Vec<ColumnPreset>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            registry: RegistrySettings::default(),
            output: OutputSettings::default(),
            source: LoadOptions::default(),
            presets: default_presets(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (required when given, otherwise the optional
    /// default file) and the process environment.
    ///
    /// # Errors
    /// Returns [`PrepError::Config`] for unreadable files or invalid values.
    pub fn load(path: Option<&Path>) -> Result<Self, PrepError> {
        Self::load_with_env(path, None)
    }

    /// Like [`Settings::load`], but reads environment overrides from `env`
    /// instead of the process environment when it is `Some`.
    ///
    /// # Errors
    /// Returns [`PrepError::Config`] for unreadable files or invalid values.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, PrepError> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        let environment = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .source(env);

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(environment)
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// # Errors
    /// Returns [`PrepError::Config`] if a registry marker is empty.
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.registry.header_marker.is_empty() || self.registry.separator_marker.is_empty() {
            return Err(ConfigError::Message(
                "registry header_marker and separator_marker must not be empty".to_owned(),
            )
            .into());
        }
        Ok(())
    }

    #[must_use]
    pub fn encoding_policy(&self) -> EncodingPolicy {
        EncodingPolicy::new(self.output.encoding, self.output.add_bom)
    }

    #[must_use]
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            filename_prefix: self.output.filename_prefix.clone(),
            line_ending: self.output.line_ending,
        }
    }

    #[must_use]
    pub fn schema_resolver(&self) -> SchemaResolver {
        SchemaResolver::new(self.registry.path.clone(), self.registry.format())
    }
}
