//! Settings with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/settree/settree.toml`
//! 3. Explicit config file (`--config <FILE>`)
//! 4. Environment variables: `SETTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, ConfigError, Environment, File, Map};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::application::{
    ApplicationError, ApplicationResult, Configuration, DEFAULT_FIELD_TERMINATOR,
    DEFAULT_ROW_TERMINATOR,
};

/// Prefix of environment variables overriding settings.
pub const ENV_PREFIX: &str = "SETTREE";

/// Parser settings as stored in TOML files and environment variables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Separator between elements of a set
    pub field_terminator: String,
    /// Separator between set expressions
    pub row_terminator: String,
    /// Drop empty tokens instead of turning them into `{}`
    pub ignore_empty_fields: bool,
    /// Treat input without a leading `{` as the body of a set
    pub auto_wrap_braces: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_terminator: DEFAULT_FIELD_TERMINATOR.to_string(),
            row_terminator: DEFAULT_ROW_TERMINATOR.to_string(),
            ignore_empty_fields: false,
            auto_wrap_braces: false,
        }
    }
}

/// Get the XDG config directory for settree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "settree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("settree.toml"))
}

impl Settings {
    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional explicit config file; must exist if given
    pub fn load(config_file: Option<&Path>) -> ApplicationResult<Self> {
        Self::load_from(global_config_path().as_deref(), config_file, None)
    }

    /// Layered load with every source given explicitly.
    ///
    /// # Arguments
    /// * `global_file` - Global config; skipped if absent on disk
    /// * `config_file` - Explicit config file; must exist if given
    /// * `env` - Variables to read instead of the process environment
    #[instrument(level = "debug", skip(env))]
    pub fn load_from(
        global_file: Option<&Path>,
        config_file: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> ApplicationResult<Self> {
        let mut builder = Self::defaults_builder()?;

        if let Some(global_path) = global_file {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                builder = builder.add_source(File::from(global_path.to_path_buf()).required(false));
            }
        }

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // SETTREE_FIELD_TERMINATOR, not SETTREE__FIELD_TERMINATOR
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    /// Load defaults plus one file, ignoring global config and environment.
    pub fn load_file(path: &Path) -> ApplicationResult<Self> {
        let config = Self::defaults_builder()?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()
            .map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    fn defaults_builder() -> ApplicationResult<ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Settings::default();
        Config::builder()
            .set_default("field_terminator", defaults.field_terminator)
            .map_err(config_err)?
            .set_default("row_terminator", defaults.row_terminator)
            .map_err(config_err)?
            .set_default("ignore_empty_fields", defaults.ignore_empty_fields)
            .map_err(config_err)?
            .set_default("auto_wrap_braces", defaults.auto_wrap_braces)
            .map_err(config_err)
    }

    /// Validate into a parser [`Configuration`].
    pub fn to_configuration(&self) -> ApplicationResult<Configuration> {
        Configuration::with_rows(
            &self.field_terminator,
            &self.row_terminator,
            self.ignore_empty_fields,
            self.auto_wrap_braces,
        )
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> ApplicationResult<String> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# settree configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/settree/settree.toml
#   File:   settree --config <FILE>
#   Env:    SETTREE_* environment variables (e.g. SETTREE_FIELD_TERMINATOR=";")
#
# Terminators must differ and may not contain '{' or '}'.

# Separator between elements of a set
# field_terminator = ","

# Separator between set expressions when reading several rows
# row_terminator = "\n"

# Drop empty tokens ("1,,2") instead of keeping them as an empty subset {}
# ignore_empty_fields = false

# Accept "1,2,3" as shorthand for "{1,2,3}"
# auto_wrap_braces = false
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
