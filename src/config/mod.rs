use crate::models::Settings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use ::config::{Config, Environment, File, FileFormat};
use std::fs;

/// Default settings file name
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

/// Prefix of environment variables that override settings (`DISENCHANT_SKIP_DAEDRIC=false`)
pub const ENV_PREFIX: &str = "DISENCHANT";

/// Loads and saves the patcher settings file.
///
/// Settings are layered: built-in defaults, then the YAML file (optional),
/// then `DISENCHANT_*` environment variables.
#[derive(Debug, Clone)]
pub struct SettingsManager {
    settings_path: Utf8PathBuf,
}

impl SettingsManager {
    /// Create a SettingsManager for the given settings file.
    ///
    /// The file does not need to exist yet.
    pub fn new<P: AsRef<Utf8Path>>(settings_path: P) -> Self {
        Self {
            settings_path: settings_path.as_ref().to_path_buf(),
        }
    }

    /// Load settings, falling back to defaults when the file is missing.
    pub fn load_settings(&self) -> Result<Settings> {
        self.load_with_env(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    fn load_with_env(&self, env: Environment) -> Result<Settings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let settings: Settings = Config::builder()
            .add_source(File::new(self.settings_path.as_str(), FileFormat::Yaml).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!(
            "Loaded settings from {} - item blacklist: {}, keyword blacklist: {}, skip daedric: {}, patch scripted: {}, patch conditioned: {}",
            self.settings_path,
            settings.item_blacklist.len(),
            settings.kywd_blacklist.len(),
            settings.skip_daedric,
            settings.patch_script_vdam,
            settings.patch_effect_cond
        );

        Ok(settings)
    }

    /// Save settings to the settings file, creating its directory if needed.
    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create settings directory: {}", parent))?;
            }
        }

        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the settings file path.
    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
