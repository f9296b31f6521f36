//! Load order assembly from `plugins.txt` and per-plugin record dumps.
//!
//! # Examples
//!
//! ```ignore
//! use smart_disenchant::services::LoadOrder;
//! use camino::Utf8Path;
//!
//! let load_order = LoadOrder::load(
//!     Utf8Path::new("Data"),
//!     Utf8Path::new("plugins.txt"),
//!     &ModKey::new("SmartDisenchantEverything.esp"),
//! )?;
//! for item in load_order.winning_items() {
//!     println!("{}", item.display_name());
//! }
//! ```

use crate::models::{ItemRecord, ModKey, Plugin, PluginRecords};
use crate::services::link_cache::LoadOrderLinkCache;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use thiserror::Error;

/// Extension of plugin record dumps, appended to the plugin file name
pub const RECORD_DUMP_EXTENSION: &str = "yaml";

/// Errors that can occur while assembling the load order
#[derive(Error, Debug)]
pub enum LoadOrderError {
    #[error("Record dump for {plugin} not found at {path}")]
    PluginNotFound { plugin: String, path: Utf8PathBuf },

    #[error("Failed to read plugin list: {0}")]
    PluginListUnreadable(#[from] std::io::Error),
}

/// Path of the record dump for `plugin` inside `data_dir`
pub fn record_dump_path(data_dir: &Utf8Path, plugin: &ModKey) -> Utf8PathBuf {
    data_dir.join(format!("{}.{}", plugin.name(), RECORD_DUMP_EXTENSION))
}

/// Reads the active plugins from a `plugins.txt` style file.
///
/// Empty lines and `#` comments are skipped. A leading `*` marks a plugin as
/// active; if no line carries a `*` every listed plugin is considered active.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read
pub fn read_plugin_list(plugins_txt: &Utf8Path) -> Result<Vec<ModKey>, LoadOrderError> {
    let file = File::open(plugins_txt)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for line_result in reader.lines() {
        let line = line_result?;
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.strip_prefix('*') {
            Some(name) => entries.push((true, name.trim().to_string())),
            None => entries.push((false, line.to_string())),
        }
    }

    let has_markers = entries.iter().any(|(active, _)| *active);
    let mut seen = HashSet::new();

    Ok(entries
        .into_iter()
        .filter(|(active, _)| *active || !has_markers)
        .map(|(_, name)| ModKey::new(name))
        .filter(|mod_key| seen.insert(mod_key.clone()))
        .collect())
}

/// Load a single plugin record dump.
pub fn load_plugin(data_dir: &Utf8Path, mod_key: &ModKey) -> Result<Plugin> {
    let path = record_dump_path(data_dir, mod_key);
    if !path.exists() {
        return Err(LoadOrderError::PluginNotFound {
            plugin: mod_key.to_string(),
            path,
        }
        .into());
    }

    let file_contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read record dump: {}", path))?;

    let records: PluginRecords = serde_yaml_ng::from_str(&file_contents)
        .with_context(|| format!("Failed to parse record dump: {}", path))?;

    let plugin = Plugin::new(mod_key.clone(), records);
    tracing::debug!("Loaded {} records from {}", plugin.record_count(), path);
    Ok(plugin)
}

/// Active plugins in load order, lowest priority first.
#[derive(Debug, Clone, Default)]
pub struct LoadOrder {
    plugins: Vec<Plugin>,
}

impl LoadOrder {
    pub fn from_plugins(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }

    /// Load every active plugin listed in `plugins_txt` from `data_dir`.
    ///
    /// `patch_mod` is left out of the load order so a previous patch never
    /// feeds into a new run.
    pub fn load(data_dir: &Utf8Path, plugins_txt: &Utf8Path, patch_mod: &ModKey) -> Result<Self> {
        let plugin_list = read_plugin_list(plugins_txt)
            .with_context(|| format!("Failed to load plugin list: {}", plugins_txt))?;

        let mut plugins = Vec::with_capacity(plugin_list.len());
        for mod_key in plugin_list {
            if &mod_key == patch_mod {
                tracing::info!("Leaving previous patch {} out of the load order", mod_key);
                continue;
            }
            plugins.push(load_plugin(data_dir, &mod_key)?);
        }

        tracing::info!(
            "Load order assembled: {} plugins from {}",
            plugins.len(),
            plugins_txt
        );

        Ok(Self { plugins })
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Winning item overrides in priority order.
    ///
    /// Plugins are walked from highest to lowest priority and the first record
    /// seen for each FormKey wins.
    pub fn winning_items(&self) -> Vec<&ItemRecord> {
        let mut seen = HashSet::new();
        self.plugins
            .iter()
            .rev()
            .flat_map(|plugin| plugin.records.items.iter())
            .filter(|item| seen.insert(item.form_key()))
            .collect()
    }

    pub fn link_cache(&self) -> LoadOrderLinkCache {
        LoadOrderLinkCache::new(&self.plugins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Equipment, FormKey};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn weapon(form_key: &str, editor_id: &str) -> ItemRecord {
        let mut record = Equipment::new(form_key.parse::<FormKey>().unwrap());
        record.editor_id = Some(editor_id.to_string());
        ItemRecord::Weapon(record)
    }

    fn plugin(name: &str, items: Vec<ItemRecord>) -> Plugin {
        Plugin::new(
            ModKey::new(name),
            PluginRecords {
                items,
                ..Default::default()
            },
        )
    }

    fn plugin_list(contents: &str) -> Vec<String> {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", contents).unwrap();
        temp_file.flush().unwrap();

        let path = Utf8PathBuf::try_from(temp_file.path().to_path_buf()).unwrap();
        read_plugin_list(&path)
            .unwrap()
            .into_iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    #[test]
    fn test_plugin_list_with_markers() {
        let names = plugin_list("# comment\n*Skyrim.esm\n\nInactive.esp\n*MyMod.esp\n");
        assert_eq!(names, vec!["Skyrim.esm", "MyMod.esp"]);
    }

    #[test]
    fn test_plugin_list_without_markers() {
        let names = plugin_list("Skyrim.esm\nUpdate.esm\n");
        assert_eq!(names, vec!["Skyrim.esm", "Update.esm"]);
    }

    #[test]
    fn test_plugin_list_drops_duplicates() {
        let names = plugin_list("*Skyrim.esm\n*skyrim.esm\n");
        assert_eq!(names, vec!["Skyrim.esm"]);
    }

    #[test]
    fn test_winning_items_priority_order() {
        let load_order = LoadOrder::from_plugins(vec![
            plugin(
                "Skyrim.esm",
                vec![
                    weapon("000001:Skyrim.esm", "Original"),
                    weapon("000002:Skyrim.esm", "Untouched"),
                ],
            ),
            plugin(
                "MyMod.esp",
                vec![
                    weapon("000001:Skyrim.esm", "Overridden"),
                    weapon("000800:MyMod.esp", "New"),
                ],
            ),
        ]);

        let names: Vec<_> = load_order
            .winning_items()
            .into_iter()
            .map(|i| i.display_name())
            .collect();
        assert_eq!(names, vec!["Overridden", "New", "Untouched"]);
    }
}
