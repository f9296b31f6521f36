use crate::models::{FormKey, ItemRecord, ModKey, PluginRecords};
use crate::services::load_order::record_dump_path;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;

/// File name of the generated patch plugin
pub const PATCH_MOD_NAME: &str = "SmartDisenchantEverything.esp";

/// Output plugin accumulating override records.
///
/// Overrides are keyed by FormKey and kept in insertion order. Only weapons and
/// armor can be overridden.
#[derive(Debug, Clone)]
pub struct PatchMod {
    mod_key: ModKey,
    overrides: IndexMap<FormKey, ItemRecord>,
}

impl PatchMod {
    pub fn new(mod_key: ModKey) -> Self {
        Self {
            mod_key,
            overrides: IndexMap::new(),
        }
    }

    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }

    /// Get the override for `item`, copying the winning record on first use.
    ///
    /// Returns `None` for item kinds other than weapons and armor.
    pub fn get_or_add_override(&mut self, item: &ItemRecord) -> Option<&mut ItemRecord> {
        if !matches!(item, ItemRecord::Weapon(_) | ItemRecord::Armor(_)) {
            return None;
        }

        Some(
            self.overrides
                .entry(item.form_key().clone())
                .or_insert_with(|| item.clone()),
        )
    }

    pub fn get(&self, form_key: &FormKey) -> Option<&ItemRecord> {
        self.overrides.get(form_key)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn overrides(&self) -> impl Iterator<Item = &ItemRecord> {
        self.overrides.values()
    }

    /// Write the patch as a record dump into `output_dir`.
    ///
    /// # Returns
    /// The path of the written file
    pub fn write(&self, output_dir: &Utf8Path) -> Result<Utf8PathBuf> {
        if !output_dir.exists() {
            fs::create_dir_all(output_dir)
                .with_context(|| format!("Failed to create output directory: {}", output_dir))?;
        }

        let records = PluginRecords {
            items: self.overrides.values().cloned().collect(),
            ..Default::default()
        };

        let path = record_dump_path(output_dir, &self.mod_key);
        let yaml_string =
            serde_yaml_ng::to_string(&records).context("Failed to serialize patch to YAML")?;

        fs::write(&path, yaml_string)
            .with_context(|| format!("Failed to write patch: {}", path))?;

        tracing::info!("Wrote {} override records to {}", self.overrides.len(), path);
        Ok(path)
    }
}

impl Default for PatchMod {
    fn default() -> Self {
        Self::new(ModKey::new(PATCH_MOD_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Equipment, MAGIC_DISALLOW_ENCHANTING, OtherItem};
    use crate::services::load_order::load_plugin;
    use tempfile::TempDir;

    fn armor() -> ItemRecord {
        let mut record = Equipment::new("000900:MyMod.esp".parse().unwrap());
        record.keywords = Some(vec![MAGIC_DISALLOW_ENCHANTING]);
        ItemRecord::Armor(record)
    }

    #[test]
    fn test_get_or_add_is_idempotent() {
        let mut patch = PatchMod::default();
        let item = armor();

        patch
            .get_or_add_override(&item)
            .and_then(ItemRecord::keywords_mut)
            .unwrap()
            .clear();

        // Second call returns the existing, already modified override
        let again = patch.get_or_add_override(&item).unwrap();
        assert_eq!(again.keywords(), Some(&[][..]));
        assert_eq!(patch.len(), 1);
    }

    #[test]
    fn test_other_items_cannot_be_overridden() {
        let mut patch = PatchMod::default();
        let item = ItemRecord::Other(OtherItem {
            form_key: "000A00:MyMod.esp".parse().unwrap(),
            category: "Book".to_string(),
            editor_id: None,
            object_effect: None,
            keywords: None,
            scripts: None,
        });

        assert!(patch.get_or_add_override(&item).is_none());
        assert!(patch.is_empty());
    }

    #[test]
    fn test_write_patch_loads_back() {
        let temp_dir = TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        let mut patch = PatchMod::default();
        patch.get_or_add_override(&armor());
        let path = patch.write(&dir).unwrap();
        assert!(path.as_str().ends_with("SmartDisenchantEverything.esp.yaml"));

        let loaded = load_plugin(&dir, patch.mod_key()).unwrap();
        assert_eq!(loaded.records.items, vec![armor()]);
    }
}
