use super::records::FormKey;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Patcher settings from `settings.yaml`
///
/// Loaded once before the scan by [`SettingsManager`](crate::config::SettingsManager).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Items that are never touched
    #[serde(default)]
    pub item_blacklist: IndexSet<FormKey>,

    /// Items carrying any of these keywords are never touched
    #[serde(default)]
    pub kywd_blacklist: IndexSet<FormKey>,

    /// Leave Daedric artifacts alone
    #[serde(default = "default_skip_daedric")]
    pub skip_daedric: bool,

    /// Patch items whose scripts reference records other than quests,
    /// linked references or messages
    #[serde(default)]
    pub patch_script_vdam: bool,

    /// Patch items whose enchantment has worn-keyword or equipped conditions
    #[serde(default)]
    pub patch_effect_cond: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            item_blacklist: IndexSet::new(),
            kywd_blacklist: IndexSet::new(),
            skip_daedric: default_skip_daedric(),
            patch_script_vdam: false,
            patch_effect_cond: false,
        }
    }
}

fn default_skip_daedric() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::DAEDRIC_ARTIFACT;

    #[test]
    fn test_settings_defaults() {
        let settings = Settings::default();
        assert!(settings.item_blacklist.is_empty());
        assert!(settings.kywd_blacklist.is_empty());
        assert!(settings.skip_daedric);
        assert!(!settings.patch_script_vdam);
        assert!(!settings.patch_effect_cond);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings: Settings =
            serde_yaml_ng::from_str("kywd_blacklist: [\"0A8668:Skyrim.esm\"]").unwrap();
        assert!(settings.kywd_blacklist.contains(&DAEDRIC_ARTIFACT));
        assert!(settings.skip_daedric);
    }
}
