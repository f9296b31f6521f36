use super::records::{ItemRecord, Message, ModKey, ObjectEffect, PlacedReference, Quest};
use serde::{Deserialize, Serialize};

/// Record dump of a single plugin, as stored in `<plugin name>.yaml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginRecords {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemRecord>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub object_effects: Vec<ObjectEffect>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quests: Vec<Quest>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placed_references: Vec<PlacedReference>,
}

/// A plugin in the load order
#[derive(Debug, Clone, PartialEq)]
pub struct Plugin {
    pub mod_key: ModKey,
    pub records: PluginRecords,
}

impl Plugin {
    pub fn new(mod_key: ModKey, records: PluginRecords) -> Self {
        Self { mod_key, records }
    }

    pub fn record_count(&self) -> usize {
        self.records.items.len()
            + self.records.object_effects.len()
            + self.records.quests.len()
            + self.records.messages.len()
            + self.records.placed_references.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_dump_deserializes() {
        let records: PluginRecords = serde_yaml_ng::from_str("{}").unwrap();
        assert_eq!(records, PluginRecords::default());
    }

    #[test]
    fn test_record_count() {
        let yaml = r#"
quests:
  - form_key: "000D62:MyMod.esp"
    editor_id: MyQuest
messages:
  - form_key: "000D63:MyMod.esp"
"#;
        let records: PluginRecords = serde_yaml_ng::from_str(yaml).unwrap();
        let plugin = Plugin::new(ModKey::new("MyMod.esp"), records);
        assert_eq!(plugin.record_count(), 2);
    }
}
