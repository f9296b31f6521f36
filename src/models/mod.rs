//! Data models for the disenchant patcher.
//!
//! - [`records`]: FormKeys and the projected game records (items, enchantments,
//!   conditions, attached scripts, quests, messages, placed references)
//! - [`PluginRecords`] / [`Plugin`]: the record dump of one plugin in the load order
//! - [`Settings`]: user options loaded from `settings.yaml`

pub mod plugin;
pub mod records;
pub mod settings;

pub use plugin::{Plugin, PluginRecords};
pub use records::{
    Condition, DAEDRIC_ARTIFACT, Effect, Equipment, FormKey, ItemKind, ItemRecord,
    MAGIC_DISALLOW_ENCHANTING, Message, ModKey, ObjectEffect, OtherItem, PlacedReference, Quest,
    RecordError, RecordKind, SKYRIM_ESM, ScriptEntry, ScriptProperty, VirtualMachineAdapter,
};
pub use settings::Settings;
