//! Game record types projected from Skyrim SE plugin data.
//!
//! Only the attributes the disenchant patcher reads are modelled. Records are
//! deserialized from YAML record dumps (see [`crate::models::PluginRecords`]).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

/// `Skyrim.esm`, master of every vanilla record.
pub const SKYRIM_ESM: ModKey = ModKey(Cow::Borrowed("Skyrim.esm"));

/// Keyword that prevents an item from being disenchanted at the arcane enchanter.
pub const MAGIC_DISALLOW_ENCHANTING: FormKey = FormKey::new_const(0x0C27BD, SKYRIM_ESM);

/// Keyword carried by the Daedric artifacts.
pub const DAEDRIC_ARTIFACT: FormKey = FormKey::new_const(0x0A8668, SKYRIM_ESM);

static FORM_KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9A-Fa-f]{1,6}):(.+\.(?i:esm|esp|esl))$").expect("Invalid FormKey regex")
});

/// Errors raised while interpreting record identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid FormKey '{0}': expected <hex id>:<plugin file>")]
    InvalidFormKey(String),
}

/// Plugin file name. Bethesda games treat plugin names case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModKey(Cow<'static, str>);

impl ModKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ModKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for ModKey {}

impl Hash for ModKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Record identifier: a 24-bit local id within the plugin that defines it.
///
/// Written as `0C27BD:Skyrim.esm`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    id: u32,
    mod_key: ModKey,
}

impl FormKey {
    pub fn new(id: u32, mod_key: ModKey) -> Self {
        Self {
            id: id & 0x00FF_FFFF,
            mod_key,
        }
    }

    const fn new_const(id: u32, mod_key: ModKey) -> Self {
        Self { id, mod_key }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn mod_key(&self) -> &ModKey {
        &self.mod_key
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.id, self.mod_key)
    }
}

impl FromStr for FormKey {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = FORM_KEY_PATTERN
            .captures(s.trim())
            .ok_or_else(|| RecordError::InvalidFormKey(s.to_string()))?;

        let id = u32::from_str_radix(&captures[1], 16)
            .map_err(|_| RecordError::InvalidFormKey(s.to_string()))?;

        Ok(Self::new(id, ModKey::new(&captures[2])))
    }
}

impl TryFrom<String> for FormKey {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(value: FormKey) -> Self {
        value.to_string()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Weapon or armor record: the two item kinds the patcher can override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_effect: Option<FormKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<FormKey>>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub non_playable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<VirtualMachineAdapter>,
}

impl Equipment {
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
            object_effect: None,
            keywords: None,
            non_playable: false,
            scripts: None,
        }
    }
}

/// Any other item kind (books, ammunition, ingredients, ...).
///
/// `object_effect` is only present for kinds that can carry an enchantment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtherItem {
    pub form_key: FormKey,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_effect: Option<FormKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<FormKey>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scripts: Option<VirtualMachineAdapter>,
}

/// Kind of an item record, without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Weapon,
    Armor,
    Other,
}

/// An item record from the load order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemRecord {
    Weapon(Equipment),
    Armor(Equipment),
    Other(OtherItem),
}

impl ItemRecord {
    pub fn kind(&self) -> ItemKind {
        match self {
            ItemRecord::Weapon(_) => ItemKind::Weapon,
            ItemRecord::Armor(_) => ItemKind::Armor,
            ItemRecord::Other(_) => ItemKind::Other,
        }
    }

    pub fn form_key(&self) -> &FormKey {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => &e.form_key,
            ItemRecord::Other(o) => &o.form_key,
        }
    }

    pub fn editor_id(&self) -> Option<&str> {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.editor_id.as_deref(),
            ItemRecord::Other(o) => o.editor_id.as_deref(),
        }
    }

    /// Enchantment reference, `None` when absent or when the kind is not enchantable
    pub fn object_effect(&self) -> Option<&FormKey> {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.object_effect.as_ref(),
            ItemRecord::Other(o) => o.object_effect.as_ref(),
        }
    }

    pub fn keywords(&self) -> Option<&[FormKey]> {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.keywords.as_deref(),
            ItemRecord::Other(o) => o.keywords.as_deref(),
        }
    }

    pub fn keywords_mut(&mut self) -> Option<&mut Vec<FormKey>> {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.keywords.as_mut(),
            ItemRecord::Other(o) => o.keywords.as_mut(),
        }
    }

    pub fn has_keyword(&self, keyword: &FormKey) -> bool {
        self.keywords().is_some_and(|k| k.contains(keyword))
    }

    /// Only weapons and armor carry the non-playable flag
    pub fn is_non_playable(&self) -> bool {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.non_playable,
            ItemRecord::Other(_) => false,
        }
    }

    pub fn scripts(&self) -> Option<&VirtualMachineAdapter> {
        match self {
            ItemRecord::Weapon(e) | ItemRecord::Armor(e) => e.scripts.as_ref(),
            ItemRecord::Other(o) => o.scripts.as_ref(),
        }
    }

    /// Editor ID for display, falling back to the FormKey
    pub fn display_name(&self) -> String {
        self.editor_id()
            .map(str::to_string)
            .unwrap_or_else(|| self.form_key().to_string())
    }
}

/// Attached script table (VMAD)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualMachineAdapter {
    #[serde(default)]
    pub scripts: Vec<ScriptEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub name: String,

    #[serde(default)]
    pub properties: Vec<ScriptProperty>,
}

/// Papyrus script property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptProperty {
    Object { name: String, object: FormKey },
    Int { name: String, value: i32 },
    Float { name: String, value: f32 },
    Bool { name: String, value: bool },
    String { name: String, value: String },
}

impl ScriptProperty {
    pub fn name(&self) -> &str {
        match self {
            ScriptProperty::Object { name, .. }
            | ScriptProperty::Int { name, .. }
            | ScriptProperty::Float { name, .. }
            | ScriptProperty::Bool { name, .. }
            | ScriptProperty::String { name, .. } => name,
        }
    }

    /// Referenced record, for object properties
    pub fn object(&self) -> Option<&FormKey> {
        match self {
            ScriptProperty::Object { object, .. } => Some(object),
            _ => None,
        }
    }
}

/// Enchantment record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEffect {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,

    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Magic effect entry of an enchantment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_effect: Option<FormKey>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
}

/// Condition attached to a magic effect, tagged by its condition function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "function")]
pub enum Condition {
    WornApparelHasKeywordCount {
        #[serde(default)]
        keyword: Option<FormKey>,
    },
    WornHasKeyword {
        #[serde(default)]
        keyword: Option<FormKey>,
    },
    GetEquipped {
        #[serde(default)]
        item: Option<FormKey>,
    },
    #[serde(other)]
    Other,
}

impl Condition {
    /// True for conditions that test what the wearer currently has equipped
    pub fn depends_on_equipped_gear(&self) -> bool {
        matches!(
            self,
            Condition::WornApparelHasKeywordCount { .. }
                | Condition::WornHasKeyword { .. }
                | Condition::GetEquipped { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
}

/// Placed object or actor; satisfies linked-reference lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedReference {
    pub form_key: FormKey,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<FormKey>,
}

/// Record kinds the link cache can resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Quest,
    LinkedReference,
    Message,
    ObjectEffect,
}
