//! Record lookup by FormKey.
//!
//! The patcher never fails on a missing record: a miss is simply `false` /
//! `None` and the caller decides what that means.

use crate::models::{FormKey, ObjectEffect, Plugin, RecordKind};
use std::collections::{HashMap, HashSet};

/// Resolves record references against the winning records of a load order.
#[cfg_attr(test, mockall::automock)]
pub trait LinkCache {
    /// True if `form_key` resolves to a record of the given kind
    fn try_resolve(&self, form_key: &FormKey, kind: RecordKind) -> bool;

    /// Resolve an enchantment record
    fn try_resolve_object_effect(&self, form_key: &FormKey) -> Option<ObjectEffect>;
}

/// [`LinkCache`] built from the plugins of a load order.
///
/// For every FormKey the record from the highest priority plugin wins.
#[derive(Debug, Default)]
pub struct LoadOrderLinkCache {
    kinds: HashMap<RecordKind, HashSet<FormKey>>,
    object_effects: HashMap<FormKey, ObjectEffect>,
}

impl LoadOrderLinkCache {
    /// Index `plugins`, given in load order (lowest priority first).
    pub fn new(plugins: &[Plugin]) -> Self {
        let mut cache = Self::default();

        for plugin in plugins {
            let records = &plugin.records;

            cache.index(RecordKind::Quest, records.quests.iter().map(|r| &r.form_key));
            cache.index(RecordKind::Message, records.messages.iter().map(|r| &r.form_key));
            cache.index(
                RecordKind::LinkedReference,
                records.placed_references.iter().map(|r| &r.form_key),
            );
            cache.index(
                RecordKind::ObjectEffect,
                records.object_effects.iter().map(|r| &r.form_key),
            );

            // Later plugins override earlier ones
            for effect in &records.object_effects {
                cache
                    .object_effects
                    .insert(effect.form_key.clone(), effect.clone());
            }
        }

        tracing::debug!(
            "Link cache indexed {} quests, {} messages, {} references, {} enchantments",
            cache.count(RecordKind::Quest),
            cache.count(RecordKind::Message),
            cache.count(RecordKind::LinkedReference),
            cache.object_effects.len()
        );

        cache
    }

    fn index<'a>(&mut self, kind: RecordKind, keys: impl Iterator<Item = &'a FormKey>) {
        self.kinds.entry(kind).or_default().extend(keys.cloned());
    }

    fn count(&self, kind: RecordKind) -> usize {
        self.kinds.get(&kind).map_or(0, HashSet::len)
    }
}

impl LinkCache for LoadOrderLinkCache {
    fn try_resolve(&self, form_key: &FormKey, kind: RecordKind) -> bool {
        self.kinds
            .get(&kind)
            .is_some_and(|keys| keys.contains(form_key))
    }

    fn try_resolve_object_effect(&self, form_key: &FormKey) -> Option<ObjectEffect> {
        self.object_effects.get(form_key).cloned()
    }
}
