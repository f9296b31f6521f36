use crate::metrics::ScanMetrics;
use crate::models::{
    Condition, DAEDRIC_ARTIFACT, ItemKind, ItemRecord, MAGIC_DISALLOW_ENCHANTING, RecordKind,
    ScriptProperty, Settings,
};
use crate::services::link_cache::LinkCache;
use crate::services::patch::PatchMod;
use crate::services::report::PatchReport;
use std::fmt;
use std::time::Instant;

/// Report list an item can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Patched,
    Skipped,
    ManualCheck,
}

/// Why an item was left out of every report list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    BlacklistedItem,
    NotEnchanted,
    NonPlayableArmor,
    NonPlayableWeapon,
    NoKeywords,
    BlacklistedKeyword,
    EnchantingAllowed,
    DaedricArtifact,
    /// Eligible, but only weapons and armor can be overridden
    NotOverridable,
    OverrideWithoutKeywords,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DropReason::BlacklistedItem => "item is blacklisted",
            DropReason::NotEnchanted => "no enchantment",
            DropReason::NonPlayableArmor => "non-playable armor",
            DropReason::NonPlayableWeapon => "non-playable weapon",
            DropReason::NoKeywords => "no keywords",
            DropReason::BlacklistedKeyword => "has a blacklisted keyword",
            DropReason::EnchantingAllowed => "already disenchantable",
            DropReason::DaedricArtifact => "Daedric artifact",
            DropReason::NotOverridable => "neither weapon nor armor",
            DropReason::OverrideWithoutKeywords => "override has no keywords",
        };
        f.write_str(text)
    }
}

/// Result of a single filter rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    Drop(DropReason),
    Route(Bucket),
}

/// Final outcome for one item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Dropped(DropReason),
    Routed(Bucket),
}

/// Everything a rule may look at besides the item itself
pub struct ScanContext<'a> {
    pub settings: &'a Settings,
    pub links: &'a dyn LinkCache,
}

pub type Rule = fn(&ItemRecord, &ScanContext<'_>) -> Verdict;

/// Filter chain, evaluated in order. The first verdict other than
/// [`Verdict::Continue`] decides the item.
pub const RULES: [Rule; 10] = [
    blacklisted_item,
    not_enchanted,
    non_playable_armor,
    non_playable_weapon,
    missing_keywords,
    blacklisted_keyword,
    enchanting_allowed,
    daedric_artifact,
    unrecognized_script_targets,
    equipment_dependent_enchantment,
];

/// Script property targets of these kinds are treated as harmless quest plumbing
const QUEST_LIKE_KINDS: [RecordKind; 3] = [
    RecordKind::Quest,
    RecordKind::LinkedReference,
    RecordKind::Message,
];

pub fn blacklisted_item(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    if ctx.settings.item_blacklist.contains(item.form_key()) {
        Verdict::Drop(DropReason::BlacklistedItem)
    } else {
        Verdict::Continue
    }
}

pub fn not_enchanted(item: &ItemRecord, _ctx: &ScanContext<'_>) -> Verdict {
    if item.object_effect().is_none() {
        Verdict::Drop(DropReason::NotEnchanted)
    } else {
        Verdict::Continue
    }
}

pub fn non_playable_armor(item: &ItemRecord, _ctx: &ScanContext<'_>) -> Verdict {
    if item.kind() == ItemKind::Armor && item.is_non_playable() {
        Verdict::Drop(DropReason::NonPlayableArmor)
    } else {
        Verdict::Continue
    }
}

pub fn non_playable_weapon(item: &ItemRecord, _ctx: &ScanContext<'_>) -> Verdict {
    if item.kind() == ItemKind::Weapon && item.is_non_playable() {
        Verdict::Drop(DropReason::NonPlayableWeapon)
    } else {
        Verdict::Continue
    }
}

pub fn missing_keywords(item: &ItemRecord, _ctx: &ScanContext<'_>) -> Verdict {
    if item.keywords().is_none() {
        Verdict::Drop(DropReason::NoKeywords)
    } else {
        Verdict::Continue
    }
}

pub fn blacklisted_keyword(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    let blacklisted = item
        .keywords()
        .unwrap_or_default()
        .iter()
        .any(|keyword| ctx.settings.kywd_blacklist.contains(keyword));

    if blacklisted {
        Verdict::Drop(DropReason::BlacklistedKeyword)
    } else {
        Verdict::Continue
    }
}

pub fn enchanting_allowed(item: &ItemRecord, _ctx: &ScanContext<'_>) -> Verdict {
    if item.has_keyword(&MAGIC_DISALLOW_ENCHANTING) {
        Verdict::Continue
    } else {
        Verdict::Drop(DropReason::EnchantingAllowed)
    }
}

pub fn daedric_artifact(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    if ctx.settings.skip_daedric && item.has_keyword(&DAEDRIC_ARTIFACT) {
        Verdict::Drop(DropReason::DaedricArtifact)
    } else {
        Verdict::Continue
    }
}

/// Items whose scripts point at anything other than quests, linked references
/// or messages may keep part of their ability in script state.
pub fn unrecognized_script_targets(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    if ctx.settings.patch_script_vdam {
        return Verdict::Continue;
    }

    let Some(vmad) = item.scripts() else {
        return Verdict::Continue;
    };

    let unrecognized = vmad
        .scripts
        .iter()
        .flat_map(|script| &script.properties)
        .filter_map(ScriptProperty::object)
        .any(|target| {
            !QUEST_LIKE_KINDS
                .iter()
                .any(|kind| ctx.links.try_resolve(target, *kind))
        });

    if unrecognized {
        Verdict::Route(Bucket::ManualCheck)
    } else {
        Verdict::Continue
    }
}

/// Enchantments that cannot be resolved, or whose effects test worn keywords
/// or equipped items, would misbehave once player-enchanted.
pub fn equipment_dependent_enchantment(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    if ctx.settings.patch_effect_cond {
        return Verdict::Continue;
    }

    let Some(enchantment) = item
        .object_effect()
        .and_then(|key| ctx.links.try_resolve_object_effect(key))
    else {
        return Verdict::Route(Bucket::Skipped);
    };

    let conditioned = enchantment.effects.iter().any(|effect| {
        effect
            .conditions
            .iter()
            .flatten()
            .any(Condition::depends_on_equipped_gear)
    });

    if conditioned {
        Verdict::Route(Bucket::Skipped)
    } else {
        Verdict::Continue
    }
}

/// Run the filter chain on one item
pub fn evaluate(item: &ItemRecord, ctx: &ScanContext<'_>) -> Verdict {
    RULES
        .iter()
        .map(|rule| rule(item, ctx))
        .find(|verdict| *verdict != Verdict::Continue)
        .unwrap_or(Verdict::Continue)
}

/// Filter-and-patch engine.
///
/// Scans winning item records once, removes `MagicDisallowEnchanting` from the
/// ones that pass every rule and sorts the rest into report lists.
///
/// # Example
///
/// ```ignore
/// let links = load_order.link_cache();
/// let patcher = DisenchantPatcher::new(&settings, &links);
/// let mut patch = PatchMod::default();
/// let report = patcher.run(load_order.winning_items(), &mut patch);
/// print!("{}", report.render());
/// ```
pub struct DisenchantPatcher<'a> {
    ctx: ScanContext<'a>,
}

impl<'a> DisenchantPatcher<'a> {
    pub fn new(settings: &'a Settings, links: &'a dyn LinkCache) -> Self {
        Self {
            ctx: ScanContext { settings, links },
        }
    }

    /// Scan `items` (winning overrides in priority order) into `patch`.
    pub fn run<'i, I>(&self, items: I, patch: &mut PatchMod) -> PatchReport
    where
        I: IntoIterator<Item = &'i ItemRecord>,
    {
        let start = Instant::now();
        let mut report = PatchReport::default();
        let mut metrics = ScanMetrics::new();

        for item in items {
            let outcome = self.process_item(item, patch);
            metrics.record(outcome);

            if let Outcome::Routed(bucket) = outcome {
                if let Some(editor_id) = item.editor_id() {
                    report.push(bucket, editor_id);
                }
            }
        }

        metrics.finish(start.elapsed());
        metrics.log_summary();
        report.metrics = metrics;
        report
    }

    /// Decide a single item, writing its override when it is eligible.
    pub fn process_item(&self, item: &ItemRecord, patch: &mut PatchMod) -> Outcome {
        match evaluate(item, &self.ctx) {
            Verdict::Drop(reason) => {
                tracing::debug!("Ignoring {}: {}", item.display_name(), reason);
                Outcome::Dropped(reason)
            }
            Verdict::Route(bucket) => {
                tracing::info!("{} routed to {:?} list", item.display_name(), bucket);
                Outcome::Routed(bucket)
            }
            Verdict::Continue => Self::remove_disallow_keyword(item, patch),
        }
    }

    fn remove_disallow_keyword(item: &ItemRecord, patch: &mut PatchMod) -> Outcome {
        let Some(record) = patch.get_or_add_override(item) else {
            // Only weapons and armor have override groups; other kinds stay unlisted.
            tracing::warn!(
                "{} is eligible but is neither a weapon nor armor, leaving it unpatched",
                item.display_name()
            );
            return Outcome::Dropped(DropReason::NotOverridable);
        };

        let Some(keywords) = record.keywords_mut() else {
            tracing::debug!("Override of {} has no keywords, abandoning", item.display_name());
            return Outcome::Dropped(DropReason::OverrideWithoutKeywords);
        };

        keywords.retain(|keyword| *keyword != MAGIC_DISALLOW_ENCHANTING);
        tracing::debug!("Removed MagicDisallowEnchanting from {}", item.display_name());
        Outcome::Routed(Bucket::Patched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Effect, Equipment, FormKey, ObjectEffect, OtherItem, ScriptEntry, VirtualMachineAdapter,
    };
    use crate::services::link_cache::MockLinkCache;

    fn key(s: &str) -> FormKey {
        s.parse().unwrap()
    }

    fn enchanted_weapon(keywords: Vec<FormKey>) -> ItemRecord {
        let mut record = Equipment::new(key("000800:MyMod.esp"));
        record.editor_id = Some("MyBlade".to_string());
        record.object_effect = Some(key("0001A2:MyMod.esp"));
        record.keywords = Some(keywords);
        ItemRecord::Weapon(record)
    }

    fn plain_enchantment() -> ObjectEffect {
        ObjectEffect {
            form_key: key("0001A2:MyMod.esp"),
            editor_id: None,
            effects: vec![Effect {
                base_effect: None,
                conditions: Some(vec![Condition::Other]),
            }],
        }
    }

    #[test]
    fn test_effect_conditions_not_resolved_when_allowed() {
        let mut links = MockLinkCache::new();
        links.expect_try_resolve_object_effect().times(0);
        links.expect_try_resolve().times(0);

        let settings = Settings {
            patch_effect_cond: true,
            ..Default::default()
        };
        let patcher = DisenchantPatcher::new(&settings, &links);
        let mut patch = PatchMod::default();

        let outcome =
            patcher.process_item(&enchanted_weapon(vec![MAGIC_DISALLOW_ENCHANTING]), &mut patch);
        assert_eq!(outcome, Outcome::Routed(Bucket::Patched));
    }

    #[test]
    fn test_unresolved_enchantment_is_skipped() {
        let mut links = MockLinkCache::new();
        links
            .expect_try_resolve_object_effect()
            .times(1)
            .returning(|_| None);

        let settings = Settings::default();
        let patcher = DisenchantPatcher::new(&settings, &links);
        let mut patch = PatchMod::default();

        let outcome =
            patcher.process_item(&enchanted_weapon(vec![MAGIC_DISALLOW_ENCHANTING]), &mut patch);
        assert_eq!(outcome, Outcome::Routed(Bucket::Skipped));
        assert!(patch.is_empty());
    }

    #[test]
    fn test_message_target_counts_as_quest_like() {
        let mut links = MockLinkCache::new();
        links
            .expect_try_resolve()
            .returning(|_, kind| kind == RecordKind::Message);
        links
            .expect_try_resolve_object_effect()
            .returning(|_| Some(plain_enchantment()));

        let mut item = enchanted_weapon(vec![MAGIC_DISALLOW_ENCHANTING]);
        if let ItemRecord::Weapon(record) = &mut item {
            record.scripts = Some(VirtualMachineAdapter {
                scripts: vec![ScriptEntry {
                    name: "ShowMessageOnEquip".to_string(),
                    properties: vec![ScriptProperty::Object {
                        name: "Msg".to_string(),
                        object: key("000D70:MyMod.esp"),
                    }],
                }],
            });
        }

        let settings = Settings::default();
        let ctx = ScanContext {
            settings: &settings,
            links: &links,
        };
        assert_eq!(unrecognized_script_targets(&item, &ctx), Verdict::Continue);
    }

    #[test]
    fn test_non_object_properties_are_ignored() {
        let mut links = MockLinkCache::new();
        links.expect_try_resolve().times(0);

        let mut item = enchanted_weapon(vec![MAGIC_DISALLOW_ENCHANTING]);
        if let ItemRecord::Weapon(record) = &mut item {
            record.scripts = Some(VirtualMachineAdapter {
                scripts: vec![ScriptEntry {
                    name: "ChargeScript".to_string(),
                    properties: vec![ScriptProperty::Int {
                        name: "Charges".to_string(),
                        value: 3,
                    }],
                }],
            });
        }

        let settings = Settings::default();
        let ctx = ScanContext {
            settings: &settings,
            links: &links,
        };
        assert_eq!(unrecognized_script_targets(&item, &ctx), Verdict::Continue);
    }

    #[test]
    fn test_rule_order_blacklist_first() {
        let links = MockLinkCache::new();
        let item = enchanted_weapon(vec![]);
        let mut settings = Settings::default();
        settings.item_blacklist.insert(item.form_key().clone());

        let ctx = ScanContext {
            settings: &settings,
            links: &links,
        };
        assert_eq!(
            evaluate(&item, &ctx),
            Verdict::Drop(DropReason::BlacklistedItem)
        );
    }

    #[test]
    fn test_non_playable_flags() {
        let links = MockLinkCache::new();
        let settings = Settings::default();
        let ctx = ScanContext {
            settings: &settings,
            links: &links,
        };

        let mut armor = Equipment::new(key("000900:MyMod.esp"));
        armor.object_effect = Some(key("0001A2:MyMod.esp"));
        armor.non_playable = true;
        let armor = ItemRecord::Armor(armor);
        assert_eq!(
            evaluate(&armor, &ctx),
            Verdict::Drop(DropReason::NonPlayableArmor)
        );

        let mut weapon = enchanted_weapon(vec![MAGIC_DISALLOW_ENCHANTING]);
        if let ItemRecord::Weapon(record) = &mut weapon {
            record.non_playable = true;
        }
        assert_eq!(
            evaluate(&weapon, &ctx),
            Verdict::Drop(DropReason::NonPlayableWeapon)
        );
    }

    #[test]
    fn test_eligible_other_item_enters_no_bucket() {
        let mut links = MockLinkCache::new();
        links
            .expect_try_resolve_object_effect()
            .returning(|_| Some(plain_enchantment()));

        let item = ItemRecord::Other(OtherItem {
            form_key: key("000A00:MyMod.esp"),
            category: "Book".to_string(),
            editor_id: Some("EnchantedTome".to_string()),
            object_effect: Some(key("0001A2:MyMod.esp")),
            keywords: Some(vec![MAGIC_DISALLOW_ENCHANTING]),
            scripts: None,
        });

        let settings = Settings::default();
        let patcher = DisenchantPatcher::new(&settings, &links);
        let mut patch = PatchMod::default();
        let report = patcher.run([&item], &mut patch);

        assert!(report.is_empty());
        assert!(patch.is_empty());
        assert_eq!(report.metrics.dropped(DropReason::NotOverridable), 1);
    }

    #[test]
    fn test_keyword_removal_preserves_other_keywords() {
        let mut links = MockLinkCache::new();
        links
            .expect_try_resolve_object_effect()
            .returning(|_| Some(plain_enchantment()));

        let first = key("000010:MyMod.esp");
        let last = key("000011:MyMod.esp");
        let item = enchanted_weapon(vec![
            first.clone(),
            MAGIC_DISALLOW_ENCHANTING,
            last.clone(),
        ]);

        let settings = Settings::default();
        let patcher = DisenchantPatcher::new(&settings, &links);
        let mut patch = PatchMod::default();
        let report = patcher.run([&item], &mut patch);

        assert_eq!(report.patched, vec!["MyBlade".to_string()]);
        let patched = patch.get(item.form_key()).unwrap();
        assert_eq!(patched.keywords(), Some(&[first, last][..]));
    }
}
