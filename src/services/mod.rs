//! Services module - the disenchant patch and the collaborators it runs against.
//!
//! # Components
//!
//! - [`DisenchantPatcher`]: the filter-and-patch engine. Walks winning item
//!   records once, applies the [`RULES`] chain and removes the
//!   `MagicDisallowEnchanting` keyword from eligible weapons and armor.
//! - [`LoadOrder`]: reads `plugins.txt` and the per-plugin record dumps, and
//!   yields winning overrides in priority order.
//! - [`LinkCache`]: FormKey lookup used by the script and enchantment rules.
//!   [`LoadOrderLinkCache`] is the load-order backed implementation.
//! - [`PatchMod`]: get-or-add override map, written out as the patch plugin dump.
//! - [`PatchReport`]: the patched / skipped / manual check lists and their
//!   console rendering.
//!
//! # Usage Example
//!
//! ```ignore
//! use smart_disenchant::services::{DisenchantPatcher, LoadOrder, PatchMod};
//!
//! let load_order = LoadOrder::load(data_dir, plugins_txt, &patch_name)?;
//! let links = load_order.link_cache();
//! let mut patch = PatchMod::default();
//!
//! let report = DisenchantPatcher::new(&settings, &links)
//!     .run(load_order.winning_items(), &mut patch);
//!
//! patch.write(output_dir)?;
//! print!("{}", report.render());
//! ```

pub mod disenchant;
pub mod link_cache;
pub mod load_order;
pub mod patch;
pub mod report;

pub use disenchant::{
    Bucket, DisenchantPatcher, DropReason, Outcome, RULES, Rule, ScanContext, Verdict, evaluate,
};
pub use link_cache::{LinkCache, LoadOrderLinkCache};
pub use load_order::{LoadOrder, LoadOrderError, load_plugin, read_plugin_list, record_dump_path};
pub use patch::{PATCH_MOD_NAME, PatchMod};
pub use report::PatchReport;
