// SmartDisenchant - removes MagicDisallowEnchanting from enchanted gear
//
// This is the library crate containing the record model, settings and the
// filter-and-patch engine. The binary crate (main.rs) provides the CLI.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use crate::config::SettingsManager;
pub use models::{FormKey, ItemRecord, ModKey, Settings};
pub use services::{DisenchantPatcher, LoadOrder, PatchMod, PatchReport};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
