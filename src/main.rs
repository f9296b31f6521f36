//! SmartDisenchant - command line entry point.
//!
//! # Overview
//!
//! Builds a patch that makes enchanted weapons and armor disenchantable by
//! removing the `MagicDisallowEnchanting` keyword. It initializes:
//! - Logging (daily rotating file + optional stderr output)
//! - Settings ([`SettingsManager`]: `settings.yaml` + `DISENCHANT_*` env overrides)
//! - The load order ([`LoadOrder`]: `plugins.txt` + per-plugin record dumps)
//!
//! # Execution Flow
//!
//! 1. Initialize logging → logs/smart-disenchant.<date>
//! 2. Load settings
//! 3. Assemble the load order, leaving out a previous patch
//! 4. Run [`DisenchantPatcher`] over the winning item overrides
//! 5. Write `SmartDisenchantEverything.esp.yaml` to the output directory
//! 6. Print the report to stdout

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use smart_disenchant::services::PATCH_MOD_NAME;
use smart_disenchant::{
    APP_NAME, DisenchantPatcher, LoadOrder, ModKey, PatchMod, Settings, SettingsManager, VERSION,
};

#[derive(Parser, Debug)]
#[command(name = "smart-disenchant")]
#[command(about = "Make enchanted gear disenchantable by removing MagicDisallowEnchanting", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory holding the plugin record dumps (<plugin>.yaml)
    #[arg(long, default_value = "Data")]
    data_dir: Utf8PathBuf,

    /// Load order file; defaults to <data-dir>/plugins.txt
    #[arg(long)]
    plugins: Option<Utf8PathBuf>,

    /// Settings file
    #[arg(long, default_value = smart_disenchant::config::SETTINGS_FILE_NAME)]
    settings: Utf8PathBuf,

    /// Where the patch is written; defaults to the data directory
    #[arg(long)]
    output_dir: Option<Utf8PathBuf>,

    /// Directory for log files
    #[arg(long, default_value = "logs")]
    log_dir: String,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Do not mirror log output to stderr
    #[arg(long)]
    quiet: bool,

    /// Write a default settings file and exit
    #[arg(long)]
    init_settings: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _guard =
        smart_disenchant::logging::setup_logging(&cli.log_dir, APP_NAME, cli.debug, !cli.quiet)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let settings_manager = SettingsManager::new(&cli.settings);

    if cli.init_settings {
        settings_manager.save_settings(&Settings::default())?;
        return Ok(());
    }

    let settings = settings_manager.load_settings()?;

    let plugins_txt = cli
        .plugins
        .clone()
        .unwrap_or_else(|| cli.data_dir.join("plugins.txt"));
    let patch_mod = ModKey::new(PATCH_MOD_NAME);

    let load_order = LoadOrder::load(&cli.data_dir, &plugins_txt, &patch_mod)?;
    let links = load_order.link_cache();
    let mut patch = PatchMod::new(patch_mod);

    let report = DisenchantPatcher::new(&settings, &links).run(load_order.winning_items(), &mut patch);

    let output_dir = cli.output_dir.as_ref().unwrap_or(&cli.data_dir);
    patch.write(output_dir).map_err(|e| {
        tracing::error!("Failed to write patch: {:#}", e);
        e
    })?;

    print!("{}", report.render());

    tracing::info!("Patch complete");
    Ok(())
}
