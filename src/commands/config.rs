//! Config command handler: show effective configuration.

use crate::app::config_manager::ResolvedConfig;
use crate::app::config_runtime;

pub fn run_config_show_command(resolved: &ResolvedConfig) {
    let loaded = &resolved.loaded;
    let settings = &resolved.settings;

    let resolved_path = loaded.path.as_ref().map_or_else(
        || "<unresolved>".to_string(),
        |path| path.display().to_string(),
    );
    println!("config_path = {resolved_path}");
    println!(
        "config_file = {}",
        if loaded.loaded_from_file {
            "loaded"
        } else {
            "not found (using defaults)"
        }
    );
    println!("rules_file = {}", settings.rules_file.display());
    if settings.stores.is_empty() {
        println!("stores = none found");
    }
    for store in &settings.stores {
        println!("store = {} {}", store.kind, store.path.display());
    }
    println!("dry_run = {}", settings.dry_run);
    println!("explain = {}", settings.explain);
    println!("verbosity = {}", config_runtime::verbosity_label(settings));
}
