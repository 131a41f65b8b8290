//! Check command: validate the rule file and print it back normalized.

use anyhow::{Context, Result};
use tracing::info;
use washcookies_core::RuleSet;

use crate::app::config_runtime::Settings;

pub fn run_check_command(settings: &Settings) -> Result<()> {
    let rules = RuleSet::load(&settings.rules_file)
        .with_context(|| format!("Rule file '{}' is invalid", settings.rules_file.display()))?;
    let counts = rules.counts();
    info!(rules = rules.len(), "rule file is valid");

    println!("rules_file = {}", settings.rules_file.display());
    for entry in &rules {
        println!("{:>4}: {}", entry.line_number(), entry.rule());
    }
    println!(
        "{} rule(s): {} allow, {} deny, {} keep",
        rules.len(),
        counts.allow,
        counts.deny,
        counts.keep
    );
    if counts.allow == 0 && counts.keep == 0 {
        println!("note: no allow or keep rules, so every cookie would be removed");
    }
    Ok(())
}
