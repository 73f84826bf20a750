//! The `qualimatch validate` command.

use anyhow::Result;

use qualimatch_core::bank::{load_bank, validate_bank};

use super::GlobalArgs;

pub fn execute(args: &GlobalArgs) -> Result<()> {
    let config = args.load_config()?;
    let bank = load_bank(config.bank_path.as_deref())?;

    let name = config
        .bank_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());
    println!(
        "Item bank: {name} ({} pretest, {} posttest, {} practice)",
        bank.pretest.len(),
        bank.posttest.len(),
        bank.practice.len()
    );

    let warnings = validate_bank(&bank);
    for w in &warnings {
        let prefix = w
            .item_id
            .as_ref()
            .map(|id| format!("  [{}/{id}]", w.phase))
            .unwrap_or_else(|| format!("  [{}]", w.phase));
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Item bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
