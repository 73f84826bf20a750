//! The `qualimatch init` command.

use std::path::Path;

use anyhow::Result;

use qualimatch_core::bank::BUILTIN_BANK;

pub fn execute() -> Result<()> {
    if Path::new("qualimatch.toml").exists() {
        println!("qualimatch.toml already exists, skipping.");
    } else {
        std::fs::write("qualimatch.toml", SAMPLE_CONFIG)?;
        println!("Created qualimatch.toml");
    }

    std::fs::create_dir_all("banks")?;
    let bank_path = Path::new("banks/custom.toml");
    if bank_path.exists() {
        println!("banks/custom.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, BUILTIN_BANK)?;
        println!("Created banks/custom.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/custom.toml and set bank_path in qualimatch.toml");
    println!("  2. Run: qualimatch validate");
    println!("  3. Run: qualimatch participant set <code>");
    println!("  4. Run: qualimatch quiz show pretest");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# qualimatch configuration

store_path = "./.qualimatch/store.json"
# bank_path = "./banks/custom.toml"
default_seed = "default"
output_dir = "./qualimatch-exports"

# Alignment inference tuning
[inference]
cue_weight = 1
strong_weight = 2
strong_min = 5
strong_margin = 2
medium_min = 3
medium_margin = 1
weak_min = 2
"#;
