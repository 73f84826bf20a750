//! The `qualimatch infer` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use qualimatch_core::inference::analyze;

use super::GlobalArgs;

pub fn execute(args: &GlobalArgs, rq: String, topic: Option<String>) -> Result<()> {
    let config = args.load_config()?;
    let analysis = analyze(topic.as_deref().unwrap_or(""), &rq, &config.inference);
    let result = &analysis.inference;

    let mut table = Table::new();
    table.set_header(vec!["Design", "Score", "Matched"]);
    for design in &result.ranking {
        let phrases: Vec<&str> = result
            .matches_for(*design)
            .map(|m| m.phrase.as_str())
            .collect();
        table.add_row(vec![
            Cell::new(design.default_label()),
            Cell::new(result.scores.get(design).copied().unwrap_or(0)),
            Cell::new(phrases.join(", ")),
        ]);
    }
    println!("{table}");

    match result.suggested {
        Some(design) => {
            println!(
                "Suggested: {} ({} confidence)",
                design.default_label(),
                result.confidence
            );
            println!("{}", result.reason);
        }
        None => println!("No clear design signal. Add a cue such as \"lived experience\" or \"over time\"."),
    }
    if analysis.too_generic {
        println!("The question reads as general. Narrow the scope (who, where, when).");
    }
    Ok(())
}
