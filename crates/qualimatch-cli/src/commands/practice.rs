//! The `qualimatch practice` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use qualimatch_core::model::Phase;
use qualimatch_report::{practice_csv, practice_file_name};

use super::{truncate, write_export, GlobalArgs, Workspace};
use crate::PracticeAction;

pub fn execute(args: &GlobalArgs, action: PracticeAction) -> Result<()> {
    let mut ws = Workspace::open(args)?;
    match action {
        PracticeAction::Show => {
            let session = ws.session();
            let mut table = Table::new();
            table.set_header(vec!["Card", "Research question", "Designs", "Sources"]);
            for card in session.practice_cards() {
                let designs: Vec<&str> = card.design_options.iter().map(|d| d.as_str()).collect();
                let sources: Vec<&str> = card.source_options.iter().map(|s| s.as_str()).collect();
                table.add_row(vec![
                    Cell::new(&card.item.id),
                    Cell::new(format!("{}\n{}", card.item.topic, truncate(&card.item.rq, 90))),
                    Cell::new(designs.join("\n")),
                    Cell::new(sources.join("\n")),
                ]);
            }
            println!("{table}");
            println!("Attempts logged: {}", session.practice_attempts().len());
        }
        PracticeAction::Check {
            card,
            design,
            source,
        } => {
            let outcome = ws.session().check_practice(&card, design, source)?;
            let attempt = &outcome.attempt;
            println!("{} ({} / 2)", outcome.verdict, attempt.points);
            if attempt.points < 2 {
                if let Some(item) = ws.bank.find(Phase::Practice, &card) {
                    let labels = &ws.bank.labels;
                    println!(
                        "Answer: {} + {}",
                        labels.design(item.correct_design),
                        labels.source(item.correct_source)
                    );
                }
            }
            println!("{}", outcome.explanation);
            if let Some(note) = &outcome.teacher_note {
                println!("Teacher note: {note}");
            }
        }
        PracticeAction::Export { output } => {
            let attempts = ws.session().practice_export()?;
            let first = &attempts[0];
            let name = practice_file_name(&first.pid, &first.seed);
            let path = ws.export_path(output, &name);
            write_export(&path, &practice_csv(&attempts), attempts.len())?;
        }
        PracticeAction::Reset => {
            ws.session().reset_practice()?;
            println!("Practice attempts cleared.");
        }
    }
    Ok(())
}
