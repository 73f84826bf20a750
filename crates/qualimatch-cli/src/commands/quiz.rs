//! The `qualimatch quiz` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use qualimatch_core::model::Labels;
use qualimatch_core::record::SubmissionRecord;
use qualimatch_core::session::QuizView;
use qualimatch_report::{quiz_csv, quiz_file_name};

use super::{truncate, write_export, GlobalArgs, Workspace};
use crate::QuizAction;

pub fn execute(args: &GlobalArgs, action: QuizAction) -> Result<()> {
    let mut ws = Workspace::open(args)?;
    match action {
        QuizAction::Show { phase } => {
            let mut session = ws.session();
            let view = session.open_quiz(phase)?;
            println!("\n{phase} (seed {})", session.seed());
            print_view(&view, &session.bank().labels);
        }
        QuizAction::Answer {
            phase,
            item,
            design,
            source,
        } => {
            if design.is_none() && source.is_none() {
                anyhow::bail!("pass --design and/or --source");
            }
            let selection = ws.session().select(phase, &item, design, source)?;
            let labels = &ws.bank.labels;
            println!(
                "{item}: design = {}, source = {}",
                selection.design.map_or("-", |d| labels.design(d)),
                selection.source.map_or("-", |s| labels.source(s)),
            );
        }
        QuizAction::Submit { phase } => {
            let record = ws.session().submit(phase)?;
            print_submission(&record);
        }
        QuizAction::Export { phase, output } => {
            let record = ws.session().quiz_export(phase)?;
            let summary = &record.summary;
            let name = quiz_file_name(phase, &summary.pid, &summary.seed);
            let path = ws.export_path(output, &name);
            write_export(&path, &quiz_csv(&record), record.rows.len())?;
        }
        QuizAction::Reset { phase } => {
            ws.session().reset_quiz(phase)?;
            println!("{phase} reset for {} (seed {}).", ws.ctx.pid_or_anon(), ws.ctx.seed);
        }
    }
    Ok(())
}

fn print_view(view: &QuizView<'_>, labels: &Labels) {
    let mut table = Table::new();
    table.set_header(vec![
        "#",
        "Item",
        "Research question",
        "Design options",
        "Source options",
        "Your answer",
    ]);

    for (i, card) in view.cards.iter().enumerate() {
        let designs: Vec<&str> = card.design_options.iter().map(|d| d.as_str()).collect();
        let sources: Vec<&str> = card.source_options.iter().map(|s| s.as_str()).collect();
        let answer = format!(
            "{}\n{}",
            card.selection.design.map_or("-", |d| labels.design(d)),
            card.selection.source.map_or("-", |s| labels.source(s)),
        );
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&card.item.id),
            Cell::new(format!("{}\n{}", card.item.topic, truncate(&card.item.rq, 90))),
            Cell::new(designs.join("\n")),
            Cell::new(sources.join("\n")),
            Cell::new(answer),
        ]);
    }

    println!("{table}");
    println!(
        "Answered {}/{} | elapsed {}s",
        view.answered(),
        view.cards.len(),
        view.elapsed_ms / 1000
    );
    if let Some(last) = &view.last {
        let s = &last.summary;
        println!(
            "Last submission: {} / {} ({}%)",
            s.total_points, s.max_points, s.percent
        );
    }
}

fn print_submission(record: &SubmissionRecord) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Item", "Your design", "Your source", "Points"]);

    for (i, row) in record.rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&row.item_id),
            Cell::new(mark(&row.chosen_design_label, row.design_correct)),
            Cell::new(mark(&row.chosen_source_label, row.source_correct)),
            Cell::new(row.points),
        ]);
    }

    let s = &record.summary;
    println!("{table}");
    println!(
        "Score: {} / {} ({}%) | time {}s",
        s.total_points,
        s.max_points,
        s.percent,
        s.elapsed_ms / 1000
    );
}

fn mark(label: &str, correct: u8) -> String {
    if correct == 1 {
        format!("{label} ✓")
    } else {
        format!("{label} ✗")
    }
}
