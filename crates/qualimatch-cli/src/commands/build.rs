//! The `qualimatch build` command.

use anyhow::Result;

use qualimatch_core::model::Labels;
use qualimatch_core::record::BuildDraft;
use qualimatch_core::session::{AlignmentCheck, DraftEdit};
use qualimatch_report::{build_csv, build_file_name};

use super::{write_export, GlobalArgs, Workspace};
use crate::BuildAction;

pub fn execute(args: &GlobalArgs, action: BuildAction) -> Result<()> {
    let mut ws = Workspace::open(args)?;
    match action {
        BuildAction::Edit {
            topic,
            rq,
            design,
            source,
        } => {
            let draft = ws.session().edit_draft(DraftEdit {
                topic,
                rq,
                design,
                source,
            })?;
            print_draft(&draft, &ws.bank.labels);
        }
        BuildAction::Show => {
            let session = ws.session();
            print_draft(&session.build_draft(), &session.bank().labels);
            if let Some(record) = session.build_record() {
                println!("\nSaved entry: {} ({})", record.alignment_flag, record.timestamp);
            }
        }
        BuildAction::Check => {
            let session = ws.session();
            let check = session.check_alignment(&session.build_draft())?;
            print_check(&check);
        }
        BuildAction::Save => {
            let mut session = ws.session();
            let draft = session.build_draft();
            let check = if draft.missing_fields().is_empty() {
                Some(session.check_alignment(&draft)?)
            } else {
                None
            };
            let record = session.save_build(&draft, check.as_ref())?;
            println!("[{}] {}", record.alignment_flag, record.feedback_text);
            println!("\nSaved build entry for {}.", record.pid);
        }
        BuildAction::Export { output } => {
            let record = ws.session().build_export()?;
            let name = build_file_name(&record.pid, &record.seed);
            let path = ws.export_path(output, &name);
            write_export(&path, &build_csv(&record), 1)?;
        }
        BuildAction::Reset => {
            ws.session().reset_build()?;
            println!("Build draft cleared.");
        }
    }
    Ok(())
}

fn print_draft(draft: &BuildDraft, labels: &Labels) {
    let or_dash = |s: &str| if s.trim().is_empty() { "-".to_string() } else { s.to_string() };
    println!("Topic:   {}", or_dash(&draft.topic));
    println!("RQ:      {}", or_dash(&draft.rq));
    println!("Design:  {}", draft.design.map_or("-", |d| labels.design(d)));
    println!("Source:  {}", draft.source.map_or("-", |s| labels.source(s)));
}

fn print_check(check: &AlignmentCheck) {
    let fb = &check.feedback;
    println!("[{}] {}", fb.flag, fb.badge_label);
    println!("{}", fb.text);
}
