//! The `qualimatch participant` command.

use anyhow::Result;

use qualimatch_core::session::stored_participant;

use super::{GlobalArgs, Workspace};
use crate::ParticipantAction;

pub fn execute(args: &GlobalArgs, action: ParticipantAction) -> Result<()> {
    let mut ws = Workspace::open(args)?;
    match action {
        ParticipantAction::Set { code } => {
            let pid = ws.session().set_participant(&code)?;
            println!("Participant: {pid} (seed {})", ws.ctx.seed);
        }
        ParticipantAction::Show => match stored_participant(&ws.store) {
            Some(pid) => println!("Participant: {pid}"),
            None => println!("No participant set."),
        },
        ParticipantAction::Clear => {
            ws.session().clear_participant()?;
            println!("Participant cleared. Saved progress is kept.");
        }
    }
    Ok(())
}
