//! Confirmation gates.
//!
//! A gate pauses the run until the operator answers yes or no. Anything
//! that does not start with `y` or `n` (either case) asks again.

use crate::error::Result;
use crate::ui::{parse_yes_no, UserInterface};

/// How a gate was passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The operator said yes.
    Approved,
    /// The operator said no.
    Rejected,
    /// Nobody is there to ask; the gate was skipped.
    Unattended,
}

/// Ask `question` until the operator gives a usable answer.
///
/// Errors only when the UI cannot read an answer at all (closed stdin).
pub fn ask_operator(ui: &mut dyn UserInterface, question: &str) -> Result<GateDecision> {
    let prompt = format!("{} [y/n]", question);
    loop {
        let answer = ui.prompt_line(&prompt)?;
        match parse_yes_no(&answer) {
            Some(true) => return Ok(GateDecision::Approved),
            Some(false) => return Ok(GateDecision::Rejected),
            None => ui.warning("Please answer Y or N"),
        }
    }
}
