use tokio::sync::{mpsc, oneshot};

use crate::console::ConsoleKind;
use crate::parser::InputPlan;

use super::PlanOutcome;

/// [EngineCommand] defines all the ways to interact with a running
/// [Engine](super::Engine) over its channel. Commands queue up and are
/// processed in order, so two plans can never interleave on one controller.
#[derive(Debug)]
pub enum EngineCommand {
    /// Execute a parsed plan. The oneshot fires with the outcome once the
    /// plan has run to completion or been cancelled and drained.
    RunPlan {
        plan: InputPlan,
        console: ConsoleKind,
        done: oneshot::Sender<PlanOutcome>,
    },
    /// Release everything and return the controller to neutral.
    Reset(mpsc::Sender<Result<(), String>>),
    Stop,
}
