use tokio::sync::mpsc;

use crate::console::ConsoleKind;
use crate::data::AccessLevel;

use super::{PlanHandle, SubmitError};

/// [ManagerCommand] defines all the ways to interact with the input
/// [Manager](super::Manager) over its channel.
#[derive(Debug)]
pub enum ManagerCommand {
    /// Run a chat message through the full input pipeline: expansion,
    /// parsing, validation, and submission to the controller's engine.
    ProcessMessage {
        text: String,
        user_level: AccessLevel,
        controller: usize,
        reply: mpsc::Sender<Result<PlanHandle, SubmitError>>,
    },
    /// Swap the active console, cancelling in-flight plans and resetting
    /// every controller to neutral first.
    SetConsole {
        console: ConsoleKind,
        reply: mpsc::Sender<Result<(), String>>,
    },
    /// Cancel all running and queued plans, reset every controller, and
    /// reject new submissions until [ManagerCommand::ResumeAll].
    StopAll(mpsc::Sender<Result<(), String>>),
    ResumeAll,
    GetConsole(mpsc::Sender<ConsoleKind>),
    ControllerCount(mpsc::Sender<usize>),
    Stop,
}
