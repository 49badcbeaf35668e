//! Input execution engine.
//!
//! Each controller slot runs one engine task that exclusively owns its
//! virtual controller. Plans queue on the engine's channel and run one at a
//! time: every group is pressed as a batch, waited out input by input, and
//! released as a batch, so simultaneous inputs reach the device as a single
//! update. A raised stop flag cancels the running plan at the next tick.
//! However a plan ends, it drains to a full release of everything it ever
//! pressed, so no input can outlive its plan.

pub mod client;
pub mod command;


use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::console::{is_wait, ConsoleKind};
use crate::input::controller::{
    tracker::InputTracker, ControllerError, VirtualController,
};
use crate::parser::{Input, InputPlan};

use self::client::EngineClient;
use self::command::EngineCommand;

/// How often a running plan checks the clock and the stop flag
const TICK_INTERVAL: Duration = Duration::from_millis(1);

/// How many commands can queue on an engine before senders block
const BUFFER_SIZE: usize = 1024;

/// How a plan finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Every group ran to completion.
    Completed,
    /// A stop request interrupted the plan before it finished.
    Cancelled,
}

/// Executes input plans against one virtual controller.
pub struct Engine {
    /// Controller slot this engine drives
    index: usize,
    rx: mpsc::Receiver<EngineCommand>,
    tx: mpsc::Sender<EngineCommand>,
    controller: Box<dyn VirtualController>,
    /// Name-level shadow of held inputs, shared with validation
    tracker: InputTracker,
    /// Cancels the running and queued plans while raised
    stopped: Arc<AtomicBool>,
}

impl Engine {
    pub fn new(
        index: usize,
        controller: Box<dyn VirtualController>,
        stopped: Arc<AtomicBool>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        Self {
            index,
            rx,
            tx,
            controller,
            tracker: InputTracker::new(),
            stopped,
        }
    }

    /// Client handle for sending commands to this engine.
    pub fn client(&self) -> EngineClient {
        EngineClient::new(self.tx.clone())
    }

    /// Shared name-level view of what this engine is holding down.
    pub fn tracker(&self) -> InputTracker {
        self.tracker.clone()
    }

    /// Run the engine until [EngineCommand::Stop] or all clients drop.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        log::debug!("Input engine {} started", self.index);
        // Push the full neutral state so the device starts from rest.
        self.reset()?;

        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                EngineCommand::RunPlan {
                    plan,
                    console,
                    done,
                } => {
                    let outcome = self.run_plan(&plan, console).await?;
                    // The submitter may have gone away by now.
                    if done.send(outcome).is_err() {
                        log::trace!("Engine {}: plan outcome listener dropped", self.index);
                    }
                }
                EngineCommand::Reset(sender) => {
                    let result = self.reset().map_err(|e| e.to_string());
                    if let Err(e) = sender.send(result).await {
                        log::error!("Failed to send reset reply: {e:?}");
                    }
                }
                EngineCommand::Stop => {
                    log::debug!("Stopping input engine {}", self.index);
                    break;
                }
            }
        }

        // Leave the controller neutral on the way out.
        self.reset()?;
        log::debug!("Input engine {} stopped", self.index);
        Ok(())
    }

    /// Execute one plan on the controller.
    async fn run_plan(
        &mut self,
        plan: &InputPlan,
        console: ConsoleKind,
    ) -> Result<PlanOutcome, ControllerError> {
        log::debug!(
            "Engine {} running plan: {} groups over {}ms",
            self.index,
            plan.groups.len(),
            plan.total_duration_ms
        );
        let mut cancelled = false;

        'groups: for group in plan.groups.iter() {
            if self.stopped.load(Ordering::SeqCst) {
                cancelled = true;
                break;
            }

            // Press phase: apply the whole group as one batch. Inputs
            // marked release lift instead of press.
            for input in group.iter() {
                if is_wait(&input.name) {
                    continue;
                }
                if input.release {
                    self.release_one(console, input);
                } else {
                    self.press_one(console, input);
                }
            }
            self.commit()?;

            // Hold phase: wait out the longest input in the group,
            // releasing each unheld input as its own duration elapses.
            let group_max = group.iter().map(|i| i.duration_ms).max().unwrap_or(0);
            let mut pending: Vec<&Input> = group
                .iter()
                .filter(|i| !i.hold && !i.release && !is_wait(&i.name))
                .collect();
            let start = Instant::now();

            loop {
                if self.stopped.load(Ordering::SeqCst) {
                    cancelled = true;
                    break 'groups;
                }
                let elapsed = start.elapsed().as_millis() as u64;

                let mut released = false;
                pending.retain(|input| {
                    if elapsed >= input.duration_ms {
                        self.controller.release_input(console, input);
                        self.tracker.release(&input.name);
                        released = true;
                        false
                    } else {
                        true
                    }
                });
                if released {
                    self.commit()?;
                }

                if elapsed >= group_max {
                    break;
                }
                sleep(TICK_INTERVAL).await;
            }
        }

        // Drain: release everything the plan ever touched, held or not,
        // in one final batch. Cancelled plans take the same path.
        for group in plan.groups.iter() {
            for input in group.iter() {
                if is_wait(&input.name) {
                    continue;
                }
                self.release_one(console, input);
            }
        }
        self.commit()?;

        if cancelled {
            log::debug!("Engine {} plan cancelled", self.index);
            Ok(PlanOutcome::Cancelled)
        } else {
            log::debug!("Engine {} plan completed", self.index);
            Ok(PlanOutcome::Completed)
        }
    }

    fn press_one(&mut self, console: ConsoleKind, input: &Input) {
        self.controller.press_input(console, input);
        self.tracker.press(&input.name);
    }

    fn release_one(&mut self, console: ConsoleKind, input: &Input) {
        self.controller.release_input(console, input);
        self.tracker.release(&input.name);
    }

    fn commit(&mut self) -> Result<(), ControllerError> {
        self.controller.commit()?;
        self.tracker.commit();
        Ok(())
    }

    fn reset(&mut self) -> Result<(), ControllerError> {
        self.controller.reset()?;
        self.tracker.reset();
        Ok(())
    }
}
