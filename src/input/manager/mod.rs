//! Input manager.
//!
//! The manager owns the input pipeline: it expands and parses chat messages
//! against the active console, validates them, and routes the resulting
//! plans to per-controller engines. One engine task per controller slot
//! serializes plans for that slot while distinct slots run in parallel.
//! The manager also owns the global stop flag the engines poll, which backs
//! both the stop-all command and the quiesce step of a console switch.

pub mod client;
pub mod command;


use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error as ThisError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::{ControllerBackend, InputLimits, Settings};
use crate::console::ConsoleKind;
use crate::data::{AccessLevel, Store};
use crate::input::controller::{
    memory::MemoryController, tracker::InputTracker, uinput::UinputController,
    ControllerError, VirtualController,
};
use crate::input::engine::{client::EngineClient, Engine, PlanOutcome};
use crate::parser::{
    expand::expand,
    parse,
    postprocess::{
        check_button_combos, check_input_permissions, check_pause_duration, ValidationError,
    },
    ParseError,
};

use self::client::ManagerClient;
use self::command::ManagerCommand;

const BUFFER_SIZE: usize = 1024;

/// Why a chat message was rejected without reaching a controller.
#[derive(Debug, ThisError)]
pub enum SubmitError {
    /// The message expanded and parsed to zero input groups.
    #[error("Message contains no inputs")]
    EmptyPlan,
    /// Input processing is halted by a stop-all.
    #[error("New inputs are currently stopped")]
    InputsStopped,
    /// The user's controller port is out of range. Numbers are 1-based
    /// in user-facing text.
    #[error("Invalid controller number {number}. Number of controllers: {count}. Please change your controller port to a valid number to perform inputs.")]
    InvalidController { number: usize, count: usize },
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// The engine refused or dropped the plan.
    #[error("Failed to queue inputs: {0}")]
    Engine(String),
}

/// Handle to a plan that has been queued on an engine.
#[derive(Debug)]
pub struct PlanHandle {
    /// Controller slot the plan runs on
    pub controller: usize,
    /// Total running duration of the plan in milliseconds
    pub total_duration_ms: u64,
    /// Fires once the plan has completed or been cancelled and drained
    pub finished: oneshot::Receiver<PlanOutcome>,
}

/// Runs the input pipeline and routes plans to per-controller engines.
pub struct Manager {
    rx: mpsc::Receiver<ManagerCommand>,
    tx: mpsc::Sender<ManagerCommand>,
    console: ConsoleKind,
    limits: InputLimits,
    store: Store,
    engines: Vec<EngineClient>,
    /// Name-level held-input state per controller, shared with its engine
    trackers: Vec<InputTracker>,
    tasks: Vec<JoinHandle<()>>,
    /// Cancels running and queued plans on every engine while raised
    stopped: Arc<AtomicBool>,
    /// Rejects new submissions until resume when true
    halted: bool,
}

impl Manager {
    /// Create the manager and spawn one engine task per controller slot.
    pub fn new(settings: &Settings, store: Store) -> Result<Manager, ControllerError> {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        let stopped = Arc::new(AtomicBool::new(false));

        let mut engines = Vec::with_capacity(settings.controller_count);
        let mut trackers = Vec::with_capacity(settings.controller_count);
        let mut tasks = Vec::with_capacity(settings.controller_count);
        for index in 0..settings.controller_count {
            let controller: Box<dyn VirtualController> = match settings.backend {
                ControllerBackend::Uinput => Box::new(UinputController::new(index)?),
                ControllerBackend::Memory => Box::new(MemoryController::new()),
            };
            let mut engine = Engine::new(index, controller, stopped.clone());
            engines.push(engine.client());
            trackers.push(engine.tracker());
            tasks.push(tokio::spawn(async move {
                if let Err(e) = engine.run().await {
                    log::error!("Input engine {index} exited with error: {e}");
                }
            }));
        }

        Ok(Manager {
            rx,
            tx,
            console: settings.console,
            limits: settings.limits.clone(),
            store,
            engines,
            trackers,
            tasks,
            stopped,
            halted: false,
        })
    }

    /// Client handle for sending commands to the manager.
    pub fn client(&self) -> ManagerClient {
        ManagerClient::new(self.tx.clone())
    }

    /// Starts listening for [ManagerCommand] messages and dispatches them
    /// as they come in.
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        log::debug!("Input manager started with {} controller(s)", self.engines.len());
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                ManagerCommand::ProcessMessage {
                    text,
                    user_level,
                    controller,
                    reply,
                } => {
                    let result = self.process_message(&text, user_level, controller).await;
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send process reply: {e:?}");
                    }
                }
                ManagerCommand::SetConsole { console, reply } => {
                    let result = self.set_console(console).await;
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send console reply: {e:?}");
                    }
                }
                ManagerCommand::StopAll(reply) => {
                    let result = self.stop_all().await;
                    if let Err(e) = reply.send(result).await {
                        log::error!("Failed to send stop reply: {e:?}");
                    }
                }
                ManagerCommand::ResumeAll => self.resume_all(),
                ManagerCommand::GetConsole(reply) => {
                    if let Err(e) = reply.send(self.console).await {
                        log::error!("Failed to send console: {e:?}");
                    }
                }
                ManagerCommand::ControllerCount(reply) => {
                    if let Err(e) = reply.send(self.engines.len()).await {
                        log::error!("Failed to send controller count: {e:?}");
                    }
                }
                ManagerCommand::Stop => {
                    log::debug!("Stopping input manager");
                    break;
                }
            }
        }
        self.shutdown().await;
        log::debug!("Input manager stopped");
        Ok(())
    }

    /// Run one chat message through the pipeline. All validation happens
    /// before the plan reaches an engine, so a rejected message has no
    /// controller side effects.
    async fn process_message(
        &mut self,
        text: &str,
        user_level: AccessLevel,
        controller: usize,
    ) -> Result<PlanHandle, SubmitError> {
        if self.halted {
            return Err(SubmitError::InputsStopped);
        }
        if controller >= self.engines.len() {
            return Err(SubmitError::InvalidController {
                number: controller + 1,
                count: self.engines.len(),
            });
        }

        let (macros, synonyms) = self
            .store
            .read(|data| (data.macros.clone(), data.synonyms.clone()));
        let expanded = expand(text, &macros, &synonyms, &self.limits);
        let plan = parse(&expanded, self.console, &self.limits)?;
        if plan.is_empty() {
            return Err(SubmitError::EmptyPlan);
        }

        let (input_access, combos) = self
            .store
            .read(|data| (data.input_access.clone(), data.invalid_combos.clone()));
        check_input_permissions(user_level, &plan, &input_access)?;
        let pressed = self.trackers[controller].pressed_inputs();
        check_button_combos(&plan, &combos, &pressed)?;
        check_pause_duration(
            &plan,
            self.limits.pause_input.as_deref(),
            self.limits.max_pause_hold_duration_ms,
        )?;

        let total_duration_ms = plan.total_duration_ms;
        let finished = self.engines[controller]
            .run_plan(plan, self.console)
            .await
            .map_err(|e| SubmitError::Engine(e.to_string()))?;

        log::debug!("Queued {total_duration_ms}ms plan on controller {controller}");
        Ok(PlanHandle {
            controller,
            total_duration_ms,
            finished,
        })
    }

    /// Swap the active console. Raises the stop flag so in-flight and
    /// queued plans cancel, waits for every controller to drain and reset
    /// to neutral, then clears the flag and swaps the profile.
    async fn set_console(&mut self, console: ConsoleKind) -> Result<(), String> {
        log::info!("Switching console to {console}");
        self.stopped.store(true, Ordering::SeqCst);
        let result = self.reset_engines().await;
        if !self.halted {
            self.stopped.store(false, Ordering::SeqCst);
        }
        result?;
        self.console = console;
        Ok(())
    }

    /// Cancel everything, reset all controllers, and reject new inputs
    /// until [Manager::resume_all].
    async fn stop_all(&mut self) -> Result<(), String> {
        log::info!("Stopping all inputs");
        self.halted = true;
        self.stopped.store(true, Ordering::SeqCst);
        self.reset_engines().await
    }

    fn resume_all(&mut self) {
        log::info!("Resuming input processing");
        self.halted = false;
        self.stopped.store(false, Ordering::SeqCst);
    }

    /// Reset every controller to neutral. Each reset waits behind the
    /// engine's queued plans, which cancel quickly while the stop flag is
    /// raised.
    async fn reset_engines(&mut self) -> Result<(), String> {
        for engine in self.engines.iter() {
            engine.reset().await.map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Stop all engine tasks and wait for them to exit.
    async fn shutdown(&mut self) {
        for engine in self.engines.iter() {
            if let Err(e) = engine.stop().await {
                log::debug!("Engine already stopped: {e}");
            }
        }
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                log::error!("Engine task failed: {e}");
            }
        }
    }
}
