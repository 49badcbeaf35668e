use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::error::{SendError, SendTimeoutError};
use tokio::sync::mpsc::{channel, Receiver, Sender};
use tokio::sync::oneshot;

use crate::console::ConsoleKind;
use crate::parser::InputPlan;

use super::command::EngineCommand;
use super::PlanOutcome;

/// Maximum duration to wait for a response from a command. If this timeout
/// is reached, that typically indicates a deadlock somewhere in the code.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Possible errors for an input engine client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to send command to engine: {0}")]
    SendError(SendError<EngineCommand>),
    #[error("engine encountered an error processing the request: {0}")]
    ServiceError(Box<dyn std::error::Error + Send + Sync>),
    #[error("engine no longer exists")]
    ChannelClosed,
}

impl From<SendError<EngineCommand>> for ClientError {
    fn from(err: SendError<EngineCommand>) -> Self {
        Self::SendError(err)
    }
}

/// A client for sending commands to an [Engine](super::Engine)
#[derive(Debug, Clone)]
pub struct EngineClient {
    tx: Sender<EngineCommand>,
}

impl From<Sender<EngineCommand>> for EngineClient {
    fn from(tx: Sender<EngineCommand>) -> Self {
        EngineClient::new(tx)
    }
}

impl EngineClient {
    pub fn new(tx: Sender<EngineCommand>) -> Self {
        Self { tx }
    }

    /// Send the given command to the engine. This method uses a timeout to
    /// detect potential deadlocks.
    async fn send(&self, cmd: EngineCommand) -> Result<(), ClientError> {
        let result = self.tx.send_timeout(cmd, DEFAULT_TIMEOUT).await;
        let Err(err) = result else {
            return Ok(());
        };
        match err {
            SendTimeoutError::Timeout(ref cmd) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} sending command to input engine: {cmd:?}");
                Err(ClientError::ServiceError(err.to_string().into()))
            }
            SendTimeoutError::Closed(_) => Err(ClientError::ChannelClosed),
        }
    }

    /// Use the given receiver to wait for a response from the engine.
    /// This method uses a timeout to detect potential deadlocks.
    async fn recv<T>(mut rx: Receiver<T>) -> Option<T>
    where
        T: Send + Sync,
    {
        let result = tokio::time::timeout(DEFAULT_TIMEOUT, rx.recv()).await;
        match result {
            Ok(value) => value,
            Err(_) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} waiting for response from input engine");
                None
            }
        }
    }

    /// Queue the given plan for execution, returning a receiver that fires
    /// with the outcome once the plan finishes.
    pub async fn run_plan(
        &self,
        plan: InputPlan,
        console: ConsoleKind,
    ) -> Result<oneshot::Receiver<PlanOutcome>, ClientError> {
        let (done, done_rx) = oneshot::channel();
        self.send(EngineCommand::RunPlan {
            plan,
            console,
            done,
        })
        .await?;
        Ok(done_rx)
    }

    /// Release everything and return the controller to neutral. Waits for
    /// any queued plans to cancel and drain first.
    pub async fn reset(&self) -> Result<(), ClientError> {
        let (tx, rx) = channel(1);
        self.send(EngineCommand::Reset(tx)).await?;
        let Some(result) = Self::recv(rx).await else {
            return Err(ClientError::ChannelClosed);
        };
        result.map_err(|e| ClientError::ServiceError(e.into()))
    }

    /// Stop the engine task.
    pub async fn stop(&self) -> Result<(), ClientError> {
        self.send(EngineCommand::Stop).await?;
        Ok(())
    }
}
