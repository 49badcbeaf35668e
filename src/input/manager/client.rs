use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::error::{SendError, SendTimeoutError};
use tokio::sync::mpsc::{channel, Receiver, Sender};

use crate::console::ConsoleKind;
use crate::data::AccessLevel;

use super::command::ManagerCommand;
use super::{PlanHandle, SubmitError};

/// Maximum duration to wait for a response from a command. If this timeout
/// is reached, that typically indicates a deadlock somewhere in the code.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Possible errors for a manager client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to send command to manager: {0}")]
    SendError(SendError<ManagerCommand>),
    #[error("manager encountered an error processing the request: {0}")]
    ServiceError(Box<dyn std::error::Error + Send + Sync>),
    #[error("manager no longer exists")]
    ChannelClosed,
}

impl From<SendError<ManagerCommand>> for ClientError {
    fn from(err: SendError<ManagerCommand>) -> Self {
        Self::SendError(err)
    }
}

/// A client for sending commands to the input [Manager](super::Manager)
#[derive(Debug, Clone)]
pub struct ManagerClient {
    tx: Sender<ManagerCommand>,
}

impl From<Sender<ManagerCommand>> for ManagerClient {
    fn from(tx: Sender<ManagerCommand>) -> Self {
        ManagerClient::new(tx)
    }
}

impl ManagerClient {
    pub fn new(tx: Sender<ManagerCommand>) -> Self {
        Self { tx }
    }

    /// Send the given command to the manager. This method uses a timeout to
    /// detect potential deadlocks.
    async fn send(&self, cmd: ManagerCommand) -> Result<(), ClientError> {
        let result = self.tx.send_timeout(cmd, DEFAULT_TIMEOUT).await;
        let Err(err) = result else {
            return Ok(());
        };
        match err {
            SendTimeoutError::Timeout(ref cmd) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} sending command to input manager: {cmd:?}");
                Err(ClientError::ServiceError(err.to_string().into()))
            }
            SendTimeoutError::Closed(_) => Err(ClientError::ChannelClosed),
        }
    }

    /// Use the given receiver to wait for a response from the manager.
    /// This method uses a timeout to detect potential deadlocks.
    async fn recv<T>(mut rx: Receiver<T>) -> Option<T>
    where
        T: Send + Sync,
    {
        let result = tokio::time::timeout(DEFAULT_TIMEOUT, rx.recv()).await;
        match result {
            Ok(value) => value,
            Err(_) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} waiting for response from input manager");
                None
            }
        }
    }

    /// Run a chat message through the input pipeline on the given
    /// controller. Returns a handle to the queued plan, or the rejection.
    pub async fn process_message(
        &self,
        text: String,
        user_level: AccessLevel,
        controller: usize,
    ) -> Result<Result<PlanHandle, SubmitError>, ClientError> {
        let (reply, rx) = channel(1);
        self.send(ManagerCommand::ProcessMessage {
            text,
            user_level,
            controller,
            reply,
        })
        .await?;
        Self::recv(rx).await.ok_or(ClientError::ChannelClosed)
    }

    /// Swap the active console, resetting all controllers to neutral.
    pub async fn set_console(&self, console: ConsoleKind) -> Result<(), ClientError> {
        let (reply, rx) = channel(1);
        self.send(ManagerCommand::SetConsole { console, reply })
            .await?;
        let Some(result) = Self::recv(rx).await else {
            return Err(ClientError::ChannelClosed);
        };
        result.map_err(|e| ClientError::ServiceError(e.into()))
    }

    /// Cancel everything and halt input processing.
    pub async fn stop_all(&self) -> Result<(), ClientError> {
        let (reply, rx) = channel(1);
        self.send(ManagerCommand::StopAll(reply)).await?;
        let Some(result) = Self::recv(rx).await else {
            return Err(ClientError::ChannelClosed);
        };
        result.map_err(|e| ClientError::ServiceError(e.into()))
    }

    /// Allow input processing again.
    pub async fn resume_all(&self) -> Result<(), ClientError> {
        self.send(ManagerCommand::ResumeAll).await
    }

    /// Get the active console.
    pub async fn get_console(&self) -> Result<ConsoleKind, ClientError> {
        let (reply, rx) = channel(1);
        self.send(ManagerCommand::GetConsole(reply)).await?;
        Self::recv(rx).await.ok_or(ClientError::ChannelClosed)
    }

    /// Get the number of controllers being managed.
    pub async fn controller_count(&self) -> Result<usize, ClientError> {
        let (reply, rx) = channel(1);
        self.send(ManagerCommand::ControllerCount(reply)).await?;
        Self::recv(rx).await.ok_or(ClientError::ChannelClosed)
    }

    /// Stop the manager and its engines.
    pub async fn stop(&self) -> Result<(), ClientError> {
        self.send(ManagerCommand::Stop).await
    }
}
