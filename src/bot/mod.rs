//! Chat front end.
//!
//! The bot consumes chat messages from a channel, keeps the user records
//! current, answers `!`-prefixed commands, and feeds everything else into
//! the input pipeline, surfacing rejections back to chat. The chat
//! transport itself stays outside this module; the shipped binary wires a
//! terminal reader to the intake channel.

pub mod command;

use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::interval;

use crate::config::Settings;
use crate::data::{Store, User};
use crate::input::manager::{client::ManagerClient, SubmitError};
use crate::parser::ParseError;

/// One message from the chat stream.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub user: String,
    pub text: String,
}

/// An unanswered duel challenge.
#[derive(Debug, Clone)]
struct PendingDuel {
    challenger: String,
    amount: i64,
    issued_at: Instant,
}

/// Chat front end: bookkeeping, commands, and the input pipeline.
pub struct Bot {
    rx: mpsc::Receiver<ChatMessage>,
    replies: mpsc::Sender<String>,
    manager: ManagerClient,
    store: Store,
    settings: Settings,
    /// Pending duel challenges keyed by the challenged user
    duels: HashMap<String, PendingDuel>,
    /// Users who have chatted since the last credit award
    chatted: HashSet<String>,
}

impl Bot {
    pub fn new(
        settings: Settings,
        store: Store,
        manager: ManagerClient,
        rx: mpsc::Receiver<ChatMessage>,
        replies: mpsc::Sender<String>,
    ) -> Self {
        Self {
            rx,
            replies,
            manager,
            store,
            settings,
            duels: HashMap::new(),
            chatted: HashSet::new(),
        }
    }

    /// Run the bot until the intake channel closes.
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        log::debug!("Chat front end started");
        let period = Duration::from_secs(self.settings.credits_interval_secs.max(1));
        let mut credits_tick = interval(period);
        loop {
            tokio::select! {
                msg = self.rx.recv() => {
                    let Some(msg) = msg else {
                        break;
                    };
                    self.handle_message(msg).await;
                }
                _ = credits_tick.tick() => self.award_credits(),
            }
        }
        log::debug!("Chat front end stopped");
        Ok(())
    }

    async fn handle_message(&mut self, msg: ChatMessage) {
        let text = msg.text.trim().to_string();
        if text.is_empty() || msg.user.is_empty() {
            return;
        }

        // Track the user and mark them active for the next credit award.
        let user = self.store.update(|data| {
            let user = data
                .users
                .entry(msg.user.clone())
                .or_insert_with(|| User::new(&msg.user));
            user.total_messages += 1;
            user.clone()
        });
        self.chatted.insert(msg.user.clone());

        // Meme echo takes precedence over everything else.
        let meme = self
            .store
            .read(|data| data.memes.get(&text.to_lowercase()).cloned());
        if let Some(meme) = meme {
            self.reply(meme).await;
            return;
        }

        if text.starts_with(self.settings.command_prefix) {
            self.handle_command(&msg.user, &text).await;
            return;
        }

        // Everything else goes through the input pipeline.
        if user.silenced {
            return;
        }
        match self
            .manager
            .process_message(text, user.level, user.controller_port)
            .await
        {
            Ok(Ok(_handle)) => {
                self.store.update(|data| {
                    if let Some(user) = data.users.get_mut(&msg.user) {
                        user.valid_inputs += 1;
                    }
                });
            }
            Ok(Err(rejection)) => {
                if let Some(reply) = rejection_reply(&rejection) {
                    self.reply(reply).await;
                }
            }
            Err(e) => log::error!("Failed to process message: {e}"),
        }
    }

    /// Award credits to everyone who chatted since the last tick.
    fn award_credits(&mut self) {
        if self.chatted.is_empty() {
            return;
        }
        let amount = self.settings.credits_amount;
        let users: Vec<String> = self.chatted.drain().collect();
        self.store.update(|data| {
            for name in users.iter() {
                if let Some(user) = data.users.get_mut(name) {
                    user.credits += amount;
                }
            }
        });
        log::debug!("Awarded {amount} credits to {} active user(s)", users.len());
    }

    async fn reply(&self, message: String) {
        if let Err(e) = self.replies.send(message).await {
            log::error!("Failed to send reply: {e}");
        }
    }
}

/// The chat reply a rejection deserves, if any. Messages that simply are
/// not inputs, and messages arriving while inputs are stopped, stay silent.
fn rejection_reply(rejection: &SubmitError) -> Option<String> {
    match rejection {
        SubmitError::EmptyPlan => None,
        SubmitError::InputsStopped => None,
        SubmitError::Parse(ParseError::InvalidInput { position: 0, .. }) => None,
        _ => Some(rejection.to_string()),
    }
}
