//! Persistent bot data: users and access levels, the macro/synonym/meme
//! tables, game logs, and the input safety tables. Stored as one JSON
//! document and saved through on every mutation.


use std::collections::HashMap;
use std::fmt::Display;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents all possible errors loading or saving [BotData]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not read or write: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to serialize: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Access ladder for users and restricted inputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    User,
    Whitelisted,
    Vip,
    Moderator,
    Admin,
    Owner,
}

impl AccessLevel {
    pub fn from_tag(tag: &str) -> Option<AccessLevel> {
        match tag.to_lowercase().as_str() {
            "user" => Some(AccessLevel::User),
            "whitelisted" => Some(AccessLevel::Whitelisted),
            "vip" => Some(AccessLevel::Vip),
            "moderator" | "mod" => Some(AccessLevel::Moderator),
            "admin" => Some(AccessLevel::Admin),
            "owner" => Some(AccessLevel::Owner),
            _ => None,
        }
    }
}

impl Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccessLevel::User => "User",
            AccessLevel::Whitelisted => "Whitelisted",
            AccessLevel::Vip => "VIP",
            AccessLevel::Moderator => "Moderator",
            AccessLevel::Admin => "Admin",
            AccessLevel::Owner => "Owner",
        };
        write!(f, "{name}")
    }
}

/// One chat user's record.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub level: AccessLevel,
    pub credits: i64,
    pub total_messages: u64,
    pub valid_inputs: u64,
    pub silenced: bool,
    /// Controller slot this user's inputs are routed to
    pub controller_port: usize,
}

impl User {
    pub fn new(name: &str) -> User {
        User {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

/// One game session log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameLog {
    pub user: String,
    pub message: String,
    /// Unix timestamp in seconds
    pub logged_at: u64,
}

impl GameLog {
    pub fn new(user: &str, message: &str) -> GameLog {
        GameLog {
            user: user.to_string(),
            message: message.to_string(),
            logged_at: unix_now(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Everything the bot persists between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotData {
    pub users: HashMap<String, User>,
    /// Macro name (with leading '#') to replacement text
    pub macros: HashMap<String, String>,
    /// Plain text replacements applied during expansion
    pub synonyms: HashMap<String, String>,
    /// Exact message text to the reply echoed for it
    pub memes: HashMap<String, String>,
    pub logs: Vec<GameLog>,
    /// Minimum level required to use specific inputs
    pub input_access: HashMap<String, AccessLevel>,
    /// Sets of inputs that must never be active simultaneously
    pub invalid_combos: Vec<Vec<String>>,
}

impl Default for BotData {
    fn default() -> Self {
        let mut synonyms = HashMap::new();
        synonyms.insert("kappa".to_string(), "#".to_string());
        Self {
            users: HashMap::new(),
            macros: HashMap::new(),
            synonyms,
            memes: HashMap::new(),
            logs: Vec::new(),
            input_access: HashMap::new(),
            invalid_combos: Vec::new(),
        }
    }
}

/// Shared handle to the bot data. Reads take a read lock; mutations go
/// through [Store::update], which saves the data back to disk.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    data: Arc<RwLock<BotData>>,
}

impl Store {
    /// Load the data file at the given path, or start fresh if it does
    /// not exist yet.
    pub fn load_or_create(path: PathBuf) -> Result<Store, StoreError> {
        let data = if path.exists() {
            log::info!("Loading bot data from {path:?}");
            let file = std::fs::File::open(&path)?;
            serde_json::from_reader(file)?
        } else {
            log::info!("No bot data found at {path:?}. Starting fresh.");
            BotData::default()
        };
        Ok(Store {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// A store that never touches disk, for tests and dry runs.
    pub fn in_memory() -> Store {
        Store {
            path: PathBuf::new(),
            data: Arc::new(RwLock::new(BotData::default())),
        }
    }

    /// Read from the data under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&BotData) -> R) -> R {
        let data = self.data.read().unwrap_or_else(PoisonError::into_inner);
        f(&data)
    }

    /// Mutate the data and persist it. Save failures are logged rather
    /// than unwinding into the caller; the in-memory state stays current.
    pub fn update<R>(&self, f: impl FnOnce(&mut BotData) -> R) -> R {
        let result = {
            let mut data = self.data.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut data)
        };
        if let Err(e) = self.save() {
            log::error!("Failed to save bot data: {e}");
        }
        result
    }

    /// Write the data as pretty JSON, through a temp file so a crash
    /// mid-write cannot truncate the previous data.
    pub fn save(&self) -> Result<(), StoreError> {
        if self.path.as_os_str().is_empty() {
            return Ok(());
        }
        let json = self.read(|data| serde_json::to_string_pretty(data))?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Saved bot data to {:?}", self.path);
        Ok(())
    }

    /// Look up a user by name.
    pub fn get_user(&self, name: &str) -> Option<User> {
        self.read(|data| data.users.get(name).cloned())
    }
}
