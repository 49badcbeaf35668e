//! Chat command dispatcher.
//!
//! Commands arrive as `!name args...` lines. Unknown commands are ignored
//! so ordinary chat that happens to start with the prefix stays silent.

use std::time::{Duration, Instant};

use rand::Rng;

use crate::console::{is_wait, ConsoleKind};
use crate::data::{AccessLevel, GameLog};
use crate::parser::{expand::expand, parse};

use super::{Bot, PendingDuel};

/// How long a duel challenge stays open
const DUEL_WINDOW: Duration = Duration::from_secs(60);

const NO_PERMISSION: &str = "You do not have permission to use this command!";
const NO_SUCH_USER: &str = "User does not exist in database!";
const DUEL_EXPIRED: &str = "You are not in a duel or your duel has expired!";

impl Bot {
    /// Dispatch one `!`-prefixed chat line.
    pub(super) async fn handle_command(&mut self, username: &str, text: &str) {
        let Some(body) = text.strip_prefix(self.settings.command_prefix) else {
            return;
        };
        let body = body.trim();
        let Some(command) = body.split_whitespace().next() else {
            return;
        };
        let rest = body[command.len()..].trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        match command.to_lowercase().as_str() {
            "inputs" => self.cmd_inputs().await,
            "console" => self.cmd_console().await,
            "setconsole" => self.cmd_set_console(username, &args).await,
            "stopall" => self.cmd_stop_all(username).await,
            "resume" => self.cmd_resume(username).await,
            "controllers" => self.cmd_controllers().await,
            "addmacro" => self.cmd_add_macro(rest).await,
            "removemacro" => self.cmd_remove_macro(&args).await,
            "macros" => self.cmd_macros().await,
            "addmeme" => self.cmd_add_meme(rest).await,
            "removememe" => self.cmd_remove_meme(&args).await,
            "memes" => self.cmd_memes().await,
            "credits" => self.cmd_credits(username, &args).await,
            "highestcredits" => self.cmd_highest_credits().await,
            "duel" => self.cmd_duel(username, &args).await,
            "accept" => self.cmd_accept(username).await,
            "deny" => self.cmd_deny(username).await,
            "log" => self.cmd_log(username, rest).await,
            "logs" => self.cmd_logs(&args).await,
            "level" => self.cmd_level(username, &args).await,
            "setlevel" => self.cmd_set_level(username, &args).await,
            _ => {}
        }
    }

    /// Caller's access level, defaulting to the lowest for unseen users.
    fn user_level(&self, username: &str) -> AccessLevel {
        self.store
            .get_user(username)
            .map(|u| u.level)
            .unwrap_or_default()
    }

    /// Check the caller's level, replying with a rejection if too low.
    async fn require_level(&self, username: &str, required: AccessLevel) -> bool {
        if self.user_level(username) < required {
            self.reply(NO_PERMISSION.to_string()).await;
            return false;
        }
        true
    }

    async fn cmd_inputs(&self) {
        match self.manager.get_console().await {
            Ok(console) => {
                let names = console.valid_inputs().join(", ");
                self.reply(format!("Valid inputs for {console}: {names}"))
                    .await;
            }
            Err(e) => log::error!("Failed to get console: {e}"),
        }
    }

    async fn cmd_console(&self) {
        match self.manager.get_console().await {
            Ok(console) => self.reply(format!("The current console is {console}!")).await,
            Err(e) => log::error!("Failed to get console: {e}"),
        }
    }

    async fn cmd_set_console(&mut self, username: &str, args: &[&str]) {
        if !self.require_level(username, AccessLevel::Moderator).await {
            return;
        }
        let tags: Vec<String> = ConsoleKind::all()
            .iter()
            .map(|c| c.to_string().to_lowercase())
            .collect();
        let Some(tag) = args.first() else {
            self.reply(format!("Please enter a console: {}", tags.join(", ")))
                .await;
            return;
        };
        let Some(console) = ConsoleKind::from_tag(tag) else {
            self.reply(format!(
                "\"{tag}\" is not a valid console. Consoles: {}",
                tags.join(", ")
            ))
            .await;
            return;
        };
        match self.manager.set_console(console).await {
            Ok(()) => self.reply(format!("Changed console to {console}!")).await,
            Err(e) => {
                log::error!("Failed to change console: {e}");
                self.reply("Failed to change console.".to_string()).await;
            }
        }
    }

    async fn cmd_stop_all(&mut self, username: &str) {
        if !self.require_level(username, AccessLevel::Moderator).await {
            return;
        }
        match self.manager.stop_all().await {
            Ok(()) => self.reply("Stopped all inputs!".to_string()).await,
            Err(e) => {
                log::error!("Failed to stop inputs: {e}");
                self.reply("Failed to stop inputs.".to_string()).await;
            }
        }
    }

    async fn cmd_resume(&mut self, username: &str) {
        if !self.require_level(username, AccessLevel::Moderator).await {
            return;
        }
        match self.manager.resume_all().await {
            Ok(()) => self.reply("Resumed input processing!".to_string()).await,
            Err(e) => log::error!("Failed to resume inputs: {e}"),
        }
    }

    async fn cmd_controllers(&self) {
        match self.manager.controller_count().await {
            Ok(count) => {
                self.reply(format!("There are {count} virtual controller(s)."))
                    .await
            }
            Err(e) => log::error!("Failed to get controller count: {e}"),
        }
    }

    /// Add or replace a macro. The body is parse-checked against the
    /// active console before being accepted; parameterized macros are
    /// checked with a dummy argument substituted for each parameter.
    async fn cmd_add_macro(&mut self, rest: &str) {
        let Some(raw_name) = rest.split_whitespace().next() else {
            self.reply("Usage: \"#macroname\" \"input sequence\"".to_string())
                .await;
            return;
        };
        let value = rest[raw_name.len()..].trim().to_lowercase();
        let name = raw_name.to_lowercase();
        if !name.starts_with('#') || name.len() < 2 {
            self.reply("Macro names must start with \"#\".".to_string())
                .await;
            return;
        }
        if value.is_empty() {
            self.reply("Usage: \"#macroname\" \"input sequence\"".to_string())
                .await;
            return;
        }

        let console = match self.manager.get_console().await {
            Ok(console) => console,
            Err(e) => {
                log::error!("Failed to get console: {e}");
                return;
            }
        };

        // Substitute a real input for each parameter so the body can be
        // parsed the way an actual invocation would be.
        let mut test_value = value.clone();
        if let Some(open) = name.find('(') {
            let dummy = console
                .valid_inputs()
                .iter()
                .find(|n| !is_wait(n))
                .copied()
                .unwrap_or("a");
            let params = name[open..].matches('*').count();
            for i in 0..params {
                test_value = test_value.replace(&format!("<{i}>"), dummy);
            }
        }
        let (macros, synonyms) = self
            .store
            .read(|data| (data.macros.clone(), data.synonyms.clone()));
        let expanded = expand(&test_value, &macros, &synonyms, &self.settings.limits);
        if let Err(e) = parse(&expanded, console, &self.settings.limits) {
            self.reply(format!("Invalid macro: {e}")).await;
            return;
        }

        let existed = self
            .store
            .update(|data| data.macros.insert(name.clone(), value).is_some());
        if existed {
            self.reply(format!("Overwrote macro {name}!")).await;
        } else {
            self.reply(format!("Added macro {name}!")).await;
        }
    }

    async fn cmd_remove_macro(&mut self, args: &[&str]) {
        let Some(name) = args.first() else {
            self.reply("Usage: \"#macroname\"".to_string()).await;
            return;
        };
        let name = name.to_lowercase();
        let removed = self.store.update(|data| data.macros.remove(&name).is_some());
        if removed {
            self.reply(format!("Removed macro {name}!")).await;
        } else {
            self.reply(format!("{name} not found in macros!")).await;
        }
    }

    async fn cmd_macros(&self) {
        let mut names = self.store.read(|data| {
            data.macros.keys().cloned().collect::<Vec<String>>()
        });
        if names.is_empty() {
            self.reply("There are none!".to_string()).await;
            return;
        }
        names.sort();
        self.reply(names.join(", ")).await;
    }

    async fn cmd_add_meme(&mut self, rest: &str) {
        let Some(raw_name) = rest.split_whitespace().next() else {
            self.reply("Usage: \"memename\" \"meme text\"".to_string())
                .await;
            return;
        };
        let value = rest[raw_name.len()..].trim().to_string();
        let name = raw_name.to_lowercase();
        if value.is_empty() {
            self.reply("Usage: \"memename\" \"meme text\"".to_string())
                .await;
            return;
        }
        if name.starts_with(self.settings.command_prefix) {
            self.reply(format!(
                "Memes cannot start with \"{}\"!",
                self.settings.command_prefix
            ))
            .await;
            return;
        }
        let existed = self
            .store
            .update(|data| data.memes.insert(name.clone(), value).is_some());
        if existed {
            self.reply(format!("Overwrote meme {name}!")).await;
        } else {
            self.reply(format!("Added meme {name}!")).await;
        }
    }

    async fn cmd_remove_meme(&mut self, args: &[&str]) {
        let Some(name) = args.first() else {
            self.reply("Usage: \"memename\"".to_string()).await;
            return;
        };
        let name = name.to_lowercase();
        let removed = self.store.update(|data| data.memes.remove(&name).is_some());
        if removed {
            self.reply(format!("Removed meme {name}!")).await;
        } else {
            self.reply(format!("{name} not found in memes!")).await;
        }
    }

    async fn cmd_memes(&self) {
        let mut names = self
            .store
            .read(|data| data.memes.keys().cloned().collect::<Vec<String>>());
        if names.is_empty() {
            self.reply("There are none!".to_string()).await;
            return;
        }
        names.sort();
        self.reply(names.join(", ")).await;
    }

    async fn cmd_credits(&self, username: &str, args: &[&str]) {
        let target = args.first().copied().unwrap_or(username);
        match self.store.get_user(target) {
            Some(user) => {
                self.reply(format!("{target} has {} credit(s)!", user.credits))
                    .await
            }
            None => self.reply(NO_SUCH_USER.to_string()).await,
        }
    }

    async fn cmd_highest_credits(&self) {
        let users = self.store.read(|data| {
            data.users
                .values()
                .map(|u| (u.name.clone(), u.credits))
                .collect::<Vec<(String, i64)>>()
        });
        if users.is_empty() {
            self.reply("Sorry, the credits database is missing or empty!".to_string())
                .await;
            return;
        }

        let highest = users.iter().map(|(_, credits)| *credits).max().unwrap_or(0);
        let mut names: Vec<&str> = users
            .iter()
            .filter(|(_, credits)| *credits == highest)
            .map(|(name, _)| name.as_str())
            .collect();
        names.sort_unstable();

        let mut listed = String::new();
        for (i, name) in names.iter().enumerate() {
            listed += name;
            if i + 1 < names.len() {
                listed += ", ";
                if i + 2 == names.len() {
                    listed += "and ";
                }
            }
        }
        let verb = if names.len() == 1 { "has" } else { "have" };
        self.reply(format!(
            "{listed} {verb} the most number of credits with a credit total of {highest}!"
        ))
        .await;
    }

    async fn cmd_duel(&mut self, username: &str, args: &[&str]) {
        let (Some(target), Some(amount)) = (args.first(), args.get(1)) else {
            self.reply("Usage: \"username\" \"credit amount\"".to_string())
                .await;
            return;
        };
        let target = target.to_string();
        let Ok(amount) = amount.parse::<i64>() else {
            self.reply("Please enter a valid amount of credits!".to_string())
                .await;
            return;
        };
        if amount <= 0 {
            self.reply("Please enter a valid amount of credits!".to_string())
                .await;
            return;
        }
        if target == username {
            self.reply("You cannot duel yourself!".to_string()).await;
            return;
        }
        let Some(target_user) = self.store.get_user(&target) else {
            self.reply(NO_SUCH_USER.to_string()).await;
            return;
        };
        let challenger_credits = self
            .store
            .get_user(username)
            .map(|u| u.credits)
            .unwrap_or(0);
        if challenger_credits < amount {
            self.reply("You do not have enough credits for this duel!".to_string())
                .await;
            return;
        }
        if target_user.credits < amount {
            self.reply(format!(
                "{target} does not have enough credits for this duel!"
            ))
            .await;
            return;
        }

        self.duels.insert(
            target.clone(),
            PendingDuel {
                challenger: username.to_string(),
                amount,
                issued_at: Instant::now(),
            },
        );
        let prefix = self.settings.command_prefix;
        self.reply(format!(
            "{target}, you have been challenged to a duel by {username} for {amount} credit(s)! \
             Type {prefix}accept to accept or {prefix}deny to deny."
        ))
        .await;
    }

    async fn cmd_accept(&mut self, username: &str) {
        let Some(duel) = self.duels.remove(username) else {
            self.reply(DUEL_EXPIRED.to_string()).await;
            return;
        };
        if duel.issued_at.elapsed() >= DUEL_WINDOW {
            self.reply(DUEL_EXPIRED.to_string()).await;
            return;
        }

        // Both users could have spent credits since the challenge.
        let (challenger_credits, accepter_credits) = self.store.read(|data| {
            (
                data.users
                    .get(&duel.challenger)
                    .map(|u| u.credits)
                    .unwrap_or(0),
                data.users.get(username).map(|u| u.credits).unwrap_or(0),
            )
        });
        if challenger_credits < duel.amount || accepter_credits < duel.amount {
            self.reply(
                "At least one user involved in the duel no longer has enough credits \
                 for the duel! The duel is off!"
                    .to_string(),
            )
            .await;
            return;
        }

        // 50/50 chance of either user winning
        let accepter_wins = rand::rng().random_range(0..2) == 0;
        let (winner, loser) = if accepter_wins {
            (username.to_string(), duel.challenger)
        } else {
            (duel.challenger, username.to_string())
        };
        self.store.update(|data| {
            if let Some(user) = data.users.get_mut(&winner) {
                user.credits += duel.amount;
            }
            if let Some(user) = data.users.get_mut(&loser) {
                user.credits -= duel.amount;
            }
        });
        self.reply(format!(
            "{winner} won the bet against {loser} for {} credit(s)!",
            duel.amount
        ))
        .await;
    }

    async fn cmd_deny(&mut self, username: &str) {
        if self.duels.remove(username).is_some() {
            self.reply("You denied the duel!".to_string()).await;
        } else {
            self.reply(DUEL_EXPIRED.to_string()).await;
        }
    }

    async fn cmd_log(&mut self, username: &str, rest: &str) {
        if !self.require_level(username, AccessLevel::Whitelisted).await {
            return;
        }
        if rest.is_empty() {
            self.reply("Please enter a message for the log.".to_string())
                .await;
            return;
        }
        let entry = GameLog::new(username, rest);
        self.store.update(|data| data.logs.push(entry));
        self.reply("Successfully logged message!".to_string()).await;
    }

    /// Show a log entry, 1 being the most recent.
    async fn cmd_logs(&self, args: &[&str]) {
        let number: usize = args
            .first()
            .and_then(|a| a.parse().ok())
            .unwrap_or(1)
            .max(1);
        let (total, entry) = self.store.read(|data| {
            (
                data.logs.len(),
                data.logs.iter().rev().nth(number - 1).cloned(),
            )
        });
        match entry {
            Some(log) => {
                self.reply(format!(
                    "Log {number} of {total} [{}] {}: {}",
                    log.logged_at, log.user, log.message
                ))
                .await
            }
            None if total == 0 => self.reply("There are no logs!".to_string()).await,
            None => {
                self.reply(format!("Log number is out of range. There are {total} log(s)."))
                    .await
            }
        }
    }

    async fn cmd_level(&self, username: &str, args: &[&str]) {
        let target = args.first().copied().unwrap_or(username);
        match self.store.get_user(target) {
            Some(user) => {
                self.reply(format!("{target} has the {} access level.", user.level))
                    .await
            }
            None => self.reply(NO_SUCH_USER.to_string()).await,
        }
    }

    async fn cmd_set_level(&mut self, username: &str, args: &[&str]) {
        if !self.require_level(username, AccessLevel::Admin).await {
            return;
        }
        let (Some(target), Some(level_tag)) = (args.first(), args.get(1)) else {
            self.reply("Usage: \"username\" \"level\"".to_string()).await;
            return;
        };
        let Some(level) = AccessLevel::from_tag(level_tag) else {
            self.reply(
                "Please enter a valid access level: user, whitelisted, vip, mod, admin, owner"
                    .to_string(),
            )
            .await;
            return;
        };
        let caller_level = self.user_level(username);
        if level >= caller_level {
            self.reply("You cannot set a level equal to or higher than your own!".to_string())
                .await;
            return;
        }
        let target = target.to_string();
        let Some(target_user) = self.store.get_user(&target) else {
            self.reply(NO_SUCH_USER.to_string()).await;
            return;
        };
        if target_user.level >= caller_level {
            self.reply(
                "You cannot change the level of someone at or above your own level!".to_string(),
            )
            .await;
            return;
        }
        self.store.update(|data| {
            if let Some(user) = data.users.get_mut(&target) {
                user.level = level;
            }
        });
        self.reply(format!("Set {target}'s level to {level}!")).await;
    }
}
