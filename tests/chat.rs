use std::error::Error;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::timeout;

use crowdpad::bot::{Bot, ChatMessage};
use crowdpad::config::{ControllerBackend, Settings};
use crowdpad::data::{AccessLevel, Store, User};
use crowdpad::input::manager::Manager;

/// A fake chat connection: send lines in, read replies out.
struct Chat {
    tx: mpsc::Sender<ChatMessage>,
    rx: mpsc::Receiver<String>,
}

impl Chat {
    async fn say(&self, user: &str, text: &str) {
        let msg = ChatMessage {
            user: user.to_string(),
            text: text.to_string(),
        };
        self.tx.send(msg).await.unwrap();
    }

    async fn reply(&mut self) -> String {
        timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("timed out waiting for a reply")
            .expect("reply channel closed")
    }

    /// Assert that nothing comes back for the last message.
    async fn silence(&mut self) {
        let result = timeout(Duration::from_millis(200), self.rx.recv()).await;
        assert!(result.is_err(), "expected silence, got {result:?}");
    }
}

fn seed_user(store: &Store, name: &str, level: AccessLevel, credits: i64) {
    store.update(|data| {
        let mut user = User::new(name);
        user.level = level;
        user.credits = credits;
        data.users.insert(name.to_string(), user);
    });
}

fn setup(settings: Settings, store: Store) -> Result<Chat, Box<dyn Error>> {
    let mut manager = Manager::new(&settings, store.clone())?;
    let manager_client = manager.client();
    tokio::spawn(async move { manager.run().await });

    let (msg_tx, msg_rx) = mpsc::channel(32);
    let (reply_tx, reply_rx) = mpsc::channel(32);
    let mut bot = Bot::new(settings, store, manager_client, msg_rx, reply_tx);
    tokio::spawn(async move { bot.run().await });

    Ok(Chat {
        tx: msg_tx,
        rx: reply_rx,
    })
}

fn settings() -> Settings {
    Settings {
        backend: ControllerBackend::Memory,
        // Keep the periodic award out of credit arithmetic below
        credits_amount: 0,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_macro_lifecycle() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    let mut chat = setup(settings(), store)?;

    chat.say("alice", "!addmacro #jump _a600ms").await;
    assert_eq!(chat.reply().await, "Added macro #jump!");

    chat.say("alice", "!macros").await;
    assert_eq!(chat.reply().await, "#jump");

    // Using the macro is a valid input message, which stays silent
    chat.say("alice", "#jump").await;
    chat.silence().await;

    chat.say("alice", "!addmacro #jump b").await;
    assert_eq!(chat.reply().await, "Overwrote macro #jump!");

    chat.say("alice", "!removemacro #jump").await;
    assert_eq!(chat.reply().await, "Removed macro #jump!");

    chat.say("alice", "!macros").await;
    assert_eq!(chat.reply().await, "There are none!");
    Ok(())
}

#[tokio::test]
async fn test_bad_macros_are_refused() -> Result<(), Box<dyn Error>> {
    let mut chat = setup(settings(), Store::in_memory())?;

    chat.say("alice", "!addmacro #bad qq").await;
    assert!(chat.reply().await.starts_with("Invalid macro:"));

    chat.say("alice", "!addmacro nohash a").await;
    assert_eq!(chat.reply().await, "Macro names must start with \"#\".");
    Ok(())
}

#[tokio::test]
async fn test_meme_echo() -> Result<(), Box<dyn Error>> {
    let mut chat = setup(settings(), Store::in_memory())?;

    chat.say("alice", "!addmeme hello Hello there!").await;
    assert_eq!(chat.reply().await, "Added meme hello!");

    chat.say("bob", "hello").await;
    assert_eq!(chat.reply().await, "Hello there!");

    chat.say("alice", "!removememe hello").await;
    assert_eq!(chat.reply().await, "Removed meme hello!");

    // Without the meme the text goes to the parser and stays silent
    chat.say("bob", "hello").await;
    chat.silence().await;
    Ok(())
}

#[tokio::test]
async fn test_input_rejections_surface_in_chat() -> Result<(), Box<dyn Error>> {
    let mut chat = setup(settings(), Store::in_memory())?;

    // Text that simply is not an input sequence stays silent
    chat.say("alice", "good morning everyone").await;
    chat.silence().await;

    // A malformed sequence that clearly tried to be one gets the reason
    chat.say("alice", "a101%").await;
    assert_eq!(chat.reply().await, "invalid percentage for input \"a\"");

    chat.say("alice", "a50").await;
    assert_eq!(
        chat.reply().await,
        "duration for input \"a\" is missing a unit (ms or s)"
    );
    Ok(())
}

#[tokio::test]
async fn test_moderation_commands_check_levels() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    seed_user(&store, "streamer", AccessLevel::Owner, 0);
    let mut chat = setup(settings(), store)?;

    chat.say("alice", "!setconsole snes").await;
    assert_eq!(
        chat.reply().await,
        "You do not have permission to use this command!"
    );

    chat.say("streamer", "!setconsole snes").await;
    assert_eq!(chat.reply().await, "Changed console to SNES!");

    chat.say("alice", "!console").await;
    assert_eq!(chat.reply().await, "The current console is SNES!");

    chat.say("streamer", "!stopall").await;
    assert_eq!(chat.reply().await, "Stopped all inputs!");

    // Inputs sent while stopped are dropped without a reply
    chat.say("alice", "a").await;
    chat.silence().await;

    chat.say("streamer", "!resume").await;
    assert_eq!(chat.reply().await, "Resumed input processing!");
    Ok(())
}

#[tokio::test]
async fn test_level_commands() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    seed_user(&store, "streamer", AccessLevel::Owner, 0);
    let mut chat = setup(settings(), store)?;

    chat.say("alice", "!level").await;
    assert_eq!(chat.reply().await, "alice has the User access level.");

    chat.say("streamer", "!setlevel alice mod").await;
    assert_eq!(chat.reply().await, "Set alice's level to Moderator!");

    chat.say("bob", "!level alice").await;
    assert_eq!(chat.reply().await, "alice has the Moderator access level.");

    // Nobody can hand out their own level or higher
    chat.say("streamer", "!setlevel alice owner").await;
    assert_eq!(
        chat.reply().await,
        "You cannot set a level equal to or higher than your own!"
    );

    chat.say("alice", "!setlevel bob vip").await;
    assert_eq!(
        chat.reply().await,
        "You do not have permission to use this command!"
    );
    Ok(())
}

#[tokio::test]
async fn test_duels_move_credits() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    seed_user(&store, "alice", AccessLevel::User, 500);
    seed_user(&store, "bob", AccessLevel::User, 500);
    let mut chat = setup(settings(), store.clone())?;

    chat.say("alice", "!duel bob 50").await;
    let challenge = chat.reply().await;
    assert!(challenge.contains("challenged to a duel by alice for 50 credit(s)!"));

    chat.say("bob", "!accept").await;
    let result = chat.reply().await;
    assert!(result.contains("won the bet against"));
    assert!(result.contains("for 50 credit(s)!"));

    // Credits only move between the two duelists
    let (alice, bob) = (
        store.get_user("alice").unwrap().credits,
        store.get_user("bob").unwrap().credits,
    );
    assert_eq!(alice + bob, 1000);
    assert!(alice == 450 || alice == 550);

    // The duel is consumed
    chat.say("bob", "!accept").await;
    assert_eq!(
        chat.reply().await,
        "You are not in a duel or your duel has expired!"
    );
    Ok(())
}

#[tokio::test]
async fn test_duel_requires_credits() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    seed_user(&store, "alice", AccessLevel::User, 10);
    seed_user(&store, "bob", AccessLevel::User, 500);
    let mut chat = setup(settings(), store)?;

    chat.say("alice", "!duel bob 50").await;
    assert_eq!(
        chat.reply().await,
        "You do not have enough credits for this duel!"
    );

    chat.say("bob", "!duel alice 50").await;
    assert_eq!(
        chat.reply().await,
        "alice does not have enough credits for this duel!"
    );
    Ok(())
}

#[tokio::test]
async fn test_game_logs() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    seed_user(&store, "streamer", AccessLevel::Owner, 0);
    let mut chat = setup(settings(), store)?;

    chat.say("alice", "!log Beat the first dungeon").await;
    assert_eq!(
        chat.reply().await,
        "You do not have permission to use this command!"
    );

    chat.say("streamer", "!logs").await;
    assert_eq!(chat.reply().await, "There are no logs!");

    chat.say("streamer", "!log Beat the first dungeon").await;
    assert_eq!(chat.reply().await, "Successfully logged message!");

    chat.say("streamer", "!logs").await;
    let entry = chat.reply().await;
    assert!(entry.starts_with("Log 1 of 1 ["));
    assert!(entry.contains("streamer: Beat the first dungeon"));

    chat.say("streamer", "!logs 2").await;
    assert_eq!(
        chat.reply().await,
        "Log number is out of range. There are 1 log(s)."
    );
    Ok(())
}

#[tokio::test]
async fn test_credits_accrue_to_active_chatters() -> Result<(), Box<dyn Error>> {
    let store = Store::in_memory();
    let mut settings = settings();
    settings.credits_interval_secs = 1;
    settings.credits_amount = 25;
    let mut chat = setup(settings, store.clone())?;

    chat.say("alice", "!console").await;
    let _ = chat.reply().await;

    // The award tick runs once a second in this configuration
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let credits = store.get_user("alice").unwrap().credits;
    assert_eq!(credits, 25);

    chat.say("alice", "!credits").await;
    assert_eq!(chat.reply().await, "alice has 25 credit(s)!");
    Ok(())
}

#[tokio::test]
async fn test_unknown_commands_stay_silent() -> Result<(), Box<dyn Error>> {
    let mut chat = setup(settings(), Store::in_memory())?;

    chat.say("alice", "!frobnicate").await;
    chat.silence().await;

    chat.say("alice", "!controllers").await;
    assert_eq!(chat.reply().await, "There are 1 virtual controller(s).");
    Ok(())
}
