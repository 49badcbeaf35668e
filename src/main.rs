use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use crowdpad::bot::Bot;
use crowdpad::bot::ChatMessage;
use crowdpad::config::path::get_data_path;
use crowdpad::config::ControllerBackend;
use crowdpad::config::Settings;
use crowdpad::console::ConsoleKind;
use crowdpad::constants::OPERATOR_NAME;
use crowdpad::data::AccessLevel;
use crowdpad::data::Store;
use crowdpad::data::User;
use crowdpad::input::manager::Manager;

const BUFFER_SIZE: usize = 1024;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a settings file to load instead of searching the usual paths
    #[arg(long)]
    config: Option<String>,
    /// Path to the bot data file
    #[arg(long)]
    data: Option<String>,
    /// Console profile to start on, overriding the settings file
    #[arg(long)]
    console: Option<String>,
    /// Number of virtual controllers to create
    #[arg(long)]
    controllers: Option<usize>,
    /// Controller backend to drive ("uinput" or "memory")
    #[arg(long)]
    backend: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let log_level = match env::var("LOG_LEVEL") {
        Ok(value) => value,
        Err(_) => "info".to_string(),
    };
    env::set_var("RUST_LOG", log_level);
    env_logger::init();
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    log::info!("Starting Crowdpad v{}", VERSION);

    let args = Args::parse();

    // Load settings and apply any command line overrides
    let mut settings = match args.config {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::load(),
    };
    if let Some(tag) = args.console {
        let Some(console) = ConsoleKind::from_tag(&tag) else {
            return Err(format!("Unknown console: {tag}").into());
        };
        settings.console = console;
    }
    if let Some(count) = args.controllers {
        settings.controller_count = count;
    }
    if let Some(backend) = args.backend {
        settings.backend = match backend.as_str() {
            "uinput" => ControllerBackend::Uinput,
            "memory" => ControllerBackend::Memory,
            other => return Err(format!("Unknown backend: {other}").into()),
        };
    }

    // Open the persistent bot data
    let data_path = match args.data {
        Some(path) => PathBuf::from(path),
        None => get_data_path(),
    };
    let store = Store::load_or_create(data_path)?;

    // The terminal operator always has full access
    store.update(|data| {
        let user = data
            .users
            .entry(OPERATOR_NAME.to_string())
            .or_insert_with(|| User::new(OPERATOR_NAME));
        user.level = AccessLevel::Owner;
    });

    // Create the input manager and its virtual controllers
    let mut manager = Manager::new(&settings, store.clone())?;

    // Setup CTRL+C handler
    let signal_client = manager.client();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.unwrap();
        log::info!("Releasing all inputs");
        if let Err(e) = signal_client.stop_all().await {
            log::error!("Unable to release inputs: {:?}", e);
        }
        log::info!("Shutting down");
        process::exit(0);
    });

    // Wire the terminal chat to the bot
    let (msg_tx, msg_rx) = mpsc::channel(BUFFER_SIZE);
    let (reply_tx, mut reply_rx) = mpsc::channel(BUFFER_SIZE);
    let mut bot = Bot::new(settings, store, manager.client(), msg_rx, reply_tx);

    // Read chat lines from stdin
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let Some(msg) = parse_chat_line(&line) else {
                        continue;
                    };
                    if msg_tx.send(msg).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::error!("Error reading chat input: {e}");
                    break;
                }
            }
        }
    });

    // Print bot replies to stdout
    tokio::spawn(async move {
        while let Some(reply) = reply_rx.recv().await {
            println!("{reply}");
        }
    });

    // Stop the manager once chat ends so both tasks wind down together
    let shutdown_client = manager.client();
    let bot_task = async move {
        let result = bot.run().await;
        shutdown_client.stop().await.ok();
        result
    };

    let (manager_result, bot_result) = tokio::join!(manager.run(), bot_task);

    match manager_result {
        Ok(_) => {
            log::info!("The input manager task has exited");
        }
        Err(manager_err) => {
            log::error!("Error in the input manager task: {manager_err}");
            return Err(manager_err);
        }
    }

    match bot_result {
        Ok(_) => {
            log::info!("The chat bot task has exited");
        }
        Err(bot_err) => {
            log::error!("Error in the chat bot task: {bot_err}");
            return Err(bot_err);
        }
    }

    log::info!("Crowdpad stopped");

    Ok(())
}

/// Parse one terminal line into a chat message. Lines of the form
/// "name: message" are attributed to that user so multiple chatters can
/// be simulated from one terminal; everything else counts as the operator.
fn parse_chat_line(line: &str) -> Option<ChatMessage> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some((name, text)) = line.split_once(": ") {
        let name = name.trim();
        if !name.is_empty() && !name.contains(' ') {
            return Some(ChatMessage {
                user: name.to_string(),
                text: text.trim().to_string(),
            });
        }
    }
    Some(ChatMessage {
        user: OPERATOR_NAME.to_string(),
        text: line.to_string(),
    })
}
