// Dolphin Translate - session runtime

pub mod clipboard;
mod constants;
pub mod dolphin;
pub mod errors;
pub mod normalize;
pub mod opener;
pub mod session;
pub mod share;
pub mod state;
mod util;

use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::clipboard::{ClipboardAccess, MemoryClipboard, SystemClipboard};
use crate::dolphin::DolphinCodec;
use crate::errors::AppError;
use crate::opener::SystemOpener;
use crate::session::{ActionOutcome, SessionController};
use crate::state::{load_settings, resolve_settings_path, SessionSnapshot};
use crate::util::text_len;

pub use crate::dolphin::{Category, Classifier, Translator};
pub use crate::state::{Label, SessionState, Settings};

/// One line typed into the session loop.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Input(String),
    Paste,
    Copy,
    Clear,
    Swap,
    Hyphenate(bool),
    Cast,
    Tweet,
    State,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = trimmed.strip_prefix(':') else {
        return Command::Input(trimmed.to_string());
    };
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("paste"), None) => Command::Paste,
        (Some("copy"), None) => Command::Copy,
        (Some("clear"), None) => Command::Clear,
        (Some("swap"), None) => Command::Swap,
        (Some("hyphenate"), Some("on")) => Command::Hyphenate(true),
        (Some("hyphenate"), Some("off")) => Command::Hyphenate(false),
        (Some("cast"), None) => Command::Cast,
        (Some("tweet"), None) => Command::Tweet,
        (Some("state"), None) => Command::State,
        (Some("quit"), None) | (Some("q"), None) => Command::Quit,
        // `::text` escapes a literal leading colon
        _ if rest.starts_with(':') => Command::Input(rest.to_string()),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let input = if snapshot.input_text.is_empty() {
        snapshot.placeholder.lines().next().unwrap_or_default()
    } else {
        snapshot.input_text.as_str()
    };
    out.push_str(&format!("{} {}\n", snapshot.input_heading, input));
    out.push_str(&format!(
        "{} {}\n",
        snapshot.output_heading, snapshot.output_text
    ));
    if let Some(counter) = &snapshot.counter {
        out.push_str(&format!(
            "{}  [cast: {}] [tweet: {}]\n",
            counter,
            on_off(snapshot.available.cast),
            on_off(snapshot.available.tweet)
        ));
    }
    out.push_str(&format!(
        "hyphenate: {}{}\n",
        on_off(snapshot.normalize),
        if snapshot.available.hyphenate {
            ""
        } else {
            " (locked)"
        }
    ));
    out
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn describe_error(error: &AppError) -> String {
    match error.suggested_action() {
        Some(action) => format!("{}: {} ({})", error.title(), error.message(), action),
        None => format!("{}: {}", error.title(), error.message()),
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .init();

    info!("Dolphin Translate starting up");
}

fn build_controller() -> SessionController {
    let settings_path = resolve_settings_path();
    let settings = load_settings(&settings_path);

    let clipboard: Arc<dyn ClipboardAccess> = match SystemClipboard::probe() {
        Ok(system) => Arc::new(system),
        Err(e) => {
            warn!("{}; falling back to in-memory clipboard", e);
            Arc::new(MemoryClipboard::new())
        }
    };
    let codec = Arc::new(DolphinCodec::new());

    SessionController::new(
        settings,
        codec.clone(),
        codec,
        clipboard,
        Arc::new(SystemOpener),
    )
}

async fn execute(session: &SessionController, command: Command) -> Result<Option<String>, AppError> {
    let outcome = match command {
        Command::Input(text) => session.input_edit(&text).await?,
        Command::Paste => session.paste().await?,
        Command::Copy => session.copy(),
        Command::Clear => session.clear().await?,
        Command::Swap => session.swap().await?,
        Command::Hyphenate(enabled) => session.toggle_normalize(enabled).await?,
        Command::Cast => session.cast_to_warpcast(),
        Command::Tweet => session.post_to_twitter(),
        Command::State => {
            let json = serde_json::to_string_pretty(&session.snapshot())
                .map_err(|e| AppError::Other(e.to_string()))?;
            return Ok(Some(json));
        }
        Command::Quit => return Ok(None),
        Command::Unknown(raw) => {
            return Ok(Some(format!("unknown command: {}", raw)));
        }
    };

    let message = match outcome {
        ActionOutcome::Applied(snapshot) => render(&snapshot),
        ActionOutcome::Superseded => "(superseded)".to_string(),
        ActionOutcome::Ignored => "(not available right now)".to_string(),
        ActionOutcome::Copied { text } => format!("copied {} characters", text_len(&text)),
        ActionOutcome::Shared { target, url } => format!("{}: {}", target.label(), url),
    };
    Ok(Some(message))
}

/// Run an interactive session on stdin/stdout until `:quit` or EOF.
pub async fn run() {
    init_logging();
    let session = build_controller();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = io::stdout();
    let _ = write!(stdout, "{}", render(&session.snapshot()));
    let _ = stdout.flush();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read input: {}", e);
                break;
            }
        };

        match execute(&session, parse_command(&line)).await {
            Ok(Some(message)) => {
                let _ = writeln!(stdout, "{}", message.trim_end());
            }
            Ok(None) => break,
            Err(e) => {
                let _ = writeln!(stdout, "{}", describe_error(&e));
            }
        }
        let _ = stdout.flush();
    }

    info!("Dolphin Translate shutting down");
}
