//! CLI for issue-triage.
//!
//! Feeds chat messages to the dispatcher, either one at a time or as a
//! line-oriented stream on stdin, and exposes board placement as standalone
//! commands so it can be retried on its own.

use clap::{Parser, Subcommand};
use issue_triage::{
    resolve_settings_path, Dispatcher, DispatcherError, Message, Reply, Repository, Settings,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Issue Triage - Route chat messages to GitHub issues and triage the unassigned backlog.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (defaults to $ISSUE_TRIAGE_CONFIG, then issue-triage.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Sender of the messages (defaults to the configured operator).
    #[arg(long)]
    author: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Handle a single chat message and print the reply.
    Message {
        /// Message text; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Start a triage walk.
    Triage,
    /// Read messages from stdin, one per line, and answer each.
    Listen,
    /// Move an issue's card to a board column.
    MoveCard {
        /// Repository as owner/name.
        repository: String,
        /// Issue number.
        number: u64,
        /// Column: Todo, "In Progress", PUSH, Test or Done.
        column: String,
    },
    /// Place the card of an issue in Todo.
    PlaceCard {
        /// Issue URL, https://github.com/{owner}/{repo}/issues/{number}.
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<ExitCode, DispatcherError> {
    let settings_path = resolve_settings_path(args.config.as_deref());
    let settings = Settings::load_or_default(&settings_path)?;
    let author = args.author.unwrap_or_else(|| settings.operator.clone());
    let dispatcher = Dispatcher::connect(settings, &args.token)?;

    let code = match args.command {
        Command::Message { text } => {
            let message = Message::new(author, text.join(" "));
            if let Some(reply) = dispatcher.handle_message(&message).await {
                print_reply(&reply);
            }
            ExitCode::SUCCESS
        }
        Command::Triage => {
            let reply = dispatcher.triage().start().await;
            print_reply(&reply);
            ExitCode::SUCCESS
        }
        Command::Listen => {
            listen(&dispatcher, &author).await;
            ExitCode::SUCCESS
        }
        Command::MoveCard {
            repository,
            number,
            column,
        } => match repository.parse::<Repository>() {
            Ok(repository) => {
                board_outcome(dispatcher.move_card(&repository, number, &column).await)
            }
            Err(e) => {
                error!(error = %e, "Invalid repository");
                ExitCode::from(2)
            }
        },
        Command::PlaceCard { url } => match dispatcher.place_card(&url).await {
            Ok(placed) => board_outcome(placed),
            Err(e) => {
                error!(error = %e, "Invalid issue URL");
                ExitCode::from(2)
            }
        },
    };
    Ok(code)
}

fn board_outcome(moved: bool) -> ExitCode {
    if moved {
        println!("✅ Card aggiornata");
        ExitCode::SUCCESS
    } else {
        println!("❌ Card non aggiornata");
        ExitCode::from(1)
    }
}

fn print_reply(reply: &Reply) {
    println!("{}\n", reply.text);
}

/// Answers stdin messages until EOF. Each line's number is the id of the
/// reply sent for it, so triage prompts can be tracked and invalidated.
async fn listen(dispatcher: &Dispatcher, author: &str) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_number: u64 = 0;

    info!("Listening on stdin");
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read stdin");
                break;
            }
        };
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        let Some(reply) = dispatcher.handle_message(&Message::new(author, line)).await else {
            continue;
        };

        if reply.invalidate_previous {
            let stale = dispatcher.triage().stale_prompts().await;
            if !stale.is_empty() {
                info!(ids = ?stale, "Invalidating earlier triage prompts");
            }
        }
        print_reply(&reply);
        if reply.prompt {
            dispatcher.triage().record_prompt(&line_number.to_string()).await;
        }
    }
}
