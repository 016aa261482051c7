//! Command-line front end for the Yammer message feed.
//!
//! Usage:
//!   yammer authorize
//!   yammer list
//!   yammer show-id --line 12
//!   yammer post "Lunch at noon?"
//!   yammer reply --line 12 "Count me in"
//!   yammer delete --id 1234
//!
//! Points are character offsets into the listing printed by `yammer list`, counted
//! from zero; lines are 1-based. Both are resolved against a fresh fetch, so they
//! move when new messages arrive. `--id` names a message directly. Deleting by
//! point or line only shows the resolved message unless `--yes` is given.

use anyhow::{anyhow, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use yammer_feed::libs::config::YammerConfig;
use yammer_feed::libs::core::index::Point;
use yammer_feed::libs::core::feed_builder::RenderRecord;
use yammer_feed::libs::core::session::FeedSession;
use yammer_feed::libs::models::MessageId;
use yammer_feed::{authorize, connect, prefetch_mugshots};

#[derive(Parser, Debug)]
#[command(name = "yammer")]
#[command(about = "Read and write the Yammer message feed")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Obtain and save an access token
    Authorize,
    /// Fetch and print the feed
    List,
    /// Print the id of the message at a position
    ShowId(Position),
    /// Post a new message
    Post { body: String },
    /// Reply to the message at a position
    Reply {
        #[command(flatten)]
        position: Position,
        body: String,
    },
    /// Delete the message at a position
    Delete {
        #[command(flatten)]
        position: Position,
        /// Delete a message found by point or line without showing it first
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Position {
    /// Character offset into the listing
    #[arg(long)]
    point: Option<Point>,

    /// 1-based line of the listing
    #[arg(long)]
    line: Option<usize>,

    /// Message id, as printed by `show-id`
    #[arg(long)]
    id: Option<MessageId>,
}

fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = YammerConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Authorize => {
            let token = authorize(&config, prompt_verifier)?;
            tracing::info!(token = %token.token, path = %config.token_file().display(), "Access token saved");
            Ok(())
        }
        command => run(command, &config),
    }
}

fn run(command: Command, config: &YammerConfig) -> Result<()> {
    let client = connect(config)?;
    let mut session = FeedSession::new();
    session.refresh(&client, &Local::now())?;

    match command {
        Command::Authorize | Command::List => {
            if config.prefetch_mugshots {
                prefetch_mugshots(config, &session)?;
            }
            print!("{}", session.buffer().text());
        }
        Command::ShowId(position) => match resolve(&session, &position)? {
            Some(message_id) => println!("{}", message_id),
            None => println!("No message at {}", position),
        },
        Command::Post { body } => {
            session.post(&client, &body, &Local::now())?;
            print!("{}", session.buffer().text());
        }
        Command::Reply { position, body } => match resolve(&session, &position)? {
            Some(message_id) => {
                session.reply_to(&client, message_id, &body, &Local::now())?;
                println!("Done: reply to message {}", message_id);
            }
            None => println!("No message at {} to reply to", position),
        },
        Command::Delete { position, yes } => match resolve(&session, &position)? {
            Some(message_id) if position.id.is_none() && !yes => {
                println!("{}", describe(message_id, session.record_for(message_id)));
                println!("Not deleted. Run again with --id {} or add --yes.", message_id);
            }
            Some(message_id) => {
                session.delete(&client, message_id, &Local::now())?;
                println!("Done: delete message {}", message_id);
            }
            None => println!("No message at {} to delete", position),
        },
    }

    Ok(())
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.point, self.line, self.id) {
            (Some(point), _, _) => write!(f, "point {}", point),
            (_, Some(line), _) => write!(f, "line {}", line),
            (_, _, Some(id)) => write!(f, "id {}", id),
            _ => write!(f, "no position"),
        }
    }
}

fn describe(message_id: MessageId, record: Option<&RenderRecord>) -> String {
    match record {
        Some(record) => {
            let first_line = record.body_plain.lines().next().unwrap_or_default();
            format!("Message {} from {}: {}", message_id, record.sender_display_name, first_line)
        }
        None => format!("Message {}", message_id),
    }
}

/// The message a position names. Points and lines are looked up in the fetched
/// feed; ids are taken as given.
fn resolve(session: &FeedSession, position: &Position) -> Result<Option<MessageId>> {
    match (position.id, position.point, position.line) {
        (Some(message_id), _, _) => Ok(Some(message_id)),
        (None, Some(point), _) => Ok(session.message_id_at(point)),
        (None, None, Some(line)) => {
            let point = session
                .buffer()
                .point_at_line(line)
                .ok_or_else(|| anyhow!("line {} is outside the listing", line))?;
            Ok(session.message_id_at(point))
        }
        (None, None, None) => Err(anyhow!("one of --point, --line or --id is required")),
    }
}

fn prompt_verifier(authorize_url: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    writeln!(stdout, "Visit {} and authorize access.", authorize_url)?;
    write!(stdout, "Verification code: ")?;
    stdout.flush()?;

    let mut verifier = String::new();
    io::stdin().lock().read_line(&mut verifier)?;
    Ok(verifier.trim().to_string())
}
