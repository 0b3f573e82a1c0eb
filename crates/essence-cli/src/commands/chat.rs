use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use essence::config::Config;
use essence::conversation::{ConversationLog, Message, Sender};
use essence::mood::{HeuristicScorer, ScoringPipeline, SeriesStore};
use essence::storage::FileStore;

use crate::error::CliResult;
use crate::output::{OutputFormat, format_timestamp, truncate_string};

#[derive(Parser)]
pub struct ChatCommand {
    #[clap(subcommand)]
    pub command: ChatSubcommand,
}

#[derive(Subcommand)]
pub enum ChatSubcommand {
    #[clap(about = "Record a message and score any unscored recent user messages")]
    Send(SendArgs),

    #[clap(about = "Show a subject's conversation history")]
    Log(LogArgs),

    #[clap(about = "Delete a subject's conversation history")]
    Clear(ClearArgs),
}

#[derive(Parser)]
pub struct SendArgs {
    #[clap(help = "Subject (persona/thread) the message belongs to")]
    pub subject: String,

    #[clap(help = "Message text")]
    pub text: String,

    #[clap(long, help = "Record the message as a persona reply instead of a user message")]
    pub persona: bool,
}

#[derive(Parser)]
pub struct LogArgs {
    #[clap(help = "Subject to show")]
    pub subject: String,

    #[clap(long, short, default_value = "20", help = "Maximum number of messages to display")]
    pub limit: usize,
}

#[derive(Parser)]
pub struct ClearArgs {
    #[clap(help = "Subject to clear")]
    pub subject: String,
}

impl ChatCommand {
    pub fn execute(&self, store: &FileStore, config: &Config, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ChatSubcommand::Send(args) => Self::send(store, config, args, format),
            ChatSubcommand::Log(args) => Self::log(store, config, args, format),
            ChatSubcommand::Clear(args) => Self::clear(store, config, args, format),
        }
    }

    fn send(store: &FileStore, config: &Config, args: &SendArgs, format: OutputFormat) -> CliResult<()> {
        let pipeline = ScoringPipeline::new(
            SeriesStore::with_max_points(store, config.series.max_points),
            ConversationLog::with_max_messages(store, config.conversation.max_messages),
            HeuristicScorer::new(),
        )
        .with_recent_messages(config.scoring.recent_messages);

        let message = if args.persona {
            Message::persona(&args.text)
        } else {
            Message::user(&args.text)
        };
        let message_id = message.id;

        pipeline.log().append(&args.subject, message);
        let scored = pipeline.ensure_scores(&args.subject);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subject": args.subject,
                    "message_id": message_id.to_string(),
                    "sender": if args.persona { "persona" } else { "user" },
                    "scored": scored,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Recorded message {message_id}.");
                if scored > 0 {
                    println!("Scored {scored} new message(s).");
                }
            }
        }

        Ok(())
    }

    fn log(store: &FileStore, config: &Config, args: &LogArgs, format: OutputFormat) -> CliResult<()> {
        let log = ConversationLog::with_max_messages(store, config.conversation.max_messages);
        let messages = log.recent(&args.subject, args.limit);

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&messages)?);
            }
            OutputFormat::Table => {
                if messages.is_empty() {
                    println!("No messages recorded for {}.", args.subject);
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Sender", "Message", "Sent"]);

                for message in &messages {
                    let sender = match message.sender {
                        Sender::User => "User",
                        Sender::Persona => "Persona",
                    };
                    table.add_row([
                        sender.to_string(),
                        truncate_string(&message.content, 60),
                        format_timestamp(&message.timestamp),
                    ]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }

    fn clear(store: &FileStore, config: &Config, args: &ClearArgs, format: OutputFormat) -> CliResult<()> {
        let log = ConversationLog::with_max_messages(store, config.conversation.max_messages);
        log.clear(&args.subject);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subject": args.subject,
                    "cleared": true,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Cleared conversation for {}.", args.subject);
            }
        }

        Ok(())
    }
}
