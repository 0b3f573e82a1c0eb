use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use essence::config::Config;
use essence::mood::{AddOutcome, RawMoodPoint, SeriesStore, weekly_aggregates};
use essence::storage::FileStore;
use serde_json::Value;

use crate::error::CliResult;
use crate::output::{OutputFormat, format_timestamp_ms, truncate_string};

#[derive(Parser)]
pub struct MoodCommand {
    #[clap(subcommand)]
    pub command: MoodSubcommand,
}

#[derive(Subcommand)]
pub enum MoodSubcommand {
    #[clap(about = "Record a mood point for a message")]
    Add(AddArgs),

    #[clap(about = "List the stored mood series for a subject")]
    List(ListArgs),

    #[clap(about = "Show the trailing-week day-bucketed averages")]
    Weekly(WeeklyArgs),

    #[clap(about = "Re-sanitize a subject's stored series")]
    Sanitize(SanitizeArgs),

    #[clap(about = "Delete a subject's series and score index")]
    Clear(ClearArgs),
}

#[derive(Parser)]
pub struct AddArgs {
    #[clap(help = "Subject (persona/thread) the point belongs to")]
    pub subject: String,

    #[clap(help = "Message id the point scores")]
    pub message_id: String,

    #[clap(long, help = "Mood score, 0-10")]
    pub mood: f64,

    #[clap(long, help = "Energy score, 0-10")]
    pub energy: f64,

    #[clap(long, help = "Label (Positive, Neutral, Negative); derived from mood if omitted")]
    pub label: Option<String>,

    #[clap(long, value_delimiter = ',', help = "Comma-separated emotion tags (up to 5 kept)")]
    pub emotions: Vec<String>,

    #[clap(long, help = "Free-text rationale")]
    pub rationale: Option<String>,

    #[clap(long, help = "Timestamp as RFC 3339 or epoch milliseconds; defaults to now")]
    pub timestamp: Option<String>,
}

#[derive(Parser)]
pub struct ListArgs {
    #[clap(help = "Subject to list")]
    pub subject: String,

    #[clap(long, short, default_value = "20", help = "Maximum number of points to display")]
    pub limit: usize,
}

#[derive(Parser)]
pub struct WeeklyArgs {
    #[clap(help = "Subject to aggregate")]
    pub subject: String,
}

#[derive(Parser)]
pub struct SanitizeArgs {
    #[clap(help = "Subject to sanitize")]
    pub subject: String,
}

#[derive(Parser)]
pub struct ClearArgs {
    #[clap(help = "Subject to clear")]
    pub subject: String,
}

impl MoodCommand {
    pub fn execute(&self, store: &FileStore, config: &Config, format: OutputFormat) -> CliResult<()> {
        let series = SeriesStore::with_max_points(store, config.series.max_points);

        match &self.command {
            MoodSubcommand::Add(args) => Self::add(&series, args, format),
            MoodSubcommand::List(args) => Self::list(&series, args, format),
            MoodSubcommand::Weekly(args) => Self::weekly(&series, args, format),
            MoodSubcommand::Sanitize(args) => Self::sanitize(&series, args, format),
            MoodSubcommand::Clear(args) => Self::clear(&series, args, format),
        }
    }

    fn add(series: &SeriesStore<&FileStore>, args: &AddArgs, format: OutputFormat) -> CliResult<()> {
        let mut raw = RawMoodPoint::new(&args.subject, &args.message_id)
            .with_scores(args.mood, args.energy)
            .with_emotions(args.emotions.clone());

        // Label and timestamp go in as raw strings so the sanitizer
        // applies the same coercions the app relies on.
        if let Some(label) = &args.label {
            raw.label = Value::String(label.clone());
        }
        if let Some(timestamp) = &args.timestamp {
            raw.timestamp = Value::String(timestamp.clone());
        }
        if let Some(rationale) = &args.rationale {
            raw = raw.with_rationale(rationale.clone());
        }

        let outcome = series.add_point(&raw);

        match format {
            OutputFormat::Json => {
                let output = match &outcome {
                    AddOutcome::Added(point) => serde_json::json!({
                        "outcome": "added",
                        "point": point,
                    }),
                    AddOutcome::Duplicate => serde_json::json!({ "outcome": "duplicate" }),
                    AddOutcome::Rejected => serde_json::json!({ "outcome": "rejected" }),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => match &outcome {
                AddOutcome::Added(point) => {
                    println!("Recorded {} (mood {}, energy {}, {}).", point.id, point.mood, point.energy, point.label);
                }
                AddOutcome::Duplicate => {
                    println!("Message {} already has a score; nothing stored.", args.message_id);
                }
                AddOutcome::Rejected => {
                    println!("Point rejected: subject and message id must be non-empty.");
                }
            },
        }

        Ok(())
    }

    fn list(series: &SeriesStore<&FileStore>, args: &ListArgs, format: OutputFormat) -> CliResult<()> {
        let mut points = series.series(&args.subject);
        let total = points.len();
        let skip = total.saturating_sub(args.limit);
        points.drain(..skip);

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&points)?);
            }
            OutputFormat::Table => {
                if points.is_empty() {
                    println!("No mood points recorded for {}.", args.subject);
                    return Ok(());
                }

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Message", "Mood", "Energy", "Label", "Emotions", "Recorded"]);

                for point in &points {
                    table.add_row([
                        truncate_string(&point.message_id, 12),
                        point.mood.to_string(),
                        point.energy.to_string(),
                        point.label.to_string(),
                        truncate_string(&point.emotions.join(", "), 30),
                        format_timestamp_ms(point.timestamp),
                    ]);
                }

                println!("{table}");
                println!("\nShowing {} of {} points", points.len(), total);
            }
        }

        Ok(())
    }

    fn weekly(series: &SeriesStore<&FileStore>, args: &WeeklyArgs, format: OutputFormat) -> CliResult<()> {
        let weekly = weekly_aggregates(series, &args.subject);

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&weekly)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Day", "Mood", "Energy"]);

                for day in &weekly {
                    table.add_row([
                        day.day.clone(),
                        day.mood.map(|m| format!("{m:.1}")).unwrap_or_else(|| "-".to_string()),
                        day.energy.map(|e| format!("{e:.1}")).unwrap_or_else(|| "-".to_string()),
                    ]);
                }

                println!("{table}");
            }
        }

        Ok(())
    }

    fn sanitize(series: &SeriesStore<&FileStore>, args: &SanitizeArgs, format: OutputFormat) -> CliResult<()> {
        let cleaned = series.sanitize_series(&args.subject);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subject": args.subject,
                    "points": cleaned.points.len(),
                    "dropped": cleaned.dropped,
                    "rewritten": cleaned.rewritten,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!(
                    "{}: {} points kept, {} dropped{}.",
                    args.subject,
                    cleaned.points.len(),
                    cleaned.dropped,
                    if cleaned.rewritten {
                        ", storage rewritten"
                    } else {
                        ", storage already clean"
                    }
                );
            }
        }

        Ok(())
    }

    fn clear(series: &SeriesStore<&FileStore>, args: &ClearArgs, format: OutputFormat) -> CliResult<()> {
        series.clear(&args.subject);

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subject": args.subject,
                    "cleared": true,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                println!("Cleared mood series for {}.", args.subject);
            }
        }

        Ok(())
    }
}
