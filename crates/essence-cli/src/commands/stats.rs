use std::collections::BTreeSet;

use clap::Parser;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use essence::config::Config;
use essence::conversation::ConversationLog;
use essence::mood::SeriesStore;
use essence::storage::FileStore;

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct StatsCommand {
    #[clap(long, help = "Show statistics for a single subject only")]
    pub subject: Option<String>,
}

impl StatsCommand {
    pub fn execute(&self, store: &FileStore, config: &Config, format: OutputFormat) -> CliResult<()> {
        let series = SeriesStore::with_max_points(store, config.series.max_points);
        let log = ConversationLog::with_max_messages(store, config.conversation.max_messages);

        let mut subjects: BTreeSet<String> = series.subjects().into_iter().collect();
        subjects.extend(log.subjects());

        if let Some(subject) = &self.subject {
            subjects.retain(|s| s == subject);
        }

        let rows: Vec<(String, usize, usize)> = subjects
            .into_iter()
            .map(|s| {
                let points = series.series(&s).len();
                let messages = log.messages(&s).len();
                (s, points, messages)
            })
            .collect();

        let total_points: usize = rows.iter().map(|(_, p, _)| p).sum();
        let total_messages: usize = rows.iter().map(|(_, _, m)| m).sum();

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "subjects": rows
                        .iter()
                        .map(|(s, p, m)| {
                            serde_json::json!({
                                "subject": s,
                                "mood_points": p,
                                "messages": m,
                            })
                        })
                        .collect::<Vec<_>>(),
                    "total_mood_points": total_points,
                    "total_messages": total_messages,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if rows.is_empty() {
                    println!("No data recorded yet.");
                    return Ok(());
                }

                println!("Essence Statistics");
                println!("======================\n");

                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Subject", "Mood Points", "Messages"]);

                for (subject, points, messages) in &rows {
                    table.add_row([subject.clone(), points.to_string(), messages.to_string()]);
                }

                println!("{table}\n");
                println!(
                    "Total: {} subject(s), {} mood points, {} messages",
                    rows.len(),
                    total_points,
                    total_messages
                );
            }
        }

        Ok(())
    }
}
