use std::path::Path;

use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use essence::config::Config;

use crate::error::CliResult;
use crate::output::OutputFormat;

#[derive(Parser)]
pub struct ConfigCommand {
    #[clap(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    #[clap(about = "Show the effective configuration")]
    Show,

    #[clap(about = "Show which config file would be loaded")]
    Path,
}

impl ConfigCommand {
    pub fn execute(&self, config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        match &self.command {
            ConfigSubcommand::Show => Self::show(config_path, format),
            ConfigSubcommand::Path => Self::path(config_path, format),
        }
    }

    fn show(config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let config = Config::load(config_path.map(Path::to_path_buf))?;

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            OutputFormat::Table => {
                let mut table = Table::new();
                table
                    .load_preset(UTF8_FULL_CONDENSED)
                    .set_content_arrangement(ContentArrangement::Dynamic)
                    .set_header(["Setting", "Value"]);

                table.add_row([
                    "storage.data_dir",
                    &config.storage.data_dir.display().to_string(),
                ]);
                table.add_row(["series.max_points", &config.series.max_points.to_string()]);
                table.add_row([
                    "conversation.max_messages",
                    &config.conversation.max_messages.to_string(),
                ]);
                table.add_row([
                    "scoring.recent_messages",
                    &config.scoring.recent_messages.to_string(),
                ]);

                println!("{table}");
            }
        }

        Ok(())
    }

    fn path(config_path: Option<&Path>, format: OutputFormat) -> CliResult<()> {
        let resolved = Config::resolve_path(config_path.map(Path::to_path_buf));

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "path": resolved.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => match resolved {
                Some(path) => println!("{}", path.display()),
                None => println!("No config file found; defaults are in effect."),
            },
        }

        Ok(())
    }
}
