pub mod commands;
pub mod error;
pub mod output;

pub use commands::{ChatCommand, ConfigCommand, MoodCommand, StatsCommand};
pub use error::{CliError, CliResult};
pub use output::{OutputFormat, format_timestamp, format_timestamp_ms, truncate_string};
