pub mod chat;
pub mod config;
pub mod mood;
pub mod stats;

pub use chat::ChatCommand;
pub use config::ConfigCommand;
pub use mood::MoodCommand;
pub use stats::StatsCommand;
