use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    macros::BotCommands,
};

use crate::media::MediaFile;

/// Type alias for dialogue management with State and InMemStorage
pub type MyDialogue = Dialogue<State, InMemStorage<State>>;

/// Type alias for handler result types
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Represents the dialogue state for the bot conversation
#[derive(Clone, Default, Debug)]
pub enum State {
    /// Initial state, waiting for a file
    #[default]
    Start,
    /// A file was received and its new name is expected next
    AwaitingFileName { media: MediaFile },
    /// Waiting for the prefix text after pressing "Set Prefix"
    AwaitingPrefix,
    /// Waiting for the caption template after pressing "Set Caption"
    AwaitingCaption,
}

/// Available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Display help information")]
    Help,
    #[command(description = "About this bot")]
    About,
    #[command(description = "Rename the replied file: /rename <new name>")]
    Rename(String),
    #[command(description = "Set a prefix for renamed files")]
    SetPrefix(String),
    #[command(description = "Remove the file name prefix")]
    DelPrefix,
    #[command(description = "Set a caption template, {filename} is replaced")]
    SetCaption(String),
    #[command(description = "Remove the custom caption")]
    DelCaption,
    #[command(description = "Show the saved thumbnail")]
    ViewThumb,
    #[command(description = "Delete the saved thumbnail")]
    DelThumb,
    #[command(description = "Open the settings menu")]
    Settings,
    #[command(description = "Show usage statistics")]
    Stats,
    #[command(description = "Cancel the current operation")]
    Cancel,
    #[command(description = "Show uptime and free disk space")]
    Status,
    #[command(description = "Delete stale downloads now (admins only)")]
    Cleanup,
}

#[cfg(test)]
mod tests {
    use super::*;
    use teloxide::utils::command::BotCommands as _;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("/rename movie.mkv", "bot").unwrap(),
            Command::Rename("movie.mkv".to_string())
        );
        assert_eq!(
            Command::parse("/setprefix [HD]", "bot").unwrap(),
            Command::SetPrefix("[HD]".to_string())
        );
        assert_eq!(Command::parse("/delthumb", "bot").unwrap(), Command::DelThumb);
        assert_eq!(Command::parse("/cancel", "bot").unwrap(), Command::Cancel);
        assert_eq!(Command::parse("/status", "bot").unwrap(), Command::Status);
        assert_eq!(Command::parse("/cleanup", "bot").unwrap(), Command::Cleanup);
    }

    #[test]
    fn test_default_state() {
        assert!(matches!(State::default(), State::Start));
    }
}
