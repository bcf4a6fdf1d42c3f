use html_escape::encode_text;

use crate::handlers::commands::Command;

/// Anything that can go wrong while handling a single command.
/// None of these are fatal: the dispatcher turns them into a reply.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("no URL given to save")]
    MissingUrl,
    #[error("no tag given to search for")]
    MissingTag,
    #[error("storage is unavailable: {0}")]
    StorageUnavailable(#[from] sqlx::Error),
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl CommandError {
    /// Plain language description of the problem, as HTML to send to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingUrl => concat!(
                "Please provide a link to save.\n",
                "Format: <code>/save &lt;link&gt; #tag1 #tag2</code>"
            )
            .to_string(),
            Self::MissingTag => concat!(
                "Please provide a tag to search for.\n",
                "Format: <code>/find #tag</code>"
            )
            .to_string(),
            Self::StorageUnavailable(_) => concat!(
                "Sorry, saved links can't be reached right now. ",
                "Please try again later."
            )
            .to_string(),
            Self::UnknownCommand(command) => format!(
                "Unknown command: <code>{}</code>\n\n{}",
                encode_text(command),
                Command::generate_help()
            ),
        }
    }
}
