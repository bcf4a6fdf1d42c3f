//! Source code for Link Saver Bot: a Telegram bot that saves links
//! with hashtags and finds them again by tag.

/// Where the bot gets its token and database from.
mod config;

/// Various types used throughout.
mod types;

/// Errors that a command can end in.
mod error;

/// Reading URLs and hashtags out of `/save` parameters.
mod tag_extractor;

/// The database.
mod database;

/// Turning links into message text.
mod formatter;

/// Functions that handle events from Telegram.
mod handlers;

/// Entry function that starts the bot.
mod entry;
pub use entry::*;
