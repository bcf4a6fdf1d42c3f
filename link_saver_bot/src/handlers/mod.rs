pub mod commands;

use std::sync::Arc;

use bot_commons::useful_methods::*;
use teloxide::{
    types::{Me, Message, UserId},
    Bot, RequestError,
};

use crate::{database::LinkStore, error::CommandError};

use self::commands::{execute, Command, CommandCall};

/// Run a parsed command for the owner and produce the reply. Errors are turned into
/// a reply too, so there's always something to send back.
pub async fn respond_to_command(
    call: &CommandCall<'_>,
    owner: UserId,
    store: &impl LinkStore,
) -> Vec<String> {
    let result = match call.resolve() {
        Ok(kind) => {
            log::debug!("{owner} called {kind:?}");
            execute(kind, call.params(), owner, store).await
        }
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        match &e {
            CommandError::StorageUnavailable(inner) => {
                log::error!("Storage failed for {owner} on {}: {inner}", call.callname);
            }
            other => log::debug!("{owner}: {other}"),
        }
        vec![e.user_message()]
    })
}

/// What to do with an incoming message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    /// Run this command for this owner.
    Command { call: CommandCall<'a>, owner: UserId },
    /// Reply with the list of commands.
    Help,
}

/// Decide what to do with a message with this text, sent by `sender`
/// to the bot `me` named `bot_username`. [`None`] means stay silent.
///
/// `sender` is [`None`] for messages sent on behalf of a chat,
/// like channel posts and anonymous admins.
pub fn route<'a>(
    text: &'a str,
    sender: Option<UserId>,
    me: UserId,
    is_private: bool,
    bot_username: &str,
) -> Option<Route<'a>> {
    // Links belong to users, so channels and anonymous admins can't have any.
    let owner = sender?;
    // Bot ignores messages made by itself.
    if owner == me {
        return None;
    }

    match CommandCall::parse(text, bot_username) {
        // In groups, other bots' commands may come without a username.
        // Only complain about unknown ones if we were asked directly.
        Some(call) if !is_private && !call.addressed && call.resolve().is_err() => None,
        Some(call) => Some(Route::Command { call, owner }),
        None if is_private => Some(Route::Help),
        None => None,
    }
}

pub async fn handle_message<S: LinkStore + 'static>(
    bot: Bot,
    me: Me,
    message: Message,
    store: Arc<S>,
) -> Result<(), RequestError> {
    let Some(text) = message.text_full() else {
        return Ok(());
    };

    let Some(decision) = route(
        text,
        message.sender_user_id(),
        me.id,
        message.chat.is_private(),
        me.username(),
    ) else {
        return Ok(());
    };

    let reply = match decision {
        Route::Command { call, owner } => respond_to_command(&call, owner, store.as_ref()).await,
        Route::Help => vec![Command::generate_help()],
    };

    bot.send_chunks(message.chat.id, &reply, message.id).await?;

    Ok(())
}
