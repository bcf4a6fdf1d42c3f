use teloxide::types::{BotCommand, UserId};

use crate::{
    database::LinkStore,
    error::CommandError,
    formatter::{self, NO_LINKS},
    tag_extractor::extract_link_and_tags,
    types::Tag,
};

/// Everything this bot can be asked to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Start,
    Help,
    Save,
    List,
    Tags,
    Find,
}

pub const COMMANDS: &[Command] = &[START, HELP, SAVE, LIST, TAGS, FIND];

pub struct Command {
    /// The command, followed by a description of its parameters, if any.
    pub callname: &'static str,
    pub description: &'static str,
    pub kind: CommandKind,
    hidden: bool,
}

pub const START: Command = Command {
    callname: "/start",
    description: "",
    kind: CommandKind::Start,
    hidden: true,
};

pub const HELP: Command = Command {
    callname: "/help",
    description: "Show this help.",
    kind: CommandKind::Help,
    hidden: false,
};

pub const SAVE: Command = Command {
    callname: "/save &lt;link&gt; #tag1 #tag2",
    description: "Save a link with tags.",
    kind: CommandKind::Save,
    hidden: false,
};

pub const LIST: Command = Command {
    callname: "/list",
    description: "List all your saved links.",
    kind: CommandKind::List,
    hidden: false,
};

pub const TAGS: Command = Command {
    callname: "/tags",
    description: "Show all tags you have used.",
    kind: CommandKind::Tags,
    hidden: false,
};

pub const FIND: Command = Command {
    callname: "/find #tag",
    description: "Find your links with this tag.",
    kind: CommandKind::Find,
    hidden: false,
};

impl Command {
    pub fn is_matching_callname(&self, command: &str) -> bool {
        self.callname
            .split_ascii_whitespace()
            .next()
            .is_some_and(|x| x.eq_ignore_ascii_case(command))
    }

    /// Look up a command by its name, like `/save`.
    pub fn find(callname: &str) -> Option<&'static Command> {
        COMMANDS
            .iter()
            .find(|command| command.is_matching_callname(callname))
    }

    pub fn generate_help() -> String {
        let mut response = String::from("Commands:\n");
        for command in COMMANDS.iter().filter(|x| !x.hidden) {
            response.push('\n');
            response.push_str(command.callname);
            response.push_str(" - ");
            response.push_str(command.description);
        }
        response
    }

    pub fn generate_bot_commands() -> Vec<BotCommand> {
        let mut output = Vec::new();

        for command in COMMANDS.iter().filter(|x| !x.hidden) {
            let Some(callname) = command.callname.split_ascii_whitespace().next() else {
                continue;
            };

            // Cut off the /
            output.push(BotCommand {
                command: callname[1..].to_string(),
                description: command.description.to_string(),
            });
        }

        output
    }
}

/// A command invocation found in a message's text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandCall<'a> {
    /// Command name without the bot's username, like `/save`.
    pub callname: &'a str,
    /// Whether the command explicitly named this bot, like `/save@Bot`.
    pub addressed: bool,
    params: &'a str,
}

impl<'a> CommandCall<'a> {
    /// Returns [`None`] if the text isn't a command, or if it's a command
    /// addressed to some other bot.
    pub fn parse(text: &'a str, bot_username: &str) -> Option<CommandCall<'a>> {
        let text = text.trim_start();
        if !text.starts_with('/') {
            return None;
        }

        let command = text.split_whitespace().next()?;
        let params = text[command.len()..].trim();

        // If the command is "/save@Link_Saver_Bot", trim the "@" and
        // everything after it, checking that the username is ours.
        let (callname, addressed) = match command.split_once('@') {
            Some((callname, username)) => {
                // Bot names are guaranteed ASCII.
                if !username.eq_ignore_ascii_case(bot_username) {
                    return None;
                }
                (callname, true)
            }
            None => (command, false),
        };

        Some(CommandCall {
            callname,
            addressed,
            params,
        })
    }

    /// Text after the command.
    ///
    /// If the input is `/save example.com #stuff`,
    /// this will be the substring `example.com #stuff`.
    #[inline]
    pub fn params(&self) -> &'a str {
        self.params
    }

    /// Figure out which of our commands this is.
    ///
    /// # Errors
    /// Returns [`CommandError::UnknownCommand`] if it's none of them.
    pub fn resolve(&self) -> Result<CommandKind, CommandError> {
        Command::find(self.callname)
            .map(|command| command.kind)
            .ok_or_else(|| CommandError::UnknownCommand(self.callname.to_string()))
    }
}

const WELCOME: &str = "Hi! I can save your links and organize them with tags.";

/// Run a command for the owner and produce the reply, split into messages.
///
/// # Errors
/// Errors if the parameters are missing something, or the storage fails.
pub async fn execute(
    kind: CommandKind,
    params: &str,
    owner: UserId,
    store: &impl LinkStore,
) -> Result<Vec<String>, CommandError> {
    let reply = match kind {
        CommandKind::Start => vec![format!("{WELCOME}\n\n{}", Command::generate_help())],
        CommandKind::Help => vec![Command::generate_help()],
        CommandKind::Save => {
            let (url, tags) = extract_link_and_tags(params)?;
            let link = store.save(owner, &url, &tags).await?;
            log::debug!("Saved link {} for {owner}", link.id);
            vec![formatter::format_saved(&link)]
        }
        CommandKind::List => {
            let links = store.list_all(owner).await?;
            formatter::format_links("Your saved links:", &links, NO_LINKS)
        }
        CommandKind::Tags => {
            let tags = store.list_tags(owner).await?;
            formatter::format_tags(&tags)
        }
        CommandKind::Find => {
            let tag = params
                .split_whitespace()
                .next()
                .and_then(Tag::new)
                .ok_or(CommandError::MissingTag)?;
            let links = store.find_by_tag(owner, &tag).await?;
            let escaped = html_escape::encode_text(tag.as_str());
            formatter::format_links(
                &format!("Links tagged with #{escaped}:"),
                &links,
                &format!("No links found with tag #{escaped}."),
            )
        }
    };

    Ok(reply)
}
