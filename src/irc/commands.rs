//! Viewer slash-command parser.
//!
//! Parses `/command args` input lines into typed [`ParsedCommand`] values
//! that the event handler can act on.

/// A parsed viewer command. Each variant corresponds to a `/command`.
#[derive(Debug, PartialEq)]
pub enum ParsedCommand {
    Search { text: String },
    ResetSearch,
    Clear,
    Pause,
    /// Fetch emote feeds again, bypassing the cache.
    Refresh,
    /// Re-read the config file and restyle the pane.
    Reload,
    Ignore { code: String },
    Unignore { code: String },
    Me { text: String },
    Quit { message: Option<String> },
    Help,
}

/// One line per command, shown by `/help`.
pub const HELP: &[&str] = &[
    "/search <text>   find older lines containing text (repeat for next)",
    "/resetsearch     drop the search highlight",
    "/clear           empty the chat pane",
    "/pause           hold the view (toggle)",
    "/refresh         reload BTTV/FFZ emotes",
    "/reload          re-read the config file",
    "/ignore <code>   stop showing an emote",
    "/unignore <code> show an ignored emote again",
    "/me <text>       send an action",
    "/quit [message]  leave",
    "Keys: PgUp/PgDn scroll, End jump to newest, Ctrl-F search, Ctrl-P pause",
];

/// Parse a slash-command string into a [`ParsedCommand`].
///
/// Returns `None` if the input does not start with `/` or is not a recognized
/// command. Commands are case-insensitive.
pub fn parse_command(input: &str) -> Option<ParsedCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = input[1..].splitn(2, ' ').collect();
    let cmd = parts.first()?.to_lowercase();
    let rest = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());

    match cmd.as_str() {
        "search" | "find" | "s" => Some(ParsedCommand::Search {
            text: rest?.to_string(),
        }),
        "resetsearch" | "rs" => Some(ParsedCommand::ResetSearch),
        "clear" | "cls" => Some(ParsedCommand::Clear),
        "pause" => Some(ParsedCommand::Pause),
        "refresh" => Some(ParsedCommand::Refresh),
        "reload" => Some(ParsedCommand::Reload),
        "ignore" => Some(ParsedCommand::Ignore {
            code: rest?.split(' ').next()?.to_string(),
        }),
        "unignore" => Some(ParsedCommand::Unignore {
            code: rest?.split(' ').next()?.to_string(),
        }),
        "me" => Some(ParsedCommand::Me {
            text: rest?.to_string(),
        }),
        "quit" | "exit" => Some(ParsedCommand::Quit {
            message: rest.map(str::to_string),
        }),
        "help" | "h" => Some(ParsedCommand::Help),
        _ => None,
    }
}
