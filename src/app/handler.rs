use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::*;
use crate::chat::emotes::EmoteDef;
use crate::chat::user::UserRef;
use crate::emotes::Feed;
use crate::irc::commands::{self, ParsedCommand};
use crate::irc::tags::Tags;
use crate::pane::style::StyleKind;
use crate::pane::MessageOptions;
use crossterm::event::{
    Event as CEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use irc::client::prelude::{Command, Message, Prefix};

const SCROLL_STEP: usize = 5;
const WHEEL_STEP: usize = 3;

pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    match event {
        AppEvent::Terminal(cevent) => {
            state.dirty = true;
            handle_terminal(state, cevent)
        }
        AppEvent::IrcMessage { message } => handle_irc_message(state, message),
        AppEvent::IrcConnected => {
            state.connection = ConnectionStatus::Connected;
            state.info(&format!("Connected, joining {}", state.channel));
            emote_requests(state, false)
        }
        AppEvent::IrcDisconnected { reason } => {
            state.connection = ConnectionStatus::Disconnected;
            state.info(&format!("Disconnected: {}", reason));
            vec![]
        }
        AppEvent::IrcError { error } => {
            tracing::warn!("IRC error: {}", error);
            state.info(&format!("Error: {}", error));
            vec![]
        }
        AppEvent::EmotesLoaded { feed, emotes } => {
            emotes_loaded(state, &feed, emotes);
            vec![Action::EmotesFinished { feed }]
        }
        AppEvent::Tick => {
            handle_tick(state);
            vec![]
        }
    }
}

fn handle_tick(state: &mut AppState) {
    let before = state.pane.scroll_offset();
    state.pane.on_idle();
    if state.pane.scroll_offset() != before {
        state.dirty = true;
    }
}

/// Feeds to load for the current channel. The BTTV channel feed needs the
/// room id, which arrives with ROOMSTATE.
fn emote_requests(state: &AppState, force: bool) -> Vec<Action> {
    let stream = state.stream().to_string();
    let mut feeds = Vec::new();
    if state.config.emotes.bttv {
        feeds.push(Feed::BttvGlobal);
        if let Some(room_id) = &state.room_id {
            feeds.push(Feed::BttvChannel {
                stream: stream.clone(),
                room_id: room_id.clone(),
            });
        }
    }
    if state.config.emotes.ffz {
        feeds.push(Feed::FfzGlobal);
        feeds.push(Feed::FfzChannel { stream });
    }
    feeds
        .into_iter()
        .map(|feed| Action::RequestEmotes { feed, force })
        .collect()
}

fn emotes_loaded(state: &mut AppState, feed: &Feed, emotes: Vec<EmoteDef>) {
    if emotes.is_empty() {
        // Keep whatever was loaded before.
        tracing::info!("No {} received", feed);
        return;
    }
    let count = emotes.len();
    match feed.stream() {
        Some(stream) => state
            .emoticons
            .channel_emoticons_received(stream, feed.source(), emotes),
        None => state.emoticons.received_emoticons(feed.source(), emotes),
    }
    tracing::debug!("Catalog updated with {} {}", count, feed);
    state.dirty = true;
}

fn handle_terminal(state: &mut AppState, event: CEvent) -> Vec<Action> {
    match event {
        CEvent::Key(key) => handle_key(state, key),
        CEvent::Mouse(mouse) => {
            handle_mouse(state, mouse);
            vec![]
        }
        CEvent::Resize(_, _) => {
            state.dirty = true;
            vec![]
        }
        _ => vec![],
    }
}

fn handle_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    // Global keybindings
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return vec![Action::Quit { message: None }],
            KeyCode::Char('f') => {
                state.input.set_text("/search ");
                return vec![];
            }
            KeyCode::Char('p') => {
                toggle_pause(state);
                return vec![];
            }
            _ => {}
        }
    }
    state.status_message = None;
    handle_input_key(state, key)
}

fn handle_input_key(state: &mut AppState, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Enter => {
            let text = state.input.take_text();
            if text.trim().is_empty() {
                return vec![];
            }
            if text.starts_with('/') {
                return handle_command(state, &text);
            }
            send_chat(state, text, false)
        }
        KeyCode::Esc => {
            state.pane.reset_search();
            vec![]
        }
        KeyCode::Backspace => {
            if key.modifiers.contains(KeyModifiers::ALT) {
                state.input.delete_word_back();
            } else {
                state.input.delete_back();
            }
            vec![]
        }
        KeyCode::Delete => {
            state.input.delete_forward();
            vec![]
        }
        KeyCode::Left => {
            state.input.move_left();
            vec![]
        }
        KeyCode::Right => {
            state.input.move_right();
            vec![]
        }
        KeyCode::Home => {
            state.input.move_home();
            vec![]
        }
        KeyCode::End => {
            state.input.move_end();
            state.pane.scroll_to_tail();
            vec![]
        }
        KeyCode::Up => {
            state.input.history_up();
            vec![]
        }
        KeyCode::Down => {
            state.input.history_down();
            vec![]
        }
        KeyCode::PageUp => {
            state.pane.scroll_up(SCROLL_STEP);
            vec![]
        }
        KeyCode::PageDown => {
            state.pane.scroll_down(SCROLL_STEP);
            vec![]
        }
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'a' => state.input.move_home(),
                    'e' => state.input.move_end(),
                    'w' => state.input.delete_word_back(),
                    'u' => state.input.set_text(""),
                    _ => {}
                }
            } else {
                state.input.insert_char(c);
            }
            vec![]
        }
        _ => vec![],
    }
}

fn toggle_pause(state: &mut AppState) {
    let paused = state.pane.toggle_scroll_pause();
    state.set_status(if paused {
        "Scrolling paused (Ctrl-P to resume)"
    } else {
        "Scrolling resumed"
    });
}

fn handle_mouse(state: &mut AppState, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => state.pane.scroll_up(WHEEL_STEP),
        MouseEventKind::ScrollDown => state.pane.scroll_down(WHEEL_STEP),
        MouseEventKind::Down(MouseButton::Left) => {
            let area = state.message_viewport.get();
            let Some((line, column)) =
                crate::ui::hit_test(&state.pane, area, mouse.column, mouse.row)
            else {
                return;
            };
            if let Some(info) = state.pane.run_at(line, column) {
                let text = describe_run(&info);
                if !text.is_empty() {
                    state.set_status(text);
                }
            }
        }
        _ => {}
    }
}

fn describe_run(info: &crate::pane::RunInfo) -> String {
    let mut parts = Vec::new();
    if let Some(url) = &info.url {
        parts.push(format!("Link: {}", url));
    }
    if let Some(emote) = &info.emote {
        parts.push(format!("Emote: {} ({}, {})", info.text, emote.source, emote.url));
    }
    if let Some(badge) = info.badge {
        parts.push(format!("Badge: {}", badge.label()));
    }
    if let Some(user) = &info.user {
        let badges: Vec<&str> = user.badges().iter().map(|b| b.label()).collect();
        if badges.is_empty() {
            parts.push(format!("User: {}", user.display_nick()));
        } else {
            parts.push(format!("User: {} [{}]", user.display_nick(), badges.join(", ")));
        }
    }
    if info.deleted {
        parts.push("deleted".to_string());
    }
    parts.join(" | ")
}

fn send_chat(state: &mut AppState, text: String, action: bool) -> Vec<Action> {
    if !state.can_chat() {
        state.info("Read-only login. Set twitch.nickname and twitch.oauth_token to chat.");
        return vec![];
    }
    // Twitch does not echo own messages back.
    let me = state.users.get_or_create(&state.login.clone());
    let options = MessageOptions {
        action,
        ..MessageOptions::default()
    };
    state
        .pane
        .print_message(&me, &text, options, &state.emoticons);
    if action {
        vec![Action::SendAction { text }]
    } else {
        vec![Action::SendMessage { text }]
    }
}

fn handle_command(state: &mut AppState, text: &str) -> Vec<Action> {
    let Some(cmd) = commands::parse_command(text) else {
        state.info(&format!("Unknown command: {} (try /help)", text.trim()));
        return vec![];
    };

    match cmd {
        ParsedCommand::Search { text } => {
            if !state.pane.search(&text) {
                state.set_status(format!("No more matches for \"{}\"", text));
            }
            vec![]
        }
        ParsedCommand::ResetSearch => {
            state.pane.reset_search();
            vec![]
        }
        ParsedCommand::Clear => {
            state.pane.clear();
            vec![]
        }
        ParsedCommand::Pause => {
            toggle_pause(state);
            vec![]
        }
        ParsedCommand::Refresh => {
            state.info("Refreshing emotes");
            emote_requests(state, true)
        }
        ParsedCommand::Reload => vec![Action::ReloadConfig],
        ParsedCommand::Ignore { code } => {
            state.emoticons.ignore(&code);
            state.info(&format!("Ignoring emote {}", code));
            vec![]
        }
        ParsedCommand::Unignore { code } => {
            state.emoticons.unignore(&code);
            state.info(&format!("No longer ignoring emote {}", code));
            vec![]
        }
        ParsedCommand::Me { text } => send_chat(state, text, true),
        ParsedCommand::Quit { message } => vec![Action::Quit { message }],
        ParsedCommand::Help => {
            for line in commands::HELP {
                state.info(line);
            }
            vec![]
        }
    }
}

/// Twitch marks the native emotes of a message in its `emotes` tag. They go
/// into a set of the author's own, which the pane matches before global and
/// channel emotes.
fn record_twitch_emotes(state: &mut AppState, user: &UserRef, tags: &Tags, text: &str) {
    let seen = tags.emotes(text);
    if seen.is_empty() {
        return;
    }
    let set = format!("twitch:{}", user.nick().to_lowercase());
    let emotes = seen
        .iter()
        .map(|(id, code)| EmoteDef::twitch(id, code))
        .collect();
    state.emoticons.set_emoticons_received(&set, emotes);
    if !user.emote_sets().contains(&set) {
        user.update(|info| info.emote_sets.push(set));
    }
}

fn is_our_channel(state: &AppState, target: &str) -> bool {
    target.eq_ignore_ascii_case(&state.channel)
}

pub fn handle_irc_message(state: &mut AppState, message: Message) -> Vec<Action> {
    let nick_from = match &message.prefix {
        Some(Prefix::Nickname(nick, _, _)) => nick.clone(),
        Some(Prefix::ServerName(name)) => name.clone(),
        None => String::new(),
    };
    let tags = Tags::from_message(message.tags.as_deref());

    match &message.command {
        Command::PRIVMSG(target, text) if is_our_channel(state, target) => {
            let (text, action) = match text
                .strip_prefix("\x01ACTION ")
                .and_then(|t| t.strip_suffix('\x01'))
            {
                Some(action_text) => (action_text, true),
                None => (text.as_str(), false),
            };
            let user = state.users.get_or_create(&nick_from);
            tags.apply_to(&user);
            record_twitch_emotes(state, &user, &tags, text);
            let own = nick_from.eq_ignore_ascii_case(&state.login);
            let options = MessageOptions {
                action,
                highlighted: !own && state.is_highlight(text),
                msg_id: tags.msg_id().map(str::to_string),
            };
            state
                .pane
                .print_message(&user, text, options, &state.emoticons);
            state.dirty = true;
            vec![]
        }
        Command::JOIN(channel, _, _) if is_our_channel(state, channel) => {
            if nick_from.eq_ignore_ascii_case(&state.login) {
                state.info(&format!("Joined {}", channel));
            } else {
                let user = state.users.get_or_create(&nick_from);
                state.pane.print_compact("JOIN", &user);
                state.dirty = true;
            }
            vec![]
        }
        Command::PART(channel, _) if is_our_channel(state, channel) => {
            let user = state.users.get_or_create(&nick_from);
            state.pane.print_compact("PART", &user);
            state.dirty = true;
            vec![]
        }
        Command::NOTICE(_, text) => {
            state.info(text);
            vec![]
        }
        Command::Raw(cmd, args) => handle_twitch_command(state, cmd, args, &tags),
        _ => vec![],
    }
}

/// Twitch-only commands, which the IRC crate hands over unparsed.
fn handle_twitch_command(
    state: &mut AppState,
    cmd: &str,
    args: &[String],
    tags: &Tags,
) -> Vec<Action> {
    let channel = args.first().map(String::as_str).unwrap_or_default();
    if !is_our_channel(state, channel) && cmd != "GLOBALUSERSTATE" {
        return vec![];
    }

    match cmd {
        "CLEARCHAT" => {
            match args.get(1) {
                Some(nick) => {
                    let user = state.users.get_or_create(nick);
                    state
                        .pane
                        .user_banned(&user, tags.ban_duration(), tags.ban_reason(), None);
                    state.dirty = true;
                }
                None => state.info("Chat was cleared by a moderator"),
            }
            vec![]
        }
        "CLEARMSG" => {
            let (Some(login), Some(msg_id)) = (tags.login(), tags.target_msg_id()) else {
                tracing::debug!("CLEARMSG without login or target-msg-id");
                return vec![];
            };
            let user = state.users.get_or_create(login);
            state.pane.user_banned(&user, None, None, Some(msg_id));
            state.dirty = true;
            vec![]
        }
        "ROOMSTATE" => {
            let Some(room_id) = tags.room_id() else {
                return vec![];
            };
            if state.room_id.as_deref() == Some(room_id) {
                return vec![];
            }
            state.room_id = Some(room_id.to_string());
            if !state.config.emotes.bttv {
                return vec![];
            }
            vec![Action::RequestEmotes {
                feed: Feed::BttvChannel {
                    stream: state.stream().to_string(),
                    room_id: room_id.to_string(),
                },
                force: false,
            }]
        }
        "USERSTATE" | "GLOBALUSERSTATE" => {
            let me = state.users.get_or_create(&state.login.clone());
            let sets = tags.emote_sets();
            tags.apply_to(&me);
            if !sets.is_empty() {
                me.update(|info| info.emote_sets = sets);
            }
            vec![]
        }
        "USERNOTICE" => {
            if let Some(text) = tags.get("system-msg") {
                state.pane.print_line(text, StyleKind::Info);
                state.dirty = true;
            }
            // A resub can carry the subscriber's own message.
            if let (Some(login), Some(text)) = (tags.login(), args.get(1)) {
                let user = state.users.get_or_create(login);
                tags.apply_to(&user);
                record_twitch_emotes(state, &user, tags, text);
                let options = MessageOptions {
                    msg_id: tags.msg_id().map(str::to_string),
                    ..MessageOptions::default()
                };
                state
                    .pane
                    .print_message(&user, text, options, &state.emoticons);
                state.dirty = true;
            }
            vec![]
        }
        _ => vec![],
    }
}
