//! Twitch IRCv3 message tags.
//!
//! The `irc` crate already unescapes tag values; this module only picks the
//! ones the chat pane cares about.

use crate::chat::user::{Badge, User};
use irc::proto::message::Tag;
use ratatui::style::Color;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct Tags {
    values: HashMap<String, String>,
}

impl Tags {
    pub fn from_message(tags: Option<&[Tag]>) -> Self {
        let values = tags
            .unwrap_or_default()
            .iter()
            .map(|Tag(key, value)| (key.clone(), value.clone().unwrap_or_default()))
            .collect();
        Self { values }
    }

    /// Tag value, `None` when absent or empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get("display-name")
    }

    pub fn color(&self) -> Option<Color> {
        let raw = self.get("color")?;
        match raw.parse::<Color>() {
            Ok(color) => Some(color),
            Err(_) => {
                tracing::debug!("Ignoring unparsable color tag {:?}", raw);
                None
            }
        }
    }

    /// `moderator/1,subscriber/12` → known badges, unknown ones dropped.
    pub fn badges(&self) -> Vec<Badge> {
        self.get("badges")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|entry| Badge::from_tag(entry.split('/').next().unwrap_or("")))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn emote_sets(&self) -> Vec<String> {
        self.get("emote-sets")
            .map(|raw| {
                raw.split(',')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Native Twitch emotes used in `text`, as `(id, code)` once per id.
    /// The `emotes` tag lists character ranges: `25:0-4,12-16/1902:6-10`.
    pub fn emotes(&self, text: &str) -> Vec<(String, String)> {
        let Some(raw) = self.get("emotes") else {
            return Vec::new();
        };
        let chars: Vec<char> = text.chars().collect();
        raw.split('/')
            .filter_map(|entry| {
                let (id, ranges) = entry.split_once(':')?;
                let (start, end) = ranges.split(',').next()?.split_once('-')?;
                let (start, end): (usize, usize) = (start.parse().ok()?, end.parse().ok()?);
                if start > end || end >= chars.len() {
                    tracing::debug!("Emote {} range {}-{} outside message", id, start, end);
                    return None;
                }
                Some((id.to_string(), chars[start..=end].iter().collect()))
            })
            .collect()
    }

    pub fn room_id(&self) -> Option<&str> {
        self.get("room-id")
    }

    /// Timeout length in seconds; absent for permanent bans.
    pub fn ban_duration(&self) -> Option<u64> {
        self.get("ban-duration").and_then(|d| d.parse().ok())
    }

    pub fn ban_reason(&self) -> Option<&str> {
        self.get("ban-reason")
    }

    pub fn target_msg_id(&self) -> Option<&str> {
        self.get("target-msg-id")
    }

    /// Id of the message itself (`id` tag on PRIVMSG).
    pub fn msg_id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Login of the author on CLEARMSG.
    pub fn login(&self) -> Option<&str> {
        self.get("login")
    }

    /// Refresh the user's details from a message they sent.
    pub fn apply_to(&self, user: &User) {
        user.update(|info| {
            if let Some(name) = self.display_name() {
                info.display_nick = Some(name.to_string());
            }
            if let Some(color) = self.color() {
                info.color = Some(color);
            }
            if self.values.contains_key("badges") {
                info.badges = self.badges();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        let raw: Vec<Tag> = pairs
            .iter()
            .map(|(k, v)| Tag(k.to_string(), Some(v.to_string())))
            .collect();
        Tags::from_message(Some(&raw))
    }

    #[test]
    fn test_privmsg_tags() {
        let t = tags(&[
            ("badges", "broadcaster/1,bits/100,subscriber/12"),
            ("color", "#1E90FF"),
            ("display-name", "Streamer"),
            ("id", "b34ccfc7-4977-403a-8a94-33c6bac34fb8"),
            ("room-id", "1337"),
        ]);
        assert_eq!(t.badges(), vec![Badge::Broadcaster, Badge::Subscriber]);
        assert_eq!(t.color(), Some(Color::Rgb(0x1e, 0x90, 0xff)));
        assert_eq!(t.display_name(), Some("Streamer"));
        assert_eq!(t.msg_id(), Some("b34ccfc7-4977-403a-8a94-33c6bac34fb8"));
        assert_eq!(t.room_id(), Some("1337"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let t = tags(&[("color", ""), ("display-name", "")]);
        assert_eq!(t.color(), None);
        assert_eq!(t.display_name(), None);
        assert!(Tags::from_message(None).badges().is_empty());
    }

    #[test]
    fn test_clearchat_tags() {
        let t = tags(&[("ban-duration", "600"), ("target-msg-id", "abc")]);
        assert_eq!(t.ban_duration(), Some(600));
        assert_eq!(t.target_msg_id(), Some("abc"));
        assert_eq!(tags(&[]).ban_duration(), None);
    }

    #[test]
    fn test_emote_sets() {
        let t = tags(&[("emote-sets", "0,33,50,,237")]);
        assert_eq!(t.emote_sets(), vec!["0", "33", "50", "237"]);
    }

    #[test]
    fn test_emotes_use_character_ranges() {
        let t = tags(&[("emotes", "25:8-12,20-24/1902:14-18/7:40-45")]);
        let found = t.emotes("héllo 😀 Kappa Keepo Kappa");
        assert_eq!(
            found,
            vec![
                ("25".to_string(), "Kappa".to_string()),
                ("1902".to_string(), "Keepo".to_string()),
            ]
        );
        assert!(tags(&[]).emotes("Kappa").is_empty());
    }

    #[test]
    fn test_apply_to_user() {
        let user = User::new("viewer", "#chan");
        tags(&[("display-name", "Viewer"), ("badges", "moderator/1")]).apply_to(&user);
        assert_eq!(user.display_nick(), "Viewer");
        assert!(user.has_badge(Badge::Moderator));
        // A message without a badges tag keeps the known badges.
        tags(&[("color", "#FF0000")]).apply_to(&user);
        assert!(user.has_badge(Badge::Moderator));
        assert_eq!(user.color(), Some(Color::Rgb(255, 0, 0)));
    }
}
