//! Chat users.
//!
//! A [`User`] is created once per login name and shared by reference
//! ([`UserRef`]). The pane attributes lines to users by pointer identity,
//! so the [`Users`] registry must hand out the same `Rc` for a name for as
//! long as the channel is open.

use ratatui::style::Color;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type UserRef = Rc<User>;

/// Compare two users by identity, not by name.
pub fn same_user(a: &UserRef, b: &UserRef) -> bool {
    Rc::ptr_eq(a, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Badge {
    Broadcaster,
    Staff,
    Admin,
    Moderator,
    Vip,
    Turbo,
    Subscriber,
}

impl Badge {
    /// Map a Twitch `badges` tag entry name (`moderator/1` → `moderator`).
    pub fn from_tag(name: &str) -> Option<Self> {
        match name {
            "broadcaster" => Some(Badge::Broadcaster),
            "staff" => Some(Badge::Staff),
            "admin" | "global_mod" => Some(Badge::Admin),
            "moderator" => Some(Badge::Moderator),
            "vip" => Some(Badge::Vip),
            "turbo" | "premium" => Some(Badge::Turbo),
            "subscriber" | "founder" => Some(Badge::Subscriber),
            _ => None,
        }
    }

    /// Short glyph printed in front of the nick when user icons are shown.
    pub fn glyph(self) -> &'static str {
        match self {
            Badge::Broadcaster => "~",
            Badge::Staff => "&",
            Badge::Admin => "!",
            Badge::Moderator => "@",
            Badge::Vip => "*",
            Badge::Turbo => "+",
            Badge::Subscriber => "%",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::Broadcaster => "Broadcaster",
            Badge::Staff => "Staff",
            Badge::Admin => "Admin",
            Badge::Moderator => "Moderator",
            Badge::Vip => "VIP",
            Badge::Turbo => "Turbo",
            Badge::Subscriber => "Subscriber",
        }
    }
}

/// Mutable per-user details, refreshed from message tags.
#[derive(Debug, Clone, Default)]
pub struct UserInfo {
    pub display_nick: Option<String>,
    pub color: Option<Color>,
    pub badges: Vec<Badge>,
    pub emote_sets: Vec<String>,
}

#[derive(Debug)]
pub struct User {
    nick: String,
    channel: String,
    info: RefCell<UserInfo>,
}

impl User {
    pub fn new(nick: &str, channel: &str) -> Self {
        Self {
            nick: nick.to_lowercase(),
            channel: channel.to_string(),
            info: RefCell::new(UserInfo::default()),
        }
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    /// Channel name without the leading `#`, as used by emote providers.
    pub fn stream(&self) -> &str {
        self.channel.trim_start_matches('#')
    }

    pub fn display_nick(&self) -> String {
        self.info
            .borrow()
            .display_nick
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.nick.clone())
    }

    pub fn color(&self) -> Option<Color> {
        self.info.borrow().color
    }

    pub fn badges(&self) -> Vec<Badge> {
        self.info.borrow().badges.clone()
    }

    #[cfg(test)]
    pub fn has_badge(&self, badge: Badge) -> bool {
        self.info.borrow().badges.contains(&badge)
    }

    pub fn emote_sets(&self) -> Vec<String> {
        self.info.borrow().emote_sets.clone()
    }

    pub fn update(&self, f: impl FnOnce(&mut UserInfo)) {
        f(&mut self.info.borrow_mut());
    }
}

/// Registry of the users seen in one channel.
#[derive(Debug)]
pub struct Users {
    channel: String,
    users: HashMap<String, UserRef>,
}

impl Users {
    pub fn new(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            users: HashMap::new(),
        }
    }

    /// Return the user for `nick`, creating it on first sight.
    pub fn get_or_create(&mut self, nick: &str) -> UserRef {
        let key = nick.to_lowercase();
        self.users
            .entry(key)
            .or_insert_with(|| Rc::new(User::new(nick, &self.channel)))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_preserves_identity() {
        let mut users = Users::new("#chan");
        let a = users.get_or_create("Alice");
        let b = users.get_or_create("alice");
        assert!(same_user(&a, &b));
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn test_same_name_different_objects_are_different_users() {
        let a: UserRef = Rc::new(User::new("bob", "#chan"));
        let b: UserRef = Rc::new(User::new("bob", "#chan"));
        assert!(!same_user(&a, &b));
    }

    #[test]
    fn test_display_nick_falls_back_to_login() {
        let user = User::new("carol", "#chan");
        assert_eq!(user.display_nick(), "carol");
        user.update(|info| info.display_nick = Some("Carol".into()));
        assert_eq!(user.display_nick(), "Carol");
        assert_eq!(user.stream(), "chan");
    }

    #[test]
    fn test_badge_from_tag() {
        assert_eq!(Badge::from_tag("moderator"), Some(Badge::Moderator));
        assert_eq!(Badge::from_tag("founder"), Some(Badge::Subscriber));
        assert_eq!(Badge::from_tag("bits"), None);
    }
}
