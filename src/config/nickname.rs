//! Anonymous Twitch login names.
//!
//! Twitch lets anyone read chat as `justinfan` followed by digits, without a
//! password.

use rand::RngExt;

pub const ANONYMOUS_PREFIX: &str = "justinfan";

/// Generate a read-only login like `justinfan48213`.
pub fn generate_nickname() -> String {
    let mut rng = rand::rng();
    let num: u32 = rng.random_range(10_000..100_000);
    format!("{}{}", ANONYMOUS_PREFIX, num)
}

pub fn is_anonymous(nick: &str) -> bool {
    nick.strip_prefix(ANONYMOUS_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_are_anonymous() {
        for _ in 0..20 {
            let nick = generate_nickname();
            assert!(is_anonymous(&nick), "{}", nick);
            assert_eq!(nick.len(), ANONYMOUS_PREFIX.len() + 5);
        }
        assert!(!is_anonymous("justinfan"));
        assert!(!is_anonymous("justinfanclub"));
        assert!(!is_anonymous("viewer"));
    }
}
