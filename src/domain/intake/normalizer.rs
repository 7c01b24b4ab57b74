//! Inbound text normalization.

/// Canonical token of the catch-all "other / not sure" entry.
pub const OTHER_TOKEN: &str = "10";

/// Spellings a caller may use for the catch-all entry.
const OTHER_ALIASES: &[&str] = &["10", "🔟", "1\u{fe0f}\u{20e3}0\u{fe0f}\u{20e3}"];

/// Trims surrounding whitespace and folds the aliases of the catch-all
/// entry onto [`OTHER_TOKEN`]. Everything else passes through unchanged.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if OTHER_ALIASES.contains(&trimmed) {
        OTHER_TOKEN.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn trims_whitespace() {
        assert_eq!(normalize("  3 \n"), "3");
        assert_eq!(normalize("\tSomeone called me\r\n"), "Someone called me");
    }

    #[test]
    fn folds_other_aliases() {
        assert_eq!(normalize("🔟"), OTHER_TOKEN);
        assert_eq!(normalize(" 🔟 "), OTHER_TOKEN);
        assert_eq!(normalize("10"), OTHER_TOKEN);
        assert_eq!(normalize("1\u{fe0f}\u{20e3}0\u{fe0f}\u{20e3}"), OTHER_TOKEN);
    }

    #[test]
    fn leaves_other_text_alone() {
        assert_eq!(normalize("1"), "1");
        assert_eq!(normalize("Hi"), "Hi");
        assert_eq!(normalize("10 rupees were taken"), "10 rupees were taken");
    }

    #[test]
    fn empty_and_blank_become_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
    }

    proptest! {
        #[test]
        fn is_idempotent(raw in ".*") {
            let once = normalize(&raw);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn only_strips_whitespace_from_plain_text(raw in "[a-zA-Z ]{0,40}") {
            prop_assert_eq!(normalize(&raw), raw.trim());
        }
    }
}
