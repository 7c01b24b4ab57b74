//! Outbound reply wording.

use super::CategoryCode;

pub fn greeting(menu: &str) -> String {
    format!(
        "🛡️ SignalShield Alert System\n\n\
         Thanks for reaching out. We help people document and understand \
         online fraud and suspicious activity.\n\n\
         ⚠️ Do NOT share OTPs, bank numbers, passwords, or personal details.\n\n\
         {menu}"
    )
}

pub fn category_confirmed(category: &CategoryCode) -> String {
    format!(
        "Got it ✅ Category selected: *{}*.\n\n\
         Now, in 2–3 sentences, please describe what happened.\n\
         You can include:\n\
         • What the scammer said/sent\n\
         • Where you saw it (WhatsApp, Insta, SMS, etc.)\n\
         • If any money or data was shared\n\n\
         ⚠️ Please still avoid OTPs, full card numbers, or IDs.",
        category.main_code()
    )
}

pub fn option_not_understood(menu: &str) -> String {
    format!("Sorry, I couldn’t understand that option. 🙏\n\n{menu}")
}

pub fn report_recorded(category: &CategoryCode) -> String {
    format!(
        "Thank you for sharing this report with SignalShield 🛡️\n\n\
         We've recorded it under: *{}*.\n\
         As we collect more reports, we'll analyse patterns and \
         share guidance on risks and next actions.\n\n\
         If you want to submit another case, just say *Hi*.",
        category.main_code()
    )
}

pub fn please_resend(category: &CategoryCode) -> String {
    format!(
        "Sorry, we couldn't save your *{}* report just now. 🙏\n\n\
         Please send your description again in a moment.",
        category.main_code()
    )
}

/// Sent when a report failed after the caller had already started another.
pub fn earlier_report_not_saved(category: &CategoryCode) -> String {
    format!(
        "Sorry, we couldn't save your earlier *{}* report. 🙏\n\n\
         Please finish this one, then say *Hi* to submit that report again.",
        category.main_code()
    )
}

/// Used when a retried delivery can no longer learn how its first attempt ended.
pub fn please_try_again() -> String {
    "Sorry, something went wrong on our side. 🙏\n\nPlease send your last message again."
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_ends_with_menu() {
        let text = greeting("MENU");
        assert!(text.starts_with("🛡️ SignalShield Alert System"));
        assert!(text.ends_with("\n\nMENU"));
    }

    #[test]
    fn replies_name_main_code() {
        let code = CategoryCode::new("ACCOUNT", "ACCOUNT_TAKEOVER");
        assert!(category_confirmed(&code).contains("*ACCOUNT*"));
        assert!(report_recorded(&code).contains("*ACCOUNT*"));
        assert!(please_resend(&code).contains("*ACCOUNT*"));
        assert!(earlier_report_not_saved(&code).contains("*ACCOUNT*"));
    }
}
