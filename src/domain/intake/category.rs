//! Fraud category catalog.
//!
//! The catalog maps the selection tokens a caller types ("1".."10") onto
//! `{main, sub}` category codes. It is validated once at startup and shared
//! read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Classification of a reported incident.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryCode {
    main_code: String,
    sub_code: String,
}

impl CategoryCode {
    pub fn new(main_code: impl Into<String>, sub_code: impl Into<String>) -> Self {
        Self {
            main_code: main_code.into(),
            sub_code: sub_code.into(),
        }
    }

    pub fn main_code(&self) -> &str {
        &self.main_code
    }

    pub fn sub_code(&self) -> &str {
        &self.sub_code
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_code, self.sub_code)
    }
}

/// One row of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryEntry {
    /// Token the caller sends to pick this entry.
    pub token: String,
    /// Marker shown in front of the label in the menu.
    pub marker: String,
    /// Human-readable label.
    pub label: String,
    pub code: CategoryCode,
}

impl CategoryEntry {
    pub fn new(
        token: impl Into<String>,
        marker: impl Into<String>,
        label: impl Into<String>,
        code: CategoryCode,
    ) -> Self {
        Self {
            token: token.into(),
            marker: marker.into(),
            label: label.into(),
            code,
        }
    }
}

/// Reasons a catalog is rejected at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Category catalog is empty")]
    Empty,

    #[error("Category token '{0}' is blank")]
    BlankToken(String),

    #[error("Duplicate category token '{0}'")]
    DuplicateToken(String),

    #[error("Duplicate category code {0}")]
    DuplicateCode(CategoryCode),
}

const MENU_HEADER: &str = "Please choose the option that best fits the issue:";

/// Validated, immutable catalog of fraud categories.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    entries: Vec<CategoryEntry>,
    by_token: HashMap<String, usize>,
    menu: String,
}

impl CategoryRegistry {
    /// Builds a registry, failing fast on an empty catalog, blank or
    /// duplicate tokens, and duplicate code pairs.
    pub fn new(entries: Vec<CategoryEntry>) -> Result<Self, RegistryError> {
        if entries.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut by_token = HashMap::with_capacity(entries.len());
        let mut codes = HashSet::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if entry.token.trim().is_empty() || entry.token.trim() != entry.token {
                return Err(RegistryError::BlankToken(entry.token.clone()));
            }
            if by_token.insert(entry.token.clone(), index).is_some() {
                return Err(RegistryError::DuplicateToken(entry.token.clone()));
            }
            if !codes.insert(entry.code.clone()) {
                return Err(RegistryError::DuplicateCode(entry.code.clone()));
            }
        }

        let menu = render_menu(&entries);

        Ok(Self {
            entries,
            by_token,
            menu,
        })
    }

    /// The production catalog.
    pub fn standard() -> Result<Self, RegistryError> {
        let rows = [
            ("1", "1️⃣", "Payment / UPI scam", "PAYMENT", "UPI_OR_PAYMENT_SCAM"),
            ("2", "2️⃣", "Job or work-from-home scam", "JOB", "JOB_SCAM"),
            ("3", "3️⃣", "Account / OTP / login issue", "ACCOUNT", "ACCOUNT_TAKEOVER"),
            ("4", "4️⃣", "Phishing link / KYC / delivery update", "PHISHING", "PHISHING_LINK"),
            ("5", "5️⃣", "Loan or credit scam", "LOAN", "LOAN_SCAM"),
            ("6", "6️⃣", "Investment / trading / crypto scam", "INVEST", "INVESTMENT_SCAM"),
            ("7", "7️⃣", "Online shopping / marketplace issue", "ECOM", "ECOMMERCE_SCAM"),
            ("8", "8️⃣", "Romance or emotional pressure", "ROMANCE", "ROMANCE_SCAM"),
            (
                "9",
                "9️⃣",
                "Fake police / bank / authority / impersonation",
                "IMPERSONATION",
                "FAKE_AUTHORITY",
            ),
            ("10", "🔟", "Other / not sure", "OTHER", "OTHER_UNSURE"),
        ];

        Self::new(
            rows.into_iter()
                .map(|(token, marker, label, main, sub)| {
                    CategoryEntry::new(token, marker, label, CategoryCode::new(main, sub))
                })
                .collect(),
        )
    }

    /// Resolves a normalized selection token.
    pub fn lookup(&self, token: &str) -> Option<&CategoryCode> {
        self.by_token.get(token).map(|&index| &self.entries[index].code)
    }

    /// Menu listing every entry in catalog order.
    pub fn menu_text(&self) -> &str {
        &self.menu
    }

    /// Entries in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CategoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn render_menu(entries: &[CategoryEntry]) -> String {
    let mut menu = String::from(MENU_HEADER);
    for entry in entries {
        menu.push('\n');
        menu.push_str(&entry.marker);
        menu.push(' ');
        menu.push_str(&entry.label);
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(token: &str, main: &str, sub: &str) -> CategoryEntry {
        CategoryEntry::new(token, token, format!("{} label", main), CategoryCode::new(main, sub))
    }

    mod validation {
        use super::*;

        #[test]
        fn standard_catalog_is_valid() {
            let registry = CategoryRegistry::standard().unwrap();
            assert_eq!(registry.len(), 10);
        }

        #[test]
        fn rejects_empty_catalog() {
            assert_eq!(CategoryRegistry::new(vec![]).unwrap_err(), RegistryError::Empty);
        }

        #[test]
        fn rejects_duplicate_token() {
            let result = CategoryRegistry::new(vec![
                entry("1", "PAYMENT", "UPI"),
                entry("1", "JOB", "JOB_SCAM"),
            ]);
            assert_eq!(result.unwrap_err(), RegistryError::DuplicateToken("1".to_string()));
        }

        #[test]
        fn rejects_duplicate_code_pair() {
            let result = CategoryRegistry::new(vec![
                entry("1", "PAYMENT", "UPI"),
                entry("2", "PAYMENT", "UPI"),
            ]);
            assert_eq!(
                result.unwrap_err(),
                RegistryError::DuplicateCode(CategoryCode::new("PAYMENT", "UPI"))
            );
        }

        #[test]
        fn same_main_code_with_different_sub_code_is_allowed() {
            let result = CategoryRegistry::new(vec![
                entry("1", "PAYMENT", "UPI"),
                entry("2", "PAYMENT", "CARD"),
            ]);
            assert!(result.is_ok());
        }

        #[test]
        fn rejects_blank_or_padded_token() {
            assert!(matches!(
                CategoryRegistry::new(vec![entry(" ", "A", "B")]),
                Err(RegistryError::BlankToken(_))
            ));
            assert!(matches!(
                CategoryRegistry::new(vec![entry(" 1", "A", "B")]),
                Err(RegistryError::BlankToken(_))
            ));
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn resolves_every_standard_token() {
            let registry = CategoryRegistry::standard().unwrap();
            let expected = [
                ("1", "PAYMENT", "UPI_OR_PAYMENT_SCAM"),
                ("2", "JOB", "JOB_SCAM"),
                ("3", "ACCOUNT", "ACCOUNT_TAKEOVER"),
                ("4", "PHISHING", "PHISHING_LINK"),
                ("5", "LOAN", "LOAN_SCAM"),
                ("6", "INVEST", "INVESTMENT_SCAM"),
                ("7", "ECOM", "ECOMMERCE_SCAM"),
                ("8", "ROMANCE", "ROMANCE_SCAM"),
                ("9", "IMPERSONATION", "FAKE_AUTHORITY"),
                ("10", "OTHER", "OTHER_UNSURE"),
            ];
            for (token, main, sub) in expected {
                let code = registry.lookup(token).unwrap();
                assert_eq!(code.main_code(), main);
                assert_eq!(code.sub_code(), sub);
            }
        }

        #[test]
        fn unknown_tokens_do_not_resolve() {
            let registry = CategoryRegistry::standard().unwrap();
            for token in ["0", "11", "abc", "", " 1", "🔟"] {
                assert!(registry.lookup(token).is_none(), "token {:?}", token);
            }
        }
    }

    mod menu {
        use super::*;

        #[test]
        fn lists_entries_in_catalog_order() {
            let registry = CategoryRegistry::standard().unwrap();
            let menu = registry.menu_text();
            let lines: Vec<&str> = menu.lines().collect();

            assert_eq!(lines[0], MENU_HEADER);
            assert_eq!(lines.len(), 11);
            assert_eq!(lines[1], "1️⃣ Payment / UPI scam");
            assert_eq!(lines[10], "🔟 Other / not sure");
        }

        #[test]
        fn entries_iterate_in_catalog_order() {
            let registry = CategoryRegistry::standard().unwrap();
            let tokens: Vec<&str> = registry.entries().map(|e| e.token.as_str()).collect();
            assert_eq!(tokens, ["1", "2", "3", "4", "5", "6", "7", "8", "9", "10"]);
        }
    }

    #[test]
    fn category_code_displays_main_and_sub() {
        let code = CategoryCode::new("ACCOUNT", "ACCOUNT_TAKEOVER");
        assert_eq!(code.to_string(), "ACCOUNT/ACCOUNT_TAKEOVER");
    }
}
