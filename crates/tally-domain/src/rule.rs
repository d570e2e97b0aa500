//! User-defined keyword rules that map descriptions to categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Maps any of its keywords to a category label for a single user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRule {
    pub id: Uuid,
    pub user_id: Uuid,
    pub keywords: Vec<String>,
    pub category: String,
    pub priority: i32,
    #[serde(default = "CategoryRule::default_enabled")]
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl CategoryRule {
    pub fn new(
        user_id: Uuid,
        keywords: Vec<String>,
        category: impl Into<String>,
        priority: i32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            keywords,
            category: category.into(),
            priority,
            enabled: true,
            created_at,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the first keyword found in an already lower-cased description.
    /// Keywords are compared as stored, lower-cased but untrimmed; whitespace-only
    /// keywords never match.
    pub fn first_match(&self, lowered_description: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .filter(|keyword| !keyword.trim().is_empty())
            .find(|keyword| lowered_description.contains(&keyword.to_lowercase()))
    }

    fn default_enabled() -> bool {
        true
    }
}

impl Displayable for CategoryRule {
    fn display_label(&self) -> String {
        format!(
            "{} <- [{}] (priority {})",
            self.category,
            self.keywords.join(", "),
            self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_ignores_case_and_blanks() {
        let rule = CategoryRule::new(
            Uuid::new_v4(),
            vec!["  ".into(), "StarBucks".into()],
            "dining",
            10,
            Utc::now(),
        );
        assert_eq!(rule.first_match("starbucks coffee"), Some("StarBucks"));
        assert_eq!(rule.first_match("peet's coffee"), None);
    }

    #[test]
    fn surrounding_whitespace_in_keyword_is_significant() {
        let rule = CategoryRule::new(
            Uuid::new_v4(),
            vec![" bar ".into()],
            "nightlife",
            1,
            Utc::now(),
        );
        assert_eq!(rule.first_match("corner bar & grill"), Some(" bar "));
        assert_eq!(rule.first_match("barista training"), None);
    }
}
