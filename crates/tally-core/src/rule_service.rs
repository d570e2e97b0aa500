use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_domain::CategoryRule;

use crate::{storage::TransactionStore, CoreError};

pub struct RuleService;

impl RuleService {
    /// Creates an enabled rule. Keywords are trimmed and lower-cased; blank
    /// and duplicate keywords are dropped while keeping the given order.
    pub fn add_rule<S>(
        store: &S,
        user_id: Uuid,
        keywords: &[String],
        category: &str,
        priority: i32,
        now: DateTime<Utc>,
    ) -> Result<CategoryRule, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let category = category.trim();
        if category.is_empty() {
            return Err(CoreError::Validation("rule category is required".into()));
        }
        let keywords = normalize_keywords(keywords);
        if keywords.is_empty() {
            return Err(CoreError::Validation(
                "rule needs at least one keyword".into(),
            ));
        }
        let rule = CategoryRule::new(user_id, keywords, category, priority, now);
        store.insert_rule(rule.clone())?;
        Ok(rule)
    }
}

/// Splits comma-separated input the way the rule form does.
pub fn parse_keyword_list(raw: &str) -> Vec<String> {
    normalize_keywords(&raw.split(',').map(str::to_string).collect::<Vec<_>>())
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_list_is_trimmed_and_deduplicated() {
        assert_eq!(
            parse_keyword_list(" Starbucks, ,PEET'S,starbucks "),
            vec!["starbucks".to_string(), "peet's".to_string()]
        );
    }
}
