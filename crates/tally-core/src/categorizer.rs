//! Rule-first category resolution with a static keyword fallback.

use tracing::debug;
use uuid::Uuid;

use tally_domain::{CategoryRule, Classification};

use crate::{fallback, storage::TransactionStore, CoreError};

/// Resolves categories for transaction descriptions.
pub struct Categorizer;

impl Categorizer {
    /// Categorizes `description` using the enabled rules of `user_id`.
    ///
    /// A failing rule lookup is returned as an error; the static table is only
    /// consulted when the lookup succeeds and no rule matches.
    pub fn categorize<S>(
        store: &S,
        description: &str,
        user_id: Uuid,
    ) -> Result<Classification, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let rules = store.find_enabled_rules(user_id)?;
        let result = categorize_with_rules(description, &rules);
        debug!(%user_id, category = %result.category, "categorized description");
        Ok(result)
    }
}

/// Pure categorization over an already-fetched rule list.
///
/// Disabled rules are ignored and the remainder is scanned by descending
/// priority (stable for equal priorities). The first rule with any keyword
/// contained in the description wins, even if a later rule would match more
/// keywords.
pub fn categorize_with_rules(description: &str, rules: &[CategoryRule]) -> Classification {
    let lowered = description.to_lowercase();
    let mut ordered: Vec<&CategoryRule> = rules.iter().filter(|rule| rule.enabled).collect();
    ordered.sort_by(|a, b| b.priority.cmp(&a.priority));

    for rule in ordered {
        if let Some(keyword) = rule.first_match(&lowered) {
            return Classification::from_rule(rule.category.clone(), rule.id, keyword);
        }
    }
    fallback::score_lowered(&lowered)
}
