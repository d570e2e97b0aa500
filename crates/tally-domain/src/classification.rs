//! Outcome of categorizing a transaction description.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transaction::UNCATEGORIZED;

/// Where a category label came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ClassificationSource {
    /// A user rule matched on `keyword`.
    Rule { rule_id: Uuid, keyword: String },
    /// The static keyword table scored `hits` matches for the category.
    Fallback { hits: usize },
    Uncategorized,
}

/// A category label plus its provenance. Only the label is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    #[serde(flatten)]
    pub source: ClassificationSource,
}

impl Classification {
    pub fn from_rule(
        category: impl Into<String>,
        rule_id: Uuid,
        keyword: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            source: ClassificationSource::Rule {
                rule_id,
                keyword: keyword.into(),
            },
        }
    }

    pub fn from_fallback(category: impl Into<String>, hits: usize) -> Self {
        Self {
            category: category.into(),
            source: ClassificationSource::Fallback { hits },
        }
    }

    pub fn uncategorized() -> Self {
        Self {
            category: UNCATEGORIZED.to_string(),
            source: ClassificationSource::Uncategorized,
        }
    }

    pub fn is_rule_match(&self) -> bool {
        matches!(self.source, ClassificationSource::Rule { .. })
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            ClassificationSource::Rule { keyword, .. } => {
                write!(f, "{} (rule keyword `{}`)", self.category, keyword)
            }
            ClassificationSource::Fallback { hits } => {
                let plural = if *hits == 1 { "" } else { "s" };
                write!(f, "{} (fallback, {} hit{})", self.category, hits, plural)
            }
            ClassificationSource::Uncategorized => f.write_str(&self.category),
        }
    }
}
