//! Static keyword-frequency classifier used when no user rule matches.

use tally_domain::Classification;

/// One row of the fallback table.
#[derive(Debug, Clone, Copy)]
pub struct FallbackCategory {
    pub category: &'static str,
    pub keywords: &'static [&'static str],
}

/// Ordered fallback table. Row order breaks ties between equal scores, so
/// reordering rows changes results.
pub const FALLBACK_TABLE: &[FallbackCategory] = &[
    FallbackCategory {
        category: "groceries",
        keywords: &[
            "grocery",
            "supermarket",
            "whole foods",
            "trader joe",
            "safeway",
            "kroger",
            "costco",
        ],
    },
    FallbackCategory {
        category: "dining",
        keywords: &[
            "restaurant",
            "cafe",
            "pizza",
            "burger",
            "sushi",
            "bar",
            "pub",
            "hotel",
            "doordash",
            "uber eats",
            "grubhub",
        ],
    },
    FallbackCategory {
        category: "transportation",
        keywords: &[
            "uber", "lyft", "gas", "parking", "transit", "amtrak", "airline", "hotel",
        ],
    },
    FallbackCategory {
        category: "utilities",
        keywords: &[
            "electric", "water", "internet", "phone", "gas bill", "utility",
        ],
    },
    FallbackCategory {
        category: "entertainment",
        keywords: &[
            "movie", "theater", "concert", "spotify", "netflix", "gaming", "steam",
        ],
    },
    FallbackCategory {
        category: "shopping",
        keywords: &["amazon", "target", "walmart", "mall", "store", "shop"],
    },
    FallbackCategory {
        category: "healthcare",
        keywords: &[
            "doctor", "pharmacy", "hospital", "clinic", "dental", "medical",
        ],
    },
    FallbackCategory {
        category: "fitness",
        keywords: &["gym", "yoga", "trainer", "sport"],
    },
    FallbackCategory {
        category: "subscriptions",
        keywords: &["subscription", "membership", "plan"],
    },
    FallbackCategory {
        category: "salary",
        keywords: &["salary", "paycheck", "wage", "bonus", "payment"],
    },
    FallbackCategory {
        category: "freelance",
        keywords: &["freelance", "contract", "invoice", "gig"],
    },
];

impl FallbackCategory {
    /// Number of this row's keywords contained in a lower-cased description.
    pub fn score(&self, lowered_description: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| lowered_description.contains(*keyword))
            .count()
    }
}

/// Classifies a description with [`FALLBACK_TABLE`] alone.
pub fn categorize_by_keywords(description: &str) -> Classification {
    score_lowered(&description.to_lowercase())
}

pub(crate) fn score_lowered(lowered_description: &str) -> Classification {
    let mut best: Option<(&FallbackCategory, usize)> = None;
    for row in FALLBACK_TABLE {
        let hits = row.score(lowered_description);
        // Strictly greater keeps the earliest row on ties.
        if hits > best.map_or(0, |(_, top)| top) {
            best = Some((row, hits));
        }
    }
    match best {
        Some((row, hits)) => Classification::from_fallback(row.category, hits),
        None => Classification::uncategorized(),
    }
}
