//! The display trait and the recurrence cadence enum.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Cadence of a recurring transaction definition.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RecurringPattern {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringPattern {
    pub const ALL: [RecurringPattern; 4] = [
        RecurringPattern::Daily,
        RecurringPattern::Weekly,
        RecurringPattern::Monthly,
        RecurringPattern::Yearly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecurringPattern::Daily => "daily",
            RecurringPattern::Weekly => "weekly",
            RecurringPattern::Monthly => "monthly",
            RecurringPattern::Yearly => "yearly",
        }
    }
}

impl fmt::Display for RecurringPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for UnknownLabel {}

impl FromStr for RecurringPattern {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        RecurringPattern::ALL
            .into_iter()
            .find(|pattern| pattern.as_str() == normalized)
            .ok_or_else(|| UnknownLabel {
                kind: "recurring pattern",
                value: value.to_string(),
            })
    }
}

/// Reads an optional pattern, mapping unrecognized labels to `None` instead of
/// failing the whole record. The recurrence engine reports such definitions.
pub fn deserialize_lenient_pattern<'de, D>(
    deserializer: D,
) -> Result<Option<RecurringPattern>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|label| label.parse().ok()))
}
