//! Domain models for transactions, recurring definitions and their instances.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::*;

/// Category label assigned when nothing else matches.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Direction of money flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        };
        f.write_str(label)
    }
}

impl FromStr for TransactionType {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(UnknownLabel {
                kind: "transaction type",
                value: value.to_string(),
            }),
        }
    }
}

/// A stored transaction record.
///
/// Recurring definitions and their generated instances share this shape: a
/// definition has `is_recurring == true`, an instance carries the
/// definition's id in `parent_transaction_id`. The back-reference is weak;
/// instances outlive a deleted definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(
        default,
        deserialize_with = "deserialize_lenient_pattern",
        skip_serializing_if = "Option::is_none"
    )]
    pub recurring_pattern: Option<RecurringPattern>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_transaction_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: Uuid,
        amount: f64,
        description: impl Into<String>,
        kind: TransactionType,
        date: DateTime<Utc>,
        category: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            amount,
            description: description.into(),
            kind,
            date,
            category: category.into(),
            is_recurring: false,
            recurring_pattern: None,
            recurring_end_date: None,
            parent_transaction_id: None,
            tags: Vec::new(),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Turns the record into a recurring definition.
    pub fn with_recurrence(
        mut self,
        pattern: RecurringPattern,
        end_date: Option<DateTime<Utc>>,
    ) -> Self {
        self.is_recurring = true;
        self.recurring_pattern = Some(pattern);
        self.recurring_end_date = end_date;
        self
    }

    pub fn is_definition(&self) -> bool {
        self.is_recurring
    }

    pub fn is_instance(&self) -> bool {
        self.parent_transaction_id.is_some()
    }

    /// Returns `true` while the definition may still generate instances at `now`.
    pub fn is_active_definition(&self, now: DateTime<Utc>) -> bool {
        self.is_recurring
            && self
                .recurring_end_date
                .map_or(false, |end_date| end_date > now)
    }

    /// Builds a concrete instance of this definition dated `date`.
    pub fn spawn_instance(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            user_id: self.user_id,
            amount: self.amount,
            description: self.description.clone(),
            kind: self.kind,
            date,
            category: self.category.clone(),
            is_recurring: false,
            recurring_pattern: None,
            recurring_end_date: None,
            parent_transaction_id: Some(self.id),
            tags: self.tags.clone(),
            notes: self.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Displayable for Transaction {
    fn display_label(&self) -> String {
        format!(
            "{} {} {:.2} [{}]",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount,
            self.category
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn spawned_instance_points_back_to_definition() {
        let now = at(2024, 2, 14);
        let definition = Transaction::new(
            Uuid::new_v4(),
            42.5,
            "Gym membership",
            TransactionType::Expense,
            at(2024, 1, 15),
            "fitness",
            now,
        )
        .with_recurrence(RecurringPattern::Monthly, Some(at(2024, 6, 1)));

        let instance = definition.spawn_instance(at(2024, 2, 15), now);

        assert_eq!(instance.parent_transaction_id, Some(definition.id));
        assert!(!instance.is_recurring);
        assert!(instance.recurring_pattern.is_none());
        assert_eq!(instance.amount, 42.5);
        assert_eq!(instance.category, "fitness");
        assert_eq!(instance.kind, TransactionType::Expense);
        assert_ne!(instance.id, definition.id);
    }

    #[test]
    fn definition_without_end_date_is_inactive() {
        let now = at(2024, 2, 14);
        let definition = Transaction::new(
            Uuid::new_v4(),
            10.0,
            "Rent",
            TransactionType::Expense,
            at(2024, 1, 1),
            "housing",
            now,
        )
        .with_recurrence(RecurringPattern::Monthly, None);
        assert!(!definition.is_active_definition(now));
    }

    #[test]
    fn end_date_equal_to_now_is_inactive() {
        let now = at(2024, 2, 14);
        let definition = Transaction::new(
            Uuid::new_v4(),
            10.0,
            "Rent",
            TransactionType::Expense,
            at(2024, 1, 1),
            "housing",
            now,
        )
        .with_recurrence(RecurringPattern::Monthly, Some(now));
        assert!(!definition.is_active_definition(now));
    }

    #[test]
    fn unknown_pattern_deserializes_to_none() {
        let json = r#"{
            "id": "6f1c2a4e-4a64-4f0e-9a8e-0d9e4b8f1a11",
            "userId": "0b6d7c9e-1f2a-4b3c-8d4e-5f6a7b8c9d0e",
            "amount": 12.0,
            "description": "Mystery",
            "type": "expense",
            "date": "2024-01-15T00:00:00Z",
            "category": "uncategorized",
            "isRecurring": true,
            "recurringPattern": "fortnightly",
            "recurringEndDate": "2024-06-01T00:00:00Z",
            "createdAt": "2024-01-15T00:00:00Z",
            "updatedAt": "2024-01-15T00:00:00Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).expect("deserialize");
        assert!(txn.is_recurring);
        assert_eq!(txn.recurring_pattern, None);
        assert_eq!(txn.kind, TransactionType::Expense);
    }
}
