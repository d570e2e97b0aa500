//! Transaction creation path: validation, auto-categorization and insert.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use tally_domain::{Classification, RecurringPattern, Transaction, TransactionType};

use crate::{categorizer::Categorizer, fallback, storage::TransactionStore, CoreError};

/// Default lifetime of a recurring definition created without an end date.
pub const DEFAULT_RECURRENCE_SPAN_DAYS: i64 = 365;

/// Input for a new transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: Uuid,
    pub amount: f64,
    pub description: String,
    pub kind: TransactionType,
    pub date: DateTime<Utc>,
    /// Explicit category; when absent the categorizer assigns one.
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn new(
        user_id: Uuid,
        amount: f64,
        description: impl Into<String>,
        kind: TransactionType,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            amount,
            description: description.into(),
            kind,
            date,
            category: None,
            tags: Vec::new(),
            notes: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

pub struct TransactionService;

impl TransactionService {
    /// Validates, categorizes and stores a one-off transaction.
    pub fn create<S>(
        store: &S,
        input: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let transaction = Self::build(store, input, now)?;
        store.insert_transaction(transaction.clone())?;
        Ok(transaction)
    }

    /// Stores a recurring definition. Without `end_date` the definition runs
    /// for `default_span` past its first date.
    pub fn create_recurring<S>(
        store: &S,
        input: NewTransaction,
        pattern: RecurringPattern,
        end_date: Option<DateTime<Utc>>,
        default_span: Duration,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let start = input.date;
        let end_date = match end_date {
            Some(end_date) => end_date,
            None => start.checked_add_signed(default_span).ok_or_else(|| {
                CoreError::DateOutOfRange(format!("default end date after {}", start))
            })?,
        };
        if end_date <= start {
            return Err(CoreError::Validation(
                "recurring end date must be after the first date".into(),
            ));
        }
        let definition = Self::build(store, input, now)?.with_recurrence(pattern, Some(end_date));
        store.insert_transaction(definition.clone())?;
        Ok(definition)
    }

    /// Categorizes for the creation path. A failed rule lookup must not block
    /// the transaction, so it degrades to the static table.
    pub fn resolve_category<S>(store: &S, description: &str, user_id: Uuid) -> Classification
    where
        S: TransactionStore + ?Sized,
    {
        Categorizer::categorize(store, description, user_id).unwrap_or_else(|error| {
            warn!(%user_id, %error, "rule lookup failed, using fallback table");
            fallback::categorize_by_keywords(description)
        })
    }

    fn build<S>(
        store: &S,
        input: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        Self::validate(&input)?;
        let category = match input.category.as_deref().map(str::trim) {
            Some(category) if !category.is_empty() => category.to_string(),
            _ => Self::resolve_category(store, &input.description, input.user_id).category,
        };
        let mut transaction = Transaction::new(
            input.user_id,
            input.amount,
            input.description.trim(),
            input.kind,
            input.date,
            category,
            now,
        );
        transaction.tags = input.tags;
        transaction.notes = input.notes;
        Ok(transaction)
    }

    fn validate(input: &NewTransaction) -> Result<(), CoreError> {
        if input.description.trim().is_empty() {
            return Err(CoreError::Validation("description is required".into()));
        }
        if !input.amount.is_finite() || input.amount <= 0.0 {
            return Err(CoreError::Validation(format!(
                "amount must be a positive number, got {}",
                input.amount
            )));
        }
        Ok(())
    }
}
