use chrono::{DateTime, Utc};
use uuid::Uuid;

use tally_domain::{CategoryRule, Transaction};

use crate::CoreError;

/// Abstraction over the document store holding transactions and category rules.
///
/// Implementations must keep instances discoverable by `parent_transaction_id`
/// and must not cascade deletes from a definition to its instances.
pub trait TransactionStore: Send + Sync {
    /// Enabled rules owned by `user_id`, highest priority first.
    fn find_enabled_rules(&self, user_id: Uuid) -> Result<Vec<CategoryRule>, CoreError>;

    /// The latest-dated instance whose `parent_transaction_id` is `definition_id`.
    fn find_latest_instance(
        &self,
        definition_id: Uuid,
    ) -> Result<Option<Transaction>, CoreError>;

    /// Recurring definitions whose end date is strictly after `now`.
    fn find_active_recurring_definitions(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, CoreError>;

    /// Every rule owned by `user_id`, disabled ones included, highest priority first.
    fn list_rules(&self, user_id: Uuid) -> Result<Vec<CategoryRule>, CoreError>;

    /// Stores `transaction`. An instance whose definition already has an
    /// instance on the same date is rejected with
    /// [`CoreError::DuplicateInstance`].
    fn insert_transaction(&self, transaction: Transaction) -> Result<Uuid, CoreError>;

    fn insert_rule(&self, rule: CategoryRule) -> Result<Uuid, CoreError>;

    /// All transactions owned by `user_id`, oldest first.
    fn list_transactions(&self, user_id: Uuid) -> Result<Vec<Transaction>, CoreError>;
}
