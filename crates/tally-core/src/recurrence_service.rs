//! Scheduler-facing service that materializes due recurring instances.

use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use tally_domain::Transaction;

use crate::{
    recurrence::{advance, Advance, DEFAULT_DUE_WINDOW_HOURS},
    storage::TransactionStore,
    time::Clock,
    CoreError,
};

/// An instance inserted during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInstance {
    pub definition_id: Uuid,
    pub instance_id: Uuid,
    pub date: DateTime<Utc>,
}

/// A definition whose processing failed during a tick.
#[derive(Debug)]
pub struct TickFailure {
    pub definition_id: Uuid,
    pub error: CoreError,
}

/// Summary of one scheduler tick.
#[derive(Debug, Default)]
pub struct TickReport {
    pub evaluated: usize,
    pub created: Vec<GeneratedInstance>,
    pub not_due: usize,
    pub finished: usize,
    pub skipped_in_flight: usize,
    /// Due instances another writer had already stored.
    pub already_present: usize,
    pub failures: Vec<TickFailure>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

enum DefinitionOutcome {
    Created(GeneratedInstance),
    NotDue,
    AlreadyPresent,
    Finished,
}

/// Evaluates active recurring definitions and inserts at most one new instance
/// per definition per tick.
///
/// Definitions currently being processed by another tick on the same engine
/// are skipped, so overlapping ticks cannot both read the same anchor before
/// either has written.
pub struct RecurrenceEngine {
    due_window: Duration,
    in_flight: Mutex<HashSet<Uuid>>,
}

impl Default for RecurrenceEngine {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_DUE_WINDOW_HOURS))
    }
}

impl RecurrenceEngine {
    pub fn new(due_window: Duration) -> Self {
        Self {
            due_window,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn due_window(&self) -> Duration {
        self.due_window
    }

    /// Runs one tick against `store` at the time reported by `clock`.
    ///
    /// Only a failure to list definitions aborts the tick. Failures for a
    /// single definition are collected in the report; that definition is
    /// retried on the next tick.
    pub fn run_tick<S>(&self, store: &S, clock: &dyn Clock) -> Result<TickReport, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let now = clock.now();
        let definitions = store.find_active_recurring_definitions(now)?;
        let mut report = TickReport::default();

        for definition in &definitions {
            let Some(_guard) = self.claim(definition.id) else {
                debug!(definition_id = %definition.id, "definition already in flight");
                report.skipped_in_flight += 1;
                continue;
            };
            report.evaluated += 1;
            match self.process_definition(store, definition, now) {
                Ok(DefinitionOutcome::Created(generated)) => report.created.push(generated),
                Ok(DefinitionOutcome::NotDue) => report.not_due += 1,
                Ok(DefinitionOutcome::AlreadyPresent) => report.already_present += 1,
                Ok(DefinitionOutcome::Finished) => report.finished += 1,
                Err(error) => {
                    warn!(definition_id = %definition.id, %error, "recurring definition failed");
                    report.failures.push(TickFailure {
                        definition_id: definition.id,
                        error,
                    });
                }
            }
        }

        info!(
            evaluated = report.evaluated,
            created = report.created.len(),
            failures = report.failures.len(),
            "recurrence tick complete"
        );
        Ok(report)
    }

    fn process_definition<S>(
        &self,
        store: &S,
        definition: &Transaction,
        now: DateTime<Utc>,
    ) -> Result<DefinitionOutcome, CoreError>
    where
        S: TransactionStore + ?Sized,
    {
        let latest = store
            .find_latest_instance(definition.id)?
            .map(|instance| instance.date);
        match advance(definition, latest, now, self.due_window)? {
            Advance::Due(instance) => {
                let date = instance.date;
                let instance_id = match store.insert_transaction(instance) {
                    Ok(id) => id,
                    Err(CoreError::DuplicateInstance { .. }) => {
                        debug!(
                            definition_id = %definition.id,
                            date = %date,
                            "instance already stored"
                        );
                        return Ok(DefinitionOutcome::AlreadyPresent);
                    }
                    Err(error) => return Err(error),
                };
                info!(
                    definition_id = %definition.id,
                    %instance_id,
                    date = %date,
                    "materialized recurring instance"
                );
                Ok(DefinitionOutcome::Created(GeneratedInstance {
                    definition_id: definition.id,
                    instance_id,
                    date,
                }))
            }
            Advance::NotDue { next } => {
                debug!(definition_id = %definition.id, next = %next, "not due yet");
                Ok(DefinitionOutcome::NotDue)
            }
            Advance::Finished => Ok(DefinitionOutcome::Finished),
        }
    }

    fn claim(&self, definition_id: Uuid) -> Option<InFlightGuard<'_>> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if in_flight.insert(definition_id) {
            Some(InFlightGuard {
                set: &self.in_flight,
                definition_id,
            })
        } else {
            None
        }
    }
}

struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    definition_id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.definition_id);
    }
}
