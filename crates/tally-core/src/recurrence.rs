//! Date arithmetic and the per-definition due check for recurring transactions.
//!
//! Month and year steps clamp to the last day of the target month. The day of
//! month is always taken from the recurring definition rather than from the
//! previous instance, so a definition dated Jan 31 yields Feb 29 (or 28) and
//! then Mar 31 again instead of drifting to the 28th/29th for good.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use tally_domain::{RecurringPattern, Transaction};

use crate::CoreError;

/// Default look-ahead: an occurrence is due once it falls within this window.
pub const DEFAULT_DUE_WINDOW_HOURS: i64 = 24;

/// Result of evaluating a single recurring definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// A new instance should be inserted.
    Due(Transaction),
    /// The next occurrence lies beyond the due window.
    NotDue { next: DateTime<Utc> },
    /// The definition has ended or its next occurrence passes the end date.
    Finished,
}

impl Advance {
    pub fn into_instance(self) -> Option<Transaction> {
        match self {
            Advance::Due(instance) => Some(instance),
            Advance::NotDue { .. } | Advance::Finished => None,
        }
    }
}

/// Computes the occurrence after `anchor` for `pattern`.
///
/// `day_of_month` is the preferred day for monthly/yearly steps; it is clamped
/// to the length of the target month. Time of day is preserved.
pub fn next_occurrence(
    pattern: RecurringPattern,
    anchor: DateTime<Utc>,
    day_of_month: u32,
) -> Result<DateTime<Utc>, CoreError> {
    let next = match pattern {
        RecurringPattern::Daily => anchor.checked_add_signed(Duration::days(1)),
        RecurringPattern::Weekly => anchor.checked_add_signed(Duration::days(7)),
        RecurringPattern::Monthly => shift_months(anchor, 1, day_of_month),
        RecurringPattern::Yearly => shift_months(anchor, 12, day_of_month),
    };
    next.ok_or_else(|| {
        CoreError::DateOutOfRange(format!("cannot advance {} by one {} period", anchor, pattern))
    })
}

/// Decides whether `definition` is due for a new instance at `now`.
///
/// `latest_instance` is the date of the most recent generated instance, if
/// any; otherwise the definition's own date anchors the sequence. At most one
/// instance is produced per call; missed periods are not backfilled.
pub fn advance(
    definition: &Transaction,
    latest_instance: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    due_window: Duration,
) -> Result<Advance, CoreError> {
    let end_date = match definition.recurring_end_date {
        Some(end_date) if definition.is_recurring && end_date > now => end_date,
        _ => return Ok(Advance::Finished),
    };
    let pattern = definition
        .recurring_pattern
        .ok_or(CoreError::InvalidRecurrencePattern(definition.id))?;

    let anchor = latest_instance.unwrap_or(definition.date);
    let next = next_occurrence(pattern, anchor, definition.date.day())?;

    if next > end_date {
        return Ok(Advance::Finished);
    }
    let horizon = now
        .checked_add_signed(due_window)
        .ok_or_else(|| CoreError::DateOutOfRange(format!("due window past {}", now)))?;
    if next <= horizon {
        Ok(Advance::Due(definition.spawn_instance(next, now)))
    } else {
        Ok(Advance::NotDue { next })
    }
}

fn shift_months(anchor: DateTime<Utc>, months: i32, day_of_month: u32) -> Option<DateTime<Utc>> {
    let date = anchor.date_naive();
    let index = date.year() * 12 + date.month0() as i32 + months;
    let year = index.div_euclid(12);
    let month = index.rem_euclid(12) as u32 + 1;
    let day = day_of_month.clamp(1, days_in_month(year, month)?);
    let shifted = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(shifted.and_time(anchor.time()).and_utc())
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first_next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    first_next.pred_opt().map(|last| last.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tally_domain::TransactionType;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn window() -> Duration {
        Duration::hours(DEFAULT_DUE_WINDOW_HOURS)
    }

    fn definition(
        date: DateTime<Utc>,
        pattern: RecurringPattern,
        end: DateTime<Utc>,
    ) -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            1200.0,
            "Rent",
            TransactionType::Expense,
            date,
            "housing",
            date,
        )
        .with_recurrence(pattern, Some(end))
    }

    #[test]
    fn fixed_steps_for_daily_and_weekly() {
        let anchor = at(2024, 12, 31, 9);
        assert_eq!(
            next_occurrence(RecurringPattern::Daily, anchor, 31).unwrap(),
            at(2025, 1, 1, 9)
        );
        assert_eq!(
            next_occurrence(RecurringPattern::Weekly, anchor, 31).unwrap(),
            at(2025, 1, 7, 9)
        );
    }

    #[test]
    fn month_end_clamps_without_drift() {
        let jan = at(2024, 1, 31, 0);
        let feb = next_occurrence(RecurringPattern::Monthly, jan, 31).unwrap();
        assert_eq!(feb, at(2024, 2, 29, 0));
        let mar = next_occurrence(RecurringPattern::Monthly, feb, 31).unwrap();
        assert_eq!(mar, at(2024, 3, 31, 0));
        let apr = next_occurrence(RecurringPattern::Monthly, mar, 31).unwrap();
        assert_eq!(apr, at(2024, 4, 30, 0));
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(
            next_occurrence(RecurringPattern::Monthly, at(2023, 12, 15, 6), 15).unwrap(),
            at(2024, 1, 15, 6)
        );
    }

    #[test]
    fn leap_day_yearly_clamps_then_recovers() {
        let leap = at(2024, 2, 29, 0);
        let next = next_occurrence(RecurringPattern::Yearly, leap, 29).unwrap();
        assert_eq!(next, at(2025, 2, 28, 0));
        let after = next_occurrence(RecurringPattern::Yearly, at(2027, 2, 28, 0), 29).unwrap();
        assert_eq!(after, at(2028, 2, 29, 0));
    }

    #[test]
    fn boundary_at_exactly_twenty_four_hours_is_due() {
        let def = definition(at(2024, 1, 15, 0), RecurringPattern::Monthly, at(2024, 6, 1, 0));
        let outcome = advance(&def, None, at(2024, 2, 14, 0), window()).unwrap();
        match outcome {
            Advance::Due(instance) => {
                assert_eq!(instance.date, at(2024, 2, 15, 0));
                assert_eq!(instance.parent_transaction_id, Some(def.id));
                assert_eq!(instance.created_at, at(2024, 2, 14, 0));
            }
            other => panic!("expected due instance, got {:?}", other),
        }
    }

    #[test]
    fn one_hour_short_of_window_is_not_due() {
        let def = definition(at(2024, 1, 15, 0), RecurringPattern::Monthly, at(2024, 6, 1, 0));
        let outcome = advance(&def, None, at(2024, 2, 13, 23), window()).unwrap();
        assert_eq!(
            outcome,
            Advance::NotDue {
                next: at(2024, 2, 15, 0)
            }
        );
    }

    #[test]
    fn end_date_equal_to_now_generates_nothing() {
        let now = at(2024, 2, 14, 0);
        let def = definition(at(2024, 1, 15, 0), RecurringPattern::Daily, now);
        assert_eq!(advance(&def, None, now, window()).unwrap(), Advance::Finished);
    }

    #[test]
    fn next_date_past_end_date_is_finished() {
        let def = definition(at(2024, 1, 15, 0), RecurringPattern::Monthly, at(2024, 2, 10, 0));
        let outcome = advance(&def, None, at(2024, 2, 9, 0), Duration::days(30)).unwrap();
        assert_eq!(outcome, Advance::Finished);
    }

    #[test]
    fn latest_instance_anchors_the_sequence() {
        let def = definition(at(2024, 1, 1, 0), RecurringPattern::Weekly, at(2024, 12, 31, 0));
        let outcome = advance(&def, Some(at(2024, 1, 8, 0)), at(2024, 1, 14, 12), window())
            .unwrap()
            .into_instance()
            .expect("due");
        assert_eq!(outcome.date, at(2024, 1, 15, 0));
    }

    #[test]
    fn only_one_period_is_generated_when_behind() {
        let def = definition(at(2024, 1, 1, 0), RecurringPattern::Daily, at(2024, 12, 31, 0));
        let instance = advance(&def, None, at(2024, 3, 1, 0), window())
            .unwrap()
            .into_instance()
            .expect("due");
        assert_eq!(instance.date, at(2024, 1, 2, 0));
    }

    #[test]
    fn missing_pattern_is_reported() {
        let mut def = definition(at(2024, 1, 1, 0), RecurringPattern::Daily, at(2024, 12, 31, 0));
        def.recurring_pattern = None;
        let err = advance(&def, None, at(2024, 1, 2, 0), window()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRecurrencePattern(id) if id == def.id));
    }

    #[test]
    fn never_exceeds_end_date() {
        let end = at(2024, 3, 10, 0);
        let def = definition(at(2024, 1, 1, 0), RecurringPattern::Daily, end);
        let mut latest = None;
        let mut now = at(2024, 1, 1, 0);
        while now < end {
            if let Advance::Due(instance) = advance(&def, latest, now, window()).unwrap() {
                assert!(instance.date <= end);
                latest = Some(instance.date);
            }
            now += Duration::hours(6);
        }
        assert_eq!(latest, Some(end));
    }
}
