//! Expands one recurring-transaction intent into a bounded series of dated
//! instances.

use serde::{Deserialize, Serialize};
use time::{Date, Duration};

use crate::{
    Error,
    ledger::calendar::{advance_months, advance_years},
    models::TransactionDraft,
};

/// How often a recurring transaction happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frequency {
    /// Every 7 days.
    Weekly,
    /// Every 14 days.
    Fortnightly,
    /// A calendar month of variable length.
    Monthly,
    /// A calendar year.
    Yearly,
}

impl Frequency {
    /// The date `steps` intervals after `start`.
    ///
    /// Month and year steps clamp to the last valid day of the target month
    /// (e.g. Jan 31 plus one month is Feb 28/29) instead of overflowing into
    /// the next month. Each step is taken from `start`, so the clamp does not
    /// propagate: two months after Jan 31 is Mar 31.
    pub fn advance(self, start: Date, steps: u32) -> Date {
        match self {
            Self::Weekly => start + Duration::weeks(i64::from(steps)),
            Self::Fortnightly => start + Duration::weeks(2 * i64::from(steps)),
            Self::Monthly => advance_months(start, steps as i32),
            Self::Yearly => advance_years(start, steps as i32),
        }
    }
}

/// The largest number of instances one recurring intent may create.
pub const MAX_OCCURRENCES: u32 = 60;

/// Expand a template into exactly `count` dated transaction drafts.
///
/// Instance *i* (1-indexed) is dated `start` advanced by *i - 1* intervals
/// and annotated with its `(i/count)` position when `count > 1`. The first
/// instance takes `first_settled`; every later instance is created planned,
/// even when its computed date is already in the past. The template's own
/// date is ignored in favour of `start`.
///
/// This is a pure computation: nothing is persisted and the drafts carry no
/// group ID yet, that is the caller's job.
///
/// # Errors
/// Returns [Error::InvalidSchedule] if `count` is outside `1..=`
/// [MAX_OCCURRENCES].
pub fn expand(
    template: &TransactionDraft,
    start: Date,
    frequency: Frequency,
    count: u32,
    first_settled: bool,
) -> Result<Vec<TransactionDraft>, Error> {
    if count == 0 || count > MAX_OCCURRENCES {
        return Err(Error::InvalidSchedule(format!(
            "a recurring transaction must have between 1 and {MAX_OCCURRENCES} occurrences, \
            got {count}"
        )));
    }

    let instances = (1..=count)
        .map(|i| {
            let mut draft = template.clone();
            draft.date = frequency.advance(start, i - 1);
            draft.settled = if i == 1 { first_settled } else { false };

            if count > 1 {
                draft.description = format!("{} ({i}/{count})", template.description);
            }

            draft
        })
        .collect();

    Ok(instances)
}

#[cfg(test)]
mod expand_tests {
    use time::macros::date;

    use crate::{
        Error,
        models::{Transaction, TransactionDraft, TransactionKind},
    };

    use super::{Frequency, MAX_OCCURRENCES, expand};

    fn template() -> TransactionDraft {
        Transaction::draft(
            8_990,
            TransactionKind::Expense,
            date!(2025 - 01 - 01),
            "Gym membership",
        )
        .account(1)
    }

    #[test]
    fn monthly_expansion_produces_one_instance_per_month() {
        let start = date!(2025 - 01 - 15);

        let instances = expand(&template(), start, Frequency::Monthly, 12, true).unwrap();

        assert_eq!(instances.len(), 12);
        for (i, instance) in instances.iter().enumerate() {
            assert_eq!(instance.date.day(), 15, "instance {} moved off the 15th", i + 1);
        }
        assert_eq!(instances[0].date, date!(2025 - 01 - 15));
        assert_eq!(instances[11].date, date!(2025 - 12 - 15));
    }

    #[test]
    fn only_the_first_instance_takes_the_settled_flag() {
        let instances =
            expand(&template(), date!(2025 - 01 - 15), Frequency::Monthly, 12, true).unwrap();

        assert!(instances[0].settled);
        assert!(
            instances[1..].iter().all(|instance| !instance.settled),
            "instances after the first must always be planned"
        );

        let instances =
            expand(&template(), date!(2025 - 01 - 15), Frequency::Monthly, 12, false).unwrap();

        assert!(!instances[0].settled);
    }

    #[test]
    fn past_dates_do_not_settle_later_instances() {
        // A series that started a year ago: every computed date is in the
        // past, but only the first instance may be settled.
        let instances =
            expand(&template(), date!(2020 - 01 - 01), Frequency::Monthly, 6, true).unwrap();

        assert!(instances[1..].iter().all(|instance| !instance.settled));
    }

    #[test]
    fn monthly_expansion_from_the_31st_clamps_through_february() {
        let instances =
            expand(&template(), date!(2025 - 01 - 31), Frequency::Monthly, 4, false).unwrap();

        let dates: Vec<_> = instances.iter().map(|instance| instance.date).collect();
        assert_eq!(
            dates,
            vec![
                date!(2025 - 01 - 31),
                date!(2025 - 02 - 28),
                date!(2025 - 03 - 31),
                date!(2025 - 04 - 30),
            ]
        );
    }

    #[test]
    fn weekly_and_fortnightly_step_by_days() {
        let start = date!(2025 - 01 - 01);

        let weekly = expand(&template(), start, Frequency::Weekly, 3, false).unwrap();
        assert_eq!(weekly[2].date, date!(2025 - 01 - 15));

        let fortnightly = expand(&template(), start, Frequency::Fortnightly, 3, false).unwrap();
        assert_eq!(fortnightly[2].date, date!(2025 - 01 - 29));
    }

    #[test]
    fn yearly_expansion_keeps_the_calendar_date() {
        let instances =
            expand(&template(), date!(2025 - 03 - 10), Frequency::Yearly, 3, false).unwrap();

        assert_eq!(instances[1].date, date!(2026 - 03 - 10));
        assert_eq!(instances[2].date, date!(2027 - 03 - 10));
    }

    #[test]
    fn descriptions_are_annotated_with_their_position() {
        let instances =
            expand(&template(), date!(2025 - 01 - 15), Frequency::Monthly, 3, false).unwrap();

        assert_eq!(instances[0].description, "Gym membership (1/3)");
        assert_eq!(instances[2].description, "Gym membership (3/3)");
    }

    #[test]
    fn a_single_occurrence_is_not_annotated() {
        let instances =
            expand(&template(), date!(2025 - 01 - 15), Frequency::Monthly, 1, true).unwrap();

        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].description, "Gym membership");
        assert!(instances[0].settled);
    }

    #[test]
    fn rejects_out_of_range_counts() {
        for count in [0, MAX_OCCURRENCES + 1] {
            let result = expand(
                &template(),
                date!(2025 - 01 - 15),
                Frequency::Monthly,
                count,
                false,
            );

            assert!(
                matches!(result, Err(Error::InvalidSchedule(_))),
                "want InvalidSchedule for count {count}, got {result:?}"
            );
        }
    }
}
