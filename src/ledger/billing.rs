//! Computes credit-card statement windows and splits purchases into
//! installments.

use serde::Serialize;
use time::Date;

use crate::{
    Error,
    ledger::calendar::{day_clamped, month_at},
    models::Card,
};

/// The largest number of installments a single purchase may be split into.
pub const MAX_INSTALLMENTS: u32 = 24;

/// A card's statement cycle, expressed as pure date arithmetic over the
/// configured close and due days.
///
/// All computations are functions of the purchase date and the card's
/// configuration; no store state is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementCycle {
    close_day: u8,
    due_day: u8,
}

impl StatementCycle {
    /// Build a cycle from statement close/due days (1-31, clamped to short
    /// months when applied).
    pub fn new(close_day: u8, due_day: u8) -> Self {
        Self { close_day, due_day }
    }

    /// The cycle configured on `card`.
    pub fn of_card(card: &Card) -> Self {
        Self::new(card.close_day, card.due_day)
    }

    /// The close date of the statement cycle `offset` months after the
    /// purchase month.
    pub fn close_date(&self, purchase_date: Date, offset: i32) -> Date {
        let (year, month) = month_at(purchase_date, offset);

        day_clamped(year, month, self.close_day)
    }

    /// The due date of the statement cycle `offset` months after the purchase
    /// month.
    ///
    /// When the due day is on or before the close day, the statement closes
    /// late in one month and is paid early in the next, so the due date lands
    /// one calendar month after its close date.
    pub fn due_date(&self, purchase_date: Date, offset: i32) -> Date {
        let due_offset = if self.due_day <= self.close_day {
            offset + 1
        } else {
            offset
        };
        let (year, month) = month_at(purchase_date, due_offset);

        day_clamped(year, month, self.due_day)
    }

    /// The month offset of the earliest cycle whose close date is on or after
    /// `purchase_date`.
    ///
    /// A purchase made exactly on the close day belongs to the closing cycle;
    /// one made the day after rolls over to the next cycle.
    pub fn first_cycle_offset(&self, purchase_date: Date) -> i32 {
        let mut offset = 0;
        while self.close_date(purchase_date, offset) < purchase_date {
            offset += 1;
        }

        offset
    }

    /// The due date of the statement a purchase made on `purchase_date` is
    /// billed to.
    pub fn purchase_due_date(&self, purchase_date: Date) -> Date {
        self.due_date(purchase_date, self.first_cycle_offset(purchase_date))
    }
}

/// One charge of an installment plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installment {
    /// The 1-indexed position within the plan.
    pub number: u32,
    /// The amount charged to this statement, in cents.
    pub amount_cents: i64,
    /// The due date of the statement this charge is billed to.
    pub due_date: Date,
}

/// Split a purchase across `count` monthly installments, one statement cycle
/// apart, starting at the statement the purchase date falls into.
///
/// The total is divided evenly; the division remainder is absorbed into the
/// first installment so the amounts always sum exactly to the total.
///
/// # Errors
/// - [Error::CardInactive] if the card has been deactivated.
/// - [Error::InvalidSchedule] if `count` is outside `1..=`
///   [MAX_INSTALLMENTS].
/// - [Error::InvalidAmount] if the total is not a positive number of cents.
/// - [Error::InstallmentMinimumNotMet] if `count > 1` and the per-installment
///   amount falls below `minimum_installment_cents`.
pub fn plan_installments(
    card: &Card,
    purchase_date: Date,
    total_amount_cents: i64,
    count: u32,
    minimum_installment_cents: i64,
) -> Result<Vec<Installment>, Error> {
    if !card.active {
        return Err(Error::CardInactive(card.id));
    }

    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(Error::InvalidSchedule(format!(
            "a purchase must be split into between 1 and {MAX_INSTALLMENTS} installments, \
            got {count}"
        )));
    }

    if total_amount_cents <= 0 {
        return Err(Error::InvalidAmount(total_amount_cents));
    }

    let base_amount = total_amount_cents / i64::from(count);
    let remainder = total_amount_cents % i64::from(count);

    if count > 1 && base_amount < minimum_installment_cents {
        return Err(Error::InstallmentMinimumNotMet {
            total_cents: total_amount_cents,
            count,
            minimum_cents: minimum_installment_cents,
        });
    }

    let cycle = StatementCycle::of_card(card);
    let first_offset = cycle.first_cycle_offset(purchase_date);

    let installments = (1..=count)
        .map(|number| Installment {
            number,
            amount_cents: if number == 1 {
                base_amount + remainder
            } else {
                base_amount
            },
            due_date: cycle.due_date(purchase_date, first_offset + number as i32 - 1),
        })
        .collect();

    Ok(installments)
}
