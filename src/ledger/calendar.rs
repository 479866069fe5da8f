//! Calendar arithmetic shared by the recurrence and billing planners.

use time::{Date, Month};

/// The year and month `offset` calendar months after `date`'s month.
pub(crate) fn month_at(date: Date, offset: i32) -> (i32, Month) {
    let zero_based = date.year() * 12 + i32::from(month_number(date.month())) - 1 + offset;
    let year = zero_based.div_euclid(12);
    let month = month_from_number((zero_based.rem_euclid(12) + 1) as u8);

    (year, month)
}

/// Advance `date` by `months` calendar months, clamping the day to the last
/// valid day of the target month instead of overflowing into the next month.
pub(crate) fn advance_months(date: Date, months: i32) -> Date {
    let (year, month) = month_at(date, months);

    day_clamped(year, month, date.day())
}

/// Advance `date` by `years` calendar years, clamping Feb 29 to Feb 28 in
/// non-leap years.
pub(crate) fn advance_years(date: Date, years: i32) -> Date {
    day_clamped(date.year() + years, date.month(), date.day())
}

/// Build a date from `year`/`month` with `day` clamped to the month's last
/// valid day.
pub(crate) fn day_clamped(year: i32, month: Month, day: u8) -> Date {
    let day = day.min(last_day_of_month(year, month));

    Date::from_calendar_date(year, month, day).expect("clamped day is valid for its month")
}

pub(crate) fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn month_number(month: Month) -> u8 {
    match month {
        Month::January => 1,
        Month::February => 2,
        Month::March => 3,
        Month::April => 4,
        Month::May => 5,
        Month::June => 6,
        Month::July => 7,
        Month::August => 8,
        Month::September => 9,
        Month::October => 10,
        Month::November => 11,
        Month::December => 12,
    }
}

fn month_from_number(number: u8) -> Month {
    match number {
        1 => Month::January,
        2 => Month::February,
        3 => Month::March,
        4 => Month::April,
        5 => Month::May,
        6 => Month::June,
        7 => Month::July,
        8 => Month::August,
        9 => Month::September,
        10 => Month::October,
        11 => Month::November,
        12 => Month::December,
        _ => unreachable!("month numbers are always normalised to 1-12"),
    }
}

#[cfg(test)]
mod calendar_tests {
    use time::macros::date;

    use super::{advance_months, advance_years, last_day_of_month};

    #[test]
    fn advance_months_keeps_the_day_when_valid() {
        assert_eq!(advance_months(date!(2025 - 01 - 15), 1), date!(2025 - 02 - 15));
        assert_eq!(advance_months(date!(2025 - 01 - 15), 3), date!(2025 - 04 - 15));
    }

    #[test]
    fn advance_months_clamps_to_the_end_of_short_months() {
        assert_eq!(advance_months(date!(2025 - 01 - 31), 1), date!(2025 - 02 - 28));
        assert_eq!(advance_months(date!(2024 - 01 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(advance_months(date!(2025 - 03 - 31), 1), date!(2025 - 04 - 30));
    }

    #[test]
    fn advance_months_does_not_propagate_the_clamp() {
        // Two months from Jan 31 lands back on the 31st, not on a day
        // inherited from February.
        assert_eq!(advance_months(date!(2025 - 01 - 31), 2), date!(2025 - 03 - 31));
    }

    #[test]
    fn advance_months_rolls_over_year_boundaries() {
        assert_eq!(advance_months(date!(2025 - 11 - 05), 3), date!(2026 - 02 - 05));
        assert_eq!(advance_months(date!(2025 - 12 - 31), 1), date!(2026 - 01 - 31));
    }

    #[test]
    fn advance_years_clamps_leap_day() {
        assert_eq!(advance_years(date!(2024 - 02 - 29), 1), date!(2025 - 02 - 28));
        assert_eq!(advance_years(date!(2024 - 02 - 29), 4), date!(2028 - 02 - 29));
    }

    #[test]
    fn february_length_follows_leap_years() {
        assert_eq!(last_day_of_month(2024, time::Month::February), 29);
        assert_eq!(last_day_of_month(2025, time::Month::February), 28);
        assert_eq!(last_day_of_month(1900, time::Month::February), 28);
        assert_eq!(last_day_of_month(2000, time::Month::February), 29);
    }
}
