//! Repayment schedule generation.
//!
//! Runs once, when a loan moves from pending to approved. Installments fall on
//! a fixed day of each month, starting the month after approval.

use chrono::{Datelike, Months, NaiveDate};

use store::Installment;

/// Latest day-of-month that exists in every month.
const LAST_SAFE_DUE_DAY: u32 = 28;

/// Build `tenure_months` unpaid installments of `emi`, due on `due_day` of
/// each month after the month of `approved_on`.
///
/// `due_day` is clamped to `1..=28` so every month has the date.
pub fn generate_schedule(
    emi: f64,
    tenure_months: u32,
    approved_on: NaiveDate,
    due_day: u32,
) -> Vec<Installment> {
    let day = due_day.clamp(1, LAST_SAFE_DUE_DAY);
    let Some(month_start) = approved_on.with_day(1) else {
        return Vec::new();
    };
    (1..=tenure_months)
        .filter_map(|offset| {
            month_start
                .checked_add_months(Months::new(offset))
                .and_then(|d| d.with_day(day))
        })
        .map(|date| Installment::unpaid(date, emi))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_schedule_rolls_over_year() {
        let schedule = generate_schedule(1000.0, 6, date(2024, 11, 20), 5);
        let dates: Vec<_> = schedule.iter().map(|i| i.date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 12, 5),
                date(2025, 1, 5),
                date(2025, 2, 5),
                date(2025, 3, 5),
                date(2025, 4, 5),
                date(2025, 5, 5),
            ]
        );
    }

    #[test]
    fn test_installments_start_unpaid_at_emi() {
        let schedule = generate_schedule(4442.44, 12, date(2025, 1, 31), 5);
        assert_eq!(schedule.len(), 12);
        assert!(schedule.iter().all(|i| !i.paid && i.paid_on.is_none()));
        assert!(schedule.iter().all(|i| i.amount == 4442.44));
        assert_eq!(schedule[0].date, date(2025, 2, 5));
    }

    #[test]
    fn test_due_day_is_clamped() {
        let schedule = generate_schedule(10.0, 2, date(2025, 1, 10), 31);
        assert_eq!(schedule[0].date, date(2025, 2, 28));
        assert_eq!(schedule[1].date, date(2025, 3, 28));

        let schedule = generate_schedule(10.0, 1, date(2025, 1, 10), 0);
        assert_eq!(schedule[0].date, date(2025, 2, 1));
    }

    #[test]
    fn test_zero_tenure_is_empty() {
        assert!(generate_schedule(10.0, 0, date(2025, 1, 10), 5).is_empty());
    }
}
