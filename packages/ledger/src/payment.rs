//! Recording installment payments.
//!
//! Marking an installment paid is idempotent: the first call stamps the date,
//! later calls change nothing. The outstanding balance is always recomputed
//! from the full schedule, never adjusted incrementally.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use store::Loan;

use crate::amount::round2;
use crate::error::{Error, Result};

/// What [`record_payment`] did.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PaymentOutcome {
    Recorded { paid_on: NaiveDate, outstanding: f64 },
    AlreadyPaid { paid_on: Option<NaiveDate>, outstanding: f64 },
}

impl PaymentOutcome {
    pub fn outstanding(&self) -> f64 {
        match self {
            PaymentOutcome::Recorded { outstanding, .. }
            | PaymentOutcome::AlreadyPaid { outstanding, .. } => *outstanding,
        }
    }
}

/// `max(totalPayable − Σ paid amounts, 0)`, to 2 decimals.
pub fn outstanding(loan: &Loan) -> f64 {
    round2((loan.total_payable - loan.total_paid()).max(0.0))
}

/// Mark installment `index` paid on `today` unless it already is.
pub fn record_payment(loan: &mut Loan, index: usize, today: NaiveDate) -> Result<PaymentOutcome> {
    let count = loan.repayments.len();
    let installment = loan
        .repayments
        .get_mut(index)
        .ok_or(Error::InstallmentOutOfRange { index, count })?;

    let newly_paid = !installment.paid;
    if newly_paid {
        installment.paid = true;
        installment.paid_on = Some(today);
    }
    let paid_on = installment.paid_on;

    loan.outstanding = outstanding(loan);

    Ok(if newly_paid {
        PaymentOutcome::Recorded {
            paid_on: today,
            outstanding: loan.outstanding,
        }
    } else {
        PaymentOutcome::AlreadyPaid {
            paid_on,
            outstanding: loan.outstanding,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::generate_schedule;
    use store::LoanStatus;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn approved_loan() -> Loan {
        Loan {
            loan_id: Some("LOAN001".into()),
            principal: 3000.0,
            tenure_months: 3,
            emi: 1000.0,
            total_payable: 3000.0,
            status: LoanStatus::Approved,
            repayments: generate_schedule(1000.0, 3, date(2025, 1, 15), 5),
            outstanding: 3000.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_record_updates_outstanding() {
        let mut loan = approved_loan();
        let outcome = record_payment(&mut loan, 0, date(2025, 2, 5)).unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::Recorded {
                paid_on: date(2025, 2, 5),
                outstanding: 2000.0
            }
        );
        assert!(loan.repayments[0].paid);
        assert_eq!(loan.outstanding, 2000.0);
    }

    #[test]
    fn test_second_record_is_noop() {
        let mut loan = approved_loan();
        record_payment(&mut loan, 1, date(2025, 3, 1)).unwrap();
        let outcome = record_payment(&mut loan, 1, date(2025, 3, 20)).unwrap();

        assert_eq!(
            outcome,
            PaymentOutcome::AlreadyPaid {
                paid_on: Some(date(2025, 3, 1)),
                outstanding: 2000.0
            }
        );
        assert_eq!(loan.repayments[1].paid_on, Some(date(2025, 3, 1)));
        assert_eq!(loan.outstanding, 2000.0);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut loan = approved_loan();
        let err = record_payment(&mut loan, 3, date(2025, 3, 1)).unwrap_err();
        assert!(matches!(err, Error::InstallmentOutOfRange { index: 3, count: 3 }));

        let mut pending = Loan::default();
        assert!(record_payment(&mut pending, 0, date(2025, 3, 1)).is_err());
    }

    #[test]
    fn test_outstanding_floors_at_zero() {
        let mut loan = approved_loan();
        // Installments sum past the rounded total
        loan.total_payable = 2999.99;
        for i in 0..3 {
            record_payment(&mut loan, i, date(2025, 4, 5)).unwrap();
        }
        assert_eq!(loan.outstanding, 0.0);
    }

    #[test]
    fn test_outstanding_rescans_schedule() {
        let mut loan = approved_loan();
        // A stale stored balance is corrected on the next recording
        loan.outstanding = 123.0;
        loan.repayments[2].paid = true;
        loan.repayments[2].paid_on = Some(date(2025, 4, 5));

        let outcome = record_payment(&mut loan, 0, date(2025, 4, 6)).unwrap();
        assert_eq!(outcome.outstanding(), 1000.0);
    }
}
