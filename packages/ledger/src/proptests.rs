//! Property-based tests for the loan arithmetic.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use store::{Loan, LoanStatus};

    use crate::emi::{emi_unrounded, LoanQuote};
    use crate::payment::record_payment;
    use crate::schedule::generate_schedule;

    fn approved_loan(principal: f64, rate: f64, tenure: u32) -> Loan {
        let quote = LoanQuote::new(principal, rate, tenure);
        let approved_on = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        Loan {
            principal,
            interest: rate,
            tenure_months: tenure,
            emi: quote.emi,
            total_payable: quote.total_payable,
            status: LoanStatus::Approved,
            repayments: generate_schedule(quote.emi, tenure, approved_on, 5),
            outstanding: quote.total_payable,
            ..Default::default()
        }
    }

    proptest! {
        #[test]
        fn test_total_payable_within_a_cent_per_month(
            principal in 1.0f64..10_000_000.0,
            rate in 0.0f64..36.0,
            tenure in 1u32..=360,
        ) {
            let quote = LoanQuote::new(principal, rate, tenure);
            let exact = emi_unrounded(principal, rate, tenure) * tenure as f64;
            let tolerance = 0.01 * tenure as f64 + 1e-6;
            prop_assert!((exact - quote.total_payable).abs() <= tolerance);
            prop_assert!((quote.emi * tenure as f64 - quote.total_payable).abs() <= 0.005 + 1e-6);
        }

        #[test]
        fn test_interest_free_emi_is_even_split(
            principal in 1.0f64..1_000_000.0,
            tenure in 1u32..=120,
        ) {
            let quote = LoanQuote::new(principal, 0.0, tenure);
            prop_assert_eq!(quote.emi, crate::amount::round2(principal / tenure as f64));
        }

        #[test]
        fn test_outstanding_never_negative(
            principal in 100.0f64..500_000.0,
            rate in 0.0f64..24.0,
            tenure in 1u32..=36,
            payments in proptest::collection::vec(0usize..40, 0..80),
        ) {
            let mut loan = approved_loan(principal, rate, tenure);
            let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
            let mut paid_before = 0;

            for index in payments {
                match record_payment(&mut loan, index, today) {
                    Ok(outcome) => prop_assert_eq!(outcome.outstanding(), loan.outstanding),
                    Err(_) => prop_assert!(index >= loan.repayments.len()),
                }
                prop_assert!(loan.outstanding >= 0.0);

                let paid = loan.repayments.iter().filter(|r| r.paid).count();
                prop_assert!(paid >= paid_before);
                paid_before = paid;
            }

            if loan.repayments.iter().all(|r| r.paid) {
                prop_assert!(loan.outstanding <= 0.005 * tenure as f64 + 0.01);
            }
        }
    }
}
