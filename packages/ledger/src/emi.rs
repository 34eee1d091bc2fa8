//! # EMI calculator
//!
//! Reducing-balance amortisation: for principal `P`, monthly rate
//! `r = annual% / 100 / 12` and `N` months,
//!
//! ```text
//! EMI = P · r · (1+r)^N / ((1+r)^N − 1)
//! ```
//!
//! An interest-free loan repays `P / N` a month. Degenerate input (no
//! principal, no tenure, negative or non-finite rate) yields an EMI of zero
//! rather than an error; affordability is a separate check
//! ([`check_affordability`]) so the application form can show a message
//! instead of failing.
//!
//! `totalPayable` is the **rounded** EMI times the tenure, rounded again. It
//! can differ from the exact amortised total by up to half a paisa per month.

use serde::{Deserialize, Serialize};

use crate::amount::round2;
use crate::error::{Error, Result};

/// The unrounded monthly installment, or 0 for degenerate input.
pub fn emi_unrounded(principal: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    if !(principal > 0.0) || !principal.is_finite() || tenure_months == 0 {
        return 0.0;
    }
    if !(annual_rate >= 0.0) || !annual_rate.is_finite() {
        return 0.0;
    }
    let n = tenure_months as f64;
    let r = annual_rate / 100.0 / 12.0;
    if r == 0.0 {
        return principal / n;
    }
    let growth = (1.0 + r).powf(n);
    let emi = principal * r * growth / (growth - 1.0);
    if emi.is_finite() {
        emi
    } else {
        principal / n
    }
}

/// Monthly installment rounded to 2 decimals.
pub fn calculate_emi(principal: f64, annual_rate: f64, tenure_months: u32) -> f64 {
    round2(emi_unrounded(principal, annual_rate, tenure_months))
}

/// What the application calculator shows before a loan is submitted.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanQuote {
    pub emi: f64,
    pub total_payable: f64,
}

impl LoanQuote {
    pub fn new(principal: f64, annual_rate: f64, tenure_months: u32) -> Self {
        let emi = calculate_emi(principal, annual_rate, tenure_months);
        let total_payable = round2(emi * tenure_months as f64);
        tracing::debug!(principal, annual_rate, tenure_months, emi, "Quoted loan");
        Self { emi, total_payable }
    }

    /// Interest over the life of the loan.
    pub fn total_interest(&self, principal: f64) -> f64 {
        round2((self.total_payable - principal).max(0.0))
    }
}

/// Refuse an EMI above `max_ratio` of the stated monthly income.
///
/// Only applies when both the EMI and the income are positive; an unknown
/// income is not grounds for refusal.
pub fn check_affordability(emi: f64, monthly_income: f64, max_ratio: f64) -> Result<()> {
    let limit = monthly_income * max_ratio;
    if emi > 0.0 && monthly_income > 0.0 && emi > limit {
        return Err(Error::EmiExceedsIncome {
            emi,
            limit: round2(limit),
            percent: round2(max_ratio * 100.0),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_amortisation() {
        // 50,000 at 12% for a year
        assert_eq!(calculate_emi(50_000.0, 12.0, 12), 4442.44);
        // 1,00,000 at 10% over five years
        assert_eq!(calculate_emi(100_000.0, 10.0, 60), 2124.70);
    }

    #[test]
    fn test_interest_free_is_even_split() {
        assert_eq!(calculate_emi(30_000.0, 0.0, 3), 10_000.0);
        assert_eq!(calculate_emi(1000.0, 0.0, 3), 333.33);
    }

    #[test]
    fn test_degenerate_input_is_zero() {
        assert_eq!(calculate_emi(0.0, 12.0, 12), 0.0);
        assert_eq!(calculate_emi(-5.0, 12.0, 12), 0.0);
        assert_eq!(calculate_emi(50_000.0, 12.0, 0), 0.0);
        assert_eq!(calculate_emi(50_000.0, -1.0, 12), 0.0);
        assert_eq!(calculate_emi(f64::NAN, 12.0, 12), 0.0);
    }

    #[test]
    fn test_quote_rounds_before_multiplying() {
        let quote = LoanQuote::new(50_000.0, 12.0, 12);
        assert_eq!(quote.emi, 4442.44);
        assert_eq!(quote.total_payable, 53_309.28);
        assert_eq!(quote.total_interest(50_000.0), 3309.28);
    }

    #[test]
    fn test_affordability() {
        assert!(check_affordability(4442.44, 10_000.0, 0.5).is_ok());
        assert!(check_affordability(5000.0, 10_000.0, 0.5).is_ok());

        let err = check_affordability(5000.01, 10_000.0, 0.5).unwrap_err();
        assert!(matches!(err, Error::EmiExceedsIncome { limit, .. } if limit == 5000.0));
        assert!(err.to_string().starts_with("EMI exceeds 50% of your monthly income"));

        // Unknown income is not a refusal
        assert!(check_affordability(9999.0, 0.0, 0.5).is_ok());
    }
}
