//! # Society configuration
//!
//! Policy knobs for the ledger, stored as TOML under the
//! [`keys::SETTINGS`](crate::keys::SETTINGS) entry of the store and read
//! through [`Repository::get_config`](crate::Repository::get_config).
//!
//! ## Structure
//!
//! ```toml
//! [loans]
//! penalty_per_day = 50          # charged per day an installment is paid late
//! due_day = 5                   # day-of-month every installment falls due
//! max_emi_income_ratio = 0.5    # EMI may not exceed this share of monthly income
//! loan_id_prefix = "LOAN"
//!
//! [members]
//! max_guarantors = 3
//! membership_fee = 1000
//! fee_due_days = 30
//! ```
//!
//! All structs derive or implement `Default` with the production values, so a
//! missing or partial config is equivalent to the defaults.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocietyConfig {
    #[serde(default)]
    pub loans: LoanConfig,
    #[serde(default)]
    pub members: MemberConfig,
}

/// Loan policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanConfig {
    pub penalty_per_day: f64,
    /// Day of month on which installments fall due. Clamped to 1..=28 when used.
    pub due_day: u32,
    pub max_emi_income_ratio: f64,
    pub loan_id_prefix: String,
}

impl Default for LoanConfig {
    fn default() -> Self {
        Self {
            penalty_per_day: 50.0,
            due_day: 5,
            max_emi_income_ratio: 0.5,
            loan_id_prefix: "LOAN".to_string(),
        }
    }
}

/// Membership policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberConfig {
    pub max_guarantors: usize,
    pub membership_fee: f64,
    pub fee_due_days: u32,
}

impl Default for MemberConfig {
    fn default() -> Self {
        Self {
            max_guarantors: 3,
            membership_fee: 1000.0,
            fee_due_days: 30,
        }
    }
}

impl SocietyConfig {
    /// Builder method to set the late-payment penalty.
    pub fn with_penalty_per_day(mut self, amount: f64) -> Self {
        self.loans.penalty_per_day = amount;
        self
    }

    /// Builder method to set the guarantor limit.
    pub fn with_max_guarantors(mut self, max: usize) -> Self {
        self.members.max_guarantors = max;
        self
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
