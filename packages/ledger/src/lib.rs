//! # Ledger crate: loan engine and society workflows
//!
//! Everything here is synchronous and storage-agnostic. The pure loan
//! arithmetic lives in its own modules; [`Ledger`] wires it to a
//! [`store::Repository`] and a [`Clock`].
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`emi`] | EMI formula, loan quotes, affordability check |
//! | [`schedule`] | Monthly repayment schedule at approval |
//! | [`payment`] | Idempotent installment payment and outstanding balance |
//! | [`report`] | Installment status, penalty, recovery and per-loan report records |
//! | [`loan_id`] | `LOAN###` display ids |
//! | [`guarantors`] | Guarantor de-duplication |
//! | [`ledger`] | [`Ledger`]: members, loans, guarantors |
//! | `registers` | Cheque, case and family-form registers (methods on [`Ledger`]) |
//! | [`clock`] | [`SystemClock`] and [`FixedClock`] |
//! | [`amount`] | Rounding and formatting of rupee amounts |

pub mod amount;
pub mod clock;
pub mod emi;
pub mod error;
pub mod guarantors;
pub mod ledger;
pub mod loan_id;
pub mod payment;
pub mod report;
pub mod schedule;

mod registers;

mod proptests;

pub use clock::{Clock, FixedClock, SystemClock};
pub use emi::{calculate_emi, check_affordability, LoanQuote};
pub use error::{Error, Result};
pub use guarantors::{dedupe, Dedup, SkipReason};
pub use ledger::{KycUpdate, Ledger, LoanApplication, LoanView, NewMember, Transition};
pub use loan_id::normalize_loan_id;
pub use payment::PaymentOutcome;
pub use report::{InstallmentStatus, LoanReport, ReportAmounts, ReportStatus};
pub use schedule::generate_schedule;
