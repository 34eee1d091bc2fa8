//! Errors returned by ledger operations.
//!
//! Every variant except [`Error::Store`] is a validation failure: the
//! operation was refused and nothing was written. Messages are phrased for
//! direct display to the person filling in the form.

/// Errors that can occur while validating or applying a ledger operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A required input was blank.
    #[error("{field} is required")]
    MissingField {
        /// Name of the form field
        field: &'static str,
    },

    /// An input was present but unusable.
    #[error("{field} must be {requirement}")]
    InvalidField {
        field: &'static str,
        requirement: &'static str,
    },

    /// The EMI is above the share of monthly income the society allows.
    #[error(
        "EMI exceeds {percent}% of your monthly income. Please increase tenure or reduce loan amount."
    )]
    EmiExceedsIncome {
        emi: f64,
        /// Largest EMI the stated income allows
        limit: f64,
        percent: f64,
    },

    #[error("member {0} not found")]
    MemberNotFound(String),

    #[error("member {0} already exists")]
    DuplicateMember(String),

    #[error("loan {0} not found")]
    LoanNotFound(String),

    #[error("installment {index} is out of range (schedule has {count})")]
    InstallmentOutOfRange { index: usize, count: usize },

    #[error("guarantor {index} not found")]
    GuarantorNotFound { index: usize },

    #[error("Please fill at least one guarantor before submitting")]
    NoGuarantors,

    #[error("All entered guarantors already exist for this member or were duplicates in your input.")]
    AllGuarantorsDuplicate,

    #[error(
        "Cannot add {adding} guarantor(s). This member already has {existing} guarantor(s). Maximum allowed is {max}."
    )]
    TooManyGuarantors {
        existing: usize,
        adding: usize,
        max: usize,
    },

    /// Index-addressed register entry (cheques, family forms) does not exist.
    #[error("{register} entry {index} not found")]
    EntryNotFound {
        register: &'static str,
        index: usize,
    },

    #[error("case {0} not found")]
    CaseNotFound(String),

    /// Persisting the result failed.
    #[error(transparent)]
    Store(#[from] store::StoreError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this is a user-correctable validation failure.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}
