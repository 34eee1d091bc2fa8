//! # Ledger: society workflows over a [`Repository`]
//!
//! [`Ledger`] owns the repository, the clock and the society configuration.
//! Every mutating operation is one read-modify-write of a whole collection:
//! read, validate, change, write back. A validation error returns before the
//! write, so a refused operation leaves storage untouched.
//!
//! ## Members
//!
//! | Method | Effect |
//! |--------|--------|
//! | [`register_member`](Ledger::register_member) | New `MEM####` member, pending, KYC unverified, fee unpaid |
//! | [`verify_kyc`](Ledger::verify_kyc) | Merge KYC details, mark verified, activate |
//! | [`collect_membership_fee`](Ledger::collect_membership_fee) | Mark the fee paid |
//! | [`search_members`](Ledger::search_members) | Text search with optional status filter |
//!
//! ## Loans
//!
//! | Method | Effect |
//! |--------|--------|
//! | [`apply_for_loan`](Ledger::apply_for_loan) | Quote, affordability check, append a pending loan |
//! | [`approve_loan`](Ledger::approve_loan) | Pending → approved, schedule generated |
//! | [`reject_loan`](Ledger::reject_loan) | Pending → rejected |
//! | [`record_payment`](Ledger::record_payment) | Mark one installment paid |
//! | [`loans`](Ledger::loans) | All loans, optionally filtered by status |
//! | [`loan_statement`](Ledger::loan_statement) / [`emi_report`](Ledger::emi_report) | Derived [`LoanReport`]s |
//!
//! Loans are addressed by member id plus loan id. The loan id may be given in
//! any form [`normalize_loan_id`](crate::normalize_loan_id) accepts.
//!
//! ## Guarantors
//!
//! [`add_guarantors`](Ledger::add_guarantors) runs the batch through
//! [`dedupe`] and enforces the per-member maximum.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use store::{
    Address, Cheque, CollectionStore, Guarantor, Kyc, KycDocument, Loan, LoanStatus, Member,
    MemberStatus, MembershipFee, Repository, SocietyConfig,
};

use crate::amount::round2;
use crate::clock::{Clock, SystemClock};
use crate::emi::{check_affordability, LoanQuote};
use crate::error::{Error, Result};
use crate::guarantors::{dedupe, Dedup};
use crate::loan_id::{display_loan_id, loan_number, normalize_loan_id_with, same_loan_id};
use crate::payment::{self, PaymentOutcome};
use crate::report::{matches_member, LoanReport};
use crate::schedule::generate_schedule;

const MEMBER_ID_PREFIX: &str = "MEM";

/// Registration form input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewMember {
    /// Explicit id; generated when absent.
    pub member_id: Option<String>,
    pub name: String,
    pub mobile: String,
    pub email: String,
    pub dob: Option<String>,
    pub address: Address,
    pub pan: String,
    pub aadhar: String,
}

/// KYC details supplied at verification. Blank values keep what is stored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KycUpdate {
    pub pan: String,
    pub aadhar: String,
    pub documents: Vec<KycDocument>,
}

/// Loan application form input.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanApplication {
    pub member_id: String,
    /// Purpose of the loan.
    pub product: String,
    pub principal: f64,
    /// Annual rate in percent.
    pub interest: f64,
    pub tenure_months: u32,
    /// Stated monthly income; 0 when not given.
    pub monthly_income: f64,
}

/// A loan together with the member it belongs to, as listed for approval.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanView {
    pub member_id: String,
    pub member_name: String,
    pub mobile: String,
    /// Normalised display id.
    pub loan_id: String,
    pub loan: Loan,
}

/// Result of an approve or reject request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Transition {
    Approved {
        installments: usize,
        first_due: Option<NaiveDate>,
    },
    Rejected,
    /// The loan was not pending; nothing changed.
    Unchanged { status: LoanStatus },
}

/// The society ledger.
pub struct Ledger<S: CollectionStore, C: Clock = SystemClock> {
    repo: Repository<S>,
    clock: C,
    config: SocietyConfig,
}

impl<S: CollectionStore> Ledger<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CollectionStore, C: Clock> Ledger<S, C> {
    /// Open a ledger over `store`, reading its stored configuration.
    pub fn with_clock(store: S, clock: C) -> Self {
        let repo = Repository::new(store);
        let config = repo.get_config();
        Self {
            repo,
            clock,
            config,
        }
    }

    pub fn repository(&self) -> &Repository<S> {
        &self.repo
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SocietyConfig {
        &self.config
    }

    /// Persist new settings and use them from now on.
    pub fn set_config(&mut self, config: SocietyConfig) -> Result<()> {
        self.repo.set_config(&config)?;
        self.config = config;
        Ok(())
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Read-modify-write of one member. Nothing is written if `f` fails.
    fn update_member<T>(
        &self,
        member_id: &str,
        f: impl FnOnce(&mut Member) -> Result<T>,
    ) -> Result<T> {
        let mut members = self.repo.members();
        let member = members
            .iter_mut()
            .find(|m| m.member_id == member_id.trim())
            .ok_or_else(|| Error::MemberNotFound(member_id.to_string()))?;
        let out = f(member)?;
        self.repo.save_members(&members)?;
        Ok(out)
    }

    /// As [`update_member`](Self::update_member), narrowed to one loan.
    fn update_loan<T>(
        &self,
        member_id: &str,
        loan_id: &str,
        f: impl FnOnce(&mut Loan) -> Result<T>,
    ) -> Result<T> {
        let prefix = self.config.loans.loan_id_prefix.as_str();
        self.update_member(member_id, |member| {
            let position = find_loan(member, loan_id, prefix)
                .ok_or_else(|| Error::LoanNotFound(loan_id.to_string()))?;
            f(&mut member.loans[position])
        })
    }

    // Members

    pub fn members(&self) -> Vec<Member> {
        self.repo.members()
    }

    pub fn find_member(&self, member_id: &str) -> Option<Member> {
        self.repo
            .members()
            .into_iter()
            .find(|m| m.member_id == member_id.trim())
    }

    pub fn register_member(&self, input: NewMember) -> Result<Member> {
        let name = required("Name", &input.name)?;
        let mobile = required("Mobile", &input.mobile)?;

        let mut members = self.repo.members();
        let taken = self.repo.member_ids();
        let member_id = match input.member_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => {
                if taken.iter().any(|t| t == id) {
                    return Err(Error::DuplicateMember(id.to_string()));
                }
                id.to_string()
            }
            _ => next_member_id(&taken),
        };

        let today = self.today();
        let fee_due = today.checked_add_days(Days::new(self.config.members.fee_due_days.into()));
        let member = Member {
            member_id,
            name,
            mobile,
            email: input.email.trim().to_string(),
            dob: input.dob,
            address: input.address,
            kyc: Kyc {
                pan: input.pan,
                aadhar: input.aadhar,
                ..Default::default()
            },
            status: MemberStatus::Pending,
            joined_at: Some(self.clock.now().to_rfc3339()),
            membership_fee: MembershipFee {
                paid: false,
                amount: self.config.members.membership_fee,
                due_date: fee_due,
                last_payment_date: None,
            },
            ..Default::default()
        };

        members.push(member.clone());
        self.repo.save_members(&members)?;
        tracing::info!("Registered member {}", member.member_id);
        Ok(member)
    }

    /// Members whose name, id, email or mobile contains `query`
    /// (case-insensitive), optionally restricted to one status.
    pub fn search_members(&self, query: &str, status: Option<MemberStatus>) -> Vec<Member> {
        let query = query.trim().to_lowercase();
        self.repo
            .members()
            .into_iter()
            .filter(|m| status.map_or(true, |s| m.status == s))
            .filter(|m| {
                query.is_empty()
                    || [&m.name, &m.member_id, &m.email, &m.mobile]
                        .iter()
                        .any(|field| field.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Record KYC details and activate the member. PAN and Aadhaar must be
    /// known afterwards, either supplied here or already on file.
    pub fn verify_kyc(&self, member_id: &str, update: KycUpdate) -> Result<Member> {
        let member = self.update_member(member_id, |member| {
            let kyc = &mut member.kyc;
            if !update.pan.trim().is_empty() {
                kyc.pan = update.pan.trim().to_string();
            }
            if !update.aadhar.trim().is_empty() {
                kyc.aadhar = update.aadhar.trim().to_string();
            }
            required("PAN", &kyc.pan)?;
            required("Aadhar", &kyc.aadhar)?;
            for doc in update.documents {
                if !kyc.documents.iter().any(|d| d.name() == doc.name()) {
                    kyc.documents.push(doc);
                }
            }
            kyc.verified = true;
            member.status = MemberStatus::Active;
            Ok(member.clone())
        })?;
        tracing::info!("Verified KYC for {}", member.member_id);
        Ok(member)
    }

    pub fn collect_membership_fee(&self, member_id: &str) -> Result<Member> {
        let paid_at = self.clock.now().to_rfc3339();
        let member = self.update_member(member_id, |member| {
            member.membership_fee.paid = true;
            member.membership_fee.last_payment_date = Some(paid_at);
            Ok(member.clone())
        })?;
        tracing::info!("Collected membership fee from {}", member.member_id);
        Ok(member)
    }

    // Loans

    /// EMI and total for the application calculator.
    pub fn quote(&self, principal: f64, annual_rate: f64, tenure_months: u32) -> LoanQuote {
        LoanQuote::new(principal, annual_rate, tenure_months)
    }

    /// Validate and store a pending loan for the applicant.
    pub fn apply_for_loan(&self, app: LoanApplication) -> Result<Loan> {
        if !(app.principal > 0.0) || !app.principal.is_finite() {
            return Err(Error::InvalidField {
                field: "Loan amount",
                requirement: "greater than zero",
            });
        }
        if app.tenure_months == 0 {
            return Err(Error::InvalidField {
                field: "Tenure",
                requirement: "at least one month",
            });
        }
        if !(app.interest >= 0.0) || !app.interest.is_finite() {
            return Err(Error::InvalidField {
                field: "Interest rate",
                requirement: "zero or more",
            });
        }

        let quote = self.quote(app.principal, app.interest, app.tenure_months);
        check_affordability(
            quote.emi,
            app.monthly_income,
            self.config.loans.max_emi_income_ratio,
        )?;

        let mut members = self.repo.members();
        let loan_id = next_loan_id(&members, &self.config.loans.loan_id_prefix);
        let member = members
            .iter_mut()
            .find(|m| m.member_id == app.member_id.trim())
            .ok_or_else(|| Error::MemberNotFound(app.member_id.clone()))?;

        let loan = Loan {
            loan_id: Some(loan_id),
            product: app.product.trim().to_string(),
            principal: app.principal,
            interest: app.interest,
            tenure_months: app.tenure_months,
            emi: quote.emi,
            total_payable: quote.total_payable,
            status: LoanStatus::Pending,
            submitted_at: Some(self.clock.now().to_rfc3339()),
            ..Default::default()
        };
        member.loans.push(loan.clone());
        self.repo.save_members(&members)?;
        tracing::info!(
            loan_id = loan.loan_id.as_deref().unwrap_or_default(),
            member_id = %app.member_id,
            emi = loan.emi,
            "Loan application submitted"
        );
        Ok(loan)
    }

    /// Every loan in the society, optionally only those in `status`.
    pub fn loans(&self, status: Option<LoanStatus>) -> Vec<LoanView> {
        let prefix = &self.config.loans.loan_id_prefix;
        self.repo
            .members()
            .into_iter()
            .flat_map(|member| {
                member
                    .loans
                    .iter()
                    .enumerate()
                    .filter(|(_, loan)| status.map_or(true, |s| loan.status == s))
                    .map(|(i, loan)| LoanView {
                        member_id: member.member_id.clone(),
                        member_name: member.name.clone(),
                        mobile: member.mobile.clone(),
                        loan_id: display_loan_id(loan, i, prefix),
                        loan: loan.clone(),
                    })
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Approve a pending loan and generate its repayment schedule.
    pub fn approve_loan(&self, member_id: &str, loan_id: &str) -> Result<Transition> {
        let today = self.today();
        let due_day = self.config.loans.due_day;
        let transition = self.update_loan(member_id, loan_id, |loan| {
            if loan.status != LoanStatus::Pending {
                return Ok(Transition::Unchanged {
                    status: loan.status,
                });
            }
            loan.repayments = generate_schedule(loan.emi, loan.tenure_months, today, due_day);
            loan.status = LoanStatus::Approved;
            loan.outstanding = round2(loan.total_payable);
            Ok(Transition::Approved {
                installments: loan.repayments.len(),
                first_due: loan.repayments.first().map(|r| r.date),
            })
        })?;
        match transition {
            Transition::Approved { installments, .. } => {
                tracing::info!("Approved loan {loan_id} of {member_id} ({installments} installments)")
            }
            Transition::Unchanged { status } => {
                tracing::debug!("Loan {loan_id} of {member_id} is already {}", status.as_str())
            }
            Transition::Rejected => {}
        }
        Ok(transition)
    }

    pub fn reject_loan(&self, member_id: &str, loan_id: &str) -> Result<Transition> {
        let transition = self.update_loan(member_id, loan_id, |loan| {
            if loan.status != LoanStatus::Pending {
                return Ok(Transition::Unchanged {
                    status: loan.status,
                });
            }
            loan.status = LoanStatus::Rejected;
            Ok(Transition::Rejected)
        })?;
        if transition == Transition::Rejected {
            tracing::info!("Rejected loan {loan_id} of {member_id}");
        }
        Ok(transition)
    }

    /// Mark installment `index` (0-based) of a loan paid today.
    pub fn record_payment(
        &self,
        member_id: &str,
        loan_id: &str,
        index: usize,
    ) -> Result<PaymentOutcome> {
        let today = self.today();
        let outcome = self.update_loan(member_id, loan_id, |loan| {
            payment::record_payment(loan, index, today)
        })?;
        match outcome {
            PaymentOutcome::Recorded { outstanding, .. } => tracing::info!(
                "Recorded installment {} of {loan_id}; outstanding {outstanding}",
                index + 1
            ),
            PaymentOutcome::AlreadyPaid { .. } => {
                tracing::debug!("Installment {} of {loan_id} already paid", index + 1)
            }
        }
        Ok(outcome)
    }

    /// The derived report for one loan, as shown in the repayment dialog.
    pub fn loan_statement(&self, member_id: &str, loan_id: &str) -> Result<LoanReport> {
        let member = self
            .find_member(member_id)
            .ok_or_else(|| Error::MemberNotFound(member_id.to_string()))?;
        let position = find_loan(&member, loan_id, &self.config.loans.loan_id_prefix)
            .ok_or_else(|| Error::LoanNotFound(loan_id.to_string()))?;
        Ok(LoanReport::build(
            &member,
            &member.loans[position],
            position,
            self.today(),
            &self.config.loans,
        ))
    }

    /// Reports for every loan of every member matching `query` on id or name.
    pub fn emi_report(&self, query: &str) -> Vec<LoanReport> {
        let today = self.today();
        let reports: Vec<LoanReport> = self
            .repo
            .members()
            .iter()
            .filter(|m| matches_member(m, query))
            .flat_map(|m| {
                m.loans
                    .iter()
                    .enumerate()
                    .map(move |(i, loan)| LoanReport::build(m, loan, i, today, &self.config.loans))
            })
            .collect();
        tracing::debug!("EMI report for {query:?}: {} loan(s)", reports.len());
        reports
    }

    // Guarantors

    /// Add a batch of guarantors, skipping blanks and duplicates.
    ///
    /// Fails when nothing was entered, when every candidate was a duplicate,
    /// or when the accepted ones would take the member past the maximum.
    pub fn add_guarantors(&self, member_id: &str, candidates: Vec<Guarantor>) -> Result<Dedup> {
        let max = self.config.members.max_guarantors;
        let result = self.update_member(member_id, |member| {
            let result = dedupe(&member.member_id, &member.guarantors, candidates);
            if !result.had_candidates() {
                return Err(Error::NoGuarantors);
            }
            if result.accepted.is_empty() {
                return Err(Error::AllGuarantorsDuplicate);
            }
            let existing = member.guarantors.len();
            if existing + result.accepted.len() > max {
                return Err(Error::TooManyGuarantors {
                    existing,
                    adding: result.accepted.len(),
                    max,
                });
            }
            member.guarantors.extend(result.accepted.iter().cloned());
            Ok(result)
        })?;
        tracing::info!(
            "Added {} guarantor(s) to {member_id}, skipped {}",
            result.accepted.len(),
            result.skipped.len()
        );
        Ok(result)
    }

    pub fn remove_guarantor(&self, member_id: &str, index: usize) -> Result<Guarantor> {
        self.update_member(member_id, |member| {
            if index >= member.guarantors.len() {
                return Err(Error::GuarantorNotFound { index });
            }
            Ok(member.guarantors.remove(index))
        })
    }

    /// Attach a cheque to the guarantor at `index`.
    pub fn add_guarantor_cheque(&self, member_id: &str, index: usize, cheque: Cheque) -> Result<()> {
        let cheque = validate_cheque(cheque)?;
        self.update_member(member_id, |member| {
            let guarantor = member
                .guarantors
                .get_mut(index)
                .ok_or(Error::GuarantorNotFound { index })?;
            guarantor.cheques.push(cheque);
            Ok(())
        })
    }
}

/// Trimmed `value`, or [`Error::MissingField`] if blank.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::MissingField { field });
    }
    Ok(value.to_string())
}

/// All four cheque fields present, amount positive.
pub(crate) fn validate_cheque(cheque: Cheque) -> Result<Cheque> {
    let cheque_no = required("Cheque number", &cheque.cheque_no)?;
    let dated = required("Cheque date", &cheque.dated)?;
    let bank_branch = required("Bank / branch", &cheque.bank_branch)?;
    if !(cheque.amount > 0.0) {
        return Err(Error::InvalidField {
            field: "Amount",
            requirement: "greater than zero",
        });
    }
    Ok(Cheque {
        cheque_no,
        dated,
        bank_branch,
        amount: round2(cheque.amount),
    })
}

/// `MEM` and four digits, one past the highest numeric suffix in use.
pub fn next_member_id(taken: &[String]) -> String {
    let highest = taken
        .iter()
        .filter_map(|id| id.strip_prefix(MEMBER_ID_PREFIX))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("{MEMBER_ID_PREFIX}{:04}", highest + 1)
}

/// One more than the number of loans on record, skipping ids already taken.
pub fn next_loan_id(members: &[Member], prefix: &str) -> String {
    let taken: Vec<String> = members
        .iter()
        .flat_map(|m| {
            m.loans
                .iter()
                .enumerate()
                .map(|(i, loan)| display_loan_id(loan, i, prefix))
        })
        .collect();
    let numbers: Vec<u64> = taken.iter().filter_map(|id| loan_number(id, prefix)).collect();
    let mut seq = taken.len() as u64 + 1;
    loop {
        let candidate = normalize_loan_id_with(&seq.to_string(), prefix);
        if !taken.contains(&candidate) && !numbers.contains(&seq) {
            return candidate;
        }
        seq += 1;
    }
}

/// Position in `member.loans` of the loan whose display id matches `loan_id`.
fn find_loan(member: &Member, loan_id: &str, prefix: &str) -> Option<usize> {
    member
        .loans
        .iter()
        .enumerate()
        .position(|(i, loan)| same_loan_id(&display_loan_id(loan, i, prefix), loan_id, prefix))
}
