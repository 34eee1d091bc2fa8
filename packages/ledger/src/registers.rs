//! Side registers kept next to the member book: security cheques deposited by
//! members, court cases under section 138, registrar recovery cases and
//! family-detail forms.
//!
//! Cheques and family forms are addressed by their position in the stored
//! list. Cases carry a generated `id` and are addressed by it.

use store::{Case138, CaseRcs, Cheque, CollectionStore, FamilySubmission, MemberCheque};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::ledger::{required, validate_cheque, Ledger};

const UNKNOWN_MEMBER: &str = "Unknown";

/// `"<millis>-<n>"`, with `n` the smallest number not already used.
fn fresh_case_id<'a>(millis: i64, taken: impl Iterator<Item = &'a str> + Clone) -> String {
    (0..)
        .map(|n| format!("{millis}-{n}"))
        .find(|candidate| !taken.clone().any(|id| id == candidate.as_str()))
        .unwrap_or_else(|| millis.to_string())
}

impl<S: CollectionStore, C: Clock> Ledger<S, C> {
    // Member cheques

    pub fn member_cheques(&self) -> Vec<MemberCheque> {
        self.repository().cheques()
    }

    /// Validate a cheque entry and fill in the member's name.
    fn resolve_cheque(&self, entry: MemberCheque) -> Result<MemberCheque> {
        let member_id = required("Member", &entry.member_id)?;
        let cheque = validate_cheque(Cheque {
            cheque_no: entry.cheque_no,
            dated: entry.dated,
            bank_branch: entry.bank_branch,
            amount: entry.amount,
        })?;
        let member_name = self
            .find_member(&member_id)
            .map(|m| m.name)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_MEMBER.to_string());
        Ok(MemberCheque {
            member_id,
            member_name,
            cheque_no: cheque.cheque_no,
            dated: cheque.dated,
            bank_branch: cheque.bank_branch,
            amount: cheque.amount,
        })
    }

    pub fn add_member_cheque(&self, entry: MemberCheque) -> Result<MemberCheque> {
        let entry = self.resolve_cheque(entry)?;
        let mut cheques = self.repository().cheques();
        cheques.push(entry.clone());
        self.repository().save_cheques(&cheques)?;
        tracing::info!("Recorded cheque {} for {}", entry.cheque_no, entry.member_id);
        Ok(entry)
    }

    pub fn update_member_cheque(&self, index: usize, entry: MemberCheque) -> Result<MemberCheque> {
        let entry = self.resolve_cheque(entry)?;
        let mut cheques = self.repository().cheques();
        let slot = cheques.get_mut(index).ok_or(Error::EntryNotFound {
            register: "cheque",
            index,
        })?;
        *slot = entry.clone();
        self.repository().save_cheques(&cheques)?;
        Ok(entry)
    }

    pub fn delete_member_cheque(&self, index: usize) -> Result<MemberCheque> {
        let mut cheques = self.repository().cheques();
        if index >= cheques.len() {
            return Err(Error::EntryNotFound {
                register: "cheque",
                index,
            });
        }
        let removed = cheques.remove(index);
        self.repository().save_cheques(&cheques)?;
        tracing::info!("Deleted cheque {}", removed.cheque_no);
        Ok(removed)
    }

    // Section 138 cases

    pub fn cases_138(&self) -> Vec<Case138> {
        self.repository().cases_138()
    }

    /// Store a new case under a fresh id, ignoring any id on the input.
    pub fn add_case_138(&self, case: Case138) -> Result<Case138> {
        required("Case number", &case.case_no)?;
        let mut cases = self.repository().cases_138();
        let id = fresh_case_id(
            self.clock().now().timestamp_millis(),
            cases.iter().map(|c| c.id.as_str()),
        );
        let case = Case138 { id, ..case };
        cases.push(case.clone());
        self.repository().save_cases_138(&cases)?;
        tracing::info!("Opened 138 case {} ({})", case.case_no, case.id);
        Ok(case)
    }

    /// Replace the case with `id`, keeping its id.
    pub fn update_case_138(&self, id: &str, case: Case138) -> Result<Case138> {
        let mut cases = self.repository().cases_138();
        let slot = cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::CaseNotFound(id.to_string()))?;
        *slot = Case138 {
            id: id.to_string(),
            ..case
        };
        let updated = slot.clone();
        self.repository().save_cases_138(&cases)?;
        Ok(updated)
    }

    pub fn delete_case_138(&self, id: &str) -> Result<()> {
        let mut cases = self.repository().cases_138();
        let before = cases.len();
        cases.retain(|c| c.id != id);
        if cases.len() == before {
            return Err(Error::CaseNotFound(id.to_string()));
        }
        self.repository().save_cases_138(&cases)?;
        Ok(())
    }

    // RCS cases

    pub fn cases_rcs(&self) -> Vec<CaseRcs> {
        self.repository().cases_rcs()
    }

    pub fn add_case_rcs(&self, case: CaseRcs) -> Result<CaseRcs> {
        required("Borrower name", &case.borrower_name)?;
        let mut cases = self.repository().cases_rcs();
        let id = fresh_case_id(
            self.clock().now().timestamp_millis(),
            cases.iter().map(|c| c.id.as_str()),
        );
        let case = CaseRcs { id, ..case };
        cases.push(case.clone());
        self.repository().save_cases_rcs(&cases)?;
        tracing::info!("Opened RCS case for {} ({})", case.borrower_name, case.id);
        Ok(case)
    }

    pub fn update_case_rcs(&self, id: &str, case: CaseRcs) -> Result<CaseRcs> {
        let mut cases = self.repository().cases_rcs();
        let slot = cases
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| Error::CaseNotFound(id.to_string()))?;
        *slot = CaseRcs {
            id: id.to_string(),
            ..case
        };
        let updated = slot.clone();
        self.repository().save_cases_rcs(&cases)?;
        Ok(updated)
    }

    pub fn delete_case_rcs(&self, id: &str) -> Result<()> {
        let mut cases = self.repository().cases_rcs();
        let before = cases.len();
        cases.retain(|c| c.id != id);
        if cases.len() == before {
            return Err(Error::CaseNotFound(id.to_string()));
        }
        self.repository().save_cases_rcs(&cases)?;
        Ok(())
    }

    // Family submissions

    pub fn family_submissions(&self) -> Vec<FamilySubmission> {
        self.repository().family_submissions()
    }

    /// Append a family form. Blank sibling and child rows are dropped.
    pub fn submit_family(&self, form: FamilySubmission) -> Result<FamilySubmission> {
        let form = clean_family(form)?;
        let mut forms = self.repository().family_submissions();
        forms.push(form.clone());
        self.repository().save_family_submissions(&forms)?;
        tracing::info!("Family details submitted for {}", form.borrower_id);
        Ok(form)
    }

    pub fn update_family_submission(
        &self,
        index: usize,
        form: FamilySubmission,
    ) -> Result<FamilySubmission> {
        let form = clean_family(form)?;
        let mut forms = self.repository().family_submissions();
        let slot = forms.get_mut(index).ok_or(Error::EntryNotFound {
            register: "family submission",
            index,
        })?;
        *slot = form.clone();
        self.repository().save_family_submissions(&forms)?;
        Ok(form)
    }
}

fn clean_family(form: FamilySubmission) -> Result<FamilySubmission> {
    let borrower_id = required("Borrower", &form.borrower_id)?;
    let non_blank = |rows: Vec<String>| -> Vec<String> {
        rows.into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect()
    };
    Ok(FamilySubmission {
        borrower_id,
        children: non_blank(form.children),
        brothers: non_blank(form.brothers),
        sisters: non_blank(form.sisters),
        ..form
    })
}
