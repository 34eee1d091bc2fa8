//! Guarantor de-duplication.
//!
//! A guarantor is identified by its membership id and by its mobile number;
//! either one matching is enough to call two entries the same person. A batch
//! of candidates is filtered against the member's existing guarantors and
//! against earlier candidates of the same batch.

use std::collections::HashSet;

use store::Guarantor;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum GuarantorKey {
    MembershipId(String),
    Mobile(String),
}

/// The identifying keys of a guarantor. Blank values contribute no key.
pub fn keys_of(guarantor: &Guarantor) -> Vec<GuarantorKey> {
    let non_blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    non_blank(&guarantor.membership_id)
        .map(GuarantorKey::MembershipId)
        .into_iter()
        .chain(non_blank(&guarantor.mobile).map(GuarantorKey::Mobile))
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing entered.
    Blank,
    /// Matches one of the member's current guarantors.
    Existing,
    /// Matches an earlier candidate in the same batch.
    InBatch,
    /// Names the borrower as their own guarantor.
    Borrower,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Skipped {
    pub candidate: Guarantor,
    pub reason: SkipReason,
}

/// Result of [`dedupe`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dedup {
    pub accepted: Vec<Guarantor>,
    pub skipped: Vec<Skipped>,
}

impl Dedup {
    /// Whether at least one non-blank candidate was supplied.
    pub fn had_candidates(&self) -> bool {
        !self.accepted.is_empty() || self.skipped.iter().any(|s| s.reason != SkipReason::Blank)
    }
}

/// Split `candidates` into those worth adding for `borrower_id` and those skipped.
pub fn dedupe(borrower_id: &str, existing: &[Guarantor], candidates: Vec<Guarantor>) -> Dedup {
    let existing_keys: HashSet<GuarantorKey> = existing.iter().flat_map(keys_of).collect();
    let borrower = GuarantorKey::MembershipId(borrower_id.trim().to_string());
    let mut seen = HashSet::new();
    let mut out = Dedup::default();

    for candidate in candidates {
        let keys = keys_of(&candidate);
        let reason = if candidate.is_blank() {
            Some(SkipReason::Blank)
        } else if !borrower_id.trim().is_empty() && keys.contains(&borrower) {
            Some(SkipReason::Borrower)
        } else if keys.iter().any(|k| existing_keys.contains(k)) {
            Some(SkipReason::Existing)
        } else if keys.iter().any(|k| seen.contains(k)) {
            Some(SkipReason::InBatch)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                if reason != SkipReason::Blank {
                    tracing::warn!(?reason, name = %candidate.name, "Skipping duplicate guarantor");
                }
                out.skipped.push(Skipped { candidate, reason });
            }
            None => {
                seen.extend(keys);
                out.accepted.push(candidate);
            }
        }
    }
    out
}
