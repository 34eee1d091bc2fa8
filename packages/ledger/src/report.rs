//! # Loan reports
//!
//! Pure derivations over a loan as it stands on a given day. Nothing here is
//! stored; the report layer renders these records into tables and documents.
//!
//! ## Per installment
//!
//! | [`InstallmentStatus`] | When |
//! |-----------------------|------|
//! | `Paid` | marked paid |
//! | `Missed` | unpaid and the due date is before today |
//! | `Pending` | unpaid and due today or later |
//!
//! ## Per loan
//!
//! - `totalPaid`: sum of paid installment amounts
//! - `recovery`: `max(totalPayable - totalPaid, 0)`
//! - `penalty`: for each installment paid after its due date,
//!   days late × the configured daily penalty
//! - `reportStatus`: `Completed` once `totalPaid >= totalPayable > 0`,
//!   otherwise `Pending`. This is not the approval status, which is carried
//!   separately in `status`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use store::config::LoanConfig;
use store::{Installment, Loan, LoanStatus, Member};

use crate::amount::{format_amount, round2, to_cents};
use crate::loan_id::display_loan_id;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallmentStatus {
    Paid,
    Missed,
    Pending,
}

/// Collection standing of a loan, independent of its approval status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    Completed,
    Pending,
}

pub fn classify(installment: &Installment, today: NaiveDate) -> InstallmentStatus {
    if installment.paid {
        InstallmentStatus::Paid
    } else if installment.date < today {
        InstallmentStatus::Missed
    } else {
        InstallmentStatus::Pending
    }
}

/// Whole days between due date and payment, or 0 if paid on time (or unpaid).
pub fn days_late(installment: &Installment) -> i64 {
    match installment.paid_on {
        Some(paid_on) if installment.paid && paid_on > installment.date => {
            (paid_on - installment.date).num_days()
        }
        _ => 0,
    }
}

pub fn penalty(loan: &Loan, penalty_per_day: f64) -> f64 {
    let days: i64 = loan.repayments.iter().map(days_late).sum();
    round2(days as f64 * penalty_per_day)
}

pub fn recovery(loan: &Loan) -> f64 {
    round2((loan.total_payable - loan.total_paid()).max(0.0))
}

pub fn report_status(total_payable: f64, total_paid: f64) -> ReportStatus {
    if total_payable > 0.0 && to_cents(total_paid) >= to_cents(total_payable) {
        ReportStatus::Completed
    } else {
        ReportStatus::Pending
    }
}

/// One line of a repayment table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentRow {
    /// 1-based position in the schedule.
    pub number: usize,
    pub due_date: NaiveDate,
    pub amount: f64,
    pub status: InstallmentStatus,
    pub paid_on: Option<NaiveDate>,
    pub days_late: i64,
}

impl InstallmentRow {
    /// `"Paid (2025-01-10)"`, `"Missed"` or `"Pending"`.
    pub fn status_label(&self) -> String {
        match (self.status, self.paid_on) {
            (InstallmentStatus::Paid, Some(on)) => format!("Paid ({on})"),
            (InstallmentStatus::Paid, None) => "Paid".to_string(),
            (InstallmentStatus::Missed, _) => "Missed".to_string(),
            (InstallmentStatus::Pending, _) => "Pending".to_string(),
        }
    }
}

/// Everything the report layer needs about one loan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanReport {
    pub member_id: String,
    pub member_name: String,
    pub mobile: String,
    pub loan_id: String,
    pub product: String,
    pub principal: f64,
    pub interest: f64,
    pub tenure_months: u32,
    pub emi: f64,
    pub total_payable: f64,
    /// Approval status.
    pub status: LoanStatus,
    pub outstanding: f64,
    /// First installment's due date.
    pub due_date: Option<NaiveDate>,
    /// Payment date of the last paid installment.
    pub paid_date: Option<NaiveDate>,
    pub total_paid: f64,
    pub recovery: f64,
    pub penalty: f64,
    pub report_status: ReportStatus,
    pub installments: Vec<InstallmentRow>,
    /// The amounts above as display strings.
    pub formatted: ReportAmounts,
}

/// Report amounts rendered with [`format_amount`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAmounts {
    pub principal: String,
    pub emi: String,
    pub total_payable: String,
    pub outstanding: String,
    pub total_paid: String,
    pub recovery: String,
    pub penalty: String,
}

impl LoanReport {
    /// Derive the report for the loan at `position` in `member.loans`.
    pub fn build(
        member: &Member,
        loan: &Loan,
        position: usize,
        today: NaiveDate,
        config: &LoanConfig,
    ) -> Self {
        let total_paid = round2(loan.total_paid());
        let installments = loan
            .repayments
            .iter()
            .enumerate()
            .map(|(i, r)| InstallmentRow {
                number: i + 1,
                due_date: r.date,
                amount: r.amount,
                status: classify(r, today),
                paid_on: r.paid_on.filter(|_| r.paid),
                days_late: days_late(r),
            })
            .collect();

        let recovery = recovery(loan);
        let penalty = penalty(loan, config.penalty_per_day);
        let formatted = ReportAmounts {
            principal: format_amount(loan.principal),
            emi: format_amount(loan.emi),
            total_payable: format_amount(loan.total_payable),
            outstanding: format_amount(loan.outstanding),
            total_paid: format_amount(total_paid),
            recovery: format_amount(recovery),
            penalty: format_amount(penalty),
        };

        Self {
            member_id: member.member_id.clone(),
            member_name: member.name.clone(),
            mobile: member.mobile.clone(),
            loan_id: display_loan_id(loan, position, &config.loan_id_prefix),
            product: loan.product.clone(),
            principal: loan.principal,
            interest: loan.interest,
            tenure_months: loan.tenure_months,
            emi: loan.emi,
            total_payable: loan.total_payable,
            status: loan.status,
            outstanding: loan.outstanding,
            due_date: loan.repayments.first().map(|r| r.date),
            paid_date: loan
                .repayments
                .iter()
                .rev()
                .find(|r| r.paid)
                .and_then(|r| r.paid_on),
            total_paid,
            recovery,
            penalty,
            report_status: report_status(loan.total_payable, total_paid),
            installments,
            formatted,
        }
    }

    pub fn missed_count(&self) -> usize {
        self.installments
            .iter()
            .filter(|r| r.status == InstallmentStatus::Missed)
            .count()
    }

    /// Label/value pairs for a summary block or a table row, amounts formatted
    /// without trailing `.00` and missing dates shown as `-`.
    pub fn summary_fields(&self) -> Vec<(&'static str, String)> {
        let date_or_dash = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
        vec![
            ("Member ID", self.member_id.clone()),
            ("Member", self.member_name.clone()),
            ("Loan ID", self.loan_id.clone()),
            ("Principal", self.formatted.principal.clone()),
            ("Interest", format!("{}%", self.interest)),
            ("Tenure", format!("{} months", self.tenure_months)),
            ("EMI", self.formatted.emi.clone()),
            ("Total Payable", self.formatted.total_payable.clone()),
            ("Due Date", date_or_dash(self.due_date)),
            ("Last Paid", date_or_dash(self.paid_date)),
            ("Total Paid", self.formatted.total_paid.clone()),
            ("Recovery", self.formatted.recovery.clone()),
            ("Penalty", self.formatted.penalty.clone()),
            (
                "Status",
                match self.report_status {
                    ReportStatus::Completed => "Completed".to_string(),
                    ReportStatus::Pending => "Pending".to_string(),
                },
            ),
        ]
    }
}

/// Case-insensitive match on member id or name. A blank query matches everything.
pub fn matches_member(member: &Member, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    query.is_empty()
        || member.member_id.to_lowercase().contains(&query)
        || member.name.to_lowercase().contains(&query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn installment(due: NaiveDate, amount: f64, paid_on: Option<NaiveDate>) -> Installment {
        Installment {
            date: due,
            amount,
            paid: paid_on.is_some(),
            paid_on,
        }
    }

    fn member() -> Member {
        Member {
            member_id: "MEM0007".into(),
            name: "Asha Verma".into(),
            mobile: "9876500001".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_classify() {
        let today = date(2025, 2, 5);
        assert_eq!(
            classify(&installment(date(2025, 1, 5), 10.0, Some(date(2025, 3, 1))), today),
            InstallmentStatus::Paid
        );
        assert_eq!(
            classify(&installment(date(2025, 2, 4), 10.0, None), today),
            InstallmentStatus::Missed
        );
        // Due today is not yet missed
        assert_eq!(
            classify(&installment(date(2025, 2, 5), 10.0, None), today),
            InstallmentStatus::Pending
        );
    }

    #[test]
    fn test_penalty_five_days_late() {
        let loan = Loan {
            repayments: vec![installment(date(2025, 1, 5), 1000.0, Some(date(2025, 1, 10)))],
            ..Default::default()
        };
        assert_eq!(penalty(&loan, 50.0), 250.0);
    }

    #[test]
    fn test_penalty_ignores_early_and_unpaid() {
        let loan = Loan {
            repayments: vec![
                installment(date(2025, 1, 5), 1000.0, Some(date(2025, 1, 1))),
                installment(date(2025, 2, 5), 1000.0, Some(date(2025, 2, 5))),
                installment(date(2025, 3, 5), 1000.0, None),
                installment(date(2025, 4, 5), 1000.0, Some(date(2025, 4, 7))),
            ],
            ..Default::default()
        };
        assert_eq!(penalty(&loan, 50.0), 100.0);
    }

    #[test]
    fn test_report_status_boundaries() {
        assert_eq!(report_status(1000.0, 1000.0), ReportStatus::Completed);
        assert_eq!(report_status(1000.0, 999.99), ReportStatus::Pending);
        assert_eq!(report_status(0.0, 0.0), ReportStatus::Pending);
        // Float noise from summing installments does not block completion
        assert_eq!(report_status(0.3, 0.1 + 0.2), ReportStatus::Completed);
    }

    #[test]
    fn test_build_report() {
        let loan = Loan {
            loan_id: Some("3".into()),
            product: "Vehicle".into(),
            principal: 3000.0,
            interest: 0.0,
            tenure_months: 3,
            emi: 1000.0,
            total_payable: 3000.0,
            status: LoanStatus::Approved,
            outstanding: 2000.0,
            repayments: vec![
                installment(date(2025, 1, 5), 1000.0, Some(date(2025, 1, 8))),
                installment(date(2025, 2, 5), 1000.0, None),
                installment(date(2025, 3, 5), 1000.0, None),
            ],
            ..Default::default()
        };
        let report = LoanReport::build(&member(), &loan, 0, date(2025, 2, 20), &LoanConfig::default());

        assert_eq!(report.loan_id, "LOAN003");
        assert_eq!(report.due_date, Some(date(2025, 1, 5)));
        assert_eq!(report.paid_date, Some(date(2025, 1, 8)));
        assert_eq!(report.total_paid, 1000.0);
        assert_eq!(report.recovery, 2000.0);
        assert_eq!(report.penalty, 150.0);
        assert_eq!(report.report_status, ReportStatus::Pending);
        assert_eq!(report.status, LoanStatus::Approved);
        assert_eq!(report.missed_count(), 1);
        assert_eq!(report.installments[0].status_label(), "Paid (2025-01-08)");
        assert_eq!(report.installments[2].status_label(), "Pending");

        assert_eq!(report.formatted.principal, "3000");
        assert_eq!(report.formatted.outstanding, "2000");
        assert_eq!(report.formatted.penalty, "150");
    }

    #[test]
    fn test_pending_loan_report_has_no_dates() {
        let loan = Loan {
            principal: 5000.0,
            emi: 450.5,
            total_payable: 5406.0,
            ..Default::default()
        };
        let report = LoanReport::build(&member(), &loan, 1, date(2025, 2, 20), &LoanConfig::default());

        assert_eq!(report.loan_id, "LOAN002");
        assert!(report.due_date.is_none());
        assert!(report.paid_date.is_none());
        assert_eq!(report.recovery, 5406.0);

        let fields = report.summary_fields();
        assert!(fields.contains(&("Due Date", "-".to_string())));
        assert!(fields.contains(&("Principal", "5000".to_string())));
        assert!(fields.contains(&("EMI", "450.50".to_string())));
    }

    #[test]
    fn test_report_serialises_camel_case() {
        let report = LoanReport::build(
            &member(),
            &Loan::default(),
            0,
            date(2025, 2, 20),
            &LoanConfig::default(),
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["reportStatus"], "Pending");
        assert_eq!(value["status"], "pending");
        assert!(value["totalPaid"].is_number());
        assert_eq!(value["formatted"]["totalPaid"], "0");
    }

    #[test]
    fn test_matches_member() {
        assert!(matches_member(&member(), ""));
        assert!(matches_member(&member(), "mem0007"));
        assert!(matches_member(&member(), " verma "));
        assert!(!matches_member(&member(), "ravi"));
    }
}
