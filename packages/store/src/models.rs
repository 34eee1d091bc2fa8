//! # Society records
//!
//! Every collection in the store is a JSON array of one of these record types.
//! Field names are camelCase to match the stored fixture and legacy data.
//!
//! ## Types
//!
//! | Struct | Stored under | Represents |
//! |--------|--------------|-----------|
//! | [`Member`] | `members` | A society member. Embeds its [`Loan`]s and [`Guarantor`]s. |
//! | [`Loan`] | (in `Member`) | A loan request and, once approved, its repayment schedule. |
//! | [`Installment`] | (in `Loan`) | One monthly repayment: due date, amount, paid flag and date. |
//! | [`Guarantor`] | (in `Member`) | A person guaranteeing the member's loans, with their [`Cheque`]s. |
//! | [`MemberCheque`] | `cheques` | A security cheque deposited by a member. |
//! | [`Case138`] | `cases138` | A cheque-dishonour court case. |
//! | [`CaseRcs`] | `casesRCS` | A registrar recovery case. |
//! | [`FamilySubmission`] | `allFamilySubmissions` | A borrower's family-detail form. |
//!
//! ## Defaulting
//!
//! Records written by older versions may omit fields, store numbers as strings
//! or use `null`. All of that is absorbed during deserialisation (see the
//! private `de` module) so the rest of the code sees fully-populated values.
//! Fields a record type does not name are kept in its `extra` map and written
//! back unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de;

/// Approval lifecycle of a loan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Approved => "approved",
            LoanStatus::Rejected => "rejected",
        }
    }
}

/// Membership standing of a member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    #[default]
    Pending,
    Active,
    Inactive,
    Suspended,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Address {
    #[serde(deserialize_with = "de::or_default")]
    pub street: String,
    #[serde(deserialize_with = "de::or_default")]
    pub city: String,
    #[serde(deserialize_with = "de::or_default")]
    pub state: String,
    #[serde(deserialize_with = "de::id")]
    pub pincode: String,
}

impl Address {
    /// Single-line form: `"street, city, state - pincode"`, skipping blanks.
    pub fn one_line(&self) -> String {
        let mut out = [&self.street, &self.city, &self.state]
            .into_iter()
            .filter(|s| !s.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if !self.pincode.is_empty() {
            out.push_str(" - ");
            out.push_str(&self.pincode);
        }
        out
    }
}

/// Identity-verification block.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Kyc {
    #[serde(deserialize_with = "de::id")]
    pub pan: String,
    #[serde(deserialize_with = "de::id")]
    pub aadhar: String,
    pub verified: bool,
    #[serde(deserialize_with = "de::or_default")]
    pub documents: Vec<KycDocument>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An uploaded KYC document: either a bare file name or the upload
/// metadata object (`{name, type, size, uploadedAt}`) written by the upload form.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KycDocument {
    Name(String),
    Upload(Map<String, Value>),
}

impl KycDocument {
    /// File name, or `""` for an upload record without one.
    pub fn name(&self) -> &str {
        match self {
            KycDocument::Name(name) => name,
            KycDocument::Upload(fields) => fields.get("name").and_then(Value::as_str).unwrap_or(""),
        }
    }
}

impl From<&str> for KycDocument {
    fn from(name: &str) -> Self {
        KycDocument::Name(name.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipFee {
    #[serde(default)]
    pub paid: bool,
    #[serde(default, deserialize_with = "de::number")]
    pub amount: f64,
    #[serde(default, deserialize_with = "de::opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub last_payment_date: Option<String>,
}

impl Default for MembershipFee {
    fn default() -> Self {
        Self {
            paid: false,
            amount: 1000.0,
            due_date: None,
            last_payment_date: None,
        }
    }
}

/// A society member.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default, deserialize_with = "de::id")]
    pub member_id: String,
    #[serde(default, deserialize_with = "de::or_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::id")]
    pub mobile: String,
    #[serde(default, deserialize_with = "de::or_default")]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub address: Address,
    #[serde(default, deserialize_with = "de::or_default")]
    pub kyc: Kyc,
    #[serde(default, deserialize_with = "de::or_default")]
    pub status: MemberStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub membership_fee: MembershipFee,
    #[serde(default, deserialize_with = "de::or_default")]
    pub guarantors: Vec<Guarantor>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub loans: Vec<Loan>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A loan embedded in its [`Member`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    #[serde(default, deserialize_with = "de::opt_id")]
    pub loan_id: Option<String>,
    /// Purpose of the loan as entered on the application.
    #[serde(default, deserialize_with = "de::or_default")]
    pub product: String,
    #[serde(default, deserialize_with = "de::number")]
    pub principal: f64,
    /// Annual interest rate in percent.
    #[serde(default, deserialize_with = "de::number")]
    pub interest: f64,
    #[serde(default, deserialize_with = "de::count")]
    pub tenure_months: u32,
    #[serde(default, deserialize_with = "de::number")]
    pub emi: f64,
    #[serde(default, deserialize_with = "de::number")]
    pub total_payable: f64,
    #[serde(default, deserialize_with = "de::or_default")]
    pub status: LoanStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, deserialize_with = "de::or_default")]
    pub repayments: Vec<Installment>,
    #[serde(default, deserialize_with = "de::number")]
    pub outstanding: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Loan {
    /// Sum of the amounts of every paid installment.
    pub fn total_paid(&self) -> f64 {
        self.repayments
            .iter()
            .filter(|r| r.paid)
            .map(|r| r.amount)
            .sum()
    }
}

/// One scheduled monthly repayment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    #[serde(deserialize_with = "de::date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "de::number")]
    pub amount: f64,
    #[serde(default)]
    pub paid: bool,
    /// Set once, when the installment is first marked paid.
    #[serde(default, deserialize_with = "de::opt_date")]
    pub paid_on: Option<NaiveDate>,
}

impl Installment {
    pub fn unpaid(date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            paid: false,
            paid_on: None,
        }
    }
}

/// A guarantor attached to a member. At most a handful per member.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Guarantor {
    #[serde(deserialize_with = "de::or_default")]
    pub name: String,
    #[serde(deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub membership_id: Option<String>,
    #[serde(deserialize_with = "de::opt_id", skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(deserialize_with = "de::or_default")]
    pub email: String,
    #[serde(deserialize_with = "de::or_default")]
    pub father_name: String,
    #[serde(deserialize_with = "de::or_default")]
    pub dob: String,
    #[serde(deserialize_with = "de::or_default")]
    pub permanent_address: String,
    #[serde(deserialize_with = "de::or_default")]
    pub current_address: String,
    #[serde(deserialize_with = "de::id")]
    pub pan: String,
    #[serde(deserialize_with = "de::id")]
    pub aadhar: String,
    #[serde(deserialize_with = "de::or_default")]
    pub bank_name: String,
    #[serde(deserialize_with = "de::or_default")]
    pub branch: String,
    #[serde(deserialize_with = "de::id")]
    pub account_no: String,
    #[serde(deserialize_with = "de::or_default")]
    pub ifsc: String,
    pub given_guarantee_other: bool,
    pub given_guarantee_our: bool,
    #[serde(deserialize_with = "de::or_default")]
    pub cheques: Vec<Cheque>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Guarantor {
    /// A candidate with no name, membership id or mobile carries nothing worth saving.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.membership_id.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.mobile.as_deref().map_or(true, |s| s.trim().is_empty())
    }
}

/// A cheque handed over by a guarantor.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cheque {
    #[serde(deserialize_with = "de::id")]
    pub cheque_no: String,
    pub dated: String,
    pub bank_branch: String,
    #[serde(deserialize_with = "de::number")]
    pub amount: f64,
}

/// A security cheque deposited by a member, kept in the `cheques` register.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberCheque {
    #[serde(deserialize_with = "de::id")]
    pub member_id: String,
    pub member_name: String,
    #[serde(deserialize_with = "de::id")]
    pub cheque_no: String,
    pub dated: String,
    pub bank_branch: String,
    #[serde(deserialize_with = "de::number")]
    pub amount: f64,
}

/// A cheque-dishonour (section 138) court case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Case138 {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub case_no: String,
    pub filing_date: String,
    pub court_name: String,
    pub case_name: String,
    pub cheque_amount: String,
    pub balance: String,
    pub previous_date: String,
    pub next_date: String,
    pub advocate: String,
    pub accused_bail: String,
    pub status: String,
}

/// A registrar of cooperative societies recovery case.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CaseRcs {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub borrower_name: String,
    pub address: String,
    pub pan: String,
    pub aadhar: String,
    pub mobile: String,
    pub email: String,
    pub rcs_case_no: String,
    pub balance: String,
    pub guarantors: String,
    pub rcs_filed: String,
    pub award_date: String,
    pub award_amount: String,
    pub govt_status: String,
    pub salary_attachment: String,
    pub recovery_status: String,
}

/// Family details collected for a borrower.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FamilySubmission {
    #[serde(deserialize_with = "de::id")]
    pub borrower_id: String,
    pub borrower_name: String,
    pub mobile: String,
    pub father_spouse: String,
    pub father_mobile: String,
    pub father_email: String,
    pub mother: String,
    pub children: Vec<String>,
    pub brothers: Vec<String>,
    pub sisters: Vec<String>,
    pub family_member_society: String,
    pub society_details: String,
    pub family_member_loan: String,
    pub loan_details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_loan_defaults() {
        let loan: Loan = serde_json::from_str(
            r#"{"loanId": 3, "principal": "50000", "emi": "2224.44",
                "totalPayable": "26693.28", "tenureMonths": "12"}"#,
        )
        .unwrap();
        assert_eq!(loan.loan_id.as_deref(), Some("3"));
        assert_eq!(loan.principal, 50000.0);
        assert_eq!(loan.emi, 2224.44);
        assert_eq!(loan.tenure_months, 12);
        assert_eq!(loan.status, LoanStatus::Pending);
        assert!(loan.repayments.is_empty());
    }

    #[test]
    fn test_member_keeps_unknown_fields() {
        let json = r#"{"_id": "member-1", "memberId": "MEM0001", "name": "Asha",
                       "loans": null, "guarantors": []}"#;
        let member: Member = serde_json::from_str(json).unwrap();
        assert!(member.loans.is_empty());
        assert_eq!(member.status, MemberStatus::Pending);
        assert_eq!(member.extra.get("_id"), Some(&Value::from("member-1")));

        let back = serde_json::to_value(&member).unwrap();
        assert_eq!(back["_id"], "member-1");
        assert_eq!(back["memberId"], "MEM0001");
    }

    #[test]
    fn test_installment_wire_format() {
        let inst = Installment::unpaid(NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), 1200.5);
        let value = serde_json::to_value(&inst).unwrap();
        assert_eq!(value["date"], "2025-01-05");
        assert_eq!(value["paid"], false);
        assert!(value["paidOn"].is_null());
    }

    #[test]
    fn test_kyc_documents_accept_upload_records() {
        let kyc: Kyc = serde_json::from_str(
            r#"{"pan": "ABCPV1234K", "aadhar": 445566778899, "verified": true,
                "documents": ["pan.pdf",
                              {"name": "aadhar.jpg", "type": "image/jpeg", "size": 20480,
                               "uploadedAt": "2025-01-10T06:30:00.000Z"}]}"#,
        )
        .unwrap();
        assert_eq!(kyc.aadhar, "445566778899");
        let names: Vec<_> = kyc.documents.iter().map(KycDocument::name).collect();
        assert_eq!(names, vec!["pan.pdf", "aadhar.jpg"]);

        // Upload metadata is written back untouched
        let back = serde_json::to_value(&kyc).unwrap();
        assert_eq!(back["documents"][1]["size"], 20480);
    }

    #[test]
    fn test_blank_guarantor() {
        assert!(Guarantor::default().is_blank());
        let g = Guarantor {
            mobile: Some("9800000000".into()),
            ..Default::default()
        };
        assert!(!g.is_blank());
    }

    #[test]
    fn test_address_one_line() {
        let addr = Address {
            street: "12 Mall Road".into(),
            city: "Shimla".into(),
            state: "HP".into(),
            pincode: "171001".into(),
        };
        assert_eq!(addr.one_line(), "12 Mall Road, Shimla, HP - 171001");
        assert_eq!(Address::default().one_line(), "");
    }
}
