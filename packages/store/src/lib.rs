pub mod config;
pub mod error;
pub mod models;
pub mod repo;

mod de;

mod memory;
pub use memory::MemoryStore;

mod file_store;
pub use file_store::FileStore;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
mod local_storage;
#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub use local_storage::LocalStorageStore;

pub use config::SocietyConfig;
pub use error::StoreError;
pub use models::{
    Address, CaseRcs, Case138, Cheque, FamilySubmission, Guarantor, Installment, Kyc, KycDocument,
    Loan, LoanStatus, Member, MemberCheque, MemberStatus, MembershipFee,
};
pub use repo::{keys, Backup, CollectionStore, Repository};
