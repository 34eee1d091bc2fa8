//! # Repository: typed collections over a raw key-value store
//!
//! All society data lives in a flat key-value store whose values are JSON
//! arrays. [`CollectionStore`] is the raw seam (string in, string out) that
//! each backend implements; [`Repository`] layers typed read-modify-write
//! access, seeding, settings and backups on top of it.
//!
//! ## [`CollectionStore`] trait
//!
//! Three synchronous methods: `get`/`set`/`remove` on string values. Backends
//! swallow their own I/O errors (logging them) so that an unavailable store
//! degrades to "no local data". Implementations live in sibling modules
//! ([`crate::memory`], [`crate::file_store`], and `local_storage` on the web).
//!
//! ## Read path
//!
//! [`read_collection`](Repository::read_collection) parses the value under a
//! key record by record. An absent key, or a value that is not a JSON array,
//! yields an empty vector. A single record that does not fit `T` is skipped
//! and logged with `tracing::warn!`; the rest of the collection is still read.
//!
//! ## Write path
//!
//! [`write_collection`](Repository::write_collection) replaces the readable
//! part of a collection. Records the read path skipped are carried over
//! verbatim after the written ones, so a record this version cannot parse is
//! never lost by an unrelated edit. If the stored value is not a JSON array at
//! all the write is refused with [`StoreError::Unreadable`]; only an explicit
//! replacement ([`import_backup`](Repository::import_backup),
//! [`clear_all`](Repository::clear_all)) overwrites it.
//!
//! There is no locking or versioning: two repositories over the same storage
//! that interleave read-modify-write cycles lose updates, and the last writer
//! wins.
//!
//! | Method | Key |
//! |--------|-----|
//! | [`members`](Repository::members) / [`save_members`](Repository::save_members) | [`keys::MEMBERS`] |
//! | [`cheques`](Repository::cheques) / [`save_cheques`](Repository::save_cheques) | [`keys::CHEQUES`] |
//! | [`cases_138`](Repository::cases_138) / [`save_cases_138`](Repository::save_cases_138) | [`keys::CASES_138`] |
//! | [`cases_rcs`](Repository::cases_rcs) / [`save_cases_rcs`](Repository::save_cases_rcs) | [`keys::CASES_RCS`] |
//! | [`family_submissions`](Repository::family_submissions) / [`save_family_submissions`](Repository::save_family_submissions) | [`keys::FAMILY_SUBMISSIONS`] |
//! | [`get_config`](Repository::get_config) / [`set_config`](Repository::set_config) | [`keys::SETTINGS`] |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SocietyConfig;
use crate::error::StoreError;
use crate::models::{CaseRcs, Case138, FamilySubmission, Member, MemberCheque};

/// Fixture used to populate an empty store on first run.
const SEED_MEMBERS: &str = include_str!("../fixtures/members.json");

const BACKUP_VERSION: &str = "1.0";

/// Logical collection names.
pub mod keys {
    pub const MEMBERS: &str = "members";
    pub const CHEQUES: &str = "cheques";
    pub const CASES_138: &str = "cases138";
    pub const CASES_RCS: &str = "casesRCS";
    pub const FAMILY_SUBMISSIONS: &str = "allFamilySubmissions";
    pub const SETTINGS: &str = "society_app_settings";

    /// Every key the application writes.
    pub const ALL: [&str; 6] = [
        MEMBERS,
        CHEQUES,
        CASES_138,
        CASES_RCS,
        FAMILY_SUBMISSIONS,
        SETTINGS,
    ];
}

/// What a key currently holds.
enum Stored {
    Absent,
    Records(Vec<Value>),
    Unreadable(serde_json::Error),
}

/// Synchronous string key-value storage.
pub trait CollectionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Exported snapshot of the members collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Member records as JSON, so unreadable ones survive a round trip.
    pub members: Vec<Value>,
    pub exported_at: String,
    pub version: String,
}

/// Typed access to the society collections held in a [`CollectionStore`].
pub struct Repository<S: CollectionStore> {
    store: S,
}

impl<S: CollectionStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying raw store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The raw stored records under `key`.
    fn load(&self, key: &str) -> Stored {
        let Some(raw) = self.store.get(key) else {
            return Stored::Absent;
        };
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => Stored::Records(records),
            Err(e) => Stored::Unreadable(e),
        }
    }

    /// Read a collection, skipping records that do not fit `T`.
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.load(key) {
            Stored::Absent => Vec::new(),
            Stored::Unreadable(e) => {
                tracing::warn!("Reading malformed collection {key:?} as empty: {e}");
                Vec::new()
            }
            Stored::Records(records) => split(key, records).0,
        }
    }

    /// Replace the readable records of a collection, keeping unreadable ones.
    pub fn write_collection<T>(&self, key: &str, items: &[T]) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned,
    {
        let carried = match self.load(key) {
            Stored::Absent => Vec::new(),
            Stored::Unreadable(_) => {
                tracing::warn!("Refusing to overwrite unreadable collection {key:?}");
                return Err(StoreError::Unreadable {
                    key: key.to_string(),
                });
            }
            Stored::Records(records) => split::<T>(key, records).1,
        };
        let records = merge(items, carried)?;
        self.replace_collection(key, &records)?;
        tracing::debug!("Wrote {} record(s) to {key:?}", items.len());
        Ok(())
    }

    /// Overwrite a collection unconditionally.
    fn replace_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items)?;
        self.store.set(key, raw);
        Ok(())
    }

    pub fn members(&self) -> Vec<Member> {
        self.read_collection(keys::MEMBERS)
    }

    pub fn save_members(&self, members: &[Member]) -> Result<(), StoreError> {
        self.write_collection(keys::MEMBERS, members)
    }

    /// `memberId` of every stored member record, including records that
    /// cannot be read as a [`Member`].
    pub fn member_ids(&self) -> Vec<String> {
        let Stored::Records(records) = self.load(keys::MEMBERS) else {
            return Vec::new();
        };
        records
            .iter()
            .filter_map(|record| match record.get("memberId")? {
                Value::String(id) => Some(id.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect()
    }

    pub fn cheques(&self) -> Vec<MemberCheque> {
        self.read_collection(keys::CHEQUES)
    }

    pub fn save_cheques(&self, cheques: &[MemberCheque]) -> Result<(), StoreError> {
        self.write_collection(keys::CHEQUES, cheques)
    }

    pub fn cases_138(&self) -> Vec<Case138> {
        self.read_collection(keys::CASES_138)
    }

    pub fn save_cases_138(&self, cases: &[Case138]) -> Result<(), StoreError> {
        self.write_collection(keys::CASES_138, cases)
    }

    pub fn cases_rcs(&self) -> Vec<CaseRcs> {
        self.read_collection(keys::CASES_RCS)
    }

    pub fn save_cases_rcs(&self, cases: &[CaseRcs]) -> Result<(), StoreError> {
        self.write_collection(keys::CASES_RCS, cases)
    }

    pub fn family_submissions(&self) -> Vec<FamilySubmission> {
        self.read_collection(keys::FAMILY_SUBMISSIONS)
    }

    pub fn save_family_submissions(&self, forms: &[FamilySubmission]) -> Result<(), StoreError> {
        self.write_collection(keys::FAMILY_SUBMISSIONS, forms)
    }

    /// Populate `members` from the bundled fixture if nothing is stored yet.
    ///
    /// An absent key or an empty array is seeded. Stored data, including data
    /// that cannot be read, is left alone. Returns the number of members seeded.
    pub fn seed_members_if_empty(&self) -> Result<usize, StoreError> {
        match self.load(keys::MEMBERS) {
            Stored::Absent => {}
            Stored::Records(records) if records.is_empty() => {}
            Stored::Records(_) => return Ok(0),
            Stored::Unreadable(e) => {
                tracing::warn!("Not seeding over unreadable members: {e}");
                return Ok(0);
            }
        }
        let seed: Vec<Member> = serde_json::from_str(SEED_MEMBERS)?;
        self.replace_collection(keys::MEMBERS, &seed)?;
        tracing::info!("Seeded {} member(s) from fixture", seed.len());
        Ok(seed.len())
    }

    /// Read the society settings, falling back to defaults.
    pub fn get_config(&self) -> SocietyConfig {
        let Some(raw) = self.store.get(keys::SETTINGS) else {
            return SocietyConfig::default();
        };
        SocietyConfig::from_toml(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable settings: {e}");
            SocietyConfig::default()
        })
    }

    pub fn set_config(&self, config: &SocietyConfig) -> Result<(), StoreError> {
        self.store.set(keys::SETTINGS, config.to_toml()?);
        Ok(())
    }

    /// Pretty-printed JSON snapshot of all members.
    ///
    /// Readable members are written in normalised form; records that cannot
    /// be read are exported as stored.
    pub fn export_backup(&self) -> Result<String, StoreError> {
        let members = match self.load(keys::MEMBERS) {
            Stored::Records(records) => {
                let (readable, carried) = split::<Member>(keys::MEMBERS, records);
                merge(&readable, carried)?
            }
            Stored::Absent | Stored::Unreadable(_) => Vec::new(),
        };
        let backup = Backup {
            members,
            exported_at: chrono::Utc::now().to_rfc3339(),
            version: BACKUP_VERSION.to_string(),
        };
        Ok(serde_json::to_string_pretty(&backup)?)
    }

    /// Replace the members collection with the one in `json`.
    ///
    /// The document must be an object with a `members` array; anything else is
    /// [`StoreError::InvalidBackup`] and leaves the store untouched. Records
    /// that cannot be read as members are kept verbatim. Returns the number of
    /// records stored.
    pub fn import_backup(&self, json: &str) -> Result<usize, StoreError> {
        let mut doc: Value = serde_json::from_str(json)?;
        let records = match doc.get_mut("members").map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => return Err(StoreError::InvalidBackup),
        };
        let (members, carried) = split::<Member>(keys::MEMBERS, records);
        let records = merge(&members, carried)?;
        self.replace_collection(keys::MEMBERS, &records)?;
        tracing::info!("Imported {} member(s) from backup", records.len());
        Ok(records.len())
    }

    /// Remove every collection the application owns.
    pub fn clear_all(&self) {
        for key in keys::ALL {
            self.store.remove(key);
        }
        tracing::info!("Cleared all stored collections");
    }
}

/// Separate the records that parse as `T` from those that do not.
fn split<T: DeserializeOwned>(key: &str, records: Vec<Value>) -> (Vec<T>, Vec<Value>) {
    let mut readable = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for (i, record) in records.into_iter().enumerate() {
        match T::deserialize(&record) {
            Ok(item) => readable.push(item),
            Err(e) => {
                tracing::warn!("Skipping unreadable record {i} of {key:?}: {e}");
                unreadable.push(record);
            }
        }
    }
    (readable, unreadable)
}

/// Serialise `items`, then append the records carried over verbatim.
fn merge<T: Serialize>(items: &[T], carried: Vec<Value>) -> Result<Vec<Value>, StoreError> {
    let mut records = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    records.extend(carried);
    Ok(records)
}
