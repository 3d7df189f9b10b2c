//! Record store backed by the embedded redb database
//!
//! This module defines the [`RecordStore`] interface used by the record
//! manager and its redb implementation. Every operation runs in a single
//! transaction: write transactions are serialized by redb, which makes
//! click increments and check-then-insert atomic.

use chrono::Utc;
use redb::{backends::InMemoryBackend, Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::error::StorageError;
use crate::model::{NewUrlRecord, UrlRecord};

/// Main table for storing URL records
///
/// Key: internal record id
/// Value: JSON-serialized UrlRecord as string
pub const TABLE_URLS: TableDefinition<u64, &str> = TableDefinition::new("urls_v1");

/// Index of public keys belonging to active records
///
/// Key: public key (e.g., "aB3xZ")
/// Value: record id
///
/// Entries are removed on deactivation, so a deactivated key can be taken
/// again by a new record.
pub const TABLE_KEY_INDEX: TableDefinition<&str, u64> = TableDefinition::new("key_index_v1");

/// Index of every secret key ever issued
///
/// Key: secret key
/// Value: record id
///
/// Entries are never removed so secrets are never reissued. Lookups check
/// the record's `is_active` flag.
pub const TABLE_SECRET_INDEX: TableDefinition<&str, u64> = TableDefinition::new("secret_index_v1");

/// Counters used by the store
pub const TABLE_META: TableDefinition<&str, u64> = TableDefinition::new("meta_v1");

const NEXT_ID: &str = "next_id";

/// Result of an insert attempt
#[derive(Debug)]
pub enum InsertOutcome {
    Inserted(UrlRecord),
    /// An active record already uses the key
    KeyTaken,
    /// The secret key has been issued before
    SecretKeyTaken,
}

/// Persistence interface for URL records
///
/// Only records with `is_active = true` are ever returned by lookups.
pub trait RecordStore: Send + Sync {
    /// Inserts a new active record with zero clicks unless its key or
    /// secret key is already in use.
    fn insert(&self, new_record: NewUrlRecord) -> Result<InsertOutcome, StorageError>;

    /// Read-only lookup of the active record with `key`.
    ///
    /// Redirects go through [`RecordStore::increment_clicks`] instead, so
    /// this never counts a click. Used for inspection and in tests.
    fn find_by_key(&self, key: &str) -> Result<Option<UrlRecord>, StorageError>;

    /// Read-only lookup of the active record with `secret_key`.
    fn find_by_secret_key(&self, secret_key: &str) -> Result<Option<UrlRecord>, StorageError>;

    /// Adds one click to the active record with `key` and returns the
    /// updated record.
    fn increment_clicks(&self, key: &str) -> Result<Option<UrlRecord>, StorageError>;

    /// Marks the active record with `secret_key` inactive and returns it as
    /// it was before the change.
    fn deactivate(&self, secret_key: &str) -> Result<Option<UrlRecord>, StorageError>;
}

/// Initializes the embedded database and creates required tables
///
/// # Example
///
/// ```no_run
/// # use url_shortener::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, StorageError> {
    let db = Database::create(db_path)?;
    create_tables(&db)?;
    Ok(db)
}

/// Same as [`init_db`] but nothing touches the disk.
pub fn init_in_memory_db() -> Result<Database, StorageError> {
    let db = Database::builder().create_with_backend(InMemoryBackend::new())?;
    create_tables(&db)?;
    Ok(db)
}

fn create_tables(db: &Database) -> Result<(), StorageError> {
    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_KEY_INDEX)?;
        write_txn.open_table(TABLE_SECRET_INDEX)?;
        write_txn.open_table(TABLE_META)?;
    }
    write_txn.commit()?;
    Ok(())
}

fn decode(json: &str) -> Result<UrlRecord, StorageError> {
    Ok(serde_json::from_str(json)?)
}

/// [`RecordStore`] implementation on top of a redb [`Database`]
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Opens (or creates) the database file at `db_path`.
    pub fn open(db_path: &str) -> Result<Self, StorageError> {
        Ok(Self::new(init_db(db_path)?))
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(init_in_memory_db()?))
    }

    /// Looks up a record id through `index` and returns the record if it
    /// is still active.
    fn find_active(
        &self,
        index: TableDefinition<'static, &'static str, u64>,
        lookup: &str,
    ) -> Result<Option<UrlRecord>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(index)?;

        let id = match index_table.get(lookup)? {
            Some(guard) => guard.value(),
            None => return Ok(None),
        };

        let table = read_txn.open_table(TABLE_URLS)?;
        let record = match table.get(id)? {
            Some(guard) => decode(guard.value())?,
            None => return Ok(None),
        };

        Ok(record.is_active.then_some(record))
    }
}

impl RecordStore for RedbStore {
    fn insert(&self, new_record: NewUrlRecord) -> Result<InsertOutcome, StorageError> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut keys = write_txn.open_table(TABLE_KEY_INDEX)?;
            if keys.get(new_record.key.as_str())?.is_some() {
                // Dropping the transaction aborts it
                return Ok(InsertOutcome::KeyTaken);
            }

            let mut secrets = write_txn.open_table(TABLE_SECRET_INDEX)?;
            if secrets.get(new_record.secret_key.as_str())?.is_some() {
                return Ok(InsertOutcome::SecretKeyTaken);
            }

            let mut meta = write_txn.open_table(TABLE_META)?;
            let id = match meta.get(NEXT_ID)? {
                Some(guard) => guard.value(),
                None => 1,
            };
            meta.insert(NEXT_ID, id + 1)?;

            let record = UrlRecord {
                id,
                key: new_record.key,
                secret_key: new_record.secret_key,
                target_url: new_record.target_url,
                is_active: true,
                clicks: 0,
                created_at: Utc::now(),
            };
            let record_json = serde_json::to_string(&record)?;

            let mut table = write_txn.open_table(TABLE_URLS)?;
            table.insert(id, record_json.as_str())?;
            keys.insert(record.key.as_str(), id)?;
            secrets.insert(record.secret_key.as_str(), id)?;

            record
        };
        write_txn.commit()?;

        Ok(InsertOutcome::Inserted(record))
    }

    fn find_by_key(&self, key: &str) -> Result<Option<UrlRecord>, StorageError> {
        self.find_active(TABLE_KEY_INDEX, key)
    }

    fn find_by_secret_key(&self, secret_key: &str) -> Result<Option<UrlRecord>, StorageError> {
        self.find_active(TABLE_SECRET_INDEX, secret_key)
    }

    fn increment_clicks(&self, key: &str) -> Result<Option<UrlRecord>, StorageError> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let keys = write_txn.open_table(TABLE_KEY_INDEX)?;
            let id = match keys.get(key)? {
                Some(guard) => guard.value(),
                None => return Ok(None),
            };

            let mut table = write_txn.open_table(TABLE_URLS)?;
            let mut record = match table.get(id)? {
                Some(guard) => decode(guard.value())?,
                None => return Ok(None),
            };
            if !record.is_active {
                return Ok(None);
            }

            record.clicks += 1;
            let record_json = serde_json::to_string(&record)?;
            table.insert(id, record_json.as_str())?;

            record
        };
        write_txn.commit()?;

        Ok(Some(record))
    }

    fn deactivate(&self, secret_key: &str) -> Result<Option<UrlRecord>, StorageError> {
        let write_txn = self.db.begin_write()?;
        let previous = {
            let secrets = write_txn.open_table(TABLE_SECRET_INDEX)?;
            let id = match secrets.get(secret_key)? {
                Some(guard) => guard.value(),
                None => return Ok(None),
            };

            let mut table = write_txn.open_table(TABLE_URLS)?;
            let mut record = match table.get(id)? {
                Some(guard) => decode(guard.value())?,
                None => return Ok(None),
            };
            if !record.is_active {
                return Ok(None);
            }

            let previous = record.clone();
            record.is_active = false;
            let record_json = serde_json::to_string(&record)?;
            table.insert(id, record_json.as_str())?;

            // Release the key for reuse, but only if it still points here
            let mut keys = write_txn.open_table(TABLE_KEY_INDEX)?;
            let owned = matches!(keys.get(record.key.as_str())?, Some(guard) if guard.value() == id);
            if owned {
                keys.remove(record.key.as_str())?;
            }

            previous
        };
        write_txn.commit()?;

        Ok(Some(previous))
    }
}
