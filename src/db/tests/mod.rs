// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::ops::Deref;

use super::{MemoryDB, ParityDb, ParityDbConfig, SettingsStore};

/// Temporary, self-cleaning `ParityDb`
pub struct TempParityDB {
    db: ParityDb,
    dir: tempfile::TempDir,
}

impl TempParityDB {
    /// Creates a new DB in a temporary path that gets wiped out when the
    /// variable gets out of scope.
    pub fn new() -> TempParityDB {
        let dir = tempfile::Builder::new()
            .tempdir()
            .expect("Failed to create temporary path for db.");
        let db = open(&dir);
        TempParityDB { db, dir }
    }

    /// Closes the database and opens it again from the same directory.
    pub fn reopen(self) -> TempParityDB {
        let TempParityDB { db, dir } = self;
        drop(db);
        let db = open(&dir);
        TempParityDB { db, dir }
    }
}

fn open(dir: &tempfile::TempDir) -> ParityDb {
    ParityDb::open(dir.path().join("paritydb"), &ParityDbConfig::default()).unwrap()
}

impl Deref for TempParityDB {
    type Target = ParityDb;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

fn read_bin(db: &impl SettingsStore) {
    let key = "0";
    let value = [1];
    db.write_bin(key, &value).unwrap();
    let res = db.read_bin(key).unwrap().unwrap();
    assert_eq!(value.as_ref(), res.as_slice());
}

fn overwrite(db: &impl SettingsStore) {
    let key = "/state_migration/cache/f01-h-x";
    db.write_bin(key, b"42").unwrap();
    assert_eq!(db.read_bin(key).unwrap(), Some(b"42".to_vec()));

    // cache entries must be overwritable
    db.write_bin(key, b"1337").unwrap();
    assert_eq!(db.read_bin(key).unwrap(), Some(b"1337".to_vec()));
}

fn does_not_exist(db: &impl SettingsStore) {
    assert!(db.read_bin("Azathoth").unwrap().is_none());
}

#[test]
fn mem_db_settings() {
    read_bin(&MemoryDB::default());
    overwrite(&MemoryDB::default());
    does_not_exist(&MemoryDB::default());
}

#[test]
fn parity_db_settings() {
    read_bin(&*TempParityDB::new());
    overwrite(&*TempParityDB::new());
    does_not_exist(&*TempParityDB::new());
}

#[test]
fn parity_db_settings_survive_reopen() {
    let db = TempParityDB::new();
    db.write_bin("durable", b"yes").unwrap();
    let db = db.reopen();
    assert_eq!(db.read_bin("durable").unwrap(), Some(b"yes".to_vec()));
}
