// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Memoization of per-actor migrations, keyed by strings derived from the
//! actor address and its prior state head. A populated cache lets a pass be
//! re-run (or resumed after a failure) without redoing expensive work.

use std::sync::Arc;

use ahash::HashMap;
use anyhow::Context as _;
use cid::Cid;
use parking_lot::{Mutex, RwLock};

use crate::db::SettingsStore;
use crate::shim::address::Address;

/// Thread-safe store of migration results.
///
/// For a fixed migration version a cached value must equal what a fresh
/// computation would produce. Errors are fatal to the pass, there is no
/// fallback to recomputation.
pub trait MigrationCache: Send + Sync {
    fn write(&self, key: &str, new_cid: Cid) -> anyhow::Result<()>;

    fn read(&self, key: &str) -> anyhow::Result<Option<Cid>>;

    /// Returns the cached value for `key`, or runs `loader`, stores its
    /// result and returns it. Concurrent callers with the same key run
    /// `loader` at most once between them; a failing `loader` stores nothing.
    fn load(
        &self,
        key: &str,
        loader: &mut dyn FnMut() -> anyhow::Result<Cid>,
    ) -> anyhow::Result<Cid>;
}

/// Cache key of a migrated actor state head.
pub fn actor_head_key(addr: &Address, head: &Cid) -> String {
    format!("{addr}-h-{head}")
}

/// Cache key of a migrated miner deadline.
pub fn deadline_key(deadline: &Cid) -> String {
    format!("d-{deadline}")
}

/// Cache key of a migrated miner sectors root.
pub fn sectors_root_key(sectors: &Cid) -> String {
    format!("s-{sectors}")
}

/// Per-key locks serializing concurrent loaders of the same key.
#[derive(Default)]
struct SingleFlight {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SingleFlight {
    fn load(
        &self,
        key: &str,
        read: impl Fn() -> anyhow::Result<Option<Cid>>,
        write: impl FnOnce(Cid) -> anyhow::Result<()>,
        loader: &mut dyn FnMut() -> anyhow::Result<Cid>,
    ) -> anyhow::Result<Cid> {
        if let Some(cid) = read()? {
            return Ok(cid);
        }

        let key_lock = self.locks.lock().entry(key.to_owned()).or_default().clone();
        let result = {
            let _guard = key_lock.lock();
            // the previous holder of the lock may have stored it
            match read() {
                Ok(Some(cid)) => Ok(cid),
                Ok(None) => loader().and_then(|cid| write(cid).map(|_| cid)),
                Err(e) => Err(e),
            }
        };

        let mut locks = self.locks.lock();
        // one reference in the map, one held here
        if Arc::strong_count(&key_lock) == 2 {
            locks.remove(key);
        }
        result
    }
}

/// In-memory cache, lost when the process exits.
#[derive(Default)]
pub struct MemMigrationCache {
    entries: RwLock<HashMap<String, Cid>>,
    flight: SingleFlight,
}

impl MemMigrationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl MigrationCache for MemMigrationCache {
    fn write(&self, key: &str, new_cid: Cid) -> anyhow::Result<()> {
        self.entries.write().insert(key.to_owned(), new_cid);
        Ok(())
    }

    fn read(&self, key: &str) -> anyhow::Result<Option<Cid>> {
        Ok(self.entries.read().get(key).copied())
    }

    fn load(
        &self,
        key: &str,
        loader: &mut dyn FnMut() -> anyhow::Result<Cid>,
    ) -> anyhow::Result<Cid> {
        self.flight.load(
            key,
            || self.read(key),
            |cid| self.write(key, cid),
            loader,
        )
    }
}

const CACHE_KEY_PREFIX: &str = "/state_migration/cache/";

/// Durable cache persisted in a [`SettingsStore`], e.g.
/// [`crate::db::ParityDb`]. Survives restarts, so an aborted pass can be
/// resumed.
pub struct SettingsMigrationCache<S> {
    store: S,
    flight: SingleFlight,
}

impl<S: SettingsStore> SettingsMigrationCache<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            flight: SingleFlight::default(),
        }
    }

    fn store_key(key: &str) -> String {
        format!("{CACHE_KEY_PREFIX}{key}")
    }
}

impl<S: SettingsStore + Send + Sync> MigrationCache for SettingsMigrationCache<S> {
    fn write(&self, key: &str, new_cid: Cid) -> anyhow::Result<()> {
        self.store
            .write_bin(&Self::store_key(key), &new_cid.to_bytes())
            .with_context(|| format!("failed to write migration cache entry {key}"))
    }

    fn read(&self, key: &str) -> anyhow::Result<Option<Cid>> {
        let bytes = self
            .store
            .read_bin(&Self::store_key(key))
            .with_context(|| format!("failed to read migration cache entry {key}"))?;
        bytes
            .map(|bytes| Cid::try_from(bytes.as_slice()))
            .transpose()
            .with_context(|| format!("corrupted migration cache entry {key}"))
    }

    fn load(
        &self,
        key: &str,
        loader: &mut dyn FnMut() -> anyhow::Result<Cid>,
    ) -> anyhow::Result<Cid> {
        self.flight.load(
            key,
            || self.read(key),
            |cid| self.write(key, cid),
            loader,
        )
    }
}
