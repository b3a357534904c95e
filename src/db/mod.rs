// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod memory;
pub mod parity_db;
pub mod parity_db_config;

pub use memory::MemoryDB;
pub use parity_db::ParityDb;
pub use parity_db_config::ParityDbConfig;

/// Interface used to store and retrieve mutable key-value entries, such as
/// the migration cache. To store IPLD blocks, use the `Blockstore` trait.
pub trait SettingsStore {
    /// Reads binary field from the Settings store.
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;

    /// Writes binary field to the Settings store. An existing value is
    /// overwritten.
    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
}

impl<T: SettingsStore + ?Sized> SettingsStore for std::sync::Arc<T> {
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        SettingsStore::read_bin(self.as_ref(), key)
    }

    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        SettingsStore::write_bin(self.as_ref(), key, value)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        SettingsStore::read_bin(*self, key)
    }

    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        SettingsStore::write_bin(*self, key, value)
    }
}

#[cfg(test)]
pub(crate) mod tests;
