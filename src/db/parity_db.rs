// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::path::PathBuf;

use super::{SettingsStore, parity_db_config::ParityDbConfig};

use anyhow::anyhow;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::DAG_CBOR;
use multihash_codetable::Code::Blake2b256;
use parity_db::{CompressionType, Db, Operation, Options};
use strum::{Display, EnumIter, IntoEnumIterator as _};

/// Determines which column a given entry is written to.
#[derive(Copy, Clone, Debug, Display, PartialEq, EnumIter)]
#[repr(u8)]
enum DbColumn {
    /// IPLD data with `Blake2b256` hash and `DAG_CBOR` codec. Actor states
    /// and state tree nodes all land here.
    GraphDagCborBlake2b256,
    /// Other IPLD data (different codec or hash function).
    GraphFull,
    /// Mutable key-value entries, e.g. the migration cache.
    Settings,
}

impl DbColumn {
    fn create_column_options(compression: CompressionType) -> Vec<parity_db::ColumnOptions> {
        DbColumn::iter()
            .map(|col| match col {
                DbColumn::GraphDagCborBlake2b256 => parity_db::ColumnOptions {
                    preimage: true,
                    compression,
                    ..Default::default()
                },
                DbColumn::GraphFull => parity_db::ColumnOptions {
                    preimage: true,
                    compression,
                    ..Default::default()
                },
                DbColumn::Settings => parity_db::ColumnOptions {
                    // entries are overwritten, so no preimage
                    preimage: false,
                    // needed for key retrieval
                    btree_index: true,
                    compression,
                    ..Default::default()
                },
            })
            .collect()
    }
}

/// Durable block store and settings store on top of `parity-db`.
pub struct ParityDb {
    db: Db,
}

impl ParityDb {
    fn to_options(path: PathBuf, config: &ParityDbConfig) -> Options {
        let columns = DbColumn::create_column_options(CompressionType::Lz4);
        let mut options = Options::with_columns(&path, columns.len() as u8);
        options.columns = columns;
        options.sync_wal = true;
        options.sync_data = true;
        options.stats = config.enable_statistics;
        options
    }

    pub fn open(path: impl Into<PathBuf>, config: &ParityDbConfig) -> anyhow::Result<Self> {
        let opts = Self::to_options(path.into(), config);
        Ok(Self {
            db: Db::open_or_create(&opts)?,
        })
    }

    fn choose_column(cid: &Cid) -> DbColumn {
        match cid.codec() {
            DAG_CBOR if cid.hash().code() == u64::from(Blake2b256) => {
                DbColumn::GraphDagCborBlake2b256
            }
            _ => DbColumn::GraphFull,
        }
    }

    fn read_from_column<K>(&self, key: K, column: DbColumn) -> anyhow::Result<Option<Vec<u8>>>
    where
        K: AsRef<[u8]>,
    {
        self.db
            .get(column as u8, key.as_ref())
            .map_err(|e| anyhow!("error from column {column}: {e}"))
    }

    fn write_to_column<K, V>(&self, key: K, value: V, column: DbColumn) -> anyhow::Result<()>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        let tx = [(column as u8, key.as_ref(), Some(value.as_ref().to_vec()))];
        self.db
            .commit(tx)
            .map_err(|e| anyhow!("error writing to column {column}: {e}"))
    }
}

impl SettingsStore for ParityDb {
    fn read_bin(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        self.read_from_column(key.as_bytes(), DbColumn::Settings)
    }

    fn write_bin(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.write_to_column(key.as_bytes(), value, DbColumn::Settings)
    }
}

impl Blockstore for ParityDb {
    fn get(&self, k: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        self.read_from_column(k.to_bytes(), Self::choose_column(k))
    }

    fn put_keyed(&self, k: &Cid, block: &[u8]) -> anyhow::Result<()> {
        self.write_to_column(k.to_bytes(), block, Self::choose_column(k))
    }

    fn put_many_keyed<D, I>(&self, blocks: I) -> anyhow::Result<()>
    where
        Self: Sized,
        D: AsRef<[u8]>,
        I: IntoIterator<Item = (Cid, D)>,
    {
        let tx = blocks.into_iter().map(|(k, v)| {
            (
                Self::choose_column(&k) as u8,
                Operation::Set(k.to_bytes(), v.as_ref().to_vec()),
            )
        });
        self.db
            .commit_changes(tx)
            .map_err(|e| anyhow!("error bulk writing: {e}"))
    }
}
