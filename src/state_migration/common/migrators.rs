// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

use super::cache::{MigrationCache, actor_head_key};
use super::{ActorMigration, ActorMigrationInput, ActorMigrationOutput, Migrator};

/// Migrator which preserves the head CID and provides a fixed result code CID.
pub struct NilMigrator(Cid);

impl<BS: Blockstore> ActorMigration<BS> for NilMigrator {
    fn migrate_state(
        &self,
        _store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<ActorMigrationOutput> {
        Ok(ActorMigrationOutput {
            new_code_cid: self.0,
            new_head: input.head,
        })
    }

    fn migrated_code_cid(&self) -> Cid {
        self.0
    }
}

/// Creates a new migrator which preserves the head CID and provides a fixed
/// result code CID.
pub fn nil_migrator<BS: Blockstore>(new_code_cid: Cid) -> Migrator<BS> {
    Arc::new(NilMigrator(new_code_cid))
}

/// Memoizes another migrator by actor address and prior head.
pub struct CachedMigrator<BS: Blockstore> {
    cache: Arc<dyn MigrationCache>,
    inner: Migrator<BS>,
}

impl<BS: Blockstore> ActorMigration<BS> for CachedMigrator<BS> {
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<ActorMigrationOutput> {
        let key = actor_head_key(&input.address, &input.head);
        let new_head = self.cache.load(&key, &mut || {
            self.inner
                .migrate_state(store, input.clone())
                .map(|output| output.new_head)
        })?;
        Ok(ActorMigrationOutput {
            new_code_cid: self.inner.migrated_code_cid(),
            new_head,
        })
    }

    fn migrated_code_cid(&self) -> Cid {
        self.inner.migrated_code_cid()
    }
}

pub fn cached_migrator<BS: Blockstore + 'static>(
    cache: Arc<dyn MigrationCache>,
    inner: Migrator<BS>,
) -> Migrator<BS> {
    Arc::new(CachedMigrator { cache, inner })
}
