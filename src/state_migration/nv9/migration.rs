// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::shim::clock::ChainEpoch;
use anyhow::ensure;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use strum::IntoEnumIterator as _;

use super::super::common::{
    Config, Logger, MigrationCache, Migrator, StateMigration,
    migrators::{cached_migrator, nil_migrator},
};
use super::{ACTORS_VERSION_IN, ACTORS_VERSION_OUT, BuiltinActor};

/// State transforms of the actor kinds whose layout changes in actors
/// version 3. Each migrator must produce the version 3 code CID of its kind.
pub type Nv9Migrators<BS> = BTreeMap<BuiltinActor, Migrator<BS>>;

impl<BS: Blockstore + 'static> StateMigration<BS> {
    /// Registers pass-through migrators for the unchanged kinds and the
    /// cached `transforms` for the others.
    pub fn add_nv9_migrations(
        &mut self,
        cache: &Arc<dyn MigrationCache>,
        transforms: &Nv9Migrators<BS>,
    ) -> anyhow::Result<()> {
        for actor in BuiltinActor::iter() {
            let old_code = actor.code_cid(ACTORS_VERSION_IN)?;
            let new_code = actor.code_cid(ACTORS_VERSION_OUT)?;
            match transforms.get(&actor) {
                Some(transform) => {
                    ensure!(
                        transform.migrated_code_cid() == new_code,
                        "{actor} migrator produces code {}, expected {new_code}",
                        transform.migrated_code_cid()
                    );
                    self.add_migrator(old_code, cached_migrator(cache.clone(), transform.clone()));
                }
                None if actor.is_pass_through() => {
                    self.add_migrator(old_code, nil_migrator(new_code));
                }
                None => tracing::warn!("no migrator supplied for {actor} actors"),
            }
        }
        Ok(())
    }
}

/// Runs the migration for `NV9`. Returns the new state root.
pub fn run_migration<DB>(
    blockstore: &Arc<DB>,
    state: &Cid,
    epoch: ChainEpoch,
    config: &Config,
    logger: &dyn Logger,
    cache: Arc<dyn MigrationCache>,
    transforms: &Nv9Migrators<DB>,
) -> anyhow::Result<Cid>
where
    DB: Blockstore + Send + Sync + 'static,
{
    config.validate()?;

    let mut migration = StateMigration::<DB>::new();
    migration.add_nv9_migrations(&cache, transforms)?;
    migration.verify_complete(BuiltinActor::count())?;

    migration.migrate_state_tree(blockstore, state, epoch, config, logger, cache)
}
