// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::sync::Arc;

use crate::shim::{address::Address, clock::ChainEpoch, state_tree::ActorState};
use anyhow::Context as _;
use fvm_ipld_blockstore::Blockstore;

use super::scope::CancellationToken;
use super::{ActorMigrationInput, MigrationCache, Migrator};

/// Defines migration result for a single actor migration.
#[derive(Debug)]
pub(super) struct MigrationJobOutput {
    pub address: Address,
    pub actor_state: ActorState,
}

/// Defines migration job for a single actor migration.
pub(super) struct MigrationJob<BS: Blockstore> {
    pub address: Address,
    pub actor_state: ActorState,
    pub actor_migration: Migrator<BS>,
    pub cache: Arc<dyn MigrationCache>,
}

impl<BS: Blockstore> MigrationJob<BS> {
    pub fn run(
        &self,
        store: &BS,
        prior_epoch: ChainEpoch,
        cancel: CancellationToken,
    ) -> anyhow::Result<MigrationJobOutput> {
        let result = self
            .actor_migration
            .migrate_state(
                store,
                ActorMigrationInput {
                    address: self.address,
                    balance: self.actor_state.balance.clone(),
                    head: self.actor_state.state,
                    prior_epoch,
                    cache: self.cache.clone(),
                    cancel,
                },
            )
            .with_context(|| {
                format!(
                    "state migration failed for {} actor, addr {}",
                    self.actor_state.code, self.address
                )
            })?;

        Ok(MigrationJobOutput {
            address: self.address,
            actor_state: ActorState::new(
                result.new_code_cid,
                result.new_head,
                self.actor_state.balance.clone(),
                self.actor_state.sequence,
            ),
        })
    }
}
