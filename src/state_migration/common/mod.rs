// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Common code that's shared across all migration code.
//! Each network upgrade / state migration code lives in their own module.

use std::sync::Arc;

use crate::shim::{address::Address, clock::ChainEpoch, econ::TokenAmount};
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;

pub mod cache;
mod config;
mod errors;
mod logger;
mod migration_job;
pub mod migrators;
mod progress;
mod scope;
mod state_migration;

pub use cache::{MemMigrationCache, MigrationCache, SettingsMigrationCache};
pub use config::Config;
pub use errors::MigrationError;
pub use logger::{Logger, NoopLogger, TracingLogger};
pub use scope::CancellationToken;
pub use state_migration::StateMigration;

/// Shared handle to a migrator, the value type of the registry.
pub type Migrator<BS> = Arc<dyn ActorMigration<BS>>;

/// Input of a single actor migration.
#[derive(Clone)]
pub struct ActorMigrationInput {
    /// Actor's address
    pub address: Address,
    /// Actor's balance
    pub balance: TokenAmount,
    /// Actor's state head CID
    pub head: Cid,
    /// Epoch of last state transition prior to migration
    pub prior_epoch: ChainEpoch,
    /// Cache for sub-structures shared between actors, e.g. miner deadlines
    pub cache: Arc<dyn MigrationCache>,
    /// Set once the pass has failed elsewhere. Long running migrators should
    /// check it periodically.
    pub cancel: CancellationToken,
}

/// Output of actor migration job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorMigrationOutput {
    /// New CID for the actor
    pub new_code_cid: Cid,
    /// New state head CID
    pub new_head: Cid,
}

/// Trait that defines the interface for actor migration job.
///
/// Implementations must be pure functions of the input and the store
/// content: the migrated tree has to be identical on every node.
pub trait ActorMigration<BS: Blockstore>: Send + Sync {
    fn migrate_state(
        &self,
        store: &BS,
        input: ActorMigrationInput,
    ) -> anyhow::Result<ActorMigrationOutput>;

    /// Code CID of the migrated actor. Constant per migrator.
    fn migrated_code_cid(&self) -> Cid;
}
