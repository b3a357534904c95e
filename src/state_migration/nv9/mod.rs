// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! This module contains the migration logic for the `NV9` upgrade, moving
//! every actor from actors version 2 to actors version 3.

mod migration;

use anyhow::Context as _;
use cid::Cid;
use cid::multihash::Multihash;
use fvm_ipld_encoding::IPLD_RAW;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};

pub use migration::{Nv9Migrators, run_migration};

/// Actors version of the tree being migrated.
pub const ACTORS_VERSION_IN: u32 = 2;
/// Actors version of the migrated tree.
pub const ACTORS_VERSION_OUT: u32 = 3;

/// Multihash code of the identity hash.
const IDENTITY_HASH: u64 = 0x00;

/// Builtin actor kinds of actors version 2.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinActor {
    Account,
    Cron,
    Init,
    StorageMarket,
    StorageMiner,
    Multisig,
    PaymentChannel,
    StoragePower,
    Reward,
    System,
    VerifiedRegistry,
    Stake,
}

impl BuiltinActor {
    /// Number of actor kinds every migration specification must cover.
    pub fn count() -> usize {
        Self::iter().count()
    }

    /// Kinds whose state layout is the same in both versions: only the code
    /// CID changes.
    pub fn is_pass_through(self) -> bool {
        matches!(
            self,
            BuiltinActor::Account | BuiltinActor::Cron | BuiltinActor::Reward | BuiltinActor::System
        )
    }

    /// Code CID of this actor kind in the given actors version: a raw CID
    /// whose identity multihash holds `fil/{version}/{name}`.
    pub fn code_cid(self, version: u32) -> anyhow::Result<Cid> {
        let name = format!("fil/{version}/{self}");
        let hash = Multihash::wrap(IDENTITY_HASH, name.as_bytes())
            .with_context(|| format!("invalid actor code name {name}"))?;
        Ok(Cid::new_v1(IPLD_RAW, hash))
    }
}
