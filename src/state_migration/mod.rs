// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Actor state tree migrations. The engine in [`common`] is shared by all
//! network upgrades, each upgrade lives in its own module.

pub mod common;
pub mod nv9;

pub use common::{
    ActorMigration, ActorMigrationInput, ActorMigrationOutput, CancellationToken, Config,
    Logger, MemMigrationCache, MigrationCache, MigrationError, Migrator, NoopLogger,
    SettingsMigrationCache, StateMigration, TracingLogger,
};
