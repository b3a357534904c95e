// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Concurrent, deterministic migration of Filecoin actor state trees across
//! network upgrades.

pub mod db;
pub mod shim;
pub mod state_migration;
pub mod utils;
