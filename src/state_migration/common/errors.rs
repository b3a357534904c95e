// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;

use crate::shim::address::Address;

/// Classified migration failures. Everything else (store, encoding and
/// migrator errors) travels as plain [`anyhow::Error`] with context.
#[derive(thiserror::Error, Debug)]
pub enum MigrationError {
    #[error("invalid migration config with {max_workers} workers")]
    InvalidConfig { max_workers: usize },
    #[error(
        "incomplete migration specification with {count} code CIDs and {deferred} deferred, expected {expected}"
    )]
    IncompleteRegistry {
        count: usize,
        deferred: usize,
        expected: usize,
    },
    #[error("no migration registered for code {code} of actor {address}")]
    UnmappedCode { code: Cid, address: Address },
    #[error("state migration cancelled")]
    Cancelled,
}
