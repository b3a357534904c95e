// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Actor state tree: a HAMT mapping actor addresses to their [`ActorState`].

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_hamt::{BytesKey, Hamt};

use super::{address::Address, econ::TokenAmount};

/// Bit width of the actors HAMT.
pub const HAMT_BIT_WIDTH: u32 = 5;

/// State of all actor implementations. Records are never mutated in place by
/// the migration, a new record is built for the output tree.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ActorState {
    /// Link to code for the actor.
    pub code: Cid,
    /// Link to the state of the actor.
    pub state: Cid,
    /// Sequence of the actor.
    pub sequence: u64,
    /// Tokens available to the actor.
    pub balance: TokenAmount,
}

impl ActorState {
    pub fn new(code: Cid, state: Cid, balance: TokenAmount, sequence: u64) -> Self {
        Self {
            code,
            state,
            sequence,
            balance,
        }
    }
}

/// State tree keyed by the actor address bytes.
pub struct StateTree<S> {
    hamt: Hamt<S, ActorState>,
}

fn hamt_config() -> fvm_ipld_hamt::Config {
    fvm_ipld_hamt::Config {
        bit_width: HAMT_BIT_WIDTH,
        ..Default::default()
    }
}

impl<S: Blockstore> StateTree<S> {
    /// Creates an empty state tree.
    pub fn new(store: S) -> Self {
        Self {
            hamt: Hamt::new_with_config(store, hamt_config()),
        }
    }

    /// Loads a state tree from its root.
    pub fn new_from_root(store: S, root: &Cid) -> anyhow::Result<Self> {
        let hamt = Hamt::load_with_config(root, store, hamt_config())
            .with_context(|| format!("failed to load state tree {root}"))?;
        Ok(Self { hamt })
    }

    pub fn get_actor(&self, addr: &Address) -> anyhow::Result<Option<ActorState>> {
        Ok(self.hamt.get(&BytesKey(addr.to_bytes()))?.cloned())
    }

    /// Same as [`StateTree::get_actor`], but returns an error if the actor
    /// is missing.
    pub fn get_required_actor(&self, addr: &Address) -> anyhow::Result<ActorState> {
        self.get_actor(addr)?
            .with_context(|| format!("actor {addr} not found in state tree"))
    }

    pub fn set_actor(&mut self, addr: &Address, actor: ActorState) -> anyhow::Result<()> {
        self.hamt.set(BytesKey(addr.to_bytes()), actor)?;
        Ok(())
    }

    /// Visits every actor in the stable HAMT order. Iteration stops at the
    /// first error returned by `f`.
    pub fn for_each<F>(&self, mut f: F) -> anyhow::Result<()>
    where
        F: FnMut(Address, &ActorState) -> anyhow::Result<()>,
    {
        self.hamt
            .for_each(|key, actor| {
                let addr = Address::from_bytes(&key.0)?;
                f(addr, actor)
            })
            .map_err(|e| match e {
                // hand back the callback's own error so callers can downcast it
                fvm_ipld_hamt::Error::Dynamic(e) => e,
                e => e.into(),
            })
    }

    /// Persists pending changes and returns the root of the tree.
    pub fn flush(&mut self) -> anyhow::Result<Cid> {
        Ok(self.hamt.flush()?)
    }
}
