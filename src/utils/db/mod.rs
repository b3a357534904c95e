// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::Context as _;
use cid::Cid;
use fvm_ipld_encoding::CborStore;
use multihash_codetable::Code::Blake2b256;
use serde::{Serialize, de::DeserializeOwned};

/// Extension methods for inserting and retrieving IPLD data with CIDs
pub trait CborStoreExt: CborStore {
    /// Default multihash code is [`multihash_codetable::Code::Blake2b256`]
    /// See <https://github.com/ipfs/go-ipld-cbor/blob/v0.0.6/store.go#L92>
    fn default_code() -> multihash_codetable::Code {
        Blake2b256
    }

    /// A wrapper of [`CborStore::put_cbor`] that omits code parameter to match store API in go
    fn put_cbor_default<S: Serialize>(&self, obj: &S) -> anyhow::Result<Cid> {
        self.put_cbor(obj, Self::default_code())
    }

    /// Get typed object from block store by `CID`, returns an error when the
    /// object is missing
    fn get_cbor_required<T: DeserializeOwned>(&self, cid: &Cid) -> anyhow::Result<T> {
        self.get_cbor(cid)?
            .with_context(|| format!("Entry not found in block store: cid={cid}"))
    }
}

impl<T: CborStore> CborStoreExt for T {}
