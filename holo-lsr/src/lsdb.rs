//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::avl::AvlTree;
use crate::interface::Link;
use crate::packet::consts::{LspFlags, PduType};
use crate::packet::pdu::{Lsp, lsp_tlvs_build};
use crate::packet::tlv::{Ipv4Reach, IsReach};
use crate::packet::{LspId, SystemId};

// Default remaining lifetime of originated LSPs, in seconds.
pub const DFLT_LSP_LIFETIME: u16 = 1200;

// The link-state database.
//
// All reads and writes go through a single lock, held only for the
// duration of each individual database operation.
#[derive(Debug, Default)]
pub struct Lsdb {
    tree: Mutex<AvlTree<LspEntry>>,
}

// An LSP stored in the database.
#[derive(Clone, Debug)]
#[derive(Deserialize, Serialize)]
pub struct LspEntry {
    pub data: Lsp,
    pub last_update: DateTime<Utc>,
}

// Result of offering an LSP to the database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LspInstallResult {
    // The LSP was unknown and got installed.
    New,
    // The LSP replaced an older instance.
    Newer,
    // The LSP isn't more recent than the stored instance.
    Stale,
}

// ===== impl Lsdb =====

impl Lsdb {
    pub fn new() -> Self {
        Default::default()
    }

    // Installs a received LSP unless the database already holds an instance
    // with the same or a higher sequence number.
    //
    // Lookup and insertion happen in the same critical section.
    pub fn install(&self, lsp: Lsp) -> LspInstallResult {
        let key = lsp.key();
        let mut tree = self.tree.lock().unwrap();
        let result = match tree.get(key) {
            None => LspInstallResult::New,
            Some(lse) if lsp.seqno > lse.data.seqno => LspInstallResult::Newer,
            Some(_) => return LspInstallResult::Stale,
        };
        tree.insert(key, LspEntry::new(lsp), true);
        result
    }

    // Builds and stores a locally originated LSP, replacing any previous
    // instance.
    //
    // `build` runs under the database lock, so sequence numbers allocated
    // inside it are stored in allocation order.
    pub fn originate(&self, build: impl FnOnce() -> Lsp) -> Lsp {
        let mut tree = self.tree.lock().unwrap();
        let lsp = build();
        tree.insert(lsp.key(), LspEntry::new(lsp.clone()), true);
        lsp
    }

    pub fn get(&self, lsp_id: &LspId) -> Option<Lsp> {
        let tree = self.tree.lock().unwrap();
        tree.get(lsp_id.key()).map(|lse| lse.data.clone())
    }

    // Encodes the stored instance of the given LSP.
    pub fn encode(&self, lsp_id: &LspId) -> Option<Bytes> {
        let tree = self.tree.lock().unwrap();
        tree.get(lsp_id.key()).map(|lse| lse.data.encode())
    }

    // Returns the identifiers of all stored LSPs in key order.
    pub fn lsp_ids(&self) -> Vec<LspId> {
        let tree = self.tree.lock().unwrap();
        tree.values().map(|lse| lse.data.lsp_id).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Runs `f` over the committed database contents while holding the
    // database lock.
    pub fn with<R>(&self, f: impl FnOnce(&AvlTree<LspEntry>) -> R) -> R {
        let tree = self.tree.lock().unwrap();
        f(&tree)
    }
}

// ===== impl LspEntry =====

impl LspEntry {
    pub fn new(data: Lsp) -> Self {
        LspEntry {
            data,
            last_update: Utc::now(),
        }
    }
}

// ===== global functions =====

// Builds the local LSP from the current link state.
//
// Neighbors are taken from the links whose adjacency is up; prefixes and
// interface addresses from every configured link.
pub fn lsp_build(
    system_id: SystemId,
    links: &[Arc<Link>],
    seqno: u32,
    rem_lifetime: u16,
) -> Lsp {
    let is_reach = links
        .iter()
        .filter_map(|link| {
            let adj = link.adjacency();
            adj.up_neighbor().map(|neighbor| IsReach {
                metric: adj.metric,
                neighbor,
                pseudonode: 0,
            })
        })
        .collect::<Vec<_>>();
    let ipv4_addrs = links
        .iter()
        .filter_map(|link| link.config.address.map(|addr| addr.ip()))
        .collect::<Vec<_>>();
    let ipv4_reach = links
        .iter()
        .flat_map(|link| {
            let metric = link.config.metric;
            link.prefixes()
                .into_iter()
                .map(move |prefix| Ipv4Reach { prefix, metric })
        })
        .collect::<Vec<_>>();

    let lsp_id = LspId::from((system_id, 0, 0));
    let tlvs = lsp_tlvs_build(is_reach, ipv4_addrs, ipv4_reach);
    Lsp::new(
        PduType::LspL1,
        rem_lifetime,
        lsp_id,
        seqno,
        LspFlags::IS_TYPE1,
        tlvs,
    )
}
