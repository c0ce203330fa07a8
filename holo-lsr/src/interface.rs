//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::collections::BTreeMap;
use std::sync::{Mutex, RwLock};

use chrono::Utc;
use ipnetwork::Ipv4Network;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::adjacency::{Adjacency, AdjacencyState};
use crate::debug::Debug;
use crate::packet::LspId;

pub const DFLT_LINK_METRIC: u32 = 10;

// A configured link.
#[derive(Debug)]
pub struct Link {
    pub name: String,
    pub config: LinkCfg,
    // Adjacency slot, written only by the neighbor handshake.
    adj: RwLock<Adjacency>,
    // Flooding bookkeeping keyed by LSP database key.
    flood_states: Mutex<BTreeMap<u64, FloodState>>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkCfg {
    pub name: String,
    pub metric: u32,
    pub address: Option<Ipv4Network>,
    pub prefixes: Vec<Ipv4Network>,
}

// Per (link, LSP) flooding flags.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct FloodState {
    pub lsp_id: LspId,
    // Send Routing Message: the LSP must be sent on this link.
    pub srm: bool,
    // Send Sequence Number: reserved, never set on broadcast links.
    pub ssn: bool,
}

// ===== impl Link =====

impl Link {
    pub fn new(config: LinkCfg) -> Link {
        let adj = Adjacency::new(config.metric);
        Link {
            name: config.name.clone(),
            config,
            adj: RwLock::new(adj),
            flood_states: Default::default(),
        }
    }

    // Returns a snapshot of the link's adjacency.
    pub fn adjacency(&self) -> Adjacency {
        self.adj.read().unwrap().clone()
    }

    // Replaces the adjacency, returning the previous state.
    pub fn adjacency_update(&self, mut adj: Adjacency) -> AdjacencyState {
        let mut slot = self.adj.write().unwrap();
        let old_state = slot.state;
        if old_state != adj.state {
            adj.last_change = Some(Utc::now());
            Debug::AdjacencyStateChange(&self.name, old_state, adj.state).log();
        } else {
            adj.last_change = slot.last_change;
        }
        *slot = adj;
        old_state
    }

    // Returns the prefixes this link contributes to the local LSP: the
    // network of the link address followed by the configured prefixes.
    pub fn prefixes(&self) -> Vec<Ipv4Network> {
        self.config
            .address
            .into_iter()
            .filter_map(|addr| {
                Ipv4Network::new(addr.network(), addr.prefix()).ok()
            })
            .chain(self.config.prefixes.iter().copied())
            .unique()
            .collect()
    }

    // Sets or clears the SRM flag of the given LSP, creating its flood state
    // on first sight.
    pub fn srm_set(&self, lsp_id: LspId, srm: bool) {
        let mut flood_states = self.flood_states.lock().unwrap();
        flood_states
            .entry(lsp_id.key())
            .and_modify(|state| state.srm = srm)
            .or_insert(FloodState {
                lsp_id,
                srm,
                ssn: false,
            });
    }

    // Collects the LSPs with SRM set and clears their flags. Nothing is
    // collected unless the adjacency is up.
    pub fn srm_take(&self) -> Vec<LspId> {
        if !self.adjacency().is_up() {
            return vec![];
        }

        let mut flood_states = self.flood_states.lock().unwrap();
        flood_states
            .values_mut()
            .filter(|state| state.srm)
            .map(|state| {
                state.srm = false;
                state.lsp_id
            })
            .collect()
    }

    pub fn flood_state(&self, lsp_id: &LspId) -> Option<FloodState> {
        let flood_states = self.flood_states.lock().unwrap();
        flood_states.get(&lsp_id.key()).copied()
    }

    pub fn flood_states(&self) -> Vec<FloodState> {
        let flood_states = self.flood_states.lock().unwrap();
        flood_states.values().copied().collect()
    }
}

// ===== impl LinkCfg =====

impl Default for LinkCfg {
    fn default() -> LinkCfg {
        LinkCfg {
            name: Default::default(),
            metric: DFLT_LINK_METRIC,
            address: None,
            prefixes: vec![],
        }
    }
}
