//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

//! Read-only management accessors.
//!
//! Every accessor returns an owned snapshot, serializable with serde, built by
//! traversing the instance's ordered stores.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::adjacency::AdjacencyState;
use crate::instance::Instance;
use crate::packet::{LspId, SystemId};
use crate::route::Route;
use crate::spf::SpfEntry;

#[derive(Clone, Debug, Serialize)]
pub struct AdjacencyInfo {
    pub link: String,
    pub state: AdjacencyState,
    pub neighbor_system_id: Option<SystemId>,
    pub metric: u32,
    pub neighbor_ip: Option<Ipv4Addr>,
    pub last_change: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TopologyInfo {
    pub entries: Vec<SpfEntry>,
    pub run_count: u64,
    pub last_run: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct InstanceInfo {
    pub system_id: SystemId,
    pub adjacencies: Vec<AdjacencyInfo>,
    pub lsp_ids: Vec<LspId>,
    pub topology: TopologyInfo,
    pub routes: Vec<Route>,
}

// ===== impl Instance =====

impl Instance {
    pub fn system_id(&self) -> SystemId {
        self.system_id
    }

    pub fn adjacencies(&self) -> Vec<AdjacencyInfo> {
        self.links
            .iter()
            .map(|link| {
                let adj = link.adjacency();
                AdjacencyInfo {
                    link: link.name.clone(),
                    state: adj.state,
                    neighbor_system_id: adj.neighbor_system_id,
                    metric: adj.metric,
                    neighbor_ip: adj.neighbor_ip,
                    last_change: adj.last_change,
                }
            })
            .collect()
    }

    pub fn lsp_ids(&self) -> Vec<LspId> {
        self.lsdb.lsp_ids()
    }

    pub fn topology(&self) -> TopologyInfo {
        let topology = self.topology.lock().unwrap();
        TopologyInfo {
            entries: topology.entries.values().cloned().collect(),
            run_count: topology.run_count,
            last_run: topology.last_run,
        }
    }

    pub fn routes(&self) -> Vec<Route> {
        let routes = self.routes.lock().unwrap();
        routes.values().cloned().collect()
    }

    pub fn info(&self) -> InstanceInfo {
        InstanceInfo {
            system_id: self.system_id(),
            adjacencies: self.adjacencies(),
            lsp_ids: self.lsp_ids(),
            topology: self.topology(),
            routes: self.routes(),
        }
    }
}
