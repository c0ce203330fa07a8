//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::adjacency::{Adjacency, AdjacencyState};
use crate::debug::Debug;
use crate::error::Error;
use crate::flooding;
use crate::interface::{Link, LinkCfg};
use crate::lsdb::{DFLT_LSP_LIFETIME, Lsdb};
use crate::packet::SystemId;
use crate::route::Route;
use crate::spf::Topology;
use crate::tasks;
use crate::tasks::messages::input::{LspUpdateMsg, SpfTriggerMsg};
use crate::tasks::messages::output::{NetTxPduMsg, RouteInstallMsg};

pub const DFLT_FLOOD_INTERVAL: u64 = 5000;

// Process-wide protocol state, shared by every worker.
#[derive(Debug)]
pub struct Instance {
    pub config: InstanceCfg,
    pub system_id: SystemId,
    pub links: Vec<Arc<Link>>,
    pub lsdb: Lsdb,
    pub topology: Mutex<Topology>,
    pub routes: Mutex<BTreeMap<Ipv4Network, Route>>,
    // Sequence number of the last originated LSP.
    seqno: AtomicU32,
    pub tx: InstanceChannelsTx,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstanceCfg {
    pub system_id: SystemId,
    // Interval between flooding scans, in milliseconds.
    pub flood_interval: u64,
    // Remaining lifetime written in originated LSPs, in seconds.
    pub lsp_lifetime: u16,
    pub links: Vec<LinkCfg>,
}

#[derive(Clone, Debug)]
pub struct InstanceChannelsTx {
    pub spf_trigger: UnboundedSender<SpfTriggerMsg>,
    pub net_tx: UnboundedSender<NetTxPduMsg>,
    pub route_install: UnboundedSender<RouteInstallMsg>,
}

#[derive(Debug)]
pub struct InstanceChannelsRx {
    pub spf_trigger: UnboundedReceiver<SpfTriggerMsg>,
    pub net_tx: UnboundedReceiver<NetTxPduMsg>,
    pub route_install: UnboundedReceiver<RouteInstallMsg>,
}

// Handles of the running workers.
#[derive(Debug)]
pub struct InstanceTasks {
    pub lsp_update_tx: BTreeMap<String, UnboundedSender<LspUpdateMsg>>,
    handles: Vec<JoinHandle<()>>,
}

// ===== impl Instance =====

impl Instance {
    pub fn new(config: InstanceCfg) -> (Arc<Instance>, InstanceChannelsRx) {
        let (spf_triggerp, spf_triggerc) = mpsc::unbounded_channel();
        let (net_txp, net_txc) = mpsc::unbounded_channel();
        let (route_installp, route_installc) = mpsc::unbounded_channel();

        let links = config
            .links
            .iter()
            .cloned()
            .map(|link_cfg| Arc::new(Link::new(link_cfg)))
            .collect();

        let instance = Instance {
            system_id: config.system_id,
            config,
            links,
            lsdb: Lsdb::new(),
            topology: Default::default(),
            routes: Default::default(),
            seqno: AtomicU32::new(0),
            tx: InstanceChannelsTx {
                spf_trigger: spf_triggerp,
                net_tx: net_txp,
                route_install: route_installp,
            },
        };
        Debug::InstanceCreate(&instance.system_id).log();

        let rx = InstanceChannelsRx {
            spf_trigger: spf_triggerc,
            net_tx: net_txc,
            route_install: route_installc,
        };
        (Arc::new(instance), rx)
    }

    // Spawns the per-link LSP input and flooding workers, and the SPF
    // worker.
    pub fn start(
        self: &Arc<Self>,
        spf_triggerc: UnboundedReceiver<SpfTriggerMsg>,
    ) -> InstanceTasks {
        Debug::InstanceStart.log();

        let mut lsp_update_tx = BTreeMap::new();
        let mut handles = vec![];
        for link in &self.links {
            let (lsp_updatep, lsp_updatec) = mpsc::unbounded_channel();
            lsp_update_tx.insert(link.name.clone(), lsp_updatep);
            handles.push(tasks::lsp_input(self, link, lsp_updatec));
            handles.push(tasks::flood_scan(self, link));
        }
        handles.push(tasks::spf_worker(self, spf_triggerc));

        InstanceTasks {
            lsp_update_tx,
            handles,
        }
    }

    pub fn link(&self, name: &str) -> Option<&Arc<Link>> {
        self.links.iter().find(|link| link.name == name)
    }

    // Entry point of the neighbor handshake: stores the new adjacency and
    // regenerates the local LSP whenever the adjacency comes up or goes
    // down.
    pub fn adjacency_change(
        &self,
        link_name: &str,
        adj: Adjacency,
    ) -> Result<(), Error> {
        let link = self
            .link(link_name)
            .ok_or_else(|| Error::LinkNotFound(link_name.to_owned()))?;

        let new_state = adj.state;
        let old_state = link.adjacency_update(adj);
        if old_state != new_state
            && (old_state == AdjacencyState::Up
                || new_state == AdjacencyState::Up)
        {
            flooding::lsp_originate(self);
        }

        Ok(())
    }

    pub(crate) fn seqno_next(&self) -> u32 {
        self.seqno.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    pub(crate) fn spf_trigger(&self) {
        let _ = self.tx.spf_trigger.send(SpfTriggerMsg {});
    }
}

// ===== impl InstanceCfg =====

impl Default for InstanceCfg {
    fn default() -> InstanceCfg {
        InstanceCfg {
            system_id: Default::default(),
            flood_interval: DFLT_FLOOD_INTERVAL,
            lsp_lifetime: DFLT_LSP_LIFETIME,
            links: vec![],
        }
    }
}

// ===== impl InstanceTasks =====

impl InstanceTasks {
    pub fn lsp_update_tx(
        &self,
        link_name: &str,
    ) -> Option<&UnboundedSender<LspUpdateMsg>> {
        self.lsp_update_tx.get(link_name)
    }

    // Aborts every worker.
    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }
    }
}
