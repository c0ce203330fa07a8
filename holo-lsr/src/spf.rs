//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::avl::AvlTree;
use crate::debug::Debug;
use crate::error::Error;
use crate::instance::Instance;
use crate::interface::Link;
use crate::lsdb::LspEntry;
use crate::packet::{LspId, SystemId};
use crate::route;

// Result of the most recent SPF run.
#[derive(Debug, Default)]
pub struct Topology {
    // Shortest-path entries keyed by System ID.
    pub entries: AvlTree<SpfEntry>,
    pub run_count: u64,
    pub last_run: Option<DateTime<Utc>>,
}

// A node on the shortest-path tree.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct SpfEntry {
    pub system_id: SystemId,
    pub distance: u32,
    // First hop towards the node, or none for the root.
    pub nexthop: Option<Nexthop>,
}

// First-hop adjacency.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Nexthop {
    pub link: String,
    pub system_id: SystemId,
    pub addr: Option<Ipv4Addr>,
}

// ===== global functions =====

// Runs the SPF computation for the instance, replacing its topology and
// route candidates.
//
// When the local LSP is missing the run is aborted and the previous topology
// is kept.
pub fn run(instance: &Instance) -> Result<(), Error> {
    Debug::SpfStart(&instance.system_id).log();

    let (entries, routes) = instance.lsdb.with(|lsdb| {
        let entries = compute_spf(instance.system_id, &instance.links, lsdb)?;
        let routes = route::compute_routes(instance.system_id, &entries, lsdb);
        Ok::<_, Error>((entries, routes))
    })?;

    // Update topology and statistics.
    let vertices = entries.len();
    let run_count = {
        let mut topology = instance.topology.lock().unwrap();
        topology.entries = entries;
        topology.run_count += 1;
        topology.last_run = Some(Utc::now());
        topology.run_count
    };
    Debug::SpfFinish(vertices, run_count).log();

    route::update(instance, routes);

    Ok(())
}

// Computes the shortest-path tree rooted at `system_id`.
//
// Only fragment zero of each node's non-pseudonode LSP is consulted.
pub fn compute_spf(
    system_id: SystemId,
    links: &[Arc<Link>],
    lsdb: &AvlTree<LspEntry>,
) -> Result<AvlTree<SpfEntry>, Error> {
    // Ensure the local LSP is present.
    if lsdb.get(vertex_lsp_key(system_id)).is_none() {
        return Err(Error::SpfRootNotFound(system_id));
    }

    // Initialize PATH with the root.
    let mut path = AvlTree::new();
    path.insert(
        system_id.key(),
        SpfEntry {
            system_id,
            distance: 0,
            nexthop: None,
        },
        false,
    );

    // Initialize TENT with the directly connected neighbors.
    let mut tent = BTreeMap::new();
    for link in links {
        let adj = link.adjacency();
        let Some(neighbor) = adj.up_neighbor() else {
            continue;
        };
        if path.contains_key(neighbor.key()) {
            continue;
        }
        let nexthop = Nexthop {
            link: link.name.clone(),
            system_id: neighbor,
            addr: adj.neighbor_ip,
        };
        cand_add(&mut tent, neighbor, adj.metric, Some(nexthop));
    }

    // Main SPF loop.
    while let Some(((distance, vertex_id), vertex)) = tent.pop_first() {
        // Move vertex to PATH.
        let nexthop = vertex.nexthop.clone();
        path.insert(vertex_id.key(), vertex, false);

        // Iterate over all neighbors advertised by the vertex's LSP.
        let Some(lse) = lsdb.get(vertex_lsp_key(vertex_id)) else {
            continue;
        };
        for nbr in lse.data.is_reach() {
            // Check if the neighbor is already on PATH.
            if path.contains_key(nbr.neighbor.key()) {
                continue;
            }

            // The first hop is inherited from the parent vertex.
            let distance = distance.saturating_add(nbr.metric);
            cand_add(&mut tent, nbr.neighbor, distance, nexthop.clone());
        }
    }

    Ok(path)
}

// ===== helper functions =====

fn vertex_lsp_key(system_id: SystemId) -> u64 {
    LspId::from((system_id, 0, 0)).key()
}

// Adds a candidate to TENT, or relaxes the distance of an existing one.
fn cand_add(
    tent: &mut BTreeMap<(u32, SystemId), SpfEntry>,
    system_id: SystemId,
    distance: u32,
    nexthop: Option<Nexthop>,
) {
    // Check if this node is already present on TENT.
    // TODO: optimize lookup.
    if let Some((cand_key, cand)) =
        tent.iter().find(|(_, cand)| cand.system_id == system_id)
    {
        match distance.cmp(&cand.distance) {
            Ordering::Less => {
                // Remove the candidate since its key has changed. It will be
                // re-added with the new distance and next hop below.
                let cand_key = *cand_key;
                tent.remove(&cand_key);
            }
            Ordering::Equal | Ordering::Greater => {
                // Keep the existing path.
                return;
            }
        }
    }

    tent.insert(
        (distance, system_id),
        SpfEntry {
            system_id,
            distance,
            nexthop,
        },
    );
}
