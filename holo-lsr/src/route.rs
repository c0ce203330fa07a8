//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::collections::{BTreeMap, BTreeSet};

use ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

use crate::avl::AvlTree;
use crate::debug::Debug;
use crate::instance::Instance;
use crate::lsdb::LspEntry;
use crate::packet::{LspId, SystemId};
use crate::spf::{Nexthop, SpfEntry};
use crate::tasks::messages::output::RouteInstallMsg;

// Route candidate handed to the route installer.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Route {
    pub prefix: Ipv4Network,
    pub metric: u32,
    pub advertiser: SystemId,
    pub nexthop: Nexthop,
}

// ===== global functions =====

// Derives route candidates from a shortest-path tree.
//
// Every prefix advertised by a reachable node becomes a candidate with the
// node's distance plus the prefix metric; the lowest metric wins. Prefixes
// advertised by the local node are connected and skipped.
pub fn compute_routes(
    system_id: SystemId,
    topology: &AvlTree<SpfEntry>,
    lsdb: &AvlTree<LspEntry>,
) -> BTreeMap<Ipv4Network, Route> {
    let lsp_key = |system_id: SystemId| LspId::from((system_id, 0, 0)).key();
    let local_prefixes = lsdb
        .get(lsp_key(system_id))
        .map(|lse| {
            lse.data
                .ipv4_reach()
                .filter_map(|reach| prefix_normalize(reach.prefix))
                .collect::<BTreeSet<_>>()
        })
        .unwrap_or_default();

    let mut routes: BTreeMap<Ipv4Network, Route> = BTreeMap::new();
    for entry in topology.values() {
        let Some(nexthop) = &entry.nexthop else {
            continue;
        };
        let Some(lse) = lsdb.get(lsp_key(entry.system_id)) else {
            continue;
        };

        for reach in lse.data.ipv4_reach() {
            let Some(prefix) = prefix_normalize(reach.prefix) else {
                continue;
            };
            if local_prefixes.contains(&prefix) {
                continue;
            }

            let metric = entry.distance.saturating_add(reach.metric);
            if let Some(route) = routes.get(&prefix)
                && route.metric <= metric
            {
                continue;
            }
            routes.insert(
                prefix,
                Route {
                    prefix,
                    metric,
                    advertiser: entry.system_id,
                    nexthop: nexthop.clone(),
                },
            );
        }
    }

    routes
}

// Replaces the instance's route candidates, handing them to the route
// installer when they changed.
pub(crate) fn update(
    instance: &Instance,
    routes: BTreeMap<Ipv4Network, Route>,
) {
    let mut current = instance.routes.lock().unwrap();
    if *current == routes {
        return;
    }

    Debug::RoutesUpdate(routes.len()).log();
    let msg = RouteInstallMsg {
        routes: routes.values().cloned().collect(),
    };
    *current = routes;
    let _ = instance.tx.route_install.send(msg);
}

// ===== helper functions =====

// Clears the host bits of a prefix.
fn prefix_normalize(prefix: Ipv4Network) -> Option<Ipv4Network> {
    Ipv4Network::new(prefix.network(), prefix.prefix()).ok()
}
