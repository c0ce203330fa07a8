//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::collections::BTreeMap;
use std::sync::Arc;

use const_addrs::ip4;
use holo_lsr::avl::AvlTree;
use holo_lsr::error::Error;
use holo_lsr::flooding;
use holo_lsr::interface::{Link, LinkCfg};
use holo_lsr::lsdb::LspEntry;
use holo_lsr::packet::SystemId;
use holo_lsr::packet::pdu::Lsp;
use holo_lsr::route::compute_routes;
use holo_lsr::spf::{self, SpfEntry, compute_spf};
use maplit::btreemap;

use crate::{adjacency_up, instance, lsp, net4, sysid};

const R1: &str = "1111.1111.1111";
const R2: &str = "1111.1111.1112";
const R3: &str = "1111.1111.1113";
const R4: &str = "1111.1111.1114";

// ===== helper functions =====

// Creates one link per (name, neighbor, metric) tuple, with its adjacency up.
fn links(adjacencies: &[(&str, &str, u32)]) -> Vec<Arc<Link>> {
    adjacencies
        .iter()
        .map(|(name, neighbor, metric)| {
            let link = Link::new(LinkCfg {
                name: name.to_string(),
                ..Default::default()
            });
            link.adjacency_update(adjacency_up(neighbor, *metric));
            Arc::new(link)
        })
        .collect()
}

fn lsdb(lsps: impl IntoIterator<Item = Lsp>) -> AvlTree<LspEntry> {
    lsps.into_iter()
        .map(|lsp| (lsp.key(), LspEntry::new(lsp)))
        .collect()
}

// R1 -- R2 -- R3, metric 10 on every segment.
fn line_lsdb() -> AvlTree<LspEntry> {
    lsdb([
        lsp(R1, 1, &[(R2, 10)], &[]),
        lsp(R2, 1, &[(R1, 10), (R3, 10)], &[]),
        lsp(R3, 1, &[(R2, 10)], &[]),
    ])
}

fn distances(entries: &AvlTree<SpfEntry>) -> BTreeMap<SystemId, u32> {
    entries
        .values()
        .map(|entry| (entry.system_id, entry.distance))
        .collect()
}

// ===== tests =====

#[test]
fn test_spf_line_from_r2() {
    let links = links(&[("eth0", R1, 10), ("eth1", R3, 10)]);
    let entries = compute_spf(sysid(R2), &links, &line_lsdb()).unwrap();
    assert_eq!(
        distances(&entries),
        btreemap! {
            sysid(R1) => 10,
            sysid(R2) => 0,
            sysid(R3) => 10,
        }
    );

    let nexthop = |system_id: &str| {
        entries
            .get(sysid(system_id).key())
            .and_then(|entry| entry.nexthop.as_ref())
            .map(|nexthop| nexthop.link.clone())
    };
    assert_eq!(nexthop(R1).as_deref(), Some("eth0"));
    assert_eq!(nexthop(R2), None);
    assert_eq!(nexthop(R3).as_deref(), Some("eth1"));
}

#[test]
fn test_spf_line_from_r1() {
    let links = links(&[("eth0", R2, 10)]);
    let entries = compute_spf(sysid(R1), &links, &line_lsdb()).unwrap();
    assert_eq!(
        distances(&entries),
        btreemap! {
            sysid(R1) => 0,
            sysid(R2) => 10,
            sysid(R3) => 20,
        }
    );

    // The first hop is inherited from R2.
    let r3 = entries.get(sysid(R3).key()).unwrap();
    let nexthop = r3.nexthop.as_ref().unwrap();
    assert_eq!(nexthop.link, "eth0");
    assert_eq!(nexthop.system_id, sysid(R2));
}

#[test]
fn test_spf_line_from_r3() {
    let links = links(&[("eth0", R2, 10)]);
    let entries = compute_spf(sysid(R3), &links, &line_lsdb()).unwrap();
    assert_eq!(
        distances(&entries),
        btreemap! {
            sysid(R1) => 20,
            sysid(R2) => 10,
            sysid(R3) => 0,
        }
    );
}

#[test]
fn test_spf_shorter_path() {
    // The direct R1 -- R3 link is more expensive than going through R2.
    let links = links(&[("eth0", R2, 10), ("eth1", R3, 50)]);
    let lsdb = lsdb([
        lsp(R1, 1, &[(R2, 10), (R3, 50)], &[]),
        lsp(R2, 1, &[(R1, 10), (R3, 10)], &[]),
        lsp(R3, 1, &[(R1, 50), (R2, 10)], &[]),
    ]);
    let entries = compute_spf(sysid(R1), &links, &lsdb).unwrap();
    let r3 = entries.get(sysid(R3).key()).unwrap();
    assert_eq!(r3.distance, 20);
    assert_eq!(r3.nexthop.as_ref().unwrap().link, "eth0");
}

#[test]
fn test_spf_missing_lsp() {
    // R4 has no LSP but is still reachable through R2.
    let links = links(&[("eth0", R2, 10)]);
    let lsdb = lsdb([
        lsp(R1, 1, &[(R2, 10)], &[]),
        lsp(R2, 1, &[(R1, 10), (R4, 5)], &[]),
    ]);
    let entries = compute_spf(sysid(R1), &links, &lsdb).unwrap();
    assert_eq!(
        distances(&entries),
        btreemap! {
            sysid(R1) => 0,
            sysid(R2) => 10,
            sysid(R4) => 15,
        }
    );
}

#[test]
fn test_spf_root_not_found() {
    let links = links(&[("eth0", R2, 10)]);
    let lsdb = lsdb([lsp(R2, 1, &[(R1, 10)], &[])]);
    let result = compute_spf(sysid(R1), &links, &lsdb);
    assert!(matches!(
        result,
        Err(Error::SpfRootNotFound(system_id)) if system_id == sysid(R1)
    ));
}

#[test]
fn test_routes() {
    let links = links(&[("eth0", R2, 10)]);
    let lsdb = lsdb([
        lsp(R1, 1, &[(R2, 10)], &[(net4(ip4!("10.0.1.0"), 24), 10)]),
        lsp(
            R2,
            1,
            &[(R1, 10), (R3, 10)],
            &[
                (net4(ip4!("10.0.1.0"), 24), 10),
                (net4(ip4!("10.0.2.0"), 24), 5),
            ],
        ),
        lsp(
            R3,
            1,
            &[(R2, 10)],
            &[
                (net4(ip4!("10.0.2.0"), 24), 1),
                (net4(ip4!("10.0.3.1"), 24), 10),
            ],
        ),
    ]);
    let entries = compute_spf(sysid(R1), &links, &lsdb).unwrap();
    let routes = compute_routes(sysid(R1), &entries, &lsdb);

    let routes = routes
        .into_values()
        .map(|route| {
            assert_eq!(route.nexthop.link, "eth0");
            (route.prefix, (route.metric, route.advertiser))
        })
        .collect::<BTreeMap<_, _>>();
    assert_eq!(
        routes,
        btreemap! {
            net4(ip4!("10.0.2.0"), 24) => (15, sysid(R2)),
            net4(ip4!("10.0.3.0"), 24) => (30, sysid(R3)),
        }
    );
}

#[test]
fn test_spf_run() {
    let (instance, mut rx) = instance(R1, &["eth0"]);

    // No local LSP yet.
    let result = spf::run(&instance);
    assert!(matches!(result, Err(Error::SpfRootNotFound(_))));
    let topology = instance.topology();
    assert_eq!(topology.run_count, 0);
    assert!(topology.entries.is_empty());

    instance
        .adjacency_change("eth0", adjacency_up(R2, 10))
        .unwrap();
    let lsp2 = lsp(R2, 1, &[(R1, 10)], &[(net4(ip4!("10.0.2.0"), 24), 10)]);
    flooding::lsp_input(&instance, "eth0", &lsp2.encode()).unwrap();

    spf::run(&instance).unwrap();
    let topology = instance.topology();
    assert_eq!(topology.run_count, 1);
    assert!(topology.last_run.is_some());
    assert_eq!(
        topology
            .entries
            .iter()
            .map(|entry| (entry.system_id, entry.distance))
            .collect::<Vec<_>>(),
        vec![(sysid(R1), 0), (sysid(R2), 10)]
    );

    let msg = rx.route_install.try_recv().unwrap();
    assert_eq!(msg.routes.len(), 1);
    assert_eq!(msg.routes[0].prefix, net4(ip4!("10.0.2.0"), 24));
    assert_eq!(msg.routes[0].metric, 20);
    assert_eq!(instance.routes(), msg.routes);

    // Unchanged routes aren't reinstalled.
    spf::run(&instance).unwrap();
    assert_eq!(instance.topology().run_count, 2);
    assert!(rx.route_install.try_recv().is_err());
}

#[test]
fn test_spf_run_root_missing_keeps_topology() {
    let (instance, mut rx) = instance(R1, &["eth0"]);

    // Topology left behind by an earlier run.
    let entries =
        compute_spf(sysid(R1), &links(&[("eth0", R2, 10)]), &line_lsdb())
            .unwrap();
    {
        let mut topology = instance.topology.lock().unwrap();
        topology.entries = entries;
        topology.run_count = 1;
        topology.last_run = Some(chrono::Utc::now());
    }
    let before = instance.topology();
    assert_eq!(before.entries.len(), 3);

    // The local LSP is missing: the run is aborted.
    let result = spf::run(&instance);
    assert!(matches!(result, Err(Error::SpfRootNotFound(_))));

    let after = instance.topology();
    assert_eq!(after.entries, before.entries);
    assert_eq!(after.run_count, 1);
    assert_eq!(after.last_run, before.last_run);
    assert!(instance.routes().is_empty());
    assert!(rx.route_install.try_recv().is_err());
}
