//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::time::Duration;

use const_addrs::ip4;
use holo_lsr::instance::{Instance, InstanceCfg};
use holo_lsr::interface::LinkCfg;
use holo_lsr::packet::LspId;
use holo_lsr::packet::pdu::Lsp;
use holo_lsr::tasks::messages::input::LspUpdateMsg;

use crate::{adjacency_up, lsp, net4, sysid};

const TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_workers() {
    let config = InstanceCfg {
        system_id: sysid("1111.1111.1111"),
        flood_interval: 10,
        links: vec![
            LinkCfg {
                name: "eth0".to_owned(),
                ..Default::default()
            },
            LinkCfg {
                name: "eth1".to_owned(),
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let (instance, mut rx) = Instance::new(config);
    let tasks = instance.start(rx.spf_trigger);

    instance
        .adjacency_change("eth0", adjacency_up("1111.1111.1112", 10))
        .unwrap();

    // The regenerated local LSP is flooded on the link that came up.
    let msg = tokio::time::timeout(TIMEOUT, rx.net_tx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.ifname, "eth0");
    let lsp_local = Lsp::decode(&msg.data, 0).unwrap();
    assert_eq!(
        lsp_local.lsp_id,
        LspId::from((sysid("1111.1111.1111"), 0, 0))
    );
    assert_eq!(lsp_local.seqno, 1);

    // A neighbor LSP received on the link ends up in the routing table.
    let lsp2 = lsp(
        "1111.1111.1112",
        1,
        &[("1111.1111.1111", 10)],
        &[(net4(ip4!("10.0.2.0"), 24), 10)],
    );
    tasks
        .lsp_update_tx("eth0")
        .unwrap()
        .send(LspUpdateMsg {
            data: lsp2.encode(),
        })
        .unwrap();
    let msg = tokio::time::timeout(TIMEOUT, rx.route_install.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(msg.routes.len(), 1);
    assert_eq!(msg.routes[0].prefix, net4(ip4!("10.0.2.0"), 24));
    assert_eq!(msg.routes[0].advertiser, sysid("1111.1111.1112"));
    assert_eq!(instance.lsdb.get(&lsp2.lsp_id), Some(lsp2));

    // eth1 has no adjacency, so nothing is flooded there.
    assert!(rx.net_tx.try_recv().is_err());

    tasks.shutdown();
}
