//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

macro_rules! assert_eq_hex {
    ($left:expr, $right:expr) => {
        if $left[..] != $right[..] {
            panic!(
                "assertion `left == right` failed\n  left: [{}]\n right: [{}]",
                $left
                    .iter()
                    .map(|b| format!("0x{:02x}", b))
                    .collect::<Vec<_>>()
                    .join(", "),
                $right
                    .iter()
                    .map(|b| format!("0x{:02x}", b))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    };
}

mod packet;
mod spf;
mod tasks;

use std::net::Ipv4Addr;
use std::sync::Arc;

use holo_lsr::adjacency::{Adjacency, AdjacencyState};
use holo_lsr::instance::{Instance, InstanceCfg, InstanceChannelsRx};
use holo_lsr::interface::LinkCfg;
use holo_lsr::packet::consts::{LspFlags, PduType};
use holo_lsr::packet::pdu::{Lsp, lsp_tlvs_build};
use holo_lsr::packet::tlv::{Ipv4Reach, IsReach};
use holo_lsr::packet::{LspId, SystemId};
use ipnetwork::Ipv4Network;

// ===== helper functions =====

fn sysid(s: &str) -> SystemId {
    s.parse().unwrap()
}

fn net4(addr: Ipv4Addr, prefixlen: u8) -> Ipv4Network {
    Ipv4Network::new(addr, prefixlen).unwrap()
}

// Creates an instance with one link per given name.
fn instance(
    system_id: &str,
    links: &[&str],
) -> (Arc<Instance>, InstanceChannelsRx) {
    let config = InstanceCfg {
        system_id: sysid(system_id),
        links: links
            .iter()
            .map(|name| LinkCfg {
                name: name.to_string(),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    };
    Instance::new(config)
}

fn adjacency_up(neighbor: &str, metric: u32) -> Adjacency {
    let mut adj = Adjacency::new(metric);
    adj.state = AdjacencyState::Up;
    adj.neighbor_system_id = Some(sysid(neighbor));
    adj
}

// Builds a non-pseudonode LSP advertising the given neighbors and prefixes.
fn lsp(
    system_id: &str,
    seqno: u32,
    neighbors: &[(&str, u32)],
    prefixes: &[(Ipv4Network, u32)],
) -> Lsp {
    let is_reach = neighbors.iter().map(|(neighbor, metric)| IsReach {
        metric: *metric,
        neighbor: sysid(neighbor),
        pseudonode: 0,
    });
    let ipv4_reach = prefixes
        .iter()
        .map(|(prefix, metric)| Ipv4Reach {
            prefix: *prefix,
            metric: *metric,
        });
    Lsp::new(
        PduType::LspL1,
        1200,
        LspId::from((sysid(system_id), 0, 0)),
        seqno,
        LspFlags::IS_TYPE1,
        lsp_tlvs_build(is_reach, [], ipv4_reach),
    )
}
