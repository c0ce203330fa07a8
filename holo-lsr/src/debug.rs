//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use tracing::{debug, debug_span};

use crate::adjacency::AdjacencyState;
use crate::packet::pdu::Lsp;
use crate::packet::{LspId, SystemId};

// Protocol debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    // Instances
    InstanceCreate(&'a SystemId),
    InstanceStart,
    // Adjacencies
    AdjacencyStateChange(&'a str, AdjacencyState, AdjacencyState),
    // Network
    PduRx(&'a str, &'a Lsp),
    TlvTruncated(u8, u8, usize),
    // Flooding
    LspInstall(&'a str, &'a Lsp),
    LspDiscard(&'a str, &'a Lsp),
    LspOriginate(&'a Lsp),
    LspFlood(&'a str, &'a LspId),
    // SPF
    SpfStart(&'a SystemId),
    SpfFinish(usize, u64),
    RoutesUpdate(usize),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub(crate) fn log(&self) {
        match self {
            Debug::InstanceCreate(system_id) => {
                debug!(%system_id, "{}", self);
            }
            Debug::InstanceStart => {
                debug!("{}", self);
            }
            Debug::AdjacencyStateChange(name, old_state, new_state) => {
                debug_span!("link", %name).in_scope(|| {
                    debug!(%old_state, %new_state, "{}", self);
                })
            }
            Debug::PduRx(name, lsp) => {
                // Parent span(s): link
                debug_span!("network").in_scope(|| {
                    debug_span!("input").in_scope(|| {
                        let data = serde_json::to_string(&lsp)
                            .unwrap_or_else(|error| error.to_string());
                        debug!(link = %name, %data, "{}", self);
                    })
                })
            }
            Debug::TlvTruncated(tlv_type, tlv_len, remaining) => {
                debug!(%tlv_type, %tlv_len, %remaining, "{}", self);
            }
            Debug::LspInstall(name, lsp) | Debug::LspDiscard(name, lsp) => {
                // Parent span(s): link
                debug!(
                    link = %name,
                    lsp_id = %lsp.lsp_id,
                    seqno = %lsp.seqno,
                    "{}", self
                );
            }
            Debug::LspOriginate(lsp) => {
                debug!(
                    lsp_id = %lsp.lsp_id,
                    seqno = %lsp.seqno,
                    tlvs = %lsp.tlvs.len(),
                    "{}", self
                );
            }
            Debug::LspFlood(name, lsp_id) => {
                // Parent span(s): link
                debug!(link = %name, %lsp_id, "{}", self);
            }
            Debug::SpfStart(system_id) => {
                // Parent span(s): spf
                debug!(root = %system_id, "{}", self);
            }
            Debug::SpfFinish(vertices, run_count) => {
                // Parent span(s): spf
                debug!(%vertices, %run_count, "{}", self);
            }
            Debug::RoutesUpdate(routes) => {
                // Parent span(s): spf
                debug!(%routes, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::InstanceCreate(..) => {
                write!(f, "instance created")
            }
            Debug::InstanceStart => {
                write!(f, "starting instance")
            }
            Debug::AdjacencyStateChange(..) => {
                write!(f, "adjacency state change")
            }
            Debug::PduRx(..) => {
                write!(f, "PDU")
            }
            Debug::TlvTruncated(..) => {
                write!(f, "TLV length exceeds PDU, stopping TLV parsing")
            }
            Debug::LspInstall(..) => {
                write!(f, "installing LSP")
            }
            Debug::LspDiscard(..) => {
                write!(f, "discarding LSP")
            }
            Debug::LspOriginate(..) => {
                write!(f, "originating LSP")
            }
            Debug::LspFlood(..) => {
                write!(f, "flooding LSP")
            }
            Debug::SpfStart(..) => {
                write!(f, "starting SPF computation")
            }
            Debug::SpfFinish(..) => {
                write!(f, "SPF computation finished")
            }
            Debug::RoutesUpdate(..) => {
                write!(f, "route candidates updated")
            }
        }
    }
}
