//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use bytes::Bytes;

use crate::debug::Debug;
use crate::error::Error;
use crate::instance::Instance;
use crate::interface::Link;
use crate::lsdb::{self, LspInstallResult};
use crate::packet::pdu::Lsp;
use crate::tasks::messages::output::NetTxPduMsg;

// Outcome of processing a received LSP.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LspInputResult {
    // The LSP was installed and scheduled for flooding on the other links.
    Installed,
    // The LSP wasn't newer than the stored instance and was dropped.
    Discarded,
}

// ===== global functions =====

// Processes an LSP received on the given link.
//
// The database update and the per-link SRM updates are separate critical
// sections: the database lock is released before any link lock is taken.
pub fn lsp_input(
    instance: &Instance,
    link_name: &str,
    data: &Bytes,
) -> Result<LspInputResult, Error> {
    if instance.link(link_name).is_none() {
        return Err(Error::LinkNotFound(link_name.to_owned()));
    }

    // Decode the LSP. Malformed frames are dropped.
    let lsp = Lsp::decode(data, 0)
        .map_err(|error| Error::PduDecodeError(link_name.to_owned(), error))?;
    Debug::PduRx(link_name, &lsp).log();

    let lsp_id = lsp.lsp_id;
    match instance.lsdb.install(lsp.clone()) {
        LspInstallResult::New | LspInstallResult::Newer => {
            Debug::LspInstall(link_name, &lsp).log();
        }
        LspInstallResult::Stale => {
            Debug::LspDiscard(link_name, &lsp).log();
            return Ok(LspInputResult::Discarded);
        }
    }

    // Flood on every link except the one the LSP came from.
    for link in &instance.links {
        link.srm_set(lsp_id, link.name != link_name);
    }

    instance.spf_trigger();

    Ok(LspInputResult::Installed)
}

// Sends every LSP whose SRM flag is set on the link, clearing the flags.
//
// Returns the number of LSPs sent. If the output channel is closed, the
// flags of the unsent LSPs are set again.
pub fn flood_scan(instance: &Instance, link: &Link) -> usize {
    let lsp_ids = link.srm_take();
    let mut sent = 0;

    for (idx, lsp_id) in lsp_ids.iter().enumerate() {
        let Some(data) = instance.lsdb.encode(lsp_id) else {
            Error::LspNotFound(link.name.clone(), *lsp_id).log();
            continue;
        };

        let msg = NetTxPduMsg {
            ifname: link.name.clone(),
            data,
        };
        if instance.tx.net_tx.send(msg).is_err() {
            for lsp_id in &lsp_ids[idx..] {
                link.srm_set(*lsp_id, true);
            }
            Error::NetTxClosed(link.name.clone()).log();
            break;
        }
        Debug::LspFlood(&link.name, lsp_id).log();
        sent += 1;
    }

    sent
}

// Regenerates the local LSP from the current link state and schedules it
// for flooding on every link.
//
// The sequence number is allocated and the LSP stored in the same database
// critical section, so concurrent originations never store an older LSP
// over a newer one.
pub fn lsp_originate(instance: &Instance) -> Lsp {
    let lsp = instance.lsdb.originate(|| {
        lsdb::lsp_build(
            instance.system_id,
            &instance.links,
            instance.seqno_next(),
            instance.config.lsp_lifetime,
        )
    });
    Debug::LspOriginate(&lsp).log();

    for link in &instance.links {
        link.srm_set(lsp.lsp_id, true);
    }

    instance.spf_trigger();

    lsp
}
