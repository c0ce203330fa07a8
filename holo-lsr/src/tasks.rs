//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug_span};

use crate::instance::Instance;
use crate::interface::Link;
use crate::{flooding, spf};

//
// Tasks diagram:
//
//                       +--------------+
//  lsp_update (Nx) ---> |              | ---> (Nx) net_tx
//                       |              |
//  flood_scan (Nx) ---> |   instance   |
//                       |              |
//                       |              | ---> (1x) spf_trigger
//                       +--------------+
//                              |
//                  spf_trigger V
//                       +--------------+
//                       |  spf worker  | ---> (1x) route_install
//                       +--------------+
//

// Inter-task message types.
pub mod messages {
    use bytes::Bytes;
    use serde::{Deserialize, Serialize};

    // Input messages (external collaborator -> protocol worker).
    pub mod input {
        use super::*;

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct LspUpdateMsg {
            pub data: Bytes,
        }

        #[derive(Debug)]
        #[derive(Deserialize, Serialize)]
        pub struct SpfTriggerMsg {}
    }

    // Output messages (protocol worker -> external collaborator).
    pub mod output {
        use super::*;
        use crate::route::Route;

        #[derive(Debug)]
        #[derive(Serialize)]
        pub struct NetTxPduMsg {
            pub ifname: String,
            pub data: Bytes,
        }

        #[derive(Debug)]
        #[derive(Serialize)]
        pub struct RouteInstallMsg {
            pub routes: Vec<Route>,
        }
    }
}

// ===== protocol tasks =====

// Processes the LSPs received on a link.
pub(crate) fn lsp_input(
    instance: &Arc<Instance>,
    link: &Arc<Link>,
    mut lsp_updatec: UnboundedReceiver<messages::input::LspUpdateMsg>,
) -> JoinHandle<()> {
    let span = debug_span!("link", name = %link.name);
    let _span_guard = span.enter();
    let span = debug_span!("lsp-input");

    let instance = instance.clone();
    let link_name = link.name.clone();
    tokio::spawn(
        async move {
            while let Some(msg) = lsp_updatec.recv().await {
                if let Err(error) =
                    flooding::lsp_input(&instance, &link_name, &msg.data)
                {
                    error.log();
                }
            }
        }
        .instrument(span),
    )
}

// Periodically sends the LSPs flagged for flooding on a link.
pub(crate) fn flood_scan(
    instance: &Arc<Instance>,
    link: &Arc<Link>,
) -> JoinHandle<()> {
    let span = debug_span!("link", name = %link.name);
    let _span_guard = span.enter();
    let span = debug_span!("flooding");

    let period = Duration::from_millis(instance.config.flood_interval.max(1));
    let instance = instance.clone();
    let link = link.clone();
    tokio::spawn(
        async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                flooding::flood_scan(&instance, &link);
            }
        }
        .instrument(span),
    )
}

// Runs the SPF computation whenever triggered.
pub(crate) fn spf_worker(
    instance: &Arc<Instance>,
    mut spf_triggerc: UnboundedReceiver<messages::input::SpfTriggerMsg>,
) -> JoinHandle<()> {
    let span = debug_span!("spf");

    let instance = instance.clone();
    tokio::spawn(
        async move {
            while spf_triggerc.recv().await.is_some() {
                // Triggers queued in the meantime are served by this run.
                while spf_triggerc.try_recv().is_ok() {}

                if let Err(error) = spf::run(&instance) {
                    error.log();
                }
            }
        }
        .instrument(span),
    )
}
