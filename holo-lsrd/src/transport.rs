//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use holo_lsr::error::{Error, IoError};
use holo_lsr::network::{self, RxFrame};
use holo_lsr::tasks::messages::input::LspUpdateMsg;
use holo_lsr::tasks::messages::output::NetTxPduMsg;
use socket2::{Domain, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::debug;

// Outer header length of the frames carried over UDP.
const FRAME_HDR_LEN: usize = 0;

// Socket of a link along with the address of its remote end.
#[derive(Debug)]
pub struct LinkSocket {
    pub socket: Arc<UdpSocket>,
    pub remote: SocketAddr,
}

// ===== global functions =====

pub(crate) fn socket(local: SocketAddr) -> Result<UdpSocket, IoError> {
    let domain = match local {
        SocketAddr::V4(_) => Domain::IPV4,
        SocketAddr::V6(_) => Domain::IPV6,
    };
    let socket = Socket::new(domain, Type::DGRAM, None)
        .and_then(|socket| {
            socket.set_nonblocking(true)?;
            socket.set_reuse_address(true)?;
            socket.bind(&local.into())?;
            Ok(socket)
        })
        .map_err(IoError::SocketError)?;
    UdpSocket::from_std(socket.into()).map_err(IoError::SocketError)
}

// Receives the frames of a link and hands its LSPs to the protocol.
pub(crate) async fn read_loop(
    link_name: String,
    link_socket: Arc<LinkSocket>,
    lsp_updatep: UnboundedSender<LspUpdateMsg>,
) {
    let mut buf = [0; 16384];

    loop {
        // Receive data from the network.
        let (num_bytes, src) =
            match link_socket.socket.recv_from(&mut buf).await {
                Ok((num_bytes, src)) => (num_bytes, src),
                Err(error) => {
                    IoError::RecvError(error).log();
                    continue;
                }
            };

        // Ignore frames coming from anywhere else than the remote end.
        if src != link_socket.remote {
            continue;
        }

        let frame = Bytes::copy_from_slice(&buf[0..num_bytes]);
        match network::classify(&frame, FRAME_HDR_LEN) {
            Ok(RxFrame::Lsp(data)) => {
                if lsp_updatep.send(LspUpdateMsg { data }).is_err() {
                    return;
                }
            }
            Ok(RxFrame::Hello(_)) => {
                // Adjacencies are statically configured.
                debug!(link = %link_name, "ignoring hello");
            }
            Err(error) => {
                Error::PduDecodeError(link_name.clone(), error).log();
            }
        }
    }
}

// Sends the frames produced by the protocol to the remote end of their
// link.
pub(crate) async fn write_loop(
    link_sockets: BTreeMap<String, Arc<LinkSocket>>,
    mut net_txc: UnboundedReceiver<NetTxPduMsg>,
) {
    while let Some(NetTxPduMsg { ifname, data }) = net_txc.recv().await {
        let Some(link_socket) = link_sockets.get(&ifname) else {
            Error::LinkNotFound(ifname).log();
            continue;
        };

        if let Err(error) =
            link_socket.socket.send_to(&data, link_socket.remote).await
        {
            IoError::SendError(error).log();
        }
    }
}
