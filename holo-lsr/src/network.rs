//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use bytes::Bytes;
use num_traits::FromPrimitive;

use crate::packet::consts::{IDRP_DISCRIMINATOR, PDU_TYPE_MASK, PduType};
use crate::packet::error::{DecodeError, DecodeResult};

// Offset of the PDU type within the common header.
const PDU_TYPE_OFFSET: usize = 4;

// Destination queue of an inbound frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RxFrame {
    // Handed to the neighbor handshake.
    Hello(Bytes),
    // Handed to the link's LSP update queue.
    Lsp(Bytes),
}

// ===== global functions =====

// Classifies an inbound frame by its protocol discriminator and PDU type,
// stripping `hdr_len` bytes of outer link header.
//
// PDUs other than hellos and LSPs aren't processed and yield an error.
pub fn classify(frame: &Bytes, hdr_len: usize) -> DecodeResult<RxFrame> {
    if frame.len() < hdr_len + PDU_TYPE_OFFSET + 1 {
        return Err(DecodeError::IncompletePdu);
    }
    let payload = frame.slice(hdr_len..);

    let idrp_discr = payload[0];
    if idrp_discr != IDRP_DISCRIMINATOR {
        return Err(DecodeError::InvalidIrdpDiscriminator(idrp_discr));
    }

    let pdu_type = payload[PDU_TYPE_OFFSET] & PDU_TYPE_MASK;
    match PduType::from_u8(pdu_type) {
        Some(pdu_type) if pdu_type.is_hello() => Ok(RxFrame::Hello(payload)),
        Some(pdu_type) if pdu_type.is_lsp() => Ok(RxFrame::Lsp(payload)),
        Some(_) => Err(DecodeError::InvalidPduType(pdu_type)),
        None => Err(DecodeError::UnknownPduType(pdu_type)),
    }
}

// ===== unit tests =====
