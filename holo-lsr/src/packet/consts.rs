//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use bitflags::bitflags;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

pub const IDRP_DISCRIMINATOR: u8 = 0x83;
pub const VERSION_PROTO_EXT: u8 = 1;
pub const VERSION: u8 = 1;
// Zero means the default system ID length (6 bytes).
pub const SYSTEM_ID_LEN_DEFAULT: u8 = 0;
pub const SYSTEM_ID_LEN: usize = 6;
// The three high-order bits of the PDU type byte are reserved.
pub const PDU_TYPE_MASK: u8 = 0x1f;

// PDU types.
//
// IANA registry:
// https://www.iana.org/assignments/isis-pdu/isis-pdu.xhtml#pdu
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum PduType {
    HelloLanL1 = 15,
    HelloLanL2 = 16,
    HelloP2P = 17,
    LspL1 = 18,
    LspL2 = 20,
    CsnpL1 = 24,
    CsnpL2 = 25,
    PsnpL1 = 26,
    PsnpL2 = 27,
}

// Top-level TLV types recognized by the codec.
//
// IANA registry:
// https://www.iana.org/assignments/isis-tlv-codepoints/isis-tlv-codepoints.xhtml#tlv-codepoints
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[derive(FromPrimitive, ToPrimitive)]
#[derive(Deserialize, Serialize)]
pub enum TlvType {
    IsReach = 2,
    Ipv4InternalReach = 128,
    Ipv4Addresses = 132,
}

// LSP attribute byte.
bitflags! {
    #[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
    #[derive(Deserialize, Serialize)]
    #[serde(transparent)]
    pub struct LspFlags: u8 {
        const P = 0x80;
        const ATT = 0x78;
        const OL = 0x04;
        const IS_TYPE2 = 0x02;
        const IS_TYPE1 = 0x01;
    }
}

// ===== impl PduType =====

impl PduType {
    pub const fn is_lsp(&self) -> bool {
        matches!(self, PduType::LspL1 | PduType::LspL2)
    }

    pub const fn is_hello(&self) -> bool {
        matches!(
            self,
            PduType::HelloLanL1 | PduType::HelloLanL2 | PduType::HelloP2P
        )
    }
}
