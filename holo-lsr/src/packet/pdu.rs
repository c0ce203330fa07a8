//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use bytes::{Buf, BufMut, Bytes, BytesMut};
use num_traits::FromPrimitive;
use serde::{Deserialize, Serialize};

use crate::packet::consts::{
    IDRP_DISCRIMINATOR, LspFlags, PDU_TYPE_MASK, PduType,
    SYSTEM_ID_LEN_DEFAULT, VERSION, VERSION_PROTO_EXT,
};
use crate::packet::error::{DecodeError, DecodeResult};
use crate::packet::tlv::{
    Ipv4AddressesTlv, Ipv4Reach, Ipv4ReachTlv, IsReach, IsReachTlv, Tlv,
    tlv_entries_split, tlvs_decode,
};
use crate::packet::{LspId, TLS_BUF};

// PDU common header.
//
// The IDRP discriminator and the length indicator aren't stored since they
// are derived during encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Header {
    pub proto_ext: u8,
    pub id_len: u8,
    pub pdu_type: PduType,
    pub version: u8,
    pub reserved: u8,
    pub max_area_addrs: u8,
}

// Link State PDU.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Lsp {
    pub hdr: Header,
    pub rem_lifetime: u16,
    pub lsp_id: LspId,
    pub seqno: u32,
    pub cksum: u16,
    pub flags: LspFlags,
    pub tlvs: Vec<Tlv>,
}

// ===== impl Header =====

impl Header {
    pub const LEN: usize = 8;

    pub const fn new(pdu_type: PduType) -> Self {
        Header {
            proto_ext: VERSION_PROTO_EXT,
            id_len: SYSTEM_ID_LEN_DEFAULT,
            pdu_type,
            version: VERSION,
            reserved: 0,
            max_area_addrs: 0,
        }
    }

    // Decodes the PDU common header from a bytes buffer.
    pub fn decode(buf: &mut Bytes) -> DecodeResult<Self> {
        // Ensure the packet has enough data for the fixed-length header.
        if buf.remaining() < Self::LEN {
            return Err(DecodeError::IncompletePdu);
        }

        // Parse IDRP discriminator.
        let idrp_discr = buf.get_u8();
        if idrp_discr != IDRP_DISCRIMINATOR {
            return Err(DecodeError::InvalidIrdpDiscriminator(idrp_discr));
        }

        // Parse length of fixed header (recomputed on encoding).
        let _fixed_header_length = buf.get_u8();

        // Parse version/protocol ID extension.
        let proto_ext = buf.get_u8();

        // Parse ID length.
        let id_len = buf.get_u8();

        // Parse PDU type, ignoring the reserved bits.
        let pdu_type = buf.get_u8() & PDU_TYPE_MASK;
        let pdu_type = match PduType::from_u8(pdu_type) {
            Some(pdu_type) => pdu_type,
            None => return Err(DecodeError::UnknownPduType(pdu_type)),
        };

        // Parse version.
        let version = buf.get_u8();

        // Parse reserved field.
        let reserved = buf.get_u8();

        // Parse maximum area addresses.
        let max_area_addrs = buf.get_u8();

        Ok(Header {
            proto_ext,
            id_len,
            pdu_type,
            version,
            reserved,
            max_area_addrs,
        })
    }

    // Encodes the PDU common header into a bytes buffer.
    fn encode(&self, buf: &mut BytesMut, fixed_header_length: u8) {
        buf.put_u8(IDRP_DISCRIMINATOR);
        buf.put_u8(fixed_header_length);
        buf.put_u8(self.proto_ext);
        buf.put_u8(self.id_len);
        buf.put_u8(self.pdu_type as u8);
        buf.put_u8(self.version);
        buf.put_u8(self.reserved);
        buf.put_u8(self.max_area_addrs);
    }
}

// ===== impl Lsp =====

impl Lsp {
    pub const HEADER_LEN: u8 = 27;
    const PDU_LEN_RANGE: std::ops::Range<usize> = 8..10;
    const CKSUM_RANGE: std::ops::Range<usize> = 24..26;
    // The checksum covers the PDU starting at the LSP ID.
    const CKSUM_OFFSET: usize = 12;

    // Builds a locally originated LSP, computing its checksum.
    pub fn new(
        pdu_type: PduType,
        rem_lifetime: u16,
        lsp_id: LspId,
        seqno: u32,
        flags: LspFlags,
        tlvs: Vec<Tlv>,
    ) -> Self {
        let mut lsp = Lsp {
            hdr: Header::new(pdu_type),
            rem_lifetime,
            lsp_id,
            seqno,
            cksum: 0,
            flags,
            tlvs,
        };
        let raw = lsp.encode();
        lsp.cksum = Self::checksum(&raw[Self::CKSUM_OFFSET..]);
        lsp
    }

    // Decodes an LSP from a frame, skipping `offset` bytes of outer link
    // header.
    pub fn decode(data: &[u8], offset: usize) -> DecodeResult<Self> {
        let Some(data) = data.get(offset..) else {
            return Err(DecodeError::IncompletePdu);
        };
        let mut buf = Bytes::copy_from_slice(data);

        // Parse PDU common header.
        let hdr = Header::decode(&mut buf)?;
        if !hdr.pdu_type.is_lsp() {
            return Err(DecodeError::InvalidPduType(hdr.pdu_type as u8));
        }

        // Ensure the whole LSP header is present.
        if data.len() < Self::HEADER_LEN as usize {
            return Err(DecodeError::IncompletePdu);
        }

        // Parse PDU length.
        let pdu_len = buf.try_get_u16()?;
        if pdu_len < Self::HEADER_LEN as u16 {
            return Err(DecodeError::InvalidPduLength(pdu_len));
        }

        // Parse remaining lifetime.
        let rem_lifetime = buf.try_get_u16()?;

        // Parse LSP ID.
        let lsp_id = LspId::decode(&mut buf)?;

        // Parse sequence number.
        let seqno = buf.try_get_u32()?;

        // Parse checksum.
        let cksum = buf.try_get_u16()?;

        // Parse flags.
        let flags = buf.try_get_u8()?;
        let flags = LspFlags::from_bits_retain(flags);

        // Ignore link-level padding past the PDU length. When the PDU length
        // exceeds the frame, the TLV parse is bounded by the frame instead.
        let body_len = pdu_len as usize - Self::HEADER_LEN as usize;
        if buf.remaining() > body_len {
            buf.truncate(body_len);
        }

        // Parse top-level TLVs.
        let tlvs = tlvs_decode(&mut buf);

        Ok(Lsp {
            hdr,
            rem_lifetime,
            lsp_id,
            seqno,
            cksum,
            flags,
            tlvs,
        })
    }

    // Encodes the LSP, filling in the PDU length. The checksum field is
    // written as stored.
    pub fn encode(&self) -> Bytes {
        TLS_BUF.with(|buf| {
            let mut buf = buf.borrow_mut();
            buf.clear();
            self.hdr.encode(&mut buf, Self::HEADER_LEN);

            // The PDU length will be initialized later.
            buf.put_u16(0);
            buf.put_u16(self.rem_lifetime);
            self.lsp_id.encode(&mut buf);
            buf.put_u32(self.seqno);
            buf.put_u16(self.cksum);
            buf.put_u8(self.flags.bits());

            // Encode TLVs.
            for tlv in &self.tlvs {
                tlv.encode(&mut buf);
            }

            // Initialize PDU length.
            let pkt_len = buf.len() as u16;
            buf[Self::PDU_LEN_RANGE].copy_from_slice(&pkt_len.to_be_bytes());

            buf.clone().freeze()
        })
    }

    // Returns the LSP database key.
    pub fn key(&self) -> u64 {
        self.lsp_id.key()
    }

    // Returns an iterator over the IS neighbors advertised by this LSP.
    pub fn is_reach(&self) -> impl Iterator<Item = &IsReach> {
        self.tlvs
            .iter()
            .filter_map(|tlv| match tlv {
                Tlv::IsReach(tlv) => Some(tlv),
                _ => None,
            })
            .flat_map(|tlv| tlv.list.iter())
    }

    // Returns an iterator over the IPv4 prefixes advertised by this LSP.
    pub fn ipv4_reach(&self) -> impl Iterator<Item = &Ipv4Reach> {
        self.tlvs
            .iter()
            .filter_map(|tlv| match tlv {
                Tlv::Ipv4Reach(tlv) => Some(tlv),
                _ => None,
            })
            .flat_map(|tlv| tlv.list.iter())
    }

    // Computes the ISO 10589 checksum over the given data, whose checksum
    // field is expected to be zero.
    fn checksum(data: &[u8]) -> u16 {
        let checksum = fletcher::calc_fletcher16(data);
        let mut checkbyte0 = (checksum & 0x00FF) as i32;
        let mut checkbyte1 = ((checksum >> 8) & 0x00FF) as i32;

        // Adjust checksum value using scaling factor.
        let sop = data.len() as i32 - 13;
        let mut x = (sop * checkbyte0 - checkbyte1) % 255;
        if x <= 0 {
            x += 255;
        }
        checkbyte1 = 510 - checkbyte0 - x;
        if checkbyte1 > 255 {
            checkbyte1 -= 255;
        }
        checkbyte0 = x;
        u16::from_be_bytes([checkbyte0 as u8, checkbyte1 as u8])
    }

    // Checks whether the encoded LSP carries a valid checksum.
    pub fn is_checksum_valid(&self) -> bool {
        let raw = self.encode();
        fletcher::calc_fletcher16(&raw[Self::CKSUM_OFFSET..]) == 0
    }
}

// ===== global functions =====

// Builds the TLV list of an originated LSP: neighbors first, then interface
// addresses, then prefixes. Oversized lists are split over several TLVs.
pub fn lsp_tlvs_build(
    is_reach: impl IntoIterator<Item = IsReach>,
    ipv4_addrs: impl IntoIterator<Item = std::net::Ipv4Addr>,
    ipv4_reach: impl IntoIterator<Item = Ipv4Reach>,
) -> Vec<Tlv> {
    let mut tlvs = vec![];
    tlvs.extend(
        tlv_entries_split::<IsReachTlv>(is_reach)
            .into_iter()
            .map(Tlv::IsReach),
    );
    tlvs.extend(
        tlv_entries_split::<Ipv4AddressesTlv>(ipv4_addrs)
            .into_iter()
            .map(Tlv::Ipv4Addresses),
    );
    tlvs.extend(
        tlv_entries_split::<Ipv4ReachTlv>(ipv4_reach)
            .into_iter()
            .map(Tlv::Ipv4Reach),
    );
    tlvs
}
