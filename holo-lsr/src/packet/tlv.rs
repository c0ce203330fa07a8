//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::net::Ipv4Addr;

use bytes::{Buf, BufMut, Bytes, BytesMut, TryGetError};
use ipnetwork::Ipv4Network;
use num_traits::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::packet::SystemId;
use crate::packet::consts::{SYSTEM_ID_LEN, TlvType};

// TLV header size.
pub const TLV_HDR_SIZE: usize = 2;
// TLV maximum length.
pub const TLV_MAX_LEN: usize = 255;

// Trait for TLV types whose payload is made up of multiple fixed-size
// entries, which may span across multiple TLV instances.
pub trait EntryBasedTlv: From<Vec<Self::Entry>> {
    type Entry;
    const FIXED_FIELDS_LEN: usize = 0;
    const ENTRY_LEN: usize;

    // Return an iterator over the TLV entries.
    fn entries(&self) -> impl Iterator<Item = &Self::Entry>;

    // Return the length of TLV.
    fn len(&self) -> usize {
        TLV_HDR_SIZE
            + Self::FIXED_FIELDS_LEN
            + self.entries().count() * Self::ENTRY_LEN
    }
}

// A single TLV, in arrival order within its PDU.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum Tlv {
    IsReach(IsReachTlv),
    Ipv4Reach(Ipv4ReachTlv),
    Ipv4Addresses(Ipv4AddressesTlv),
    Unknown(UnknownTlv),
}

// IS neighbors (type 2).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsReachTlv {
    pub reserved: u8,
    pub list: Vec<IsReach>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct IsReach {
    pub metric: u32,
    pub neighbor: SystemId,
    pub pseudonode: u8,
}

// IPv4 internal reachability (type 128).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4ReachTlv {
    pub list: Vec<Ipv4Reach>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4Reach {
    pub prefix: Ipv4Network,
    pub metric: u32,
}

// IPv4 interface addresses (type 132).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct Ipv4AddressesTlv {
    pub list: Vec<Ipv4Addr>,
}

// TLV carried verbatim, either because its type isn't recognized or because
// its value doesn't match the layout of its type.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct UnknownTlv {
    pub tlv_type: u8,
    pub length: u8,
    pub value: Bytes,
}

// ===== impl Tlv =====

impl Tlv {
    pub fn tlv_type(&self) -> u8 {
        match self {
            Tlv::IsReach(_) => TlvType::IsReach as u8,
            Tlv::Ipv4Reach(_) => TlvType::Ipv4InternalReach as u8,
            Tlv::Ipv4Addresses(_) => TlvType::Ipv4Addresses as u8,
            Tlv::Unknown(tlv) => tlv.tlv_type,
        }
    }

    // Total encoded length, header included.
    pub fn len(&self) -> usize {
        match self {
            Tlv::IsReach(tlv) => tlv.len(),
            Tlv::Ipv4Reach(tlv) => tlv.len(),
            Tlv::Ipv4Addresses(tlv) => tlv.len(),
            Tlv::Unknown(tlv) => TLV_HDR_SIZE + tlv.length as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == TLV_HDR_SIZE
    }

    fn decode(tlv_type: u8, tlv_len: u8, value: Bytes) -> Tlv {
        let mut buf = value.clone();
        let tlv = match TlvType::from_u8(tlv_type) {
            Some(TlvType::IsReach) => {
                IsReachTlv::decode(tlv_len, &mut buf).map(Tlv::IsReach)
            }
            Some(TlvType::Ipv4InternalReach) => {
                Ipv4ReachTlv::decode(tlv_len, &mut buf).map(Tlv::Ipv4Reach)
            }
            Some(TlvType::Ipv4Addresses) => {
                Ipv4AddressesTlv::decode(tlv_len, &mut buf)
                    .map(Tlv::Ipv4Addresses)
            }
            None => None,
        };

        tlv.unwrap_or_else(|| {
            Tlv::Unknown(UnknownTlv::new(tlv_type, tlv_len, value))
        })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        match self {
            Tlv::IsReach(tlv) => tlv.encode(buf),
            Tlv::Ipv4Reach(tlv) => tlv.encode(buf),
            Tlv::Ipv4Addresses(tlv) => tlv.encode(buf),
            Tlv::Unknown(tlv) => tlv.encode(buf),
        }
    }
}

// ===== impl IsReachTlv =====

impl IsReachTlv {
    fn decode(tlv_len: u8, buf: &mut Bytes) -> Option<Self> {
        // Validate the TLV length.
        let tlv_len = tlv_len as usize;
        if tlv_len < Self::FIXED_FIELDS_LEN
            || (tlv_len - Self::FIXED_FIELDS_LEN) % Self::ENTRY_LEN != 0
        {
            return None;
        }

        let reserved = buf.try_get_u8().ok()?;
        let mut list = vec![];
        while buf.remaining() >= Self::ENTRY_LEN {
            let entry = IsReach::decode(buf).ok()?;
            list.push(entry);
        }

        Some(IsReachTlv { reserved, list })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        let start_pos = tlv_encode_start(buf, TlvType::IsReach);
        buf.put_u8(self.reserved);
        for entry in &self.list {
            buf.put_u32(entry.metric);
            entry.neighbor.encode(buf);
            buf.put_u8(entry.pseudonode);
        }
        tlv_encode_end(buf, start_pos);
    }
}

impl EntryBasedTlv for IsReachTlv {
    type Entry = IsReach;
    const FIXED_FIELDS_LEN: usize = 1;
    const ENTRY_LEN: usize = 4 + SYSTEM_ID_LEN + 1;

    fn entries(&self) -> impl Iterator<Item = &IsReach> {
        self.list.iter()
    }
}

impl From<Vec<IsReach>> for IsReachTlv {
    fn from(list: Vec<IsReach>) -> IsReachTlv {
        IsReachTlv { reserved: 0, list }
    }
}

// ===== impl IsReach =====

impl IsReach {
    fn decode(buf: &mut Bytes) -> Result<Self, TryGetError> {
        let metric = buf.try_get_u32()?;
        let neighbor = SystemId::decode(buf)?;
        let pseudonode = buf.try_get_u8()?;
        Ok(IsReach {
            metric,
            neighbor,
            pseudonode,
        })
    }
}

// ===== impl Ipv4ReachTlv =====

impl Ipv4ReachTlv {
    fn decode(tlv_len: u8, buf: &mut Bytes) -> Option<Self> {
        // Validate the TLV length.
        if tlv_len as usize % Self::ENTRY_LEN != 0 {
            return None;
        }

        let mut list = vec![];
        while buf.remaining() >= Self::ENTRY_LEN {
            let prefix = Ipv4Addr::from(buf.try_get_u32().ok()?);
            let mask = Ipv4Addr::from(buf.try_get_u32().ok()?);
            let metric = buf.try_get_u32().ok()?;

            // Non-contiguous masks can't be represented.
            let prefix = Ipv4Network::with_netmask(prefix, mask).ok()?;
            list.push(Ipv4Reach { prefix, metric });
        }

        Some(Ipv4ReachTlv { list })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        let start_pos = tlv_encode_start(buf, TlvType::Ipv4InternalReach);
        for entry in &self.list {
            buf.put_u32(entry.prefix.ip().into());
            buf.put_u32(entry.prefix.mask().into());
            buf.put_u32(entry.metric);
        }
        tlv_encode_end(buf, start_pos);
    }
}

impl EntryBasedTlv for Ipv4ReachTlv {
    type Entry = Ipv4Reach;
    const ENTRY_LEN: usize = 12;

    fn entries(&self) -> impl Iterator<Item = &Ipv4Reach> {
        self.list.iter()
    }
}

impl From<Vec<Ipv4Reach>> for Ipv4ReachTlv {
    fn from(list: Vec<Ipv4Reach>) -> Ipv4ReachTlv {
        Ipv4ReachTlv { list }
    }
}

// ===== impl Ipv4AddressesTlv =====

impl Ipv4AddressesTlv {
    fn decode(tlv_len: u8, buf: &mut Bytes) -> Option<Self> {
        // Validate the TLV length.
        if tlv_len as usize % Self::ENTRY_LEN != 0 {
            return None;
        }

        let mut list = vec![];
        while buf.remaining() >= Self::ENTRY_LEN {
            let addr = Ipv4Addr::from(buf.try_get_u32().ok()?);
            list.push(addr);
        }

        Some(Ipv4AddressesTlv { list })
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        let start_pos = tlv_encode_start(buf, TlvType::Ipv4Addresses);
        for addr in &self.list {
            buf.put_u32((*addr).into());
        }
        tlv_encode_end(buf, start_pos);
    }
}

impl EntryBasedTlv for Ipv4AddressesTlv {
    type Entry = Ipv4Addr;
    const ENTRY_LEN: usize = 4;

    fn entries(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.list.iter()
    }
}

impl From<Vec<Ipv4Addr>> for Ipv4AddressesTlv {
    fn from(list: Vec<Ipv4Addr>) -> Ipv4AddressesTlv {
        Ipv4AddressesTlv { list }
    }
}

// ===== impl UnknownTlv =====

impl UnknownTlv {
    pub fn new(tlv_type: u8, length: u8, value: Bytes) -> Self {
        UnknownTlv {
            tlv_type,
            length,
            value,
        }
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(self.tlv_type);
        buf.put_u8(self.length);
        buf.put_slice(&self.value);
    }
}

// ===== global functions =====

// Decodes a TLV stream until the buffer is exhausted.
//
// A length field pointing past the end of the buffer stops the parse; the
// TLVs read up to that point are returned.
pub fn tlvs_decode(buf: &mut Bytes) -> Vec<Tlv> {
    let mut tlvs = vec![];

    while buf.remaining() >= TLV_HDR_SIZE {
        let tlv_type = buf.get_u8();
        let tlv_len = buf.get_u8();
        if tlv_len as usize > buf.remaining() {
            Debug::TlvTruncated(tlv_type, tlv_len, buf.remaining()).log();
            buf.advance(buf.remaining());
            break;
        }

        let value = buf.copy_to_bytes(tlv_len as usize);
        tlvs.push(Tlv::decode(tlv_type, tlv_len, value));
    }

    tlvs
}

pub(crate) fn tlv_encode_start(
    buf: &mut BytesMut,
    tlv_type: impl ToPrimitive,
) -> usize {
    let start_pos = buf.len();
    buf.put_u8(tlv_type.to_u8().unwrap_or_default());
    // The TLV length will be rewritten later.
    buf.put_u8(0);
    start_pos
}

pub(crate) fn tlv_encode_end(buf: &mut BytesMut, start_pos: usize) {
    // Rewrite TLV length.
    buf[start_pos + 1] = (buf.len() - start_pos - TLV_HDR_SIZE) as u8;
}

// Splits a list of TLV entries into as many TLVs as necessary.
pub fn tlv_entries_split<T>(
    entries: impl IntoIterator<Item = T::Entry>,
) -> Vec<T>
where
    T: EntryBasedTlv,
{
    let max_entries = (TLV_MAX_LEN - T::FIXED_FIELDS_LEN) / T::ENTRY_LEN;
    let mut tlvs = vec![];
    let mut tlv_entries = vec![];

    for entry in entries {
        if tlv_entries.len() == max_entries {
            tlvs.push(T::from(std::mem::take(&mut tlv_entries)));
        }
        tlv_entries.push(entry);
    }
    if !tlv_entries.is_empty() {
        tlvs.push(T::from(tlv_entries));
    }

    tlvs
}

// ===== unit tests =====
