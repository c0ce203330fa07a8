//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

pub mod consts;
pub mod error;
pub mod pdu;
pub mod tlv;

use std::cell::RefCell;
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes, BytesMut, TryGetError};
use serde::{Deserialize, Serialize};

use crate::packet::consts::SYSTEM_ID_LEN;

thread_local!(
    pub static TLS_BUF: RefCell<BytesMut> =
        RefCell::new(BytesMut::with_capacity(4096))
);

// Represents a System ID.
//
// Serialized using the dotted hexadecimal notation ("1921.6800.1001").
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct SystemId([u8; SYSTEM_ID_LEN]);

// Represents an LSP ID.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct LspId {
    pub system_id: SystemId,
    pub pseudonode: u8,
    pub fragment: u8,
}

// Error returned when parsing a malformed System ID string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SystemIdParseError(pub String);

// ===== impl SystemId =====

impl SystemId {
    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, TryGetError> {
        let mut system_id = [0; SYSTEM_ID_LEN];
        buf.try_copy_to_slice(&mut system_id)?;
        Ok(SystemId(system_id))
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&self.0);
    }

    // Returns the System ID as a 48-bit big-endian integer, used to key the
    // topology store.
    pub fn key(&self) -> u64 {
        let mut bytes = [0; 8];
        bytes[2..].copy_from_slice(&self.0);
        u64::from_be_bytes(bytes)
    }
}

impl AsRef<[u8]> for SystemId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; SYSTEM_ID_LEN]> for SystemId {
    fn from(bytes: [u8; SYSTEM_ID_LEN]) -> SystemId {
        SystemId(bytes)
    }
}

impl std::fmt::Display for SystemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let bytes = &self.0;
        write!(
            f,
            "{:02x}{:02x}.{:02x}{:02x}.{:02x}{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

impl FromStr for SystemId {
    type Err = SystemIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || SystemIdParseError(s.to_owned());

        let groups = s.split('.').collect::<Vec<_>>();
        if groups.len() != 3 {
            return Err(error());
        }

        let mut bytes = [0; SYSTEM_ID_LEN];
        for (idx, group) in groups.iter().enumerate() {
            if group.len() != 4 || !group.chars().all(|c| c.is_ascii_hexdigit())
            {
                return Err(error());
            }
            let value = u16::from_str_radix(group, 16).map_err(|_| error())?;
            bytes[idx * 2..idx * 2 + 2].copy_from_slice(&value.to_be_bytes());
        }

        Ok(SystemId(bytes))
    }
}

impl TryFrom<String> for SystemId {
    type Error = SystemIdParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SystemId> for String {
    fn from(system_id: SystemId) -> String {
        system_id.to_string()
    }
}

// ===== impl LspId =====

impl LspId {
    pub(crate) fn decode(buf: &mut Bytes) -> Result<Self, TryGetError> {
        let mut bytes = [0; 8];
        buf.try_copy_to_slice(&mut bytes)?;
        Ok(Self::from(bytes))
    }

    pub(crate) fn encode(&self, buf: &mut BytesMut) {
        self.system_id.encode(buf);
        buf.put_u8(self.pseudonode);
        buf.put_u8(self.fragment);
    }

    // Returns the big-endian interpretation of the 8-byte LSP ID, used to key
    // the link-state database.
    pub fn key(&self) -> u64 {
        let mut bytes = [0; 8];
        bytes[..SYSTEM_ID_LEN].copy_from_slice(self.system_id.as_ref());
        bytes[6] = self.pseudonode;
        bytes[7] = self.fragment;
        u64::from_be_bytes(bytes)
    }
}

impl From<[u8; 8]> for LspId {
    fn from(bytes: [u8; 8]) -> LspId {
        LspId {
            system_id: SystemId::from([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5],
            ]),
            pseudonode: bytes[6],
            fragment: bytes[7],
        }
    }
}

impl From<u64> for LspId {
    fn from(key: u64) -> LspId {
        LspId::from(key.to_be_bytes())
    }
}

impl From<(SystemId, u8, u8)> for LspId {
    fn from(components: (SystemId, u8, u8)) -> LspId {
        LspId {
            system_id: components.0,
            pseudonode: components.1,
            fragment: components.2,
        }
    }
}

impl std::fmt::Display for LspId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{:02x}-{:02x}",
            self.system_id, self.pseudonode, self.fragment
        )
    }
}

// ===== impl SystemIdParseError =====

impl std::fmt::Display for SystemIdParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid system ID: {}", self.0)
    }
}

impl std::error::Error for SystemIdParseError {}

// ===== unit tests =====
