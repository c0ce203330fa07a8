//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::packet::SystemId;

// Per-link adjacency, as maintained by the neighbor handshake.
//
// The protocol core only reads it when originating the local LSP and when
// seeding the SPF candidate list.
#[derive(Clone, Debug, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct Adjacency {
    #[new(default)]
    pub state: AdjacencyState,
    #[new(default)]
    pub neighbor_system_id: Option<SystemId>,
    pub metric: u32,
    #[new(default)]
    pub neighbor_ip: Option<Ipv4Addr>,
    #[new(default)]
    pub last_change: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdjacencyState {
    #[default]
    New,
    Init,
    Up,
}

// ===== impl Adjacency =====

impl Adjacency {
    pub fn is_up(&self) -> bool {
        self.state == AdjacencyState::Up
    }

    // Returns the neighbor System ID when the adjacency is fully up.
    pub fn up_neighbor(&self) -> Option<SystemId> {
        if self.is_up() {
            self.neighbor_system_id
        } else {
            None
        }
    }
}

// ===== impl AdjacencyState =====

impl std::fmt::Display for AdjacencyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjacencyState::New => write!(f, "new"),
            AdjacencyState::Init => write!(f, "init"),
            AdjacencyState::Up => write!(f, "up"),
        }
    }
}
