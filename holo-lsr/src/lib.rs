//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

pub mod adjacency;
pub mod avl;
pub mod debug;
pub mod error;
pub mod flooding;
pub mod instance;
pub mod interface;
pub mod lsdb;
pub mod network;
pub mod northbound;
pub mod packet;
pub mod route;
pub mod spf;
pub mod tasks;
