//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use tracing::{warn, warn_span};

use crate::packet::error::DecodeError;
use crate::packet::{LspId, SystemId};

// Protocol errors.
#[derive(Debug)]
pub enum Error {
    // I/O errors
    IoError(IoError),
    // Inter-task communication
    LinkNotFound(String),
    LspNotFound(String, LspId),
    NetTxClosed(String),
    // Packet input
    PduDecodeError(String, DecodeError),
    // SPF
    SpfRootNotFound(SystemId),
}

// Link transport errors.
#[derive(Debug)]
pub enum IoError {
    SocketError(std::io::Error),
    RecvError(std::io::Error),
    SendError(std::io::Error),
}

// ===== impl Error =====

impl Error {
    pub fn log(&self) {
        match self {
            Error::IoError(error) => {
                error.log();
            }
            Error::LinkNotFound(name) => {
                warn!(%name, "{}", self);
            }
            Error::LspNotFound(name, lsp_id) => {
                warn_span!("link", %name).in_scope(|| {
                    warn!(%lsp_id, "{}", self);
                })
            }
            Error::NetTxClosed(name) => {
                warn!(%name, "{}", self);
            }
            Error::PduDecodeError(name, error) => {
                warn_span!("link", %name).in_scope(|| {
                    warn!(%error, "{}", self);
                })
            }
            Error::SpfRootNotFound(system_id) => {
                warn!(%system_id, "{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(error) => error.fmt(f),
            Error::LinkNotFound(..) => {
                write!(f, "link not found")
            }
            Error::LspNotFound(..) => {
                write!(f, "LSP not found in the database")
            }
            Error::NetTxClosed(..) => {
                write!(f, "output channel closed, LSPs left pending")
            }
            Error::PduDecodeError(..) => {
                write!(f, "failed to decode packet")
            }
            Error::SpfRootNotFound(..) => {
                write!(f, "local LSP not found, aborting SPF run")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(error) => Some(error),
            Error::PduDecodeError(_, error) => Some(error),
            _ => None,
        }
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

// ===== impl IoError =====

impl IoError {
    pub fn log(&self) {
        match self {
            IoError::SocketError(error)
            | IoError::RecvError(error)
            | IoError::SendError(error) => {
                warn!(error = %with_source(error), "{}", self);
            }
        }
    }
}

impl std::fmt::Display for IoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoError::SocketError(..) => {
                write!(f, "failed to create socket")
            }
            IoError::RecvError(..) => {
                write!(f, "failed to receive packet")
            }
            IoError::SendError(..) => {
                write!(f, "failed to send packet")
            }
        }
    }
}

impl std::error::Error for IoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IoError::SocketError(error)
            | IoError::RecvError(error)
            | IoError::SendError(error) => Some(error),
        }
    }
}

// ===== global functions =====

pub fn with_source<E: std::error::Error>(error: E) -> String {
    if let Some(source) = error.source() {
        format!("{} ({})", error, with_source(source))
    } else {
        error.to_string()
    }
}
