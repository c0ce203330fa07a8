//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

mod lsp;
mod tlv;

use holo_lsr::packet::error::DecodeError;
use holo_lsr::packet::pdu::Lsp;

//
// Helper functions.
//

fn test_encode_lsp(bytes_expected: &[u8], lsp: &Lsp) {
    let bytes_actual = lsp.encode();
    assert_eq_hex!(bytes_expected, bytes_actual);
}

fn test_decode_lsp(bytes: &[u8], lsp_expected: &Lsp) {
    let lsp_actual = Lsp::decode(bytes, 0).unwrap();
    assert_eq!(*lsp_expected, lsp_actual);
}

fn test_decode_lsp_error(bytes: &[u8], error_expected: DecodeError) {
    let error_actual = Lsp::decode(bytes, 0).unwrap_err();
    assert_eq!(error_expected, error_actual);
}
