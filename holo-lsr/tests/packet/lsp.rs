//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use std::sync::{Arc, LazyLock as Lazy};

use bytes::Bytes;

use const_addrs::ip4;
use holo_lsr::interface::{Link, LinkCfg};
use holo_lsr::lsdb::lsp_build;
use holo_lsr::packet::consts::{LspFlags, PduType};
use holo_lsr::packet::error::DecodeError;
use holo_lsr::packet::pdu::{Header, Lsp};
use holo_lsr::packet::tlv::{
    Ipv4AddressesTlv, Ipv4Reach, Ipv4ReachTlv, IsReach, IsReachTlv, Tlv,
    UnknownTlv,
};
use holo_lsr::packet::{LspId, SystemId};

use super::{test_decode_lsp, test_decode_lsp_error, test_encode_lsp};
use crate::{adjacency_up, net4};

//
// Test packets.
//

static LSP1: Lazy<(Vec<u8>, Lsp)> = Lazy::new(|| {
    (
        vec![
            0x83, 0x1b, 0x01, 0x00, 0x12, 0x01, 0x00, 0x00, 0x00, 0x3d, 0x04,
            0xb0, 0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x01, 0xe0, 0x01, 0x01, 0x02, 0x0c, 0x00, 0x00, 0x00, 0x00,
            0x0a, 0x11, 0x11, 0x11, 0x11, 0x11, 0x12, 0x00, 0x84, 0x04, 0x0a,
            0x00, 0x01, 0x01, 0x80, 0x0c, 0x0a, 0x00, 0x01, 0x00, 0xff, 0xff,
            0xff, 0x00, 0x00, 0x00, 0x00, 0x0a,
        ],
        Lsp {
            hdr: Header::new(PduType::LspL1),
            rem_lifetime: 1200,
            lsp_id: LspId::from([
                0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x00, 0x00,
            ]),
            seqno: 1,
            cksum: 0xe001,
            flags: LspFlags::IS_TYPE1,
            tlvs: vec![
                Tlv::IsReach(IsReachTlv {
                    reserved: 0,
                    list: vec![IsReach {
                        metric: 10,
                        neighbor: SystemId::from([
                            0x11, 0x11, 0x11, 0x11, 0x11, 0x12,
                        ]),
                        pseudonode: 0,
                    }],
                }),
                Tlv::Ipv4Addresses(Ipv4AddressesTlv {
                    list: vec![ip4!("10.0.1.1")],
                }),
                Tlv::Ipv4Reach(Ipv4ReachTlv {
                    list: vec![Ipv4Reach {
                        prefix: net4(ip4!("10.0.1.0"), 24),
                        metric: 10,
                    }],
                }),
            ],
        },
    )
});

//
// Tests.
//

#[test]
fn test_encode_lsp1() {
    let (ref bytes, ref lsp) = *LSP1;
    test_encode_lsp(bytes, lsp);
}

#[test]
fn test_decode_lsp1() {
    let (ref bytes, ref lsp) = *LSP1;
    test_decode_lsp(bytes, lsp);
}

#[test]
fn test_decode_lsp1_padding() {
    let (ref bytes, ref lsp) = *LSP1;
    let mut bytes = bytes.clone();
    bytes.extend([0; 16]);
    test_decode_lsp(&bytes, lsp);
}

#[test]
fn test_decode_lsp1_offset() {
    let (ref bytes, ref lsp) = *LSP1;
    let mut frame = vec![0xfe, 0xfe, 0x03];
    frame.extend(bytes);
    let lsp_actual = Lsp::decode(&frame, 3).unwrap();
    assert_eq!(*lsp, lsp_actual);
}

#[test]
fn test_decode_lsp1_truncated_tlv() {
    // The prefix TLV is cut short; the TLVs before it are kept.
    let (ref bytes, ref lsp) = *LSP1;
    let bytes = &bytes[..bytes.len() - 3];
    let lsp_actual = Lsp::decode(bytes, 0).unwrap();
    assert_eq!(lsp.tlvs[..2], lsp_actual.tlvs[..]);
    assert_eq!(lsp.lsp_id, lsp_actual.lsp_id);
    assert_eq!(lsp.seqno, lsp_actual.seqno);
}

#[test]
fn test_decode_lsp1_reserved_type_bits() {
    let (ref bytes, ref lsp) = *LSP1;
    let mut bytes = bytes.clone();
    bytes[4] |= 0x20;
    test_decode_lsp(&bytes, lsp);
}

#[test]
fn test_decode_errors() {
    let (ref bytes, _) = *LSP1;

    // Truncated common header.
    test_decode_lsp_error(&bytes[..5], DecodeError::IncompletePdu);

    // Truncated LSP header.
    test_decode_lsp_error(&bytes[..20], DecodeError::IncompletePdu);

    // Invalid IDRP discriminator.
    let mut data = bytes.clone();
    data[0] = 0x82;
    test_decode_lsp_error(&data, DecodeError::InvalidIrdpDiscriminator(0x82));

    // Unknown PDU type.
    let mut data = bytes.clone();
    data[4] = 0x05;
    test_decode_lsp_error(&data, DecodeError::UnknownPduType(0x05));

    // Hello PDU.
    let mut data = bytes.clone();
    data[4] = PduType::HelloP2P as u8;
    test_decode_lsp_error(
        &data,
        DecodeError::InvalidPduType(PduType::HelloP2P as u8),
    );

    // PDU length shorter than the LSP header.
    let mut data = bytes.clone();
    data[8..10].copy_from_slice(&20u16.to_be_bytes());
    test_decode_lsp_error(&data, DecodeError::InvalidPduLength(20));
}

#[test]
fn test_checksum() {
    let (_, ref lsp) = *LSP1;
    let mut lsp = Lsp::new(
        PduType::LspL1,
        lsp.rem_lifetime,
        lsp.lsp_id,
        lsp.seqno,
        lsp.flags,
        lsp.tlvs.clone(),
    );
    assert!(lsp.is_checksum_valid());

    lsp.seqno += 1;
    assert!(!lsp.is_checksum_valid());
}

#[test]
fn test_lsp_build() {
    let (ref bytes, _) = *LSP1;
    let link = Link::new(LinkCfg {
        name: "eth0".to_owned(),
        address: Some(net4(ip4!("10.0.1.1"), 24)),
        ..Default::default()
    });
    link.adjacency_update(adjacency_up("1111.1111.1112", 10));

    let system_id = "1111.1111.1111".parse().unwrap();
    let lsp = lsp_build(system_id, &[Arc::new(link)], 1, 1200);
    assert!(lsp.is_checksum_valid());

    // Everything but the checksum matches the reference encoding.
    let raw = lsp.encode();
    assert_eq_hex!(bytes[..24], raw[..24]);
    assert_eq_hex!(bytes[26..], raw[26..]);
    assert_eq!(raw[12..18], [0x11; 6]);
}

#[test]
fn test_lsp_mixed_tlvs() {
    let tlvs = vec![
        Tlv::Unknown(UnknownTlv::new(
            0xf0,
            3,
            Bytes::from_static(&[0x01, 0x02, 0x03]),
        )),
        Tlv::Ipv4Reach(Ipv4ReachTlv {
            list: vec![
                Ipv4Reach {
                    prefix: net4(ip4!("10.0.2.0"), 24),
                    metric: 20,
                },
                Ipv4Reach {
                    prefix: net4(ip4!("172.16.0.0"), 16),
                    metric: 5,
                },
            ],
        }),
        Tlv::IsReach(IsReachTlv::default()),
        Tlv::Unknown(UnknownTlv::new(0x01, 0, Bytes::new())),
        Tlv::Ipv4Reach(Ipv4ReachTlv::default()),
        Tlv::IsReach(IsReachTlv {
            reserved: 0,
            list: vec![IsReach {
                metric: 63,
                neighbor: SystemId::from([0x22; 6]),
                pseudonode: 1,
            }],
        }),
        Tlv::Ipv4Addresses(Ipv4AddressesTlv {
            list: vec![ip4!("10.0.2.1"), ip4!("172.16.0.1")],
        }),
    ];
    let lsp = Lsp::new(
        PduType::LspL2,
        600,
        LspId::from([0x22, 0x22, 0x22, 0x22, 0x22, 0x22, 0x00, 0x03]),
        0x8000_0001,
        LspFlags::IS_TYPE1 | LspFlags::IS_TYPE2,
        tlvs,
    );
    assert!(lsp.is_checksum_valid());

    // TLV order and empty TLVs are preserved.
    let raw = lsp.encode();
    test_decode_lsp(&raw, &lsp);
    test_encode_lsp(&raw, &Lsp::decode(&raw, 0).unwrap());
}
