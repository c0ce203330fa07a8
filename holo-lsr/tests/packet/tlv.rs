//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//
// Sponsored by NLnet as part of the Next Generation Internet initiative.
// See: https://nlnet.nl/NGI0
//

use bytes::Bytes;
use const_addrs::ip4;
use holo_lsr::packet::tlv::{Ipv4AddressesTlv, Tlv, UnknownTlv, tlvs_decode};

#[test]
fn test_decode_unknown() {
    let mut buf = Bytes::from_static(&[0x01, 0x02, 0x01, 0x01]);
    let tlvs = tlvs_decode(&mut buf);
    assert_eq!(
        tlvs,
        vec![Tlv::Unknown(UnknownTlv::new(
            1,
            2,
            Bytes::from_static(&[0x01, 0x01])
        ))]
    );
    assert!(buf.is_empty());
}

#[test]
fn test_decode_mixed() {
    let mut buf = Bytes::from_static(&[
        0x84, 0x08, 0x0a, 0x00, 0x01, 0x01, 0x0a, 0x00, 0x02, 0x01, 0xf0,
        0x00, 0x84, 0x03, 0x0a, 0x00, 0x03,
    ]);
    let tlvs = tlvs_decode(&mut buf);
    assert_eq!(
        tlvs,
        vec![
            Tlv::Ipv4Addresses(Ipv4AddressesTlv {
                list: vec![ip4!("10.0.1.1"), ip4!("10.0.2.1")],
            }),
            Tlv::Unknown(UnknownTlv::new(0xf0, 0, Bytes::new())),
            // Malformed length for the type.
            Tlv::Unknown(UnknownTlv::new(
                0x84,
                3,
                Bytes::from_static(&[0x0a, 0x00, 0x03])
            )),
        ]
    );
}

#[test]
fn test_decode_overrun() {
    let mut buf =
        Bytes::from_static(&[0x01, 0x01, 0xff, 0x02, 0x08, 0x00, 0x00]);
    let tlvs = tlvs_decode(&mut buf);
    assert_eq!(
        tlvs,
        vec![Tlv::Unknown(UnknownTlv::new(
            1,
            1,
            Bytes::from_static(&[0xff])
        ))]
    );
    assert!(buf.is_empty());
}
