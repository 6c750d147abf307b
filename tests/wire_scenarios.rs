/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! End-to-end scenarios exercising the public `Decoder`/`encode_message`
//! surface only (§8), one test per spec §8 scenario not already covered
//! by an inline `#[cfg(test)]` module closer to its owning type.

use g3_ldap_proto::control::{decode_known, TypedControl};
use g3_ldap_proto::decode::{DecodeError, Decoder, DecoderConfig};
use g3_ldap_proto::encode_message;
use g3_ldap_proto::message::{Control, Message, Operation};
use g3_ldap_proto::model::{Dn, Filter};
use g3_ldap_proto::schema::StaticSchemaManager;

#[test]
fn scenario_a_unbind_round_trips_exact_bytes() {
    let bytes = hex_literal::hex!("3006020201f44200");
    let mut decoder = Decoder::default();
    let messages = decoder.feed(&bytes).unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_id, 500);
    assert!(matches!(messages[0].operation, Operation::UnbindRequest));

    let re_encoded = encode_message(&messages[0]).unwrap();
    assert_eq!(re_encoded, bytes);
}

#[test]
fn scenario_c_del_request_with_manage_dsa_it_control_round_trips() {
    let dn = Dn::parse("cn=testModify,ou=users,ou=system").unwrap();
    let message = Message::new(3, Operation::DelRequest(dn.clone())).with_controls(vec![
        Control::new("2.16.840.1.113730.3.4.2"),
    ]);

    let bytes = encode_message(&message).unwrap();
    let mut decoder = Decoder::default();
    let decoded = decoder.feed(&bytes).unwrap().pop().unwrap();

    match &decoded.operation {
        Operation::DelRequest(decoded_dn) => assert_eq!(decoded_dn, &dn),
        other => panic!("unexpected operation {other:?}"),
    }
    assert_eq!(decoded.controls.len(), 1);
    assert_eq!(decoded.controls[0].control_type, "2.16.840.1.113730.3.4.2");
    assert!(!decoded.controls[0].criticality);
    assert!(matches!(
        decode_known(&decoded.controls[0]).unwrap(),
        Some(TypedControl::ManageDsaIt(_))
    ));

    // bytes are stable under a second round trip.
    let re_encoded = encode_message(&decoded).unwrap();
    assert_eq!(re_encoded, bytes);
}

#[test]
fn scenario_d_filter_parse_and_reserialize() {
    let text = "(&(objectClass=Person)(|(sn=Jensen)(cn=Babs J*)))";
    let filter = Filter::parse(text).unwrap();
    match &filter {
        Filter::And(children) => {
            assert_eq!(children.len(), 2);
            assert_eq!(children[0], Filter::Equality("objectClass".into(), b"Person".to_vec()));
            match &children[1] {
                Filter::Or(or_children) => {
                    assert_eq!(or_children.len(), 2);
                    assert_eq!(or_children[0], Filter::Equality("sn".into(), b"Jensen".to_vec()));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(filter.to_string(), text);
}

#[test]
fn scenario_e_dn_parse_with_utf8_and_plus() {
    let schema = StaticSchemaManager::default();
    let dn = Dn::parse_with_schema(r"OU=Exemple \+ Rdn\C3\A4\ ", Some(&schema)).unwrap();
    assert_eq!(dn.up_name(), r"OU=Exemple \+ Rdn\C3\A4\ ");
    assert_eq!(dn.norm_name(), r"2.5.4.11=exemple \+ rdn\C3\A4");
}

#[test]
fn streaming_equivalence_any_byte_partition_decodes_identically() {
    // SearchResultDone{messageID 7, success}.
    let bytes = hex_literal::hex!("300c02010765070a010004000400");
    let whole = Decoder::default().feed(&bytes).unwrap();

    for split in 1..bytes.len() {
        let mut decoder = Decoder::default();
        let mut messages = decoder.feed(&bytes[..split]).unwrap();
        messages.extend(decoder.feed(&bytes[split..]).unwrap());
        assert_eq!(messages.len(), whole.len());
        assert_eq!(messages[0].message_id, whole[0].message_id);
    }
}

#[test]
fn max_pdu_enforcement_rejects_before_buffering_value() {
    let mut decoder = Decoder::new(DecoderConfig {
        max_pdu_size: 16,
        ..Default::default()
    });
    // header claims a 1000-byte SEQUENCE.
    let header = [0x30u8, 0x82, 0x03, 0xE8];
    let err = decoder.feed(&header).unwrap_err();
    assert!(matches!(err, DecodeError::PduTooLarge { .. }));
}
