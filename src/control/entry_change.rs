/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Entry Change Notification control (the persistent search response
//! counterpart, well-known OID 2.16.840.1.113730.3.4.7): `SEQUENCE {
//! changeType ENUMERATED, previousDN OCTET STRING OPTIONAL, changeNumber
//! INTEGER OPTIONAL }` (§4.7).

use crate::ber::{
    encode_enumerated, encode_integer, encode_octet_string, encode_sequence, Cursor,
    ReverseBuffer,
};
use crate::ber::{TAG_ENUMERATED, TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE};
use crate::control::ControlError;
use crate::message::ChangeType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryChangeNotification {
    pub change_type: ChangeType,
    pub previous_dn: Option<String>,
    pub change_number: Option<i64>,
}

impl EntryChangeNotification {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.7";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        let mut outer = Cursor::new(bytes, 4);
        let mut seq = outer.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
        let raw_change_type = seq
            .read_integer_value(TAG_ENUMERATED)
            .map_err(|_| malformed())?;
        let change_type = ChangeType::from_bit(raw_change_type).ok_or_else(malformed)?;
        let previous_dn = seq
            .try_utf8_value(TAG_OCTET_STRING)
            .map_err(|_| malformed())?
            .map(str::to_string);
        let change_number = seq
            .try_integer_value(TAG_INTEGER)
            .map_err(|_| malformed())?;
        seq.finish().map_err(|_| malformed())?;
        outer.finish().map_err(|_| malformed())?;
        Ok(EntryChangeNotification {
            change_type,
            previous_dn,
            change_number,
        })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        let start = buf.pos();
        if let Some(change_number) = self.change_number {
            encode_integer(buf, change_number);
        }
        if let Some(previous_dn) = &self.previous_dn {
            encode_octet_string(buf, previous_dn.as_bytes());
        }
        encode_enumerated(buf, self.change_type.bit() as i64);
        encode_sequence(buf, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_with_optionals_present() {
        let ctrl = EntryChangeNotification {
            change_type: ChangeType::ModifyDn,
            previous_dn: Some("cn=old,dc=example,dc=com".to_string()),
            change_number: Some(42),
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        assert_eq!(
            EntryChangeNotification::decode_value(buf.as_slice()).unwrap(),
            ctrl
        );
    }

    #[test]
    fn round_trips_with_optionals_absent() {
        let ctrl = EntryChangeNotification {
            change_type: ChangeType::Add,
            previous_dn: None,
            change_number: None,
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        assert_eq!(
            EntryChangeNotification::decode_value(buf.as_slice()).unwrap(),
            ctrl
        );
    }
}
