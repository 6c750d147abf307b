/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Persistent Search control (draft-ietf-ldapext-psearch, well-known OID
//! 2.16.840.1.113730.3.4.3): `SEQUENCE { changeTypes INTEGER (1..15),
//! changesOnly BOOLEAN, returnECs BOOLEAN }` (§4.7, scenario g).

use crate::ber::{encode_boolean, encode_integer, encode_sequence, Cursor, ReverseBuffer};
use crate::ber::{TAG_BOOLEAN, TAG_INTEGER, TAG_SEQUENCE};
use crate::control::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistentSearch {
    /// Bitwise-OR of `ChangeType::bit()` values, 1..=15.
    pub change_types: u8,
    pub changes_only: bool,
    pub return_ecs: bool,
}

impl PersistentSearch {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.3";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        let mut outer = Cursor::new(bytes, 4);
        let mut seq = outer.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
        let change_types = seq.read_integer_value(TAG_INTEGER).map_err(|_| malformed())?;
        if !(1..=15).contains(&change_types) {
            return Err(malformed());
        }
        let changes_only = seq
            .read_boolean_value(TAG_BOOLEAN)
            .map_err(|_| malformed())?;
        let return_ecs = seq
            .read_boolean_value(TAG_BOOLEAN)
            .map_err(|_| malformed())?;
        seq.finish().map_err(|_| malformed())?;
        outer.finish().map_err(|_| malformed())?;
        Ok(PersistentSearch {
            change_types: change_types as u8,
            changes_only,
            return_ecs,
        })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        let start = buf.pos();
        encode_boolean(buf, self.return_ecs);
        encode_boolean(buf, self.changes_only);
        encode_integer(buf, self.change_types as i64);
        encode_sequence(buf, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_g_add_or_modify_dn() {
        let bytes = [0x30, 0x09, 0x02, 0x01, 0x09, 0x01, 0x01, 0x00, 0x01, 0x01, 0x00];
        let decoded = PersistentSearch::decode_value(&bytes).unwrap();
        assert_eq!(
            decoded,
            PersistentSearch {
                change_types: 9,
                changes_only: false,
                return_ecs: false,
            }
        );
        let mut buf = ReverseBuffer::new();
        decoded.encode_value(&mut buf);
        assert_eq!(buf.as_slice(), bytes);
    }

    #[test]
    fn zero_change_types_is_rejected() {
        let bytes = [0x30, 0x09, 0x02, 0x01, 0x00, 0x01, 0x01, 0x00, 0x01, 0x01, 0x00];
        assert!(PersistentSearch::decode_value(&bytes).is_err());
    }

    #[test]
    fn change_types_above_fifteen_is_rejected() {
        let bytes = [0x30, 0x09, 0x02, 0x01, 0x10, 0x01, 0x01, 0x00, 0x01, 0x01, 0x00];
        assert!(PersistentSearch::decode_value(&bytes).is_err());
    }
}
