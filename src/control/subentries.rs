/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Subentries control (RFC 3672): a single BOOLEAN controlling whether a
//! search returns ordinary entries or subentries (§4.7).

use crate::ber::{encode_boolean, ReverseBuffer};
use crate::ber::TAG_BOOLEAN;
use crate::control::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subentries {
    pub visible: bool,
}

impl Subentries {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.1.10.1";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        if bytes.len() != 3 || bytes[0] != TAG_BOOLEAN || bytes[1] != 1 {
            return Err(malformed());
        }
        Ok(Subentries {
            visible: bytes[2] != 0,
        })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        encode_boolean(buf, self.visible);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_true_and_false() {
        for visible in [true, false] {
            let ctrl = Subentries { visible };
            let mut buf = ReverseBuffer::new();
            ctrl.encode_value(&mut buf);
            assert_eq!(Subentries::decode_value(buf.as_slice()).unwrap(), ctrl);
        }
    }
}
