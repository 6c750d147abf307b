/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! ManageDsaIT (RFC 3296): a presence-only control, carries no value.

use crate::ber::ReverseBuffer;
use crate::control::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ManageDsaIt;

impl ManageDsaIt {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.2";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        if !bytes.is_empty() {
            return Err(ControlError::MalformedValue(Self::OID.to_string()));
        }
        Ok(ManageDsaIt)
    }

    pub fn encode_value(&self, _buf: &mut ReverseBuffer) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_decodes() {
        assert_eq!(ManageDsaIt::decode_value(b"").unwrap(), ManageDsaIt);
    }

    #[test]
    fn non_empty_value_is_malformed() {
        assert!(ManageDsaIt::decode_value(b"x").is_err());
    }
}
