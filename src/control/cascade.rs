/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Cascade control: asks the server to apply an operation (typically a
//! delete) across subordinate referrals/subentries as well. Like
//! [`ManageDsaIt`](super::ManageDsaIt), it carries no value; only its
//! presence (and criticality) matters.
//!
//! No RFC assigns this control a number; the OID below follows the
//! private-enterprise-number convention vendors use for it and is kept
//! for round-trip symmetry with the rest of the registry rather than as
//! a claim of wire compatibility with any one server (§1 Non-goals).

use crate::ber::ReverseBuffer;
use crate::control::ControlError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cascade;

impl Cascade {
    pub const OID: &'static str = "1.3.6.1.4.1.4203.666.11.9";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        if !bytes.is_empty() {
            return Err(ControlError::MalformedValue(Self::OID.to_string()));
        }
        Ok(Cascade)
    }

    pub fn encode_value(&self, _buf: &mut ReverseBuffer) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_decodes() {
        assert_eq!(Cascade::decode_value(b"").unwrap(), Cascade);
    }
}
