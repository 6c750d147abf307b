/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! proxyAuthz (RFC 4370): the control's value *is* the authzId octet
//! string directly — unlike the other controls here it is not wrapped in
//! its own SEQUENCE (§4.7).

use crate::ber::ReverseBuffer;
use crate::control::ControlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedAuthz {
    pub authz_id: String,
}

impl ProxiedAuthz {
    pub const OID: &'static str = "2.16.840.1.113730.3.4.18";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let authz_id = std::str::from_utf8(bytes)
            .map_err(|_| ControlError::MalformedValue(Self::OID.to_string()))?
            .to_string();
        Ok(ProxiedAuthz { authz_id })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        buf.push_front(self.authz_id.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_authz_id() {
        let ctrl = ProxiedAuthz {
            authz_id: "dn:cn=admin,dc=example,dc=com".to_string(),
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        assert_eq!(ProxiedAuthz::decode_value(buf.as_slice()).unwrap(), ctrl);
    }

    #[test]
    fn empty_authz_id_means_anonymous() {
        let ctrl = ProxiedAuthz {
            authz_id: String::new(),
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        assert_eq!(ProxiedAuthz::decode_value(buf.as_slice()).unwrap(), ctrl);
    }
}
