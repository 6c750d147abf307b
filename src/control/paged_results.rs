/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! simplePagedResultsControl (RFC 2696): `SEQUENCE { size INTEGER, cookie
//! OCTET STRING }` (§4.7).

use crate::ber::{encode_integer, encode_octet_string, encode_sequence, Cursor, ReverseBuffer};
use crate::ber::{TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE};
use crate::control::ControlError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResults {
    pub size: i64,
    pub cookie: Vec<u8>,
}

impl PagedResults {
    pub const OID: &'static str = "1.2.840.113556.1.4.319";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        let mut outer = Cursor::new(bytes, 4);
        let mut body = outer.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
        let size = body.read_integer_value(TAG_INTEGER).map_err(|_| malformed())?;
        let cookie = body
            .read_octet_string_value(TAG_OCTET_STRING)
            .map_err(|_| malformed())?
            .to_vec();
        body.finish().map_err(|_| malformed())?;
        outer.finish().map_err(|_| malformed())?;
        Ok(PagedResults { size, cookie })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        let start = buf.pos();
        encode_octet_string(buf, &self.cookie);
        encode_integer(buf, self.size);
        encode_sequence(buf, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_size_and_cookie() {
        let ctrl = PagedResults {
            size: 100,
            cookie: b"abc".to_vec(),
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        let decoded = PagedResults::decode_value(buf.as_slice()).unwrap();
        assert_eq!(decoded, ctrl);
    }

    #[test]
    fn empty_cookie_is_legal() {
        let ctrl = PagedResults {
            size: 0,
            cookie: Vec::new(),
        };
        let mut buf = ReverseBuffer::new();
        ctrl.encode_value(&mut buf);
        let decoded = PagedResults::decode_value(buf.as_slice()).unwrap();
        assert_eq!(decoded, ctrl);
    }
}
