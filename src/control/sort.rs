/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! serverSideSortRequest / sortKeyResponseControl (RFC 2891):
//!
//! ```text
//! SortKeyList ::= SEQUENCE OF SEQUENCE {
//!     attributeType   AttributeDescription,
//!     orderingRule    [0] MatchingRuleId OPTIONAL,
//!     reverseOrder    [1] BOOLEAN DEFAULT FALSE }
//!
//! SortResult ::= SEQUENCE {
//!     sortResult      ENUMERATED { ... },
//!     attributeType   [0] AttributeDescription OPTIONAL }
//! ```

use crate::ber::{
    encode_enumerated, encode_octet_string, encode_octet_string_tagged, encode_sequence, Cursor,
    ReverseBuffer,
};
use crate::ber::{TAG_ENUMERATED, TAG_OCTET_STRING, TAG_SEQUENCE};
use crate::control::ControlError;
use crate::message::ResultCode;

const TAG_ORDERING_RULE: u8 = 0x80;
const TAG_REVERSE_ORDER: u8 = 0x81;
const TAG_RESULT_ATTRIBUTE_TYPE: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub attribute_type: String,
    pub ordering_rule: Option<String>,
    pub reverse_order: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    pub keys: Vec<SortKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortResponse {
    pub result: ResultCode,
    pub attribute_type: Option<String>,
}

impl SortRequest {
    pub const OID: &'static str = "1.2.840.113556.1.4.473";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        let mut outer = Cursor::new(bytes, 6);
        let mut seq = outer.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
        let mut keys = Vec::new();
        while seq.has_more() {
            let mut key = seq.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
            let attribute_type = key
                .read_utf8_value(TAG_OCTET_STRING)
                .map_err(|_| malformed())?
                .to_string();
            let ordering_rule = key
                .try_utf8_value(TAG_ORDERING_RULE)
                .map_err(|_| malformed())?
                .map(str::to_string);
            let reverse_order = key
                .read_boolean_default_false(TAG_REVERSE_ORDER)
                .map_err(|_| malformed())?;
            key.finish().map_err(|_| malformed())?;
            keys.push(SortKey {
                attribute_type,
                ordering_rule,
                reverse_order,
            });
        }
        outer.finish().map_err(|_| malformed())?;
        Ok(SortRequest { keys })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        let outer_start = buf.pos();
        for key in self.keys.iter().rev() {
            encode_sort_key(buf, key);
        }
        encode_sequence(buf, outer_start);
    }
}

fn encode_sort_key(buf: &mut ReverseBuffer, key: &SortKey) {
    let start = buf.pos();
    if key.reverse_order {
        buf.push_front_byte(0xFF);
        buf.prepend_tag_length(TAG_REVERSE_ORDER, 1);
    }
    if let Some(rule) = &key.ordering_rule {
        encode_octet_string_tagged(buf, TAG_ORDERING_RULE, rule.as_bytes());
    }
    encode_octet_string(buf, key.attribute_type.as_bytes());
    encode_sequence(buf, start);
}

impl SortResponse {
    pub const OID: &'static str = "1.2.840.113556.1.4.474";

    pub fn decode_value(bytes: &[u8]) -> Result<Self, ControlError> {
        let malformed = || ControlError::MalformedValue(Self::OID.to_string());
        let mut outer = Cursor::new(bytes, 4);
        let mut seq = outer.enter_constructed(TAG_SEQUENCE).map_err(|_| malformed())?;
        let result_code = seq
            .read_integer_value(TAG_ENUMERATED)
            .map_err(|_| malformed())?;
        if !(0..=256).contains(&result_code) {
            return Err(malformed());
        }
        let attribute_type = seq
            .try_utf8_value(TAG_RESULT_ATTRIBUTE_TYPE)
            .map_err(|_| malformed())?
            .map(str::to_string);
        seq.finish().map_err(|_| malformed())?;
        outer.finish().map_err(|_| malformed())?;
        Ok(SortResponse {
            result: ResultCode::from_code(result_code as u8),
            attribute_type,
        })
    }

    pub fn encode_value(&self, buf: &mut ReverseBuffer) {
        let start = buf.pos();
        if let Some(attribute_type) = &self.attribute_type {
            encode_octet_string_tagged(buf, TAG_RESULT_ATTRIBUTE_TYPE, attribute_type.as_bytes());
        }
        encode_enumerated(buf, self.result.code() as i64);
        encode_sequence(buf, start);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_request_round_trips_multiple_keys() {
        let req = SortRequest {
            keys: vec![
                SortKey {
                    attribute_type: "cn".to_string(),
                    ordering_rule: None,
                    reverse_order: false,
                },
                SortKey {
                    attribute_type: "sn".to_string(),
                    ordering_rule: Some("2.5.13.3".to_string()),
                    reverse_order: true,
                },
            ],
        };
        let mut buf = ReverseBuffer::new();
        let start = buf.pos();
        for key in req.keys.iter().rev() {
            encode_sort_key(&mut buf, key);
        }
        encode_sequence(&mut buf, start);
        let decoded = SortRequest::decode_value(buf.as_slice()).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn sort_response_round_trips() {
        let resp = SortResponse {
            result: ResultCode::Success,
            attribute_type: Some("cn".to_string()),
        };
        let mut buf = ReverseBuffer::new();
        resp.encode_value(&mut buf);
        let decoded = SortResponse::decode_value(buf.as_slice()).unwrap();
        assert_eq!(decoded, resp);
    }
}
