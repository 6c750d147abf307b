/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! The incremental decoder engine (§4.2) and the `LDAPMessage` grammar
//! driven over one assembled PDU (§4.3).
//!
//! `Decoder::feed` buffers bytes until a complete top-level `SEQUENCE` TLV
//! is available — exactly the frame-boundary check
//! `g3-codec`'s `ldap::LdapSequence::parse_with_identifier` performs for
//! this same protocol — then hands the assembled bytes to [`Cursor`] for a
//! full recursive-descent decode. There is no partial, resumable
//! field-by-field state kept across `feed` calls; once a PDU's bytes are
//! all present, decoding it is a single synchronous pass.

mod grammar;

use log::{debug, trace, warn};
use thiserror::Error;

use crate::ber::{BerError, BerLength, BerLengthParseError, Cursor, TAG_SEQUENCE};
use crate::control::ControlError;
use crate::message::{Control, Message};
use crate::model::{DnError, FilterError};
use crate::tags;

/// Default `max_pdu_size`: generous for directory entries with many
/// multi-valued attributes while still bounding a hostile peer's ability
/// to make the decoder buffer unbounded memory before ever seeing a
/// complete PDU.
pub const DEFAULT_MAX_PDU_SIZE: usize = 2 * 1024 * 1024;

/// Default `max_tlv_depth`, shared with [`Cursor`]'s own nesting guard.
pub const DEFAULT_MAX_TLV_DEPTH: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    pub max_pdu_size: usize,
    pub max_tlv_depth: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            max_tlv_depth: DEFAULT_MAX_TLV_DEPTH,
        }
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Ber(#[from] BerError),
    #[error(transparent)]
    Dn(#[from] DnError),
    #[error(transparent)]
    Filter(#[from] FilterError),
    #[error(transparent)]
    Control(#[from] ControlError),
    #[error("unrecognized protocolOp tag {tag:#04x}")]
    UnknownOperationTag { tag: u8 },
    #[error("messageID {0} is outside the 1..=2147483647 range RFC 4511 requires")]
    InvalidMessageId(i64),
    #[error("declared PDU length {declared} exceeds the configured maximum of {max} bytes")]
    PduTooLarge { declared: usize, max: usize },
    #[error("control has an empty controlType OID")]
    EmptyControlOid,
    #[error("control has a malformed controlType OID {0:?}")]
    MalformedControlOid(String),
    #[error("{0} has an out-of-range value {1}")]
    ConstraintViolation(&'static str, i64),
    #[error("operation {tag:#04x} (messageID {message_id}) failed to decode: {source}")]
    OperationFailed {
        message_id: i32,
        tag: u8,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// For the request kinds with a well-defined response shape (§4.2
    /// Recovery), the message ID and response-operation tag a caller
    /// needs to synthesize an error response rather than abort the whole
    /// connection on a single malformed request. `None` for every other
    /// error: a malformed outer envelope, an unknown messageID, or a
    /// request type with no single-PDU response (Unbind, Abandon) leaves
    /// no safe way to keep the connection going.
    pub fn recoverable_response(&self) -> Option<(i32, u8)> {
        match self {
            DecodeError::OperationFailed { message_id, tag, .. } => {
                response_tag_for(*tag).map(|resp| (*message_id, resp))
            }
            _ => None,
        }
    }
}

fn response_tag_for(request_tag: u8) -> Option<u8> {
    match request_tag {
        tags::OP_SEARCH_REQUEST => Some(tags::OP_SEARCH_RESULT_DONE),
        tags::OP_MODIFY_REQUEST => Some(tags::OP_MODIFY_RESPONSE),
        tags::OP_ADD_REQUEST => Some(tags::OP_ADD_RESPONSE),
        tags::OP_DEL_REQUEST => Some(tags::OP_DEL_RESPONSE),
        tags::OP_MODIFY_DN_REQUEST => Some(tags::OP_MODIFY_DN_RESPONSE),
        tags::OP_COMPARE_REQUEST => Some(tags::OP_COMPARE_RESPONSE),
        _ => None,
    }
}

/// Streaming `LDAPMessage` decoder. Owns a growable byte buffer; feed it
/// arbitrarily chunked wire bytes and it hands back every PDU that has
/// become complete since the last call.
///
/// Once `feed` returns an `Err`, the connection is no longer in a known
/// state: the byte offset at which the bad PDU started is lost (it has
/// already been folded into `buffer`) so there's no way to resynchronize.
/// Callers should stop feeding and tear down the connection — `reset` is
/// for reusing the allocation on a *new* connection, not for recovering
/// this one.
#[derive(Debug)]
pub struct Decoder {
    config: DecoderConfig,
    buffer: Vec<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new(DecoderConfig::default())
    }
}

impl Decoder {
    pub fn new(config: DecoderConfig) -> Self {
        Decoder {
            config,
            buffer: Vec::new(),
        }
    }

    pub fn set_max_pdu_size(&mut self, max_pdu_size: usize) {
        self.config.max_pdu_size = max_pdu_size;
    }

    /// Bytes currently buffered waiting on a complete PDU.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Drops any buffered partial PDU. Does not affect `config`.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Appends `data` to the internal buffer and decodes every PDU that
    /// is now complete, in order. Returns `Ok(vec![])` when `data` only
    /// advanced a partial PDU. On `Err`, `self.buffer` still holds the
    /// bytes of the PDU that failed to decode (and anything after it);
    /// `reset()` before reusing this decoder for a new connection.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Message>, DecodeError> {
        self.buffer.extend_from_slice(data);
        trace!("ldap decoder: fed {} bytes, {} buffered", data.len(), self.buffer.len());

        let mut messages = Vec::new();
        loop {
            match self.try_decode_one()? {
                Some(message) => {
                    debug!(
                        "ldap decoder: decoded messageID {} ({} bytes left buffered)",
                        message.message_id,
                        self.buffer.len()
                    );
                    messages.push(message);
                }
                None => break,
            }
        }
        Ok(messages)
    }

    fn try_decode_one(&mut self) -> Result<Option<Message>, DecodeError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let identifier = self.buffer[0];
        if identifier != TAG_SEQUENCE {
            return Err(BerError::UnexpectedTag {
                expected: TAG_SEQUENCE,
                found: identifier,
            }
            .into());
        }
        let length = match BerLength::parse(&self.buffer[1..]) {
            Ok(length) => length,
            Err(BerLengthParseError::NeedMoreData(_)) => return Ok(None),
            Err(BerLengthParseError::TooLargeValue) => return Err(BerError::LengthInvalid.into()),
        };
        if length.indefinite() {
            return Err(BerError::IndefiniteLength.into());
        }
        let declared = length.value();
        if declared > self.config.max_pdu_size as u64 {
            warn!(
                "ldap decoder: declared PDU length {} exceeds max_pdu_size {}",
                declared, self.config.max_pdu_size
            );
            return Err(DecodeError::PduTooLarge {
                declared: declared as usize,
                max: self.config.max_pdu_size,
            });
        }
        let header_len = 1 + length.encoded_len();
        let total_len = header_len + declared as usize;
        if self.buffer.len() < total_len {
            return Ok(None);
        }

        let message = decode_message(&self.buffer[..total_len], self.config.max_tlv_depth)?;
        self.buffer.drain(..total_len);
        Ok(Some(message))
    }
}

/// Decodes exactly one complete `LDAPMessage` PDU.
fn decode_message(bytes: &[u8], max_tlv_depth: usize) -> Result<Message, DecodeError> {
    let mut outer = Cursor::new(bytes, max_tlv_depth);
    let mut msg = outer.enter_constructed(TAG_SEQUENCE)?;

    let raw_id = msg.read_integer_value(crate::ber::TAG_INTEGER)?;
    if !(1..=i32::MAX as i64).contains(&raw_id) {
        return Err(DecodeError::InvalidMessageId(raw_id));
    }
    let message_id = raw_id as i32;

    let (op_tag, op_value) = msg.read_any()?;
    let tag = op_tag.raw();
    let operation = grammar::decode_operation(tag, op_value).map_err(|source| {
        DecodeError::OperationFailed {
            message_id,
            tag,
            source: Box::new(source),
        }
    })?;

    let controls = match msg.try_enter_constructed(tags::CONTROLS)? {
        Some(mut control_seq) => decode_controls(&mut control_seq)?,
        None => Vec::new(),
    };

    msg.finish()?;
    outer.finish()?;

    Ok(Message::new(message_id, operation).with_controls(controls))
}

fn decode_controls(seq: &mut Cursor<'_>) -> Result<Vec<Control>, DecodeError> {
    let mut controls = Vec::new();
    while seq.has_more() {
        let mut one = seq.enter_constructed(crate::ber::TAG_SEQUENCE)?;
        let control_type = one.read_utf8_value(crate::ber::TAG_OCTET_STRING)?.to_string();
        if control_type.is_empty() {
            return Err(DecodeError::EmptyControlOid);
        }
        if !crate::message::is_valid_numeric_oid(&control_type) {
            return Err(DecodeError::MalformedControlOid(control_type));
        }
        let criticality = one.read_boolean_default_false(crate::ber::TAG_BOOLEAN)?;
        let control_value = one
            .try_octet_string_value(crate::ber::TAG_OCTET_STRING)?
            .map(|bytes| bytes.to_vec());
        one.finish()?;
        controls.push(Control {
            control_type,
            criticality,
            control_value,
        });
    }
    Ok(controls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Operation, ResultCode};

    #[test]
    fn feeds_one_pdu_byte_at_a_time() {
        // unbindRequest, messageID 500: a frequent scenario (§8 scenario a).
        let bytes = hex_literal::hex!("3006020201f44200");
        let mut decoder = Decoder::default();
        let mut messages = Vec::new();
        for &b in &bytes[..bytes.len() - 1] {
            messages.extend(decoder.feed(&[b]).unwrap());
        }
        assert!(messages.is_empty());
        messages.extend(decoder.feed(&bytes[bytes.len() - 1..]).unwrap());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message_id, 500);
        assert!(matches!(messages[0].operation, Operation::UnbindRequest));
    }

    #[test]
    fn two_pdus_in_one_feed_call_both_decode() {
        let one = hex_literal::hex!("3006020201f44200");
        let mut both = one.to_vec();
        both.extend_from_slice(&one);
        let mut decoder = Decoder::default();
        let messages = decoder.feed(&both).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn oversized_declared_length_is_rejected_before_buffering_value() {
        let mut decoder = Decoder::new(DecoderConfig {
            max_pdu_size: 10,
            ..Default::default()
        });
        // header claims a 1000-byte SEQUENCE; only the header is ever fed.
        let header = [0x30u8, 0x82, 0x03, 0xE8];
        let err = decoder.feed(&header).unwrap_err();
        assert!(matches!(err, DecodeError::PduTooLarge { .. }));
    }

    #[test]
    fn unknown_operation_tag_is_reported() {
        // SEQUENCE { INTEGER 1, [APPLICATION 30] "" } -- tag 0x5E is not
        // any protocolOp this crate recognizes.
        let bytes = [0x30, 0x05, 0x02, 0x01, 0x01, 0x5E, 0x00];
        let mut decoder = Decoder::default();
        let err = decoder.feed(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownOperationTag { tag: 0x5E }));
    }

    #[test]
    fn search_result_done_round_trips_success() {
        // SEQUENCE { messageID 7, searchResDone LDAPResult{success, "", ""} }
        let bytes = hex_literal::hex!("300c02010765070a010004000400");
        let mut decoder = Decoder::default();
        let messages = decoder.feed(&bytes).unwrap();
        assert_eq!(messages.len(), 1);
        match &messages[0].operation {
            Operation::SearchResultDone(result) => {
                assert_eq!(result.result_code, ResultCode::Success);
            }
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn malformed_control_oid_is_rejected() {
        // UnbindRequest, messageID 1, controls [0] { SEQUENCE { controlType="abc" } }.
        let bytes = hex_literal::hex!("300e0201014200a00730050403616263");
        let mut decoder = Decoder::default();
        let err = decoder.feed(&bytes).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedControlOid(oid) if oid == "abc"));
    }
}
