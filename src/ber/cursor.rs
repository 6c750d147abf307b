/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Generic TLV reader over a complete in-memory buffer (§4.1).
//!
//! By the time a [`Cursor`] is built, the streaming engine (`decode::Decoder`)
//! has already assembled one complete top-level PDU's bytes — the engine
//! owns the "wait for more bytes" state machine described in §4.2; this
//! type is the recursive-descent reader the per-operation grammar (§4.3)
//! drives over that assembled buffer. Tracking `depth` here is what bounds
//! `tlv_stack` (§4.2, default max 100).

use thiserror::Error;

use super::tag::{HighTagNumberForm, Tag};
use super::length::{BerLength, BerLengthParseError};

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum BerError {
    #[error("need more data to complete a TLV")]
    Truncated,
    #[error("indefinite length form is not supported")]
    IndefiniteLength,
    #[error("BER length encoding is malformed or overflows")]
    LengthInvalid,
    #[error("declared length {declared} exceeds the {available} bytes available")]
    LengthExceedsBuffer { declared: u64, available: usize },
    #[error("high-tag-number form is not used by LDAP and is rejected")]
    HighTagNumberForm,
    #[error("expected tag {expected:#04x}, found {found:#04x}")]
    UnexpectedTag { expected: u8, found: u8 },
    #[error("expected a constructed TLV, found a primitive one")]
    ExpectedConstructed,
    #[error("expected a primitive TLV, found a constructed one")]
    ExpectedPrimitive,
    #[error("TLV nesting exceeds the configured max depth {0}")]
    DepthExceeded(usize),
    #[error("trailing bytes after a definite-length value was fully consumed")]
    TrailingBytes,
    #[error("value is not valid UTF-8")]
    InvalidUtf8,
    #[error("BOOLEAN value must be exactly one octet")]
    InvalidBooleanLength,
    #[error("INTEGER/ENUMERATED value must be 1..=8 octets and minimally encoded")]
    InvalidIntegerEncoding,
}

impl From<BerLengthParseError> for BerError {
    fn from(value: BerLengthParseError) -> Self {
        match value {
            BerLengthParseError::NeedMoreData(_) => BerError::Truncated,
            BerLengthParseError::TooLargeValue => BerError::LengthInvalid,
        }
    }
}

impl From<HighTagNumberForm> for BerError {
    fn from(_: HighTagNumberForm) -> Self {
        BerError::HighTagNumberForm
    }
}

/// A recursive-descent reader over one complete, already-buffered region of
/// BER bytes. `max_depth` is shared by every `enter_constructed` descendant
/// so the whole tree rooted at one top-level PDU is bounded.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], max_depth: usize) -> Self {
        Cursor {
            data,
            pos: 0,
            depth: 0,
            max_depth,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Peeks the next identifier octet without consuming it. Used by
    /// grammar actions that branch on the upcoming tag (e.g. a BIND
    /// authentication CHOICE or a filter's context tag).
    pub fn peek_tag(&self) -> Result<Tag, BerError> {
        let byte = *self.data.get(self.pos).ok_or(BerError::Truncated)?;
        Ok(Tag::parse(byte)?)
    }

    pub fn has_more(&self) -> bool {
        !self.is_empty()
    }

    /// Reads one TLV header (tag + length), returning the tag and the
    /// value's byte length without consuming the value itself.
    fn read_header(&mut self) -> Result<(Tag, usize), BerError> {
        let identifier = *self.data.get(self.pos).ok_or(BerError::Truncated)?;
        let tag = Tag::parse(identifier)?;
        let length = BerLength::parse(&self.data[self.pos + 1..])?;
        if length.indefinite() {
            return Err(BerError::IndefiniteLength);
        }
        let declared = length.value();
        if declared > usize::MAX as u64 {
            return Err(BerError::LengthInvalid);
        }
        let header_len = 1 + length.encoded_len();
        let available = self.data.len() - self.pos - header_len;
        if declared as usize > available {
            return Err(BerError::LengthExceedsBuffer {
                declared,
                available,
            });
        }
        self.pos += header_len;
        Ok((tag, declared as usize))
    }

    /// Reads a primitive TLV whose tag must equal `expected` exactly,
    /// returning its value bytes and advancing past them.
    pub fn expect_primitive(&mut self, expected: u8) -> Result<&'a [u8], BerError> {
        let start = self.pos;
        let (tag, len) = self.read_header()?;
        if tag.raw() != expected {
            self.pos = start;
            return Err(BerError::UnexpectedTag {
                expected,
                found: tag.raw(),
            });
        }
        if tag.constructed {
            return Err(BerError::ExpectedPrimitive);
        }
        let value = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(value)
    }

    /// Like [`expect_primitive`](Self::expect_primitive) but does not fail
    /// (just returns `Ok(None)` with the cursor unmoved) when the upcoming
    /// tag doesn't match — used for OPTIONAL fields.
    pub fn try_primitive(&mut self, expected: u8) -> Result<Option<&'a [u8]>, BerError> {
        if self.is_empty() || self.peek_tag()?.raw() != expected {
            return Ok(None);
        }
        self.expect_primitive(expected).map(Some)
    }

    /// Enters a constructed TLV whose tag must equal `expected`, returning
    /// a child cursor scoped to its value bytes with depth+1.
    pub fn enter_constructed(&mut self, expected: u8) -> Result<Cursor<'a>, BerError> {
        if self.depth >= self.max_depth {
            return Err(BerError::DepthExceeded(self.max_depth));
        }
        let start = self.pos;
        let (tag, len) = self.read_header()?;
        if tag.raw() != expected {
            self.pos = start;
            return Err(BerError::UnexpectedTag {
                expected,
                found: tag.raw(),
            });
        }
        if !tag.constructed {
            return Err(BerError::ExpectedConstructed);
        }
        let value = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(Cursor {
            data: value,
            pos: 0,
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }

    pub fn try_enter_constructed(&mut self, expected: u8) -> Result<Option<Cursor<'a>>, BerError> {
        if self.is_empty() || self.peek_tag()?.raw() != expected {
            return Ok(None);
        }
        self.enter_constructed(expected).map(Some)
    }

    /// Reads the next TLV header regardless of tag, returning a sub-cursor
    /// over its value bytes if constructed, or the raw value bytes if
    /// primitive — used by grammar actions (e.g. the Filter CHOICE and
    /// controls list) that must branch on whatever tag shows up next.
    pub fn read_any(&mut self) -> Result<(Tag, AnyValue<'a>), BerError> {
        if self.depth >= self.max_depth {
            return Err(BerError::DepthExceeded(self.max_depth));
        }
        let (tag, len) = self.read_header()?;
        let value = &self.data[self.pos..self.pos + len];
        self.pos += len;
        if tag.constructed {
            Ok((
                tag,
                AnyValue::Constructed(Cursor {
                    data: value,
                    pos: 0,
                    depth: self.depth + 1,
                    max_depth: self.max_depth,
                }),
            ))
        } else {
            Ok((tag, AnyValue::Primitive(value)))
        }
    }

    /// Asserts the cursor has consumed every byte of its scope — called
    /// after a SEQUENCE's fields are all read, to catch trailing garbage.
    pub fn finish(&self) -> Result<(), BerError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(BerError::TrailingBytes)
        }
    }

    pub fn read_integer_value(&mut self, expected: u8) -> Result<i64, BerError> {
        let bytes = self.expect_primitive(expected)?;
        decode_signed_integer(bytes)
    }

    pub fn try_integer_value(&mut self, expected: u8) -> Result<Option<i64>, BerError> {
        match self.try_primitive(expected)? {
            Some(bytes) => Ok(Some(decode_signed_integer(bytes)?)),
            None => Ok(None),
        }
    }

    pub fn read_boolean_value(&mut self, expected: u8) -> Result<bool, BerError> {
        let bytes = self.expect_primitive(expected)?;
        if bytes.len() != 1 {
            return Err(BerError::InvalidBooleanLength);
        }
        Ok(bytes[0] != 0)
    }

    /// BOOLEAN DEFAULT FALSE: absent means `false`.
    pub fn read_boolean_default_false(&mut self, expected: u8) -> Result<bool, BerError> {
        match self.try_primitive(expected)? {
            None => Ok(false),
            Some(bytes) if bytes.len() == 1 => Ok(bytes[0] != 0),
            Some(_) => Err(BerError::InvalidBooleanLength),
        }
    }

    pub fn read_octet_string_value(&mut self, expected: u8) -> Result<&'a [u8], BerError> {
        self.expect_primitive(expected)
    }

    pub fn try_octet_string_value(&mut self, expected: u8) -> Result<Option<&'a [u8]>, BerError> {
        self.try_primitive(expected)
    }

    pub fn read_utf8_value(&mut self, expected: u8) -> Result<&'a str, BerError> {
        let bytes = self.expect_primitive(expected)?;
        std::str::from_utf8(bytes).map_err(|_| BerError::InvalidUtf8)
    }

    pub fn try_utf8_value(&mut self, expected: u8) -> Result<Option<&'a str>, BerError> {
        match self.try_primitive(expected)? {
            Some(bytes) => Ok(Some(
                std::str::from_utf8(bytes).map_err(|_| BerError::InvalidUtf8)?,
            )),
            None => Ok(None),
        }
    }
}

/// Either a primitive TLV's raw value bytes or a constructed TLV's scoped
/// sub-cursor, as returned by [`Cursor::read_any`].
#[derive(Debug, Clone, Copy)]
pub enum AnyValue<'a> {
    Primitive(&'a [u8]),
    Constructed(Cursor<'a>),
}

/// Decodes a BER INTEGER/ENUMERATED content octet string: two's-complement,
/// big-endian, minimally encoded (1..=8 octets). Also used directly by
/// grammar actions that already hold a tag's raw value bytes via
/// [`Cursor::read_any`] (AbandonRequest's `MessageID` is one such case).
pub(crate) fn decode_signed_integer(bytes: &[u8]) -> Result<i64, BerError> {
    if bytes.is_empty() || bytes.len() > 8 {
        return Err(BerError::InvalidIntegerEncoding);
    }
    if bytes.len() > 1 {
        let first_nine_bits_all_zero = bytes[0] == 0x00 && bytes[1] & 0x80 == 0;
        let first_nine_bits_all_one = bytes[0] == 0xFF && bytes[1] & 0x80 != 0;
        if first_nine_bits_all_zero || first_nine_bits_all_one {
            return Err(BerError::InvalidIntegerEncoding);
        }
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut buf = if negative { [0xFFu8; 8] } else { [0u8; 8] };
    buf[8 - bytes.len()..].copy_from_slice(bytes);
    Ok(i64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_primitive_tlv() {
        let data = [0x04, 0x03, b'f', b'o', b'o'];
        let mut cursor = Cursor::new(&data, 10);
        let value = cursor.expect_primitive(0x04).unwrap();
        assert_eq!(value, b"foo");
        assert!(cursor.is_empty());
    }

    #[test]
    fn enters_constructed_tlv_with_child_depth() {
        let data = [0x30, 0x05, 0x02, 0x01, 0x03, 0x01, 0x00];
        let mut cursor = Cursor::new(&data, 10);
        let mut inner = cursor.enter_constructed(0x30).unwrap();
        assert_eq!(inner.read_integer_value(0x02).unwrap(), 3);
        let _ = inner.expect_primitive(0x01).unwrap();
        assert!(inner.finish().is_ok());
    }

    #[test]
    fn decodes_negative_two_complement_integer() {
        assert_eq!(decode_signed_integer(&[0xFE]).unwrap(), -2);
        assert_eq!(decode_signed_integer(&[0x01, 0xF4]).unwrap(), 500);
        assert_eq!(decode_signed_integer(&[0x00, 0x80]).unwrap(), 128);
    }

    #[test]
    fn rejects_non_minimal_integer_encoding() {
        assert!(decode_signed_integer(&[0x00, 0x01]).is_err());
        assert!(decode_signed_integer(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn truncated_length_is_an_error() {
        let data = [0x04, 0x05, b'h', b'i'];
        let mut cursor = Cursor::new(&data, 10);
        assert!(matches!(
            cursor.expect_primitive(0x04),
            Err(BerError::LengthExceedsBuffer { .. })
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        // ten nested SEQUENCE wrappers around a single INTEGER 1.
        let mut bytes = vec![0x02, 0x01, 0x01];
        for _ in 0..10 {
            let mut wrapped = vec![0x30, bytes.len() as u8];
            wrapped.extend_from_slice(&bytes);
            bytes = wrapped;
        }
        let mut current = Cursor::new(&bytes, 5);
        let mut depth = 0;
        let mut err = None;
        loop {
            match current.enter_constructed(0x30) {
                Ok(next) => {
                    current = next;
                    depth += 1;
                }
                Err(e) => {
                    err = Some(e);
                    break;
                }
            }
        }
        assert_eq!(depth, 5);
        assert_eq!(err, Some(BerError::DepthExceeded(5)));
    }
}
