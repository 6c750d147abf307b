/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Primitive BER layer: tag/length/value reading and writing.
//!
//! Definite-length form only; indefinite length is a parse error at every
//! layer built on top of this one. Reverse-oriented encode helpers build
//! `ReverseBuffer` instances in a single pass with no precomputed length
//! tree walk (see `writer`).

mod tag;
pub use tag::{
    HighTagNumberForm, Tag, TagClass, TAG_BOOLEAN, TAG_ENUMERATED, TAG_INTEGER, TAG_NULL,
    TAG_OBJECT_IDENTIFIER, TAG_OCTET_STRING, TAG_SEQUENCE, TAG_SET,
};

mod length;
pub use length::{BerLength, BerLengthEncoder, BerLengthParseError};

mod integer;
pub use integer::{BerInteger, BerIntegerParseError};

mod writer;
pub use writer::ReverseBuffer;

mod encode;
pub use encode::{
    encode_boolean, encode_boolean_tagged, encode_enumerated, encode_integer,
    encode_integer_tagged, encode_octet_string, encode_octet_string_tagged, encode_sequence,
    encode_sequence_tagged, encode_set,
};

mod cursor;
pub(crate) use cursor::decode_signed_integer;
pub use cursor::{AnyValue, BerError, Cursor};

/// Maximum byte length of a BER length's own encoding this crate will
/// accept before treating the PDU as malformed, independent of the
/// caller-configured `max_pdu_size`. A length needing more than 8
/// content octets already exceeds any value representable in a `u64`
/// offset and can never legitimately describe an LDAP PDU.
pub const MAX_LENGTH_OCTETS: usize = 9;
