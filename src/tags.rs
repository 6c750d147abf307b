/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! BER tag constants for every `protocolOp` CHOICE alternative and every
//! context-tagged field inside them (RFC 4511 §4, §6). Shared by
//! [`crate::decode`]'s grammar and [`crate::encode`]'s per-message
//! encoders so the two stay in lock-step by construction rather than by
//! convention.
//!
//! `DelRequest` and `AbandonRequest` are the two operations whose ASN.1
//! type is a primitive (`LDAPDN`/`MessageID` respectively) rather than a
//! `SEQUENCE`, so their tags have the constructed bit clear even though
//! every other request/response here is constructed.

// protocolOp application tags.
pub const OP_BIND_REQUEST: u8 = 0x60;
pub const OP_BIND_RESPONSE: u8 = 0x61;
pub const OP_UNBIND_REQUEST: u8 = 0x42;
pub const OP_SEARCH_REQUEST: u8 = 0x63;
pub const OP_SEARCH_RESULT_ENTRY: u8 = 0x64;
pub const OP_SEARCH_RESULT_DONE: u8 = 0x65;
pub const OP_MODIFY_REQUEST: u8 = 0x66;
pub const OP_MODIFY_RESPONSE: u8 = 0x67;
pub const OP_ADD_REQUEST: u8 = 0x68;
pub const OP_ADD_RESPONSE: u8 = 0x69;
pub const OP_DEL_REQUEST: u8 = 0x4A;
pub const OP_DEL_RESPONSE: u8 = 0x6B;
pub const OP_MODIFY_DN_REQUEST: u8 = 0x6C;
pub const OP_MODIFY_DN_RESPONSE: u8 = 0x6D;
pub const OP_COMPARE_REQUEST: u8 = 0x6E;
pub const OP_COMPARE_RESPONSE: u8 = 0x6F;
pub const OP_ABANDON_REQUEST: u8 = 0x50;
pub const OP_SEARCH_RESULT_REFERENCE: u8 = 0x73;
pub const OP_EXTENDED_REQUEST: u8 = 0x77;
pub const OP_EXTENDED_RESPONSE: u8 = 0x78;
pub const OP_INTERMEDIATE_RESPONSE: u8 = 0x79;

// AuthenticationChoice inside BindRequest.
pub const BIND_AUTH_SIMPLE: u8 = 0x80;
pub const BIND_AUTH_SASL: u8 = 0xA3;

// BindResponse.serverSaslCreds [7].
pub const BIND_RESPONSE_SASL_CREDS: u8 = 0x87;

// LDAPResult.referral [3].
pub const RESULT_REFERRAL: u8 = 0xA3;

// Filter CHOICE tags (RFC 4511 §4.5.1).
pub const FILTER_AND: u8 = 0xA0;
pub const FILTER_OR: u8 = 0xA1;
pub const FILTER_NOT: u8 = 0xA2;
pub const FILTER_EQUALITY: u8 = 0xA3;
pub const FILTER_SUBSTRINGS: u8 = 0xA4;
pub const FILTER_GREATER_OR_EQUAL: u8 = 0xA5;
pub const FILTER_LESS_OR_EQUAL: u8 = 0xA6;
pub const FILTER_PRESENT: u8 = 0x87;
pub const FILTER_APPROX_MATCH: u8 = 0xA8;
pub const FILTER_EXTENSIBLE_MATCH: u8 = 0xA9;

// SubstringFilter's substrings CHOICE tags.
pub const SUBSTRING_INITIAL: u8 = 0x80;
pub const SUBSTRING_ANY: u8 = 0x81;
pub const SUBSTRING_FINAL: u8 = 0x82;

// MatchingRuleAssertion fields inside an extensibleMatch filter.
pub const EXTENSIBLE_MATCHING_RULE: u8 = 0x81;
pub const EXTENSIBLE_TYPE: u8 = 0x82;
pub const EXTENSIBLE_MATCH_VALUE: u8 = 0x83;
pub const EXTENSIBLE_DN_ATTRIBUTES: u8 = 0x84;

// ModifyDNRequest.newSuperior [0].
pub const MODIFY_DN_NEW_SUPERIOR: u8 = 0x80;

// ExtendedRequest.
pub const EXTENDED_REQUEST_NAME: u8 = 0x80;
pub const EXTENDED_REQUEST_VALUE: u8 = 0x81;

// ExtendedResponse.
pub const EXTENDED_RESPONSE_NAME: u8 = 0x8A;
pub const EXTENDED_RESPONSE_VALUE: u8 = 0x8B;

// IntermediateResponse.
pub const INTERMEDIATE_RESPONSE_NAME: u8 = 0x80;
pub const INTERMEDIATE_RESPONSE_VALUE: u8 = 0x81;

// Message-level controls wrapper, [0] IMPLICIT SEQUENCE OF Control.
pub const CONTROLS: u8 = 0xA0;
