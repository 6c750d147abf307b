/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Streaming BER/DER codec, DN model, and search filter model for LDAPv3
//! (RFC 4511). See `spec.md`/`SPEC_FULL.md` at the workspace root for the
//! full component design; in short:
//!
//!   - [`ber`] — the primitive TLV layer (definite-length only).
//!   - [`decode`] — the incremental decoder engine and per-message grammar.
//!   - [`encode`] — the single-pass reverse encoder.
//!   - [`message`] — the LDAP message model (`Message`, `Operation`,
//!     `LdapResult`, `Control`, ...).
//!   - [`model`] — the DN, search filter, entry, and subtree specification
//!     models consumed and produced by the codec.
//!   - [`control`] — the controls registry (PagedResults, SortRequest, ...).
//!   - [`schema`] — the narrow schema-manager collaborator interface.

pub mod ber;
pub mod control;
pub mod decode;
pub mod encode;
pub mod message;
pub mod model;
pub mod schema;
mod tags;

pub use decode::{DecodeError, Decoder, DecoderConfig};
pub use encode::{encode_message, EncodeError};
pub use message::{Control, LdapResult, Message, Operation, ResultCode};
