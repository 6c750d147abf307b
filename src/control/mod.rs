/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Controls registry (§4.7): one module per concrete control, each
//! exposing `decode_value`/`encode_value` for its inner BER value, plus a
//! static OID-keyed lookup table mirroring the action-table pattern used
//! for the grammar (no runtime registration, no reflection).

mod cascade;
mod entry_change;
mod manage_dsa_it;
mod paged_results;
mod persistent_search;
mod proxied_authz;
mod sort;
mod subentries;

pub use cascade::Cascade;
pub use entry_change::EntryChangeNotification;
pub use manage_dsa_it::ManageDsaIt;
pub use paged_results::PagedResults;
pub use persistent_search::PersistentSearch;
pub use proxied_authz::ProxiedAuthz;
pub use sort::{SortKey, SortRequest, SortResponse};
pub use subentries::Subentries;

use thiserror::Error;

use crate::ber::ReverseBuffer;
use crate::message::Control;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("malformed control value for OID {0}")]
    MalformedValue(String),
    #[error("empty control type OID")]
    EmptyOid,
}

/// A control whose inner value has been decoded into one of the known
/// types. Produced by [`decode_known`]; absent from the registry (or
/// decode failure on a non-critical control) means the caller keeps the
/// opaque [`Control`] bytes instead.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedControl {
    PagedResults(PagedResults),
    SortRequest(SortRequest),
    SortResponse(SortResponse),
    ManageDsaIt(ManageDsaIt),
    Cascade(Cascade),
    Subentries(Subentries),
    EntryChangeNotification(EntryChangeNotification),
    PersistentSearch(PersistentSearch),
    ProxiedAuthz(ProxiedAuthz),
}

/// `(OID, decoder)` static table, populated once and never mutated —
/// safe for arbitrary concurrent read (§5).
const REGISTRY: &[(&str, fn(&[u8]) -> Result<TypedControl, ControlError>)] = &[
    (PagedResults::OID, |v| {
        PagedResults::decode_value(v).map(TypedControl::PagedResults)
    }),
    (SortRequest::OID, |v| {
        SortRequest::decode_value(v).map(TypedControl::SortRequest)
    }),
    (SortResponse::OID, |v| {
        SortResponse::decode_value(v).map(TypedControl::SortResponse)
    }),
    (ManageDsaIt::OID, |v| {
        ManageDsaIt::decode_value(v).map(TypedControl::ManageDsaIt)
    }),
    (Cascade::OID, |v| {
        Cascade::decode_value(v).map(TypedControl::Cascade)
    }),
    (Subentries::OID, |v| {
        Subentries::decode_value(v).map(TypedControl::Subentries)
    }),
    (EntryChangeNotification::OID, |v| {
        EntryChangeNotification::decode_value(v).map(TypedControl::EntryChangeNotification)
    }),
    (PersistentSearch::OID, |v| {
        PersistentSearch::decode_value(v).map(TypedControl::PersistentSearch)
    }),
    (ProxiedAuthz::OID, |v| {
        ProxiedAuthz::decode_value(v).map(TypedControl::ProxiedAuthz)
    }),
];

fn lookup(oid: &str) -> Option<fn(&[u8]) -> Result<TypedControl, ControlError>> {
    REGISTRY
        .iter()
        .find(|(registered_oid, _)| *registered_oid == oid)
        .map(|(_, decoder)| *decoder)
}

/// Attempts to decode `control`'s inner value through the registry.
/// `Ok(None)` means the OID has no registered factory, not an error —
/// the caller keeps the control's opaque bytes. A registered-but-failing
/// decode propagates to the caller, who (per §4.7) converts it to
/// `PROTOCOL_ERROR` when the control is critical and otherwise logs a
/// warning and retains the opaque payload.
pub fn decode_known(control: &Control) -> Result<Option<TypedControl>, ControlError> {
    if control.control_type.is_empty() {
        return Err(ControlError::EmptyOid);
    }
    let Some(decoder) = lookup(&control.control_type) else {
        return Ok(None);
    };
    let value = control.control_value.as_deref().unwrap_or(&[]);
    decoder(value).map(Some)
}

/// Encodes a [`TypedControl`] back into an opaque [`Control`], ready for
/// the generic controls-sequence encoder.
pub fn encode_known(typed: &TypedControl, critical: bool) -> Control {
    let mut buf = ReverseBuffer::new();
    let oid = match typed {
        TypedControl::PagedResults(c) => {
            c.encode_value(&mut buf);
            PagedResults::OID
        }
        TypedControl::SortRequest(c) => {
            c.encode_value(&mut buf);
            SortRequest::OID
        }
        TypedControl::SortResponse(c) => {
            c.encode_value(&mut buf);
            SortResponse::OID
        }
        TypedControl::ManageDsaIt(c) => {
            c.encode_value(&mut buf);
            ManageDsaIt::OID
        }
        TypedControl::Cascade(c) => {
            c.encode_value(&mut buf);
            Cascade::OID
        }
        TypedControl::Subentries(c) => {
            c.encode_value(&mut buf);
            Subentries::OID
        }
        TypedControl::EntryChangeNotification(c) => {
            c.encode_value(&mut buf);
            EntryChangeNotification::OID
        }
        TypedControl::PersistentSearch(c) => {
            c.encode_value(&mut buf);
            PersistentSearch::OID
        }
        TypedControl::ProxiedAuthz(c) => {
            c.encode_value(&mut buf);
            ProxiedAuthz::OID
        }
    };
    Control::new(oid)
        .critical(critical)
        .with_value(buf.finish())
}
