/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! The LDAP message model (§3, §4.3): one [`Message`] per `LDAPMessage`
//! PDU, tagged by [`Operation`] and carrying an ordered [`Control`] list.

use crate::model::dn::Dn;
use crate::model::entry::{Attribute, Entry};
use crate::model::filter::Filter;

/// `resultCode` per RFC 4511 §4.1.9. Codes this crate has never seen
/// named keep their raw value in `Other` rather than being rejected —
/// §3 requires 91..125 to be accepted even though only 0..90 are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Success,
    OperationsError,
    ProtocolError,
    TimeLimitExceeded,
    SizeLimitExceeded,
    CompareFalse,
    CompareTrue,
    AuthMethodNotSupported,
    StrongerAuthRequired,
    Referral,
    AdminLimitExceeded,
    UnavailableCriticalExtension,
    ConfidentialityRequired,
    SaslBindInProgress,
    NoSuchAttribute,
    UndefinedAttributeType,
    InappropriateMatching,
    ConstraintViolation,
    AttributeOrValueExists,
    InvalidAttributeSyntax,
    NoSuchObject,
    AliasProblem,
    InvalidDnSyntax,
    AliasDereferencingProblem,
    InappropriateAuthentication,
    InvalidCredentials,
    InsufficientAccessRights,
    Busy,
    Unavailable,
    UnwillingToPerform,
    LoopDetect,
    NamingViolation,
    ObjectClassViolation,
    NotAllowedOnNonLeaf,
    NotAllowedOnRdn,
    EntryAlreadyExists,
    ObjectClassModsProhibited,
    AffectsMultipleDsas,
    Other(u8),
}

impl ResultCode {
    pub fn code(self) -> u8 {
        match self {
            ResultCode::Success => 0,
            ResultCode::OperationsError => 1,
            ResultCode::ProtocolError => 2,
            ResultCode::TimeLimitExceeded => 3,
            ResultCode::SizeLimitExceeded => 4,
            ResultCode::CompareFalse => 5,
            ResultCode::CompareTrue => 6,
            ResultCode::AuthMethodNotSupported => 7,
            ResultCode::StrongerAuthRequired => 8,
            ResultCode::Referral => 10,
            ResultCode::AdminLimitExceeded => 11,
            ResultCode::UnavailableCriticalExtension => 12,
            ResultCode::ConfidentialityRequired => 13,
            ResultCode::SaslBindInProgress => 14,
            ResultCode::NoSuchAttribute => 16,
            ResultCode::UndefinedAttributeType => 17,
            ResultCode::InappropriateMatching => 18,
            ResultCode::ConstraintViolation => 19,
            ResultCode::AttributeOrValueExists => 20,
            ResultCode::InvalidAttributeSyntax => 21,
            ResultCode::NoSuchObject => 32,
            ResultCode::AliasProblem => 33,
            ResultCode::InvalidDnSyntax => 34,
            ResultCode::AliasDereferencingProblem => 36,
            ResultCode::InappropriateAuthentication => 48,
            ResultCode::InvalidCredentials => 49,
            ResultCode::InsufficientAccessRights => 50,
            ResultCode::Busy => 51,
            ResultCode::Unavailable => 52,
            ResultCode::UnwillingToPerform => 53,
            ResultCode::LoopDetect => 54,
            ResultCode::NamingViolation => 64,
            ResultCode::ObjectClassViolation => 65,
            ResultCode::NotAllowedOnNonLeaf => 66,
            ResultCode::NotAllowedOnRdn => 67,
            ResultCode::EntryAlreadyExists => 68,
            ResultCode::ObjectClassModsProhibited => 69,
            ResultCode::AffectsMultipleDsas => 71,
            ResultCode::Other(code) => code,
        }
    }

    pub fn from_code(code: u8) -> ResultCode {
        match code {
            0 => ResultCode::Success,
            1 => ResultCode::OperationsError,
            2 => ResultCode::ProtocolError,
            3 => ResultCode::TimeLimitExceeded,
            4 => ResultCode::SizeLimitExceeded,
            5 => ResultCode::CompareFalse,
            6 => ResultCode::CompareTrue,
            7 => ResultCode::AuthMethodNotSupported,
            8 => ResultCode::StrongerAuthRequired,
            10 => ResultCode::Referral,
            11 => ResultCode::AdminLimitExceeded,
            12 => ResultCode::UnavailableCriticalExtension,
            13 => ResultCode::ConfidentialityRequired,
            14 => ResultCode::SaslBindInProgress,
            16 => ResultCode::NoSuchAttribute,
            17 => ResultCode::UndefinedAttributeType,
            18 => ResultCode::InappropriateMatching,
            19 => ResultCode::ConstraintViolation,
            20 => ResultCode::AttributeOrValueExists,
            21 => ResultCode::InvalidAttributeSyntax,
            32 => ResultCode::NoSuchObject,
            33 => ResultCode::AliasProblem,
            34 => ResultCode::InvalidDnSyntax,
            36 => ResultCode::AliasDereferencingProblem,
            48 => ResultCode::InappropriateAuthentication,
            49 => ResultCode::InvalidCredentials,
            50 => ResultCode::InsufficientAccessRights,
            51 => ResultCode::Busy,
            52 => ResultCode::Unavailable,
            53 => ResultCode::UnwillingToPerform,
            54 => ResultCode::LoopDetect,
            64 => ResultCode::NamingViolation,
            65 => ResultCode::ObjectClassViolation,
            66 => ResultCode::NotAllowedOnNonLeaf,
            67 => ResultCode::NotAllowedOnRdn,
            68 => ResultCode::EntryAlreadyExists,
            69 => ResultCode::ObjectClassModsProhibited,
            71 => ResultCode::AffectsMultipleDsas,
            other => ResultCode::Other(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    BaseObject,
    SingleLevel,
    WholeSubtree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerefAliases {
    Never,
    InSearching,
    FindingBase,
    Always,
}

/// `changeType` per RFC 4533/the persistent-search and entry-change-notify
/// controls (§4.7). The bit values double as the `changeTypes` bitmask the
/// persistent search control's request carries (1..15, any non-empty
/// combination of the four).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Add,
    Delete,
    Modify,
    ModifyDn,
}

impl ChangeType {
    pub fn bit(self) -> u8 {
        match self {
            ChangeType::Add => 1,
            ChangeType::Delete => 2,
            ChangeType::Modify => 4,
            ChangeType::ModifyDn => 8,
        }
    }

    pub fn from_bit(value: i64) -> Option<ChangeType> {
        match value {
            1 => Some(ChangeType::Add),
            2 => Some(ChangeType::Delete),
            4 => Some(ChangeType::Modify),
            8 => Some(ChangeType::ModifyDn),
            _ => None,
        }
    }
}

/// {resultCode, matchedDN, diagnosticMessage, referral} (§3).
#[derive(Debug, Clone, PartialEq)]
pub struct LdapResult {
    pub result_code: ResultCode,
    pub matched_dn: Dn,
    pub diagnostic_message: String,
    pub referral: Option<Vec<String>>,
}

impl LdapResult {
    pub fn success() -> Self {
        LdapResult {
            result_code: ResultCode::Success,
            matched_dn: Dn::empty(),
            diagnostic_message: String::new(),
            referral: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindCredentials {
    Simple(Vec<u8>),
    Sasl {
        mechanism: String,
        credentials: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    pub version: u8,
    pub name: Dn,
    pub credentials: BindCredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BindResponse {
    pub result: LdapResult,
    pub server_sasl_creds: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub base_object: Dn,
    pub scope: Scope,
    pub deref_aliases: DerefAliases,
    pub size_limit: u32,
    pub time_limit: u32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifyOperationKind {
    Add,
    Delete,
    Replace,
    Increment,
}

#[derive(Debug, Clone)]
pub struct ModifyOperation {
    pub kind: ModifyOperationKind,
    pub modification: Attribute,
}

#[derive(Debug, Clone)]
pub struct ModifyRequest {
    pub object: Dn,
    pub changes: Vec<ModifyOperation>,
}

#[derive(Debug, Clone)]
pub struct AddRequest {
    pub entry: Entry,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyDnRequest {
    pub entry: Dn,
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    pub new_superior: Option<Dn>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRequest {
    pub entry: Dn,
    pub attribute_desc: String,
    pub assertion_value: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedRequest {
    pub request_name: String,
    pub request_value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedResponse {
    pub result: LdapResult,
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntermediateResponse {
    pub response_name: Option<String>,
    pub response_value: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
pub struct SearchResultEntry {
    pub entry: Entry,
}

/// Discriminated union over the protocol operations this crate covers
/// (§3). Response variants for Modify/Add/Del/ModifyDn/Compare share
/// `LdapResult`'s shape and are not given separate wrapper types.
#[derive(Debug, Clone)]
pub enum Operation {
    BindRequest(BindRequest),
    BindResponse(BindResponse),
    UnbindRequest,
    SearchRequest(SearchRequest),
    SearchResultEntry(SearchResultEntry),
    SearchResultReference(Vec<String>),
    SearchResultDone(LdapResult),
    ModifyRequest(ModifyRequest),
    ModifyResponse(LdapResult),
    AddRequest(AddRequest),
    AddResponse(LdapResult),
    DelRequest(Dn),
    DelResponse(LdapResult),
    ModifyDnRequest(ModifyDnRequest),
    ModifyDnResponse(LdapResult),
    CompareRequest(CompareRequest),
    CompareResponse(LdapResult),
    AbandonRequest(i32),
    ExtendedRequest(ExtendedRequest),
    ExtendedResponse(ExtendedResponse),
    IntermediateResponse(IntermediateResponse),
}

/// {OID, criticality (default false), optional decoded payload bytes +
/// optional typed view} (§3). Messages own their controls; the list is
/// never shared across messages.
#[derive(Debug, Clone)]
pub struct Control {
    pub control_type: String,
    pub criticality: bool,
    pub control_value: Option<Vec<u8>>,
}

impl Control {
    pub fn new(control_type: impl Into<String>) -> Self {
        Control {
            control_type: control_type.into(),
            criticality: false,
            control_value: None,
        }
    }

    pub fn critical(mut self, critical: bool) -> Self {
        self.criticality = critical;
        self
    }

    pub fn with_value(mut self, value: Vec<u8>) -> Self {
        self.control_value = Some(value);
        self
    }
}

/// `LDAPOID ::= OCTET STRING` constrained by RFC 4511 §4.1.2 to the ABNF
/// `numericoid` production: dotted decimal arcs, no empty or leading-zero
/// arcs beyond a bare `0`, at least two arcs. Used to reject a malformed
/// `controlType` symmetrically on decode and encode (§4.3).
pub fn is_valid_numeric_oid(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let mut arcs = 0;
    for arc in s.split('.') {
        arcs += 1;
        if arc.is_empty() || !arc.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if arc.len() > 1 && arc.as_bytes()[0] == b'0' {
            return false;
        }
    }
    arcs >= 2
}

/// One `LDAPMessage` PDU: `{ messageID, protocolOp, controls [0] OPTIONAL }`.
/// `message_id` is validated to `1..=i32::MAX` by the decoder/constructors;
/// this type itself does not re-validate.
#[derive(Debug, Clone)]
pub struct Message {
    pub message_id: i32,
    pub operation: Operation,
    pub controls: Vec<Control>,
}

impl Message {
    pub fn new(message_id: i32, operation: Operation) -> Self {
        Message {
            message_id,
            operation,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: Vec<Control>) -> Self {
        self.controls = controls;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_code_round_trips_named_and_reserved() {
        assert_eq!(ResultCode::from_code(34), ResultCode::InvalidDnSyntax);
        assert_eq!(ResultCode::InvalidDnSyntax.code(), 34);
        assert_eq!(ResultCode::from_code(100), ResultCode::Other(100));
        assert_eq!(ResultCode::Other(100).code(), 100);
    }

    #[test]
    fn control_builder_defaults_non_critical() {
        let control = Control::new("2.16.840.1.113730.3.4.2");
        assert!(!control.criticality);
        assert!(control.control_value.is_none());
    }
}
