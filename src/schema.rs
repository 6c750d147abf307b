/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! The schema collaborator interface the codec consumes (§6).
//!
//! The schema subsystem itself — OID tables, syntax checkers, the full set
//! of RFC 4517/4519 matching rules — is an external collaborator and out of
//! scope for this crate. What lives here is the narrow trait the DN and
//! filter parsers call through, plus a small built-in [`StaticSchemaManager`]
//! covering the handful of RFC 4519 attribute types commonly seen in
//! examples and tests, so the crate is usable (and its normalization
//! behavior testable) without wiring up a real directory schema.

use std::borrow::Cow;

use ahash::AHashMap;
use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("value cannot be normalized by this attribute type's equality rule")]
    NotNormalizable,
}

/// A matching rule: the (normalize, compare) pair RFC 4512 attaches to an
/// attribute type for equality, ordering, or substring semantics. This
/// crate only needs the rule's identity and its string-vs-binary nature;
/// actual comparison is the schema subsystem's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingRule {
    pub oid: SmolStr,
    pub human_readable: bool,
}

impl MatchingRule {
    pub const CASE_IGNORE_MATCH: &'static str = "2.5.13.2";
    pub const CASE_EXACT_MATCH: &'static str = "2.5.13.5";
    pub const OCTET_STRING_MATCH: &'static str = "2.5.13.17";

    fn case_ignore() -> Self {
        MatchingRule {
            oid: SmolStr::new_static(Self::CASE_IGNORE_MATCH),
            human_readable: true,
        }
    }

    fn octet_string() -> Self {
        MatchingRule {
            oid: SmolStr::new_static(Self::OCTET_STRING_MATCH),
            human_readable: false,
        }
    }
}

/// Attribute-type metadata as seen through the codec's narrow window:
/// its OID, its matching rules, and whether its syntax is human-readable
/// (non-human-readable syntaxes skip string normalization, §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeType {
    pub oid: SmolStr,
    pub equality_rule: Option<MatchingRule>,
    pub ordering_rule: Option<MatchingRule>,
    pub substring_rule: Option<MatchingRule>,
    pub human_readable: bool,
}

impl AttributeType {
    /// A sentinel attribute type for a name/OID the schema manager doesn't
    /// recognize: carries the spelling through as its own pseudo-OID and
    /// behaves as a human-readable type with case-ignore equality, which
    /// is the least surprising default for free-form directory data.
    pub fn unknown(spelling: &str) -> Self {
        AttributeType {
            oid: SmolStr::new(spelling),
            equality_rule: None,
            ordering_rule: None,
            substring_rule: None,
            human_readable: true,
        }
    }
}

/// The schema collaborator interface consumed by the DN and filter parsers
/// (§6). Implementations must be thread-safe and read-mostly: the codec
/// never mutates schema state and expects lookups to be safe under
/// arbitrary concurrent read (§5).
pub trait SchemaManager: Send + Sync {
    fn lookup_attribute_type(&self, name_or_oid: &str) -> Option<AttributeType>;

    fn lookup_matching_rule(&self, oid: &str) -> Option<MatchingRule>;

    /// Normalize `value` per `attr_type`'s equality matching rule. Returns
    /// the normalized bytes (still UTF-8 for human-readable syntaxes).
    /// A `None` return (not an `Err`) means "apply no additional
    /// normalization beyond what the caller already did" — reserved for
    /// attribute types this manager knows about but has no equality rule
    /// for (RFC 4512 permits this).
    fn normalize(&self, attr_type: &AttributeType, value: &[u8]) -> Result<Cow<'_, [u8]>, SchemaError>;
}

/// No schema configured: callers fall back to lowercasing the type
/// spelling and leaving values exactly as parsed (§4.6 "Without a schema
/// manager").
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSchema;

impl SchemaManager for NoSchema {
    fn lookup_attribute_type(&self, _name_or_oid: &str) -> Option<AttributeType> {
        None
    }

    fn lookup_matching_rule(&self, _oid: &str) -> Option<MatchingRule> {
        None
    }

    fn normalize(&self, _attr_type: &AttributeType, value: &[u8]) -> Result<Cow<'_, [u8]>, SchemaError> {
        Ok(Cow::Owned(value.to_vec()))
    }
}

/// A small built-in schema covering the RFC 4519 attribute types this
/// crate's own tests exercise. Not a substitute for the real schema
/// subsystem (out of scope per §1); useful as the reference
/// implementation of the [`SchemaManager`] contract and for round-trip
/// tests that need case-ignore normalization to kick in.
pub struct StaticSchemaManager {
    by_name: AHashMap<SmolStr, AttributeType>,
}

impl Default for StaticSchemaManager {
    fn default() -> Self {
        Self::rfc4519()
    }
}

impl StaticSchemaManager {
    pub fn rfc4519() -> Self {
        let mut by_name = AHashMap::default();
        let entries: &[(&str, &str, bool)] = &[
            ("cn", "2.5.4.3", true),
            ("sn", "2.5.4.4", true),
            ("ou", "2.5.4.11", true),
            ("o", "2.5.4.10", true),
            ("dc", "0.9.2342.19200300.100.1.25", true),
            ("uid", "0.9.2342.19200300.100.1.1", true),
            ("l", "2.5.4.7", true),
            ("st", "2.5.4.8", true),
            ("c", "2.5.4.6", true),
            ("mail", "0.9.2342.19200300.100.1.3", true),
            ("objectclass", "2.5.4.0", true),
            ("userpassword", "2.5.4.35", false),
        ];
        for (name, oid, human_readable) in entries {
            let rule = if *human_readable {
                Some(MatchingRule::case_ignore())
            } else {
                Some(MatchingRule::octet_string())
            };
            let attr_type = AttributeType {
                oid: SmolStr::new(*oid),
                equality_rule: rule.clone(),
                ordering_rule: None,
                substring_rule: if *human_readable { rule } else { None },
                human_readable: *human_readable,
            };
            by_name.insert(SmolStr::new(*name), attr_type);
        }
        StaticSchemaManager { by_name }
    }
}

impl SchemaManager for StaticSchemaManager {
    fn lookup_attribute_type(&self, name_or_oid: &str) -> Option<AttributeType> {
        let lower = name_or_oid.to_ascii_lowercase();
        if let Some(found) = self.by_name.get(lower.as_str()) {
            return Some(found.clone());
        }
        self.by_name
            .values()
            .find(|attr_type| attr_type.oid == lower)
            .cloned()
    }

    fn lookup_matching_rule(&self, oid: &str) -> Option<MatchingRule> {
        match oid {
            MatchingRule::CASE_IGNORE_MATCH => Some(MatchingRule::case_ignore()),
            MatchingRule::OCTET_STRING_MATCH => Some(MatchingRule::octet_string()),
            _ => None,
        }
    }

    fn normalize(&self, attr_type: &AttributeType, value: &[u8]) -> Result<Cow<'_, [u8]>, SchemaError> {
        if !attr_type.human_readable {
            return Ok(Cow::Owned(value.to_vec()));
        }
        let Ok(text) = std::str::from_utf8(value) else {
            return Ok(Cow::Owned(value.to_vec()));
        };
        let collapsed = collapse_insignificant_spaces(text.trim());
        Ok(Cow::Owned(collapsed.to_lowercase().into_bytes()))
    }
}

/// caseIgnoreMatch (and friends) treat runs of whitespace as a single
/// insignificant space (X.520). Leading/trailing space is handled by the
/// caller's `trim()`.
fn collapse_insignificant_spaces(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_schema_resolves_ou_to_oid() {
        let schema = StaticSchemaManager::default();
        let attr_type = schema.lookup_attribute_type("OU").unwrap();
        assert_eq!(attr_type.oid.as_str(), "2.5.4.11");
        assert!(attr_type.human_readable);
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        let schema = StaticSchemaManager::default();
        let attr_type = schema.lookup_attribute_type("ou").unwrap();
        let normalized = schema.normalize(&attr_type, b"  Exemple  Rdn  ").unwrap();
        assert_eq!(normalized.as_ref(), b"exemple rdn");
    }
}
