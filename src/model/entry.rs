/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Entry/Attribute/Value model (§3). These are the types a
//! `SearchResultEntry` decodes into and an `AddRequest` encodes from; they
//! carry no BER concerns of their own.

use indexmap::IndexMap;

use crate::model::dn::Dn;
use crate::schema::AttributeType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// UTF-8 text, possibly schema-normalized.
    String(String),
    /// Opaque bytes for non-human-readable syntaxes.
    Binary(Vec<u8>),
}

impl Value {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::String(s) => s.as_bytes(),
            Value::Binary(b) => b,
        }
    }
}

/// {userProvidedId, resolved AttributeType, ordered-but-set-semantics
/// collection of Values}. Duplicates by the type's equality rule are
/// rejected on insert.
#[derive(Debug, Clone)]
pub struct Attribute {
    user_provided_id: String,
    attr_type: Option<AttributeType>,
    values: Vec<Value>,
}

impl Attribute {
    pub fn new(user_provided_id: impl Into<String>, attr_type: Option<AttributeType>) -> Self {
        Attribute {
            user_provided_id: user_provided_id.into(),
            attr_type,
            values: Vec::new(),
        }
    }

    pub fn user_provided_id(&self) -> &str {
        &self.user_provided_id
    }

    pub fn attr_type(&self) -> Option<&AttributeType> {
        self.attr_type.as_ref()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Appends `value` unless an equal value (by the attribute's equality
    /// rule when a schema type is known, otherwise byte equality) is
    /// already present. Returns `false` if the value was a duplicate.
    pub fn push_value(&mut self, value: Value) -> bool {
        if self.values.iter().any(|existing| self.equal(existing, &value)) {
            return false;
        }
        self.values.push(value);
        true
    }

    fn equal(&self, a: &Value, b: &Value) -> bool {
        match (&self.attr_type, a, b) {
            (Some(attr_type), Value::String(a), Value::String(b)) if attr_type.human_readable => {
                a.to_lowercase() == b.to_lowercase()
            }
            _ => a.as_bytes() == b.as_bytes(),
        }
    }
}

/// {DN, ordered mapping from attribute-type OID to Attribute}. Insertion
/// order is preserved (not significant for equality).
#[derive(Debug, Clone)]
pub struct Entry {
    dn: Dn,
    attributes: IndexMap<String, Attribute>,
}

impl Entry {
    pub fn new(dn: Dn) -> Self {
        Entry {
            dn,
            attributes: IndexMap::new(),
        }
    }

    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn attribute(&self, oid_or_id: &str) -> Option<&Attribute> {
        self.attributes.get(oid_or_id)
    }

    /// Inserts `attribute` keyed by its resolved OID when a schema type
    /// is known, otherwise by its lower-cased user-provided spelling.
    pub fn insert_attribute(&mut self, attribute: Attribute) {
        let key = match &attribute.attr_type {
            Some(attr_type) => attr_type.oid.to_string(),
            None => attribute.user_provided_id.to_ascii_lowercase(),
        };
        self.attributes.insert(key, attribute);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{MatchingRule, SchemaManager, StaticSchemaManager};

    #[test]
    fn duplicate_human_readable_values_are_rejected() {
        let schema = StaticSchemaManager::default();
        let attr_type = schema.lookup_attribute_type("cn").unwrap();
        let mut attr = Attribute::new("cn", Some(attr_type));
        assert!(attr.push_value(Value::String("Babs".to_string())));
        assert!(!attr.push_value(Value::String("BABS".to_string())));
        assert_eq!(attr.values().len(), 1);
    }

    #[test]
    fn entry_attribute_lookup_by_oid() {
        let schema = StaticSchemaManager::default();
        let attr_type = schema.lookup_attribute_type("ou").unwrap();
        let mut entry = Entry::new(Dn::empty());
        let mut attr = Attribute::new("ou", Some(attr_type));
        attr.push_value(Value::String("people".to_string()));
        entry.insert_attribute(attr);
        assert!(entry.attribute("2.5.4.11").is_some());
    }

    #[test]
    fn binary_values_rely_on_byte_equality() {
        let unknown = crate::schema::AttributeType::unknown("userCertificate");
        let rule = MatchingRule::OCTET_STRING_MATCH;
        let _ = rule;
        let mut attr = Attribute::new("userCertificate", Some(unknown));
        assert!(attr.push_value(Value::Binary(vec![1, 2, 3])));
        assert!(attr.push_value(Value::Binary(vec![1, 2, 4])));
        assert_eq!(attr.values().len(), 2);
    }
}
