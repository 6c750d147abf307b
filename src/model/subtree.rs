/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! X.501 subtree specification parser (§4.8): base DN, specificExclusions
//! (chopBefore/chopAfter), minimum/maximum depth, and a refinement filter
//! over object-class OIDs.

use thiserror::Error;

use crate::model::dn::{Dn, DnError};
use crate::schema::SchemaManager;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubtreeError {
    #[error("malformed subtree specification syntax at byte {0}")]
    InvalidSyntax(usize),
    #[error("invalid DN in subtree specification: {0}")]
    InvalidDn(#[from] DnError),
    #[error("unknown subtree specification component {0:?}")]
    UnknownComponent(String),
}

/// `and|or|not|item:OID` refinement tree (§4.8). Resolvable against the
/// schema manager, but stored here purely as object-class OIDs — the
/// schema lookup, if any, is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement {
    And(Vec<Refinement>),
    Or(Vec<Refinement>),
    Not(Box<Refinement>),
    Item(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubtreeSpecification {
    pub base: Dn,
    pub chop_before: Vec<Dn>,
    pub chop_after: Vec<Dn>,
    pub minimum: Option<u32>,
    pub maximum: Option<u32>,
    pub refinement: Option<Refinement>,
}

impl SubtreeSpecification {
    pub fn parse(s: &str) -> Result<Self, SubtreeError> {
        Self::parse_with_schema(s, None)
    }

    pub fn parse_with_schema(
        s: &str,
        schema: Option<&dyn SchemaManager>,
    ) -> Result<Self, SubtreeError> {
        let mut parser = SubtreeParser {
            bytes: s.as_bytes(),
            pos: 0,
            schema,
        };
        parser.parse_specification()
    }
}

struct SubtreeParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    schema: Option<&'a dyn SchemaManager>,
}

impl<'a> SubtreeParser<'a> {
    fn skip_ws(&mut self) {
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), SubtreeError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(SubtreeError::InvalidSyntax(self.pos))
        }
    }

    /// Reads a bareword component label (e.g. `base`, `minimum`,
    /// `specificExclusions`). Does not consume trailing whitespace.
    fn read_label(&mut self) -> &'a str {
        let start = self.pos;
        while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_alphabetic() {
            self.pos += 1;
        }
        std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("")
    }

    /// A component label must be followed by at least one whitespace
    /// character before its value opens (§4.8, `{ base"ou=system" }` is
    /// rejected).
    fn require_whitespace_after_label(&mut self) -> Result<(), SubtreeError> {
        if self.peek().map(|b| b.is_ascii_whitespace()) != Some(true) {
            return Err(SubtreeError::InvalidSyntax(self.pos));
        }
        self.skip_ws();
        Ok(())
    }

    fn read_quoted_dn(&mut self) -> Result<Dn, SubtreeError> {
        self.expect(b'"')?;
        let start = self.pos;
        while self.peek() != Some(b'"') {
            if self.pos >= self.bytes.len() {
                return Err(SubtreeError::InvalidSyntax(self.pos));
            }
            self.pos += 1;
        }
        let dn_str = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| SubtreeError::InvalidSyntax(start))?;
        self.expect(b'"')?;
        Ok(Dn::parse_with_schema(dn_str, self.schema)?)
    }

    fn read_integer(&mut self) -> Result<u32, SubtreeError> {
        let start = self.pos;
        while self.peek().map(|b| b.is_ascii_digit()) == Some(true) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(SubtreeError::InvalidSyntax(start));
        }
        std::str::from_utf8(&self.bytes[start..self.pos])
            .unwrap()
            .parse()
            .map_err(|_| SubtreeError::InvalidSyntax(start))
    }

    /// `{ [component [, component]*] }`
    fn parse_specification(&mut self) -> Result<SubtreeSpecification, SubtreeError> {
        self.skip_ws();
        self.expect(b'{')?;
        self.skip_ws();

        let mut spec = SubtreeSpecification::default();

        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(spec);
        }

        loop {
            self.parse_component(&mut spec)?;
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(SubtreeError::InvalidSyntax(self.pos)),
            }
        }

        self.skip_ws();
        if self.pos != self.bytes.len() {
            return Err(SubtreeError::InvalidSyntax(self.pos));
        }
        Ok(spec)
    }

    fn parse_component(&mut self, spec: &mut SubtreeSpecification) -> Result<(), SubtreeError> {
        let label = self.read_label();
        match label {
            "base" => {
                self.require_whitespace_after_label()?;
                spec.base = self.read_quoted_dn()?;
            }
            "minimum" => {
                self.require_whitespace_after_label()?;
                spec.minimum = Some(self.read_integer()?);
            }
            "maximum" => {
                self.require_whitespace_after_label()?;
                spec.maximum = Some(self.read_integer()?);
            }
            "specificExclusions" => {
                self.require_whitespace_after_label()?;
                self.parse_specific_exclusions(spec)?;
            }
            "specificationFilter" => {
                self.require_whitespace_after_label()?;
                spec.refinement = Some(self.parse_refinement()?);
            }
            "" => return Err(SubtreeError::InvalidSyntax(self.pos)),
            other => return Err(SubtreeError::UnknownComponent(other.to_string())),
        }
        Ok(())
    }

    /// `specificExclusions { (chopBefore|chopAfter):"DN", … }`
    fn parse_specific_exclusions(
        &mut self,
        spec: &mut SubtreeSpecification,
    ) -> Result<(), SubtreeError> {
        self.expect(b'{')?;
        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(());
        }
        loop {
            let label = self.read_label();
            self.expect(b':')?;
            let dn = self.read_quoted_dn()?;
            match label {
                "chopBefore" => spec.chop_before.push(dn),
                "chopAfter" => spec.chop_after.push(dn),
                "" => return Err(SubtreeError::InvalidSyntax(self.pos)),
                other => return Err(SubtreeError::UnknownComponent(other.to_string())),
            }
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(SubtreeError::InvalidSyntax(self.pos)),
            }
        }
        Ok(())
    }

    /// `and|or|not|item:OID`, recursing into `(...)`-wrapped child lists.
    fn parse_refinement(&mut self) -> Result<Refinement, SubtreeError> {
        self.skip_ws();
        let label = self.read_label();
        self.skip_ws();
        match label {
            "item" => {
                self.expect(b':')?;
                self.skip_ws();
                let start = self.pos;
                while self.peek().map(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
                    == Some(true)
                {
                    self.pos += 1;
                }
                if start == self.pos {
                    return Err(SubtreeError::InvalidSyntax(start));
                }
                let oid = std::str::from_utf8(&self.bytes[start..self.pos])
                    .unwrap()
                    .to_string();
                Ok(Refinement::Item(oid))
            }
            "not" => {
                self.expect(b':')?;
                self.skip_ws();
                let child = self.parse_refinement()?;
                Ok(Refinement::Not(Box::new(child)))
            }
            "and" | "or" => {
                self.expect(b':')?;
                self.skip_ws();
                let children = self.parse_refinement_list()?;
                if label == "and" {
                    Ok(Refinement::And(children))
                } else {
                    Ok(Refinement::Or(children))
                }
            }
            "" => Err(SubtreeError::InvalidSyntax(self.pos)),
            other => Err(SubtreeError::UnknownComponent(other.to_string())),
        }
    }

    fn parse_refinement_list(&mut self) -> Result<Vec<Refinement>, SubtreeError> {
        self.expect(b'{')?;
        self.skip_ws();
        let mut items = Vec::new();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(items);
        }
        loop {
            items.push(self.parse_refinement()?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => {
                    self.pos += 1;
                    self.skip_ws();
                }
                Some(b'}') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(SubtreeError::InvalidSyntax(self.pos)),
            }
        }
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_f_base_exclusions_min_max() {
        let spec = SubtreeSpecification::parse(
            r#"{ base "ou=people", specificExclusions { chopBefore:"cn=y", chopAfter:"sn=l" }, minimum 7, maximum 77 }"#,
        )
        .unwrap();
        assert_eq!(spec.base, Dn::parse("ou=people").unwrap());
        assert_eq!(spec.chop_before, vec![Dn::parse("cn=y").unwrap()]);
        assert_eq!(spec.chop_after, vec![Dn::parse("sn=l").unwrap()]);
        assert_eq!(spec.minimum, Some(7));
        assert_eq!(spec.maximum, Some(77));
        assert_eq!(spec.refinement, None);
    }

    #[test]
    fn scenario_f_missing_whitespace_after_label_is_rejected() {
        let result = SubtreeSpecification::parse(r#"{ base"ou=system" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_specification() {
        let spec = SubtreeSpecification::parse("{ }").unwrap();
        assert_eq!(spec, SubtreeSpecification::default());
    }

    #[test]
    fn refinement_and_or_not_item() {
        let spec = SubtreeSpecification::parse(
            "{ specificationFilter and:{item:2.5.6.6, not:item:2.5.6.7} }",
        )
        .unwrap();
        assert_eq!(
            spec.refinement,
            Some(Refinement::And(vec![
                Refinement::Item("2.5.6.6".to_string()),
                Refinement::Not(Box::new(Refinement::Item("2.5.6.7".to_string()))),
            ]))
        );
    }

    #[test]
    fn unknown_component_is_rejected() {
        let result = SubtreeSpecification::parse(r#"{ bogus "x" }"#);
        assert!(matches!(result, Err(SubtreeError::UnknownComponent(_))));
    }
}
