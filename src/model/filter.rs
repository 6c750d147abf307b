/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! RFC 4515 search filter model, string parser, and canonical serializer
//! (§4.5). The same [`Filter`] tree is what the decoder's grammar actions
//! build directly from BER (§4.3) and what the reverse encoder walks
//! (§4.4); this module only owns the tree shape and the textual form.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("malformed filter syntax at byte {0}")]
    InvalidFilterSyntax(usize),
    #[error("unterminated escape sequence at byte {0}")]
    InvalidEscape(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringFilter {
    pub initial: Option<Vec<u8>>,
    pub any: Vec<Vec<u8>>,
    pub r#final: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensibleMatch {
    pub matching_rule: Option<String>,
    pub attr_type: Option<String>,
    pub value: Vec<u8>,
    pub dn_attributes: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equality(String, Vec<u8>),
    GreaterOrEqual(String, Vec<u8>),
    LessOrEqual(String, Vec<u8>),
    ApproxMatch(String, Vec<u8>),
    Present(String),
    Substring(String, SubstringFilter),
    ExtensibleMatch(ExtensibleMatch),
}

impl Filter {
    pub fn parse(s: &str) -> Result<Filter, FilterError> {
        let bytes = s.as_bytes();
        let mut parser = FilterParser { bytes, pos: 0 };
        let filter = parser.parse_filter()?;
        if parser.pos != bytes.len() {
            return Err(FilterError::InvalidFilterSyntax(parser.pos));
        }
        Ok(filter)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        match self {
            Filter::And(children) => {
                write!(f, "&")?;
                for child in children {
                    write!(f, "{child}")?;
                }
            }
            Filter::Or(children) => {
                write!(f, "|")?;
                for child in children {
                    write!(f, "{child}")?;
                }
            }
            Filter::Not(child) => write!(f, "!{child}")?,
            Filter::Equality(attr, value) => write!(f, "{attr}={}", escape_filter_value(value))?,
            Filter::GreaterOrEqual(attr, value) => {
                write!(f, "{attr}>={}", escape_filter_value(value))?
            }
            Filter::LessOrEqual(attr, value) => {
                write!(f, "{attr}<={}", escape_filter_value(value))?
            }
            Filter::ApproxMatch(attr, value) => {
                write!(f, "{attr}~={}", escape_filter_value(value))?
            }
            Filter::Present(attr) => write!(f, "{attr}=*")?,
            Filter::Substring(attr, sub) => {
                write!(f, "{attr}=")?;
                if let Some(initial) = &sub.initial {
                    write!(f, "{}", escape_filter_value(initial))?;
                }
                write!(f, "*")?;
                for any in &sub.any {
                    write!(f, "{}*", escape_filter_value(any))?;
                }
                if let Some(fin) = &sub.r#final {
                    write!(f, "{}", escape_filter_value(fin))?;
                }
            }
            Filter::ExtensibleMatch(ext) => {
                if let Some(attr_type) = &ext.attr_type {
                    write!(f, "{attr_type}")?;
                }
                if ext.dn_attributes {
                    write!(f, ":dn")?;
                }
                if let Some(rule) = &ext.matching_rule {
                    write!(f, ":{rule}")?;
                }
                write!(f, ":={}", escape_filter_value(&ext.value))?;
            }
        }
        write!(f, ")")
    }
}

fn escape_filter_value(value: &[u8]) -> String {
    let mut out = String::with_capacity(value.len());
    for &b in value {
        match b {
            0x00 | b'(' | b')' | b'*' | b'\\' => out.push_str(&format!("\\{b:02X}")),
            _ => out.push(b as char),
        }
    }
    out
}

struct FilterParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FilterParser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, b: u8) -> Result<(), FilterError> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(FilterError::InvalidFilterSyntax(self.pos))
        }
    }

    /// `filter = LPAREN filtercomp RPAREN`
    fn parse_filter(&mut self) -> Result<Filter, FilterError> {
        self.expect(b'(')?;
        let filter = self.parse_filtercomp()?;
        self.expect(b')')?;
        Ok(filter)
    }

    fn parse_filtercomp(&mut self) -> Result<Filter, FilterError> {
        match self.peek() {
            Some(b'&') => {
                self.pos += 1;
                let children = self.parse_filterlist()?;
                if children.is_empty() {
                    return Err(FilterError::InvalidFilterSyntax(self.pos));
                }
                Ok(Filter::And(children))
            }
            Some(b'|') => {
                self.pos += 1;
                let children = self.parse_filterlist()?;
                if children.is_empty() {
                    return Err(FilterError::InvalidFilterSyntax(self.pos));
                }
                Ok(Filter::Or(children))
            }
            Some(b'!') => {
                self.pos += 1;
                let child = self.parse_filter()?;
                Ok(Filter::Not(Box::new(child)))
            }
            _ => self.parse_item(),
        }
    }

    fn parse_filterlist(&mut self) -> Result<Vec<Filter>, FilterError> {
        let mut filters = Vec::new();
        while self.peek() == Some(b'(') {
            filters.push(self.parse_filter()?);
        }
        Ok(filters)
    }

    /// `item = simple / present / substring / extensible`
    fn parse_item(&mut self) -> Result<Filter, FilterError> {
        let start = self.pos;

        // extensible match starting with `:` (no attr type, e.g. `(:dn:2.4.8.10:=value)`)
        if self.peek() == Some(b':') {
            return self.parse_extensible(None);
        }

        let attr_end = self.scan_attribute_description();
        if attr_end == start {
            return Err(FilterError::InvalidFilterSyntax(start));
        }
        let attr = std::str::from_utf8(&self.bytes[start..attr_end])
            .map_err(|_| FilterError::InvalidFilterSyntax(start))?
            .to_string();
        self.pos = attr_end;

        match self.peek() {
            Some(b':') => self.parse_extensible(Some(attr)),
            Some(b'=') => {
                self.pos += 1;
                self.parse_equality_like(attr)
            }
            Some(b'>') if self.bytes.get(self.pos + 1) == Some(&b'=') => {
                self.pos += 2;
                let value = self.parse_assertion_value()?;
                Ok(Filter::GreaterOrEqual(attr, value))
            }
            Some(b'<') if self.bytes.get(self.pos + 1) == Some(&b'=') => {
                self.pos += 2;
                let value = self.parse_assertion_value()?;
                Ok(Filter::LessOrEqual(attr, value))
            }
            Some(b'~') if self.bytes.get(self.pos + 1) == Some(&b'=') => {
                self.pos += 2;
                let value = self.parse_assertion_value()?;
                Ok(Filter::ApproxMatch(attr, value))
            }
            _ => Err(FilterError::InvalidFilterSyntax(self.pos)),
        }
    }

    /// Attribute description: type name / OID, optionally with `;option`s.
    /// Stops before `=`, `>=`, `<=`, `~=`, or `:` (extensible marker).
    fn scan_attribute_description(&self) -> usize {
        let mut i = self.pos;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'=' | b'>' | b'<' | b'~' | b':' | b')' | b'(' => break,
                _ => i += 1,
            }
        }
        i
    }

    /// After the `=` of an `item` production: could be `present` (`*`),
    /// `substring` (contains unescaped `*`), or a plain `equality` value.
    fn parse_equality_like(&mut self, attr: String) -> Result<Filter, FilterError> {
        let value_start = self.pos;
        let value_end = self.scan_value_span();
        let span = &self.bytes[value_start..value_end];

        if span == b"*" {
            self.pos = value_end;
            return Ok(Filter::Present(attr));
        }

        if span.contains(&b'*') {
            let sub = self.parse_substring_span(span)?;
            self.pos = value_end;
            return Ok(Filter::Substring(attr, sub));
        }

        self.pos = value_end;
        let value = decode_filter_value(span)?;
        Ok(Filter::Equality(attr, value))
    }

    fn parse_assertion_value(&mut self) -> Result<Vec<u8>, FilterError> {
        let start = self.pos;
        let end = self.scan_value_span();
        self.pos = end;
        decode_filter_value(&self.bytes[start..end])
    }

    /// Scans to the matching unescaped `)` for this item's value.
    fn scan_value_span(&self) -> usize {
        let mut i = self.pos;
        let mut escaped = false;
        while i < self.bytes.len() {
            if escaped {
                escaped = false;
                i += 1;
                continue;
            }
            match self.bytes[i] {
                b'\\' => {
                    escaped = true;
                    i += 1;
                }
                b')' => break,
                _ => i += 1,
            }
        }
        i
    }

    fn parse_substring_span(&self, span: &[u8]) -> Result<SubstringFilter, FilterError> {
        let parts = split_unescaped_star(span);
        let n = parts.len();
        let mut initial = None;
        let mut r#final = None;
        let mut any = Vec::new();
        for (idx, part) in parts.iter().enumerate() {
            if idx == 0 && !part.is_empty() {
                initial = Some(decode_filter_value(part)?);
            } else if idx == n - 1 && !part.is_empty() {
                r#final = Some(decode_filter_value(part)?);
            } else if idx > 0 && idx < n - 1 {
                any.push(decode_filter_value(part)?);
            }
            // idx==0 or idx==n-1 empty spans are the implicit leading/trailing `*`
        }
        Ok(SubstringFilter {
            initial,
            any,
            r#final,
        })
    }

    fn parse_extensible(&mut self, attr: Option<String>) -> Result<Filter, FilterError> {
        let mut dn_attributes = false;
        let mut matching_rule = None;

        loop {
            if self.peek() != Some(b':') {
                break;
            }
            self.pos += 1;
            let tok_start = self.pos;
            let tok_end = {
                let mut i = tok_start;
                while i < self.bytes.len() && self.bytes[i] != b':' && self.bytes[i] != b'=' {
                    i += 1;
                }
                i
            };
            let token = &self.bytes[tok_start..tok_end];
            if token == b"dn" {
                dn_attributes = true;
                self.pos = tok_end;
            } else if !token.is_empty() {
                matching_rule = Some(
                    std::str::from_utf8(token)
                        .map_err(|_| FilterError::InvalidFilterSyntax(tok_start))?
                        .to_string(),
                );
                self.pos = tok_end;
            } else {
                return Err(FilterError::InvalidFilterSyntax(tok_start));
            }

            if self.peek() == Some(b'=') {
                break;
            }
        }

        self.expect(b'=')?;
        let value = self.parse_assertion_value()?;
        Ok(Filter::ExtensibleMatch(ExtensibleMatch {
            matching_rule,
            attr_type: attr,
            value,
            dn_attributes,
        }))
    }
}

fn split_unescaped_star(span: &[u8]) -> Vec<&[u8]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut escaped = false;
    while i < span.len() {
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }
        match span[i] {
            b'\\' => {
                escaped = true;
                i += 1;
            }
            b'*' => {
                parts.push(&span[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    parts.push(&span[start..]);
    parts
}

/// Decodes a filter assertion value: `\xx` two-hex-digit escapes decode a
/// byte; any other character (including a leading `#`, unlike DN values)
/// is copied through verbatim. A lone trailing `\` is an error.
fn decode_filter_value(span: &[u8]) -> Result<Vec<u8>, FilterError> {
    let mut out = Vec::with_capacity(span.len());
    let mut i = 0;
    while i < span.len() {
        match span[i] {
            b'\\' => {
                if i + 2 >= span.len() + 1 || i + 2 > span.len() {
                    return Err(FilterError::InvalidEscape(i));
                }
                let hi = span.get(i + 1).copied();
                let lo = span.get(i + 2).copied();
                match (hi, lo) {
                    (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                        out.push((hex_value(hi) << 4) | hex_value(lo));
                        i += 3;
                    }
                    _ => return Err(FilterError::InvalidEscape(i)),
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_d_nested_and_or_substring() {
        let filter = Filter::parse("(&(objectClass=Person)(|(sn=Jensen)(cn=Babs J*)))").unwrap();
        assert_eq!(
            filter,
            Filter::And(vec![
                Filter::Equality("objectClass".to_string(), b"Person".to_vec()),
                Filter::Or(vec![
                    Filter::Equality("sn".to_string(), b"Jensen".to_vec()),
                    Filter::Substring(
                        "cn".to_string(),
                        SubstringFilter {
                            initial: Some(b"Babs J".to_vec()),
                            any: vec![],
                            r#final: None,
                        }
                    ),
                ]),
            ])
        );
        assert_eq!(
            filter.to_string(),
            "(&(objectClass=Person)(|(sn=Jensen)(cn=Babs J*)))"
        );
    }

    #[test]
    fn present_filter() {
        let filter = Filter::parse("(attr=*)").unwrap();
        assert_eq!(filter, Filter::Present("attr".to_string()));
    }

    #[test]
    fn substring_with_only_any() {
        let filter = Filter::parse("(attr=*foo*)").unwrap();
        assert_eq!(
            filter,
            Filter::Substring(
                "attr".to_string(),
                SubstringFilter {
                    initial: None,
                    any: vec![b"foo".to_vec()],
                    r#final: None,
                }
            )
        );
        assert_eq!(filter.to_string(), "(attr=*foo*)");
    }

    #[test]
    fn extensible_match_with_dn_and_rule() {
        let filter = Filter::parse("(cn:dn:2.4.8.10:=John Smith)").unwrap();
        assert_eq!(
            filter,
            Filter::ExtensibleMatch(ExtensibleMatch {
                matching_rule: Some("2.4.8.10".to_string()),
                attr_type: Some("cn".to_string()),
                value: b"John Smith".to_vec(),
                dn_attributes: true,
            })
        );
    }

    #[test]
    fn extensible_match_without_attr_type() {
        let filter = Filter::parse("(:dn:2.4.8.10:=John Smith)").unwrap();
        assert_eq!(
            filter,
            Filter::ExtensibleMatch(ExtensibleMatch {
                matching_rule: Some("2.4.8.10".to_string()),
                attr_type: None,
                value: b"John Smith".to_vec(),
                dn_attributes: true,
            })
        );
    }

    #[test]
    fn not_requires_exactly_one_child() {
        let filter = Filter::parse("(!(objectClass=Person))").unwrap();
        assert_eq!(
            filter,
            Filter::Not(Box::new(Filter::Equality(
                "objectClass".to_string(),
                b"Person".to_vec()
            )))
        );
    }

    #[test]
    fn and_with_zero_children_is_rejected() {
        assert!(Filter::parse("(&)").is_err());
    }

    #[test]
    fn hash_is_not_a_hex_indicator_in_filters() {
        let filter = Filter::parse("(cn=#foo)").unwrap();
        assert_eq!(filter, Filter::Equality("cn".to_string(), b"#foo".to_vec()));
    }

    #[test]
    fn value_escapes_round_trip() {
        let filter = Filter::parse(r"(cn=Foo \28Bar\29)").unwrap();
        assert_eq!(
            filter,
            Filter::Equality("cn".to_string(), b"Foo (Bar)".to_vec())
        );
        assert_eq!(filter.to_string(), r"(cn=Foo \28Bar\29)");
    }
}
