/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! RFC 4514 Distinguished Name model and string parser (§4.6).

use smallvec::SmallVec;
use thiserror::Error;

use crate::schema::{AttributeType, SchemaManager};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DnError {
    #[error("malformed DN syntax at byte {0}")]
    InvalidDnSyntax(usize),
    #[error("empty or unresolvable attribute type at byte {0}")]
    InvalidAttributeType(usize),
}

/// One `type=value` pair inside an RDN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ava {
    up_type: String,
    type_oid: String,
    value_bytes: Vec<u8>,
    norm_value: String,
}

impl Ava {
    pub fn up_type(&self) -> &str {
        &self.up_type
    }

    /// The attribute type reduced to an OID (schema-resolved) or the
    /// lowercased user spelling when no schema is configured (§3 Invariants).
    pub fn type_oid(&self) -> &str {
        &self.type_oid
    }

    /// The AVA's value as raw decoded bytes (escapes resolved, hex-string
    /// form decoded).
    pub fn value_bytes(&self) -> &[u8] {
        &self.value_bytes
    }

    /// The value after RFC-4514 canonical-escape rendering of its
    /// (schema-normalized, if configured) form. This is the text used to
    /// build `Dn::norm_name`.
    pub fn norm_value(&self) -> &str {
        &self.norm_value
    }
}

/// A non-empty set of AVAs that together identify a child within its
/// parent (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rdn {
    avas: SmallVec<[Ava; 1]>,
}

impl Rdn {
    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }
}

/// An ordered sequence of RDNs, most-specific first (§3).
#[derive(Debug, Clone)]
pub struct Dn {
    rdns: Vec<Rdn>,
    up_name: String,
    norm_name: String,
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.norm_name == other.norm_name
    }
}
impl Eq for Dn {}

impl Default for Dn {
    fn default() -> Self {
        Dn::empty()
    }
}

impl Dn {
    /// The empty DN: legal, prints as the empty string (§3).
    pub fn empty() -> Self {
        Dn {
            rdns: Vec::new(),
            up_name: String::new(),
            norm_name: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// The user-provided form, bytes-for-bytes as supplied modulo
    /// separator normalization (`;` is accepted on input but this is the
    /// form the caller gave us, so even `;` separators are preserved here).
    pub fn up_name(&self) -> &str {
        &self.up_name
    }

    /// The canonical, schema-normalized form (§3). Two DNs are equal iff
    /// their `norm_name`s are identical.
    pub fn norm_name(&self) -> &str {
        &self.norm_name
    }

    pub fn parse(s: &str) -> Result<Self, DnError> {
        Self::parse_with_schema(s, None)
    }

    pub fn parse_with_schema(
        s: &str,
        schema: Option<&dyn SchemaManager>,
    ) -> Result<Self, DnError> {
        let mut parser = DnParser::new(s, schema);
        parser.parse()
    }
}

struct DnParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    schema: Option<&'a dyn SchemaManager>,
}

impl<'a> DnParser<'a> {
    fn new(input: &'a str, schema: Option<&'a dyn SchemaManager>) -> Self {
        DnParser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            schema,
        }
    }

    fn parse(&mut self) -> Result<Dn, DnError> {
        if self.input.is_empty() {
            return Ok(Dn::empty());
        }

        let mut rdns = Vec::new();
        let mut norm_parts = Vec::new();

        loop {
            let rdn_start = self.pos;
            let rdn_end = self.scan_rdn_span()?;
            let rdn_str = &self.input[rdn_start..rdn_end];
            let (rdn, norm) = self.parse_rdn(rdn_str, rdn_start)?;
            rdns.push(rdn);
            norm_parts.push(norm);

            self.pos = rdn_end;
            if self.pos >= self.bytes.len() {
                break;
            }
            // separator: ',' or ';'
            match self.bytes[self.pos] {
                b',' | b';' => {
                    self.pos += 1;
                }
                _ => return Err(DnError::InvalidDnSyntax(self.pos)),
            }
            if self.pos >= self.bytes.len() {
                return Err(DnError::InvalidDnSyntax(self.pos));
            }
        }

        Ok(Dn {
            rdns,
            up_name: self.input.to_string(),
            norm_name: norm_parts.join(","),
        })
    }

    /// Scans forward from `self.pos` to the end of the current RDN
    /// (stopping at the first unescaped `,` or `;`), returning the end
    /// offset (exclusive).
    fn scan_rdn_span(&self) -> Result<usize, DnError> {
        let mut i = self.pos;
        let mut escaped = false;
        while i < self.bytes.len() {
            let b = self.bytes[i];
            if escaped {
                escaped = false;
                i += 1;
                continue;
            }
            match b {
                b'\\' => {
                    escaped = true;
                    i += 1;
                }
                b',' | b';' => return Ok(i),
                _ => i += 1,
            }
        }
        if escaped {
            return Err(DnError::InvalidDnSyntax(i));
        }
        Ok(i)
    }

    fn parse_rdn(&self, rdn_str: &str, base_offset: usize) -> Result<(Rdn, String), DnError> {
        let ava_spans = split_unescaped(rdn_str, b'+');
        if ava_spans.is_empty() {
            return Err(DnError::InvalidDnSyntax(base_offset));
        }
        let mut avas = SmallVec::new();
        let mut norm_avas = Vec::new();
        for span in ava_spans {
            let (ava, norm) = self.parse_ava(span, base_offset)?;
            avas.push(ava);
            norm_avas.push(norm);
        }
        // RFC 4514 canonical form sorts nothing: AVA order within a
        // multi-valued RDN is preserved as written.
        Ok((Rdn { avas }, norm_avas.join("+")))
    }

    fn parse_ava(&self, ava_str: &str, base_offset: usize) -> Result<(Ava, String), DnError> {
        let eq_pos = find_unescaped(ava_str, b'=')
            .ok_or(DnError::InvalidDnSyntax(base_offset))?;
        let raw_type = ava_str[..eq_pos].trim();
        let raw_value = &ava_str[eq_pos + 1..];

        if raw_type.is_empty() {
            return Err(DnError::InvalidAttributeType(base_offset));
        }
        let up_type = strip_oid_prefix(raw_type);
        if !is_valid_attribute_type_spelling(up_type) {
            return Err(DnError::InvalidAttributeType(base_offset));
        }

        let is_hex_form = trim_dn_value_whitespace(raw_value).starts_with('#');
        let value_bytes = decode_dn_value(raw_value)?;

        let attr_type = self
            .schema
            .and_then(|schema| schema.lookup_attribute_type(up_type));
        let type_oid = match &attr_type {
            Some(resolved) => resolved.oid.to_string(),
            None => up_type.to_ascii_lowercase(),
        };

        let norm_value = if is_hex_form {
            // the BER-encoded form round-trips as itself: re-normalizing
            // binary octets through a string equality rule makes no sense.
            let mut s = String::from("#");
            for b in &value_bytes {
                s.push_str(&format!("{b:02X}"));
            }
            s
        } else {
            let norm_value_bytes = match (&attr_type, self.schema) {
                (Some(resolved), Some(schema)) => schema
                    .normalize(resolved, &value_bytes)
                    .map(|cow| cow.into_owned())
                    .unwrap_or_else(|_| value_bytes.clone()),
                _ => value_bytes.clone(),
            };
            render_canonical_value(&norm_value_bytes)
        };
        let norm = format!("{type_oid}={norm_value}");

        Ok((
            Ava {
                up_type: raw_type.to_string(),
                type_oid,
                value_bytes,
                norm_value: norm_value.clone(),
            },
            norm,
        ))
    }
}

fn strip_oid_prefix(spelling: &str) -> &str {
    for prefix in ["oid.", "OID."] {
        if let Some(rest) = spelling.strip_prefix(prefix) {
            return rest;
        }
    }
    spelling
}

fn is_valid_attribute_type_spelling(s: &str) -> bool {
    if s.is_empty() {
        return false;
    }
    let first_is_digit = s.as_bytes()[0].is_ascii_digit();
    if first_is_digit {
        // dotted OID: digits and '.' only
        s.bytes().all(|b| b.is_ascii_digit() || b == b'.')
            && !s.starts_with('.')
            && !s.ends_with('.')
    } else {
        s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
    }
}

/// Splits on an unescaped separator byte, honoring `\` escapes (but not
/// hex-string values, which never contain the separator bytes we split
/// on here: `+` and `=`).
fn split_unescaped(s: &str, sep: u8) -> Vec<&str> {
    let bytes = s.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0;
    let mut i = 0;
    let mut escaped = false;
    while i < bytes.len() {
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }
        match bytes[i] {
            b'\\' => {
                escaped = true;
                i += 1;
            }
            b if b == sep => {
                spans.push(&s[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    spans.push(&s[start..]);
    spans
}

fn find_unescaped(s: &str, target: u8) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut escaped = false;
    while i < bytes.len() {
        if escaped {
            escaped = false;
            i += 1;
            continue;
        }
        match bytes[i] {
            b'\\' => {
                escaped = true;
                i += 1;
            }
            b if b == target => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Decodes a DN value (RFC 4514 §2.4): either a leading-`#` BER hex string,
/// or a sequence of literal bytes / `\HH` escapes / `\`-escaped specials.
fn decode_dn_value(raw: &str) -> Result<Vec<u8>, DnError> {
    let trimmed = trim_dn_value_whitespace(raw);
    if let Some(hex) = trimmed.strip_prefix('#') {
        return decode_hex_string(hex);
    }

    let bytes = trimmed.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if i + 1 >= bytes.len() {
                    return Err(DnError::InvalidDnSyntax(i));
                }
                let next = bytes[i + 1];
                if is_dn_special_escape(next) {
                    out.push(next);
                    i += 2;
                } else if next.is_ascii_hexdigit() {
                    if i + 2 >= bytes.len() || !bytes[i + 2].is_ascii_hexdigit() {
                        return Err(DnError::InvalidDnSyntax(i));
                    }
                    let hi = hex_value(next);
                    let lo = hex_value(bytes[i + 2]);
                    out.push((hi << 4) | lo);
                    i += 3;
                } else {
                    return Err(DnError::InvalidDnSyntax(i));
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

/// RFC 4514's value grammar strips a single unescaped leading/trailing
/// space (further spaces must be escaped to survive); we only trim one
/// layer here since `decode_dn_value` is handed exactly the raw span
/// between separators, untouched.
fn trim_dn_value_whitespace(raw: &str) -> &str {
    let mut s = raw;
    if let Some(stripped) = s.strip_prefix(' ') {
        s = stripped;
    }
    if s.ends_with(' ') && !s.ends_with("\\ ") {
        s = &s[..s.len() - 1];
    }
    s
}

fn is_dn_special_escape(b: u8) -> bool {
    matches!(b, b',' | b'=' | b'+' | b'<' | b'>' | b'#' | b';' | b'\\' | b'"' | b' ')
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

fn decode_hex_string(hex: &str) -> Result<Vec<u8>, DnError> {
    let bytes = hex.as_bytes();
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return Err(DnError::InvalidDnSyntax(0));
    }
    let mut out = Vec::with_capacity(bytes.len() / 2);
    for chunk in bytes.chunks(2) {
        if !chunk[0].is_ascii_hexdigit() || !chunk[1].is_ascii_hexdigit() {
            return Err(DnError::InvalidDnSyntax(0));
        }
        out.push((hex_value(chunk[0]) << 4) | hex_value(chunk[1]));
    }
    Ok(out)
}

/// Renders `bytes` as an RFC-4514 canonical value. Printable specials
/// (`"`, `+`, `,`, `;`, `<`, `>`, `\`), a leading `#`, and a leading or
/// trailing space are escaped as `\` followed by the literal character
/// (RFC 4514 §2.4's first escaping form); NUL and any non-ASCII byte are
/// escaped as uppercase `\HH` (its second form, since those bytes have no
/// printable single-character representation in the DN string syntax).
fn render_canonical_value(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() + 4);
    let last = bytes.len().saturating_sub(1);
    for (idx, &b) in bytes.iter().enumerate() {
        match b {
            b'"' | b'+' | b',' | b';' | b'<' | b'>' | b'\\' => {
                out.push('\\');
                out.push(b as char);
            }
            b'#' if idx == 0 => {
                out.push('\\');
                out.push('#');
            }
            b' ' if idx == 0 || idx == last => {
                out.push('\\');
                out.push(' ');
            }
            0x00 => out.push_str("\\00"),
            _ if b >= 0x80 => out.push_str(&format!("\\{b:02X}")),
            _ => out.push(b as char),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StaticSchemaManager;

    #[test]
    fn empty_dn_round_trips() {
        let dn = Dn::parse("").unwrap();
        assert!(dn.is_empty());
        assert_eq!(dn.norm_name(), "");
    }

    #[test]
    fn two_rdn_dn_without_schema() {
        let dn = Dn::parse("cn=Babs Jensen,ou=People").unwrap();
        assert_eq!(dn.rdns().len(), 2);
        assert_eq!(dn.norm_name(), "cn=Babs Jensen,ou=People");
    }

    #[test]
    fn plus_separated_multivalued_rdn() {
        let dn = Dn::parse("cn=Babs+uid=bjensen,ou=People").unwrap();
        assert_eq!(dn.rdns()[0].avas().len(), 2);
    }

    #[test]
    fn scenario_e_utf8_plus_hex_escape_with_schema() {
        let schema = StaticSchemaManager::default();
        let dn =
            Dn::parse_with_schema("OU=Exemple \\+ Rdn\\C3\\A4\\ ", Some(&schema)).unwrap();
        assert_eq!(dn.up_name(), "OU=Exemple \\+ Rdn\\C3\\A4\\ ");
        assert_eq!(dn.norm_name(), "2.5.4.11=exemple \\+ rdn\\C3\\A4");
    }

    #[test]
    fn hex_string_value_decodes_as_binary() {
        let dn = Dn::parse("cn=#04024869").unwrap();
        assert_eq!(
            dn.rdns()[0].avas()[0].value_bytes(),
            &[0x04, 0x02, 0x48, 0x69]
        );
    }

    #[test]
    fn odd_hex_digit_count_is_invalid() {
        assert!(Dn::parse("cn=#123").is_err());
    }

    #[test]
    fn dn_equality_is_by_norm_name() {
        let a = Dn::parse("CN=foo,OU=bar").unwrap();
        let b = Dn::parse("cn=foo,ou=bar").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn semicolon_separator_accepted() {
        let dn = Dn::parse("cn=a;ou=b").unwrap();
        assert_eq!(dn.rdns().len(), 2);
    }

    #[test]
    fn missing_equals_is_invalid_syntax() {
        assert!(Dn::parse("cnfoo").is_err());
    }

    #[test]
    fn empty_type_is_invalid_attribute_type() {
        let err = Dn::parse("=foo").unwrap_err();
        assert_eq!(err, DnError::InvalidAttributeType(0));
    }

    #[test]
    fn oid_prefix_is_stripped_in_canonical_form() {
        let dn = Dn::parse("OID.2.5.4.3=foo").unwrap();
        assert_eq!(dn.norm_name(), "2.5.4.3=foo");
    }
}
