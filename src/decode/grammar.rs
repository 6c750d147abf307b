/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Per-`protocolOp` grammar actions (§4.3): one function per `Operation`
//! variant, dispatched by [`decode_operation`] off the tag the outer
//! message grammar already peeled off. Each function owns exactly the
//! fields of its ASN.1 SEQUENCE and calls `finish()` once it has consumed
//! them all, so trailing/extra fields are caught at the point they occur
//! rather than silently ignored.

use crate::ber::{
    AnyValue, Cursor, TAG_BOOLEAN, TAG_ENUMERATED, TAG_INTEGER, TAG_OCTET_STRING, TAG_SEQUENCE,
    TAG_SET,
};
use crate::message::{
    AddRequest, BindCredentials, BindRequest, BindResponse, CompareRequest, DerefAliases,
    ExtendedRequest, ExtendedResponse, IntermediateResponse, LdapResult, ModifyDnRequest,
    ModifyOperation, ModifyOperationKind, ModifyRequest, Operation, ResultCode, Scope,
    SearchRequest, SearchResultEntry,
};
use crate::model::{Attribute, Dn, Entry, ExtensibleMatch, Filter, SubstringFilter, Value};
use crate::tags;

use super::DecodeError;

fn expect_constructed<'a>(value: AnyValue<'a>) -> Result<Cursor<'a>, DecodeError> {
    match value {
        AnyValue::Constructed(cursor) => Ok(cursor),
        AnyValue::Primitive(_) => Err(crate::ber::BerError::ExpectedConstructed.into()),
    }
}

fn expect_primitive_value<'a>(value: AnyValue<'a>) -> Result<&'a [u8], DecodeError> {
    match value {
        AnyValue::Primitive(bytes) => Ok(bytes),
        AnyValue::Constructed(_) => Err(crate::ber::BerError::ExpectedPrimitive.into()),
    }
}

fn decode_dn_str(s: &str) -> Result<Dn, DecodeError> {
    Ok(Dn::parse(s)?)
}

fn decode_dn_bytes(bytes: &[u8]) -> Result<Dn, DecodeError> {
    let s = std::str::from_utf8(bytes).map_err(|_| crate::ber::BerError::InvalidUtf8)?;
    decode_dn_str(s)
}

fn decode_attribute_value(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(s) => Value::String(s.to_string()),
        Err(_) => Value::Binary(bytes.to_vec()),
    }
}

pub(super) fn decode_operation(tag: u8, value: AnyValue<'_>) -> Result<Operation, DecodeError> {
    match tag {
        tags::OP_BIND_REQUEST => {
            decode_bind_request(expect_constructed(value)?).map(Operation::BindRequest)
        }
        tags::OP_BIND_RESPONSE => {
            decode_bind_response(expect_constructed(value)?).map(Operation::BindResponse)
        }
        tags::OP_UNBIND_REQUEST => {
            let bytes = expect_primitive_value(value)?;
            if !bytes.is_empty() {
                return Err(crate::ber::BerError::TrailingBytes.into());
            }
            Ok(Operation::UnbindRequest)
        }
        tags::OP_SEARCH_REQUEST => {
            decode_search_request(expect_constructed(value)?).map(Operation::SearchRequest)
        }
        tags::OP_SEARCH_RESULT_ENTRY => {
            decode_search_result_entry(expect_constructed(value)?)
                .map(Operation::SearchResultEntry)
        }
        tags::OP_SEARCH_RESULT_DONE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::SearchResultDone)
        }
        tags::OP_SEARCH_RESULT_REFERENCE => {
            decode_uri_list(expect_constructed(value)?).map(Operation::SearchResultReference)
        }
        tags::OP_MODIFY_REQUEST => {
            decode_modify_request(expect_constructed(value)?).map(Operation::ModifyRequest)
        }
        tags::OP_MODIFY_RESPONSE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::ModifyResponse)
        }
        tags::OP_ADD_REQUEST => {
            decode_add_request(expect_constructed(value)?).map(Operation::AddRequest)
        }
        tags::OP_ADD_RESPONSE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::AddResponse)
        }
        tags::OP_DEL_REQUEST => {
            let bytes = expect_primitive_value(value)?;
            Ok(Operation::DelRequest(decode_dn_bytes(bytes)?))
        }
        tags::OP_DEL_RESPONSE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::DelResponse)
        }
        tags::OP_MODIFY_DN_REQUEST => {
            decode_modify_dn_request(expect_constructed(value)?).map(Operation::ModifyDnRequest)
        }
        tags::OP_MODIFY_DN_RESPONSE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::ModifyDnResponse)
        }
        tags::OP_COMPARE_REQUEST => {
            decode_compare_request(expect_constructed(value)?).map(Operation::CompareRequest)
        }
        tags::OP_COMPARE_RESPONSE => {
            decode_ldap_result(expect_constructed(value)?).map(Operation::CompareResponse)
        }
        tags::OP_ABANDON_REQUEST => {
            let bytes = expect_primitive_value(value)?;
            let id = crate::ber::decode_signed_integer(bytes)?;
            if !(1..=i32::MAX as i64).contains(&id) {
                return Err(DecodeError::InvalidMessageId(id));
            }
            Ok(Operation::AbandonRequest(id as i32))
        }
        tags::OP_EXTENDED_REQUEST => {
            decode_extended_request(expect_constructed(value)?).map(Operation::ExtendedRequest)
        }
        tags::OP_EXTENDED_RESPONSE => {
            decode_extended_response(expect_constructed(value)?).map(Operation::ExtendedResponse)
        }
        tags::OP_INTERMEDIATE_RESPONSE => decode_intermediate_response(expect_constructed(value)?)
            .map(Operation::IntermediateResponse),
        other => Err(DecodeError::UnknownOperationTag { tag: other }),
    }
}

fn decode_ldap_result_fields(seq: &mut Cursor<'_>) -> Result<LdapResult, DecodeError> {
    let raw_code = seq.read_integer_value(TAG_ENUMERATED)?;
    if !(0..=255).contains(&raw_code) {
        return Err(DecodeError::ConstraintViolation("resultCode", raw_code));
    }
    let result_code = ResultCode::from_code(raw_code as u8);
    let matched_dn = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let diagnostic_message = seq.read_utf8_value(TAG_OCTET_STRING)?.to_string();
    let referral = match seq.try_enter_constructed(tags::RESULT_REFERRAL)? {
        Some(mut uris) => {
            let mut list = Vec::new();
            while uris.has_more() {
                list.push(uris.read_utf8_value(TAG_OCTET_STRING)?.to_string());
            }
            Some(list)
        }
        None => None,
    };
    Ok(LdapResult {
        result_code,
        matched_dn,
        diagnostic_message,
        referral,
    })
}

fn decode_ldap_result(mut seq: Cursor<'_>) -> Result<LdapResult, DecodeError> {
    let result = decode_ldap_result_fields(&mut seq)?;
    seq.finish()?;
    Ok(result)
}

fn decode_bind_request(mut seq: Cursor<'_>) -> Result<BindRequest, DecodeError> {
    let raw_version = seq.read_integer_value(TAG_INTEGER)?;
    if raw_version != 3 {
        return Err(DecodeError::ConstraintViolation("bind version", raw_version));
    }
    let name = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let auth_tag = seq.peek_tag()?.raw();
    let credentials = if auth_tag == tags::BIND_AUTH_SIMPLE {
        BindCredentials::Simple(seq.expect_primitive(tags::BIND_AUTH_SIMPLE)?.to_vec())
    } else if auth_tag == tags::BIND_AUTH_SASL {
        let mut sasl = seq.enter_constructed(tags::BIND_AUTH_SASL)?;
        let mechanism = sasl.read_utf8_value(TAG_OCTET_STRING)?.to_string();
        let credentials = sasl
            .try_octet_string_value(TAG_OCTET_STRING)?
            .map(|bytes| bytes.to_vec());
        sasl.finish()?;
        BindCredentials::Sasl {
            mechanism,
            credentials,
        }
    } else {
        return Err(crate::ber::BerError::UnexpectedTag {
            expected: tags::BIND_AUTH_SIMPLE,
            found: auth_tag,
        }
        .into());
    };
    seq.finish()?;
    Ok(BindRequest {
        version: raw_version as u8,
        name,
        credentials,
    })
}

fn decode_bind_response(mut seq: Cursor<'_>) -> Result<BindResponse, DecodeError> {
    let result = decode_ldap_result_fields(&mut seq)?;
    let server_sasl_creds = seq
        .try_octet_string_value(tags::BIND_RESPONSE_SASL_CREDS)?
        .map(|bytes| bytes.to_vec());
    seq.finish()?;
    Ok(BindResponse {
        result,
        server_sasl_creds,
    })
}

fn decode_search_request(mut seq: Cursor<'_>) -> Result<SearchRequest, DecodeError> {
    let base_object = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let raw_scope = seq.read_integer_value(TAG_ENUMERATED)?;
    let scope = match raw_scope {
        0 => Scope::BaseObject,
        1 => Scope::SingleLevel,
        2 => Scope::WholeSubtree,
        other => return Err(DecodeError::ConstraintViolation("scope", other)),
    };
    let raw_deref = seq.read_integer_value(TAG_ENUMERATED)?;
    let deref_aliases = match raw_deref {
        0 => DerefAliases::Never,
        1 => DerefAliases::InSearching,
        2 => DerefAliases::FindingBase,
        3 => DerefAliases::Always,
        other => return Err(DecodeError::ConstraintViolation("derefAliases", other)),
    };
    let raw_size_limit = seq.read_integer_value(TAG_INTEGER)?;
    if !(0..=i64::from(u32::MAX)).contains(&raw_size_limit) {
        return Err(DecodeError::ConstraintViolation("sizeLimit", raw_size_limit));
    }
    let raw_time_limit = seq.read_integer_value(TAG_INTEGER)?;
    if !(0..=i64::from(u32::MAX)).contains(&raw_time_limit) {
        return Err(DecodeError::ConstraintViolation("timeLimit", raw_time_limit));
    }
    let types_only = seq.read_boolean_value(TAG_BOOLEAN)?;
    let (filter_tag, filter_value) = seq.read_any()?;
    let filter = decode_filter(filter_tag.raw(), filter_value)?;
    let mut attr_seq = seq.enter_constructed(TAG_SEQUENCE)?;
    let mut attributes = Vec::new();
    while attr_seq.has_more() {
        attributes.push(attr_seq.read_utf8_value(TAG_OCTET_STRING)?.to_string());
    }
    seq.finish()?;
    Ok(SearchRequest {
        base_object,
        scope,
        deref_aliases,
        size_limit: raw_size_limit as u32,
        time_limit: raw_time_limit as u32,
        types_only,
        filter,
        attributes,
    })
}

fn decode_filter(tag: u8, value: AnyValue<'_>) -> Result<Filter, DecodeError> {
    match tag {
        tags::FILTER_AND => Ok(Filter::And(decode_filter_set(expect_constructed(value)?)?)),
        tags::FILTER_OR => Ok(Filter::Or(decode_filter_set(expect_constructed(value)?)?)),
        tags::FILTER_NOT => {
            let mut inner = expect_constructed(value)?;
            let (child_tag, child_value) = inner.read_any()?;
            let child = decode_filter(child_tag.raw(), child_value)?;
            inner.finish()?;
            Ok(Filter::Not(Box::new(child)))
        }
        tags::FILTER_EQUALITY => {
            let (attr, val) = decode_ava(expect_constructed(value)?)?;
            Ok(Filter::Equality(attr, val))
        }
        tags::FILTER_GREATER_OR_EQUAL => {
            let (attr, val) = decode_ava(expect_constructed(value)?)?;
            Ok(Filter::GreaterOrEqual(attr, val))
        }
        tags::FILTER_LESS_OR_EQUAL => {
            let (attr, val) = decode_ava(expect_constructed(value)?)?;
            Ok(Filter::LessOrEqual(attr, val))
        }
        tags::FILTER_APPROX_MATCH => {
            let (attr, val) = decode_ava(expect_constructed(value)?)?;
            Ok(Filter::ApproxMatch(attr, val))
        }
        tags::FILTER_PRESENT => {
            let bytes = expect_primitive_value(value)?;
            let attr = std::str::from_utf8(bytes)
                .map_err(|_| crate::ber::BerError::InvalidUtf8)?
                .to_string();
            Ok(Filter::Present(attr))
        }
        tags::FILTER_SUBSTRINGS => decode_substring_filter(expect_constructed(value)?),
        tags::FILTER_EXTENSIBLE_MATCH => {
            decode_extensible_match(expect_constructed(value)?).map(Filter::ExtensibleMatch)
        }
        other => Err(crate::ber::BerError::UnexpectedTag {
            expected: tags::FILTER_EQUALITY,
            found: other,
        }
        .into()),
    }
}

fn decode_filter_set(mut seq: Cursor<'_>) -> Result<Vec<Filter>, DecodeError> {
    let mut filters = Vec::new();
    while seq.has_more() {
        let (tag, value) = seq.read_any()?;
        filters.push(decode_filter(tag.raw(), value)?);
    }
    if filters.is_empty() {
        return Err(DecodeError::ConstraintViolation("and/or filter set", 0));
    }
    Ok(filters)
}

fn decode_ava(mut seq: Cursor<'_>) -> Result<(String, Vec<u8>), DecodeError> {
    let attr = seq.read_utf8_value(TAG_OCTET_STRING)?.to_string();
    let value = seq.read_octet_string_value(TAG_OCTET_STRING)?.to_vec();
    seq.finish()?;
    Ok((attr, value))
}

fn decode_substring_filter(mut seq: Cursor<'_>) -> Result<Filter, DecodeError> {
    let attr = seq.read_utf8_value(TAG_OCTET_STRING)?.to_string();
    let mut subs = seq.enter_constructed(TAG_SEQUENCE)?;
    let mut initial = None;
    let mut any = Vec::new();
    let mut r#final = None;
    while subs.has_more() {
        let (tag, value) = subs.read_any()?;
        let bytes = expect_primitive_value(value)?;
        match tag.raw() {
            tags::SUBSTRING_INITIAL => {
                if initial.is_some() || !any.is_empty() || r#final.is_some() {
                    return Err(DecodeError::ConstraintViolation(
                        "substring initial position",
                        0,
                    ));
                }
                initial = Some(bytes.to_vec());
            }
            tags::SUBSTRING_ANY => any.push(bytes.to_vec()),
            tags::SUBSTRING_FINAL => {
                if r#final.is_some() {
                    return Err(DecodeError::ConstraintViolation(
                        "substring final position",
                        0,
                    ));
                }
                r#final = Some(bytes.to_vec());
            }
            other => {
                return Err(crate::ber::BerError::UnexpectedTag {
                    expected: tags::SUBSTRING_ANY,
                    found: other,
                }
                .into())
            }
        }
    }
    if initial.is_none() && any.is_empty() && r#final.is_none() {
        return Err(DecodeError::ConstraintViolation("substrings", 0));
    }
    seq.finish()?;
    Ok(Filter::Substring(
        attr,
        SubstringFilter {
            initial,
            any,
            r#final,
        },
    ))
}

fn decode_extensible_match(mut seq: Cursor<'_>) -> Result<ExtensibleMatch, DecodeError> {
    let matching_rule = seq
        .try_utf8_value(tags::EXTENSIBLE_MATCHING_RULE)?
        .map(str::to_string);
    let attr_type = seq
        .try_utf8_value(tags::EXTENSIBLE_TYPE)?
        .map(str::to_string);
    let value = seq
        .read_octet_string_value(tags::EXTENSIBLE_MATCH_VALUE)?
        .to_vec();
    let dn_attributes = seq.read_boolean_default_false(tags::EXTENSIBLE_DN_ATTRIBUTES)?;
    seq.finish()?;
    Ok(ExtensibleMatch {
        matching_rule,
        attr_type,
        value,
        dn_attributes,
    })
}

fn decode_entry_body(seq: &mut Cursor<'_>) -> Result<Entry, DecodeError> {
    let dn = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let mut entry = Entry::new(dn);
    let mut attrs = seq.enter_constructed(TAG_SEQUENCE)?;
    while attrs.has_more() {
        let mut one = attrs.enter_constructed(TAG_SEQUENCE)?;
        let id = one.read_utf8_value(TAG_OCTET_STRING)?.to_string();
        let mut values_seq = one.enter_constructed(TAG_SET)?;
        let mut attribute = Attribute::new(id, None);
        while values_seq.has_more() {
            let bytes = values_seq.read_octet_string_value(TAG_OCTET_STRING)?;
            attribute.push_value(decode_attribute_value(bytes));
        }
        one.finish()?;
        entry.insert_attribute(attribute);
    }
    Ok(entry)
}

fn decode_search_result_entry(mut seq: Cursor<'_>) -> Result<SearchResultEntry, DecodeError> {
    let entry = decode_entry_body(&mut seq)?;
    seq.finish()?;
    Ok(SearchResultEntry { entry })
}

fn decode_add_request(mut seq: Cursor<'_>) -> Result<AddRequest, DecodeError> {
    let entry = decode_entry_body(&mut seq)?;
    seq.finish()?;
    Ok(AddRequest { entry })
}

fn decode_modify_request(mut seq: Cursor<'_>) -> Result<ModifyRequest, DecodeError> {
    let object = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let mut changes_seq = seq.enter_constructed(TAG_SEQUENCE)?;
    let mut changes = Vec::new();
    while changes_seq.has_more() {
        let mut one = changes_seq.enter_constructed(TAG_SEQUENCE)?;
        let raw_op = one.read_integer_value(TAG_ENUMERATED)?;
        let kind = match raw_op {
            0 => ModifyOperationKind::Add,
            1 => ModifyOperationKind::Delete,
            2 => ModifyOperationKind::Replace,
            3 => ModifyOperationKind::Increment,
            other => return Err(DecodeError::ConstraintViolation("modify operation", other)),
        };
        let mut partial = one.enter_constructed(TAG_SEQUENCE)?;
        let id = partial.read_utf8_value(TAG_OCTET_STRING)?.to_string();
        let mut values_seq = partial.enter_constructed(TAG_SET)?;
        let mut attribute = Attribute::new(id, None);
        while values_seq.has_more() {
            let bytes = values_seq.read_octet_string_value(TAG_OCTET_STRING)?;
            attribute.push_value(decode_attribute_value(bytes));
        }
        partial.finish()?;
        one.finish()?;
        changes.push(ModifyOperation {
            kind,
            modification: attribute,
        });
    }
    seq.finish()?;
    Ok(ModifyRequest { object, changes })
}

fn decode_modify_dn_request(mut seq: Cursor<'_>) -> Result<ModifyDnRequest, DecodeError> {
    let entry = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let new_rdn = seq.read_utf8_value(TAG_OCTET_STRING)?.to_string();
    let delete_old_rdn = seq.read_boolean_value(TAG_BOOLEAN)?;
    let new_superior = seq
        .try_utf8_value(tags::MODIFY_DN_NEW_SUPERIOR)?
        .map(decode_dn_str)
        .transpose()?;
    seq.finish()?;
    Ok(ModifyDnRequest {
        entry,
        new_rdn,
        delete_old_rdn,
        new_superior,
    })
}

fn decode_compare_request(mut seq: Cursor<'_>) -> Result<CompareRequest, DecodeError> {
    let entry = decode_dn_str(seq.read_utf8_value(TAG_OCTET_STRING)?)?;
    let mut ava = seq.enter_constructed(TAG_SEQUENCE)?;
    let attribute_desc = ava.read_utf8_value(TAG_OCTET_STRING)?.to_string();
    let assertion_value = ava.read_octet_string_value(TAG_OCTET_STRING)?.to_vec();
    ava.finish()?;
    seq.finish()?;
    Ok(CompareRequest {
        entry,
        attribute_desc,
        assertion_value,
    })
}

fn decode_extended_request(mut seq: Cursor<'_>) -> Result<ExtendedRequest, DecodeError> {
    let request_name = seq
        .read_utf8_value(tags::EXTENDED_REQUEST_NAME)?
        .to_string();
    let request_value = seq
        .try_octet_string_value(tags::EXTENDED_REQUEST_VALUE)?
        .map(|bytes| bytes.to_vec());
    seq.finish()?;
    Ok(ExtendedRequest {
        request_name,
        request_value,
    })
}

fn decode_extended_response(mut seq: Cursor<'_>) -> Result<ExtendedResponse, DecodeError> {
    let result = decode_ldap_result_fields(&mut seq)?;
    let response_name = seq
        .try_utf8_value(tags::EXTENDED_RESPONSE_NAME)?
        .map(str::to_string);
    let response_value = seq
        .try_octet_string_value(tags::EXTENDED_RESPONSE_VALUE)?
        .map(|bytes| bytes.to_vec());
    seq.finish()?;
    Ok(ExtendedResponse {
        result,
        response_name,
        response_value,
    })
}

fn decode_intermediate_response(mut seq: Cursor<'_>) -> Result<IntermediateResponse, DecodeError> {
    let response_name = seq
        .try_utf8_value(tags::INTERMEDIATE_RESPONSE_NAME)?
        .map(str::to_string);
    let response_value = seq
        .try_octet_string_value(tags::INTERMEDIATE_RESPONSE_VALUE)?
        .map(|bytes| bytes.to_vec());
    seq.finish()?;
    Ok(IntermediateResponse {
        response_name,
        response_value,
    })
}

fn decode_uri_list(mut seq: Cursor<'_>) -> Result<Vec<String>, DecodeError> {
    let mut uris = Vec::new();
    while seq.has_more() {
        uris.push(seq.read_utf8_value(TAG_OCTET_STRING)?.to_string());
    }
    if uris.is_empty() {
        return Err(DecodeError::ConstraintViolation("searchResultReference", 0));
    }
    Ok(uris)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_request_with_simple_auth() {
        // SEQUENCE { version 3, name "cn=admin", simple "secret" }
        let bytes = hex_literal::hex!("30150201030408636e3d61646d696e8006736563726574");
        let mut cursor = Cursor::new(&bytes, 10);
        let seq = cursor.enter_constructed(TAG_SEQUENCE).unwrap();
        let request = decode_bind_request(seq).unwrap();
        assert_eq!(request.version, 3);
        assert_eq!(request.name.up_name(), "cn=admin");
        assert_eq!(
            request.credentials,
            BindCredentials::Simple(b"secret".to_vec())
        );
    }

    #[test]
    fn bind_request_with_non_v3_version_is_rejected() {
        // same as bind_request_with_simple_auth but version 2.
        let bytes = hex_literal::hex!("30150201020408636e3d61646d696e8006736563726574");
        let mut cursor = Cursor::new(&bytes, 10);
        let seq = cursor.enter_constructed(TAG_SEQUENCE).unwrap();
        let err = decode_bind_request(seq).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::ConstraintViolation("bind version", 2)
        ));
    }

    #[test]
    fn present_filter_round_trips_attribute_name() {
        let bytes = [0x87, 0x02, b'c', b'n'];
        let mut cursor = Cursor::new(&bytes, 10);
        let (tag, value) = cursor.read_any().unwrap();
        let filter = decode_filter(tag.raw(), value).unwrap();
        assert_eq!(filter, Filter::Present("cn".to_string()));
    }

    #[test]
    fn empty_and_filter_is_rejected() {
        let bytes = [0xA0, 0x00];
        let mut cursor = Cursor::new(&bytes, 10);
        let (tag, value) = cursor.read_any().unwrap();
        assert!(decode_filter(tag.raw(), value).is_err());
    }
}
