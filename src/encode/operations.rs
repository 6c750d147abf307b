/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2026 G3-OSS developers.
 */

//! Per-`protocolOp` encoders (§4.4), one function per [`Operation`]
//! variant. Each mirrors its counterpart in the decoder's grammar
//! field-for-field but writes siblings in reverse order, since
//! [`ReverseBuffer`] builds a structure's bytes from the inside out.

use crate::ber::{
    encode_boolean, encode_enumerated, encode_integer, encode_integer_tagged, encode_octet_string,
    encode_octet_string_tagged, encode_sequence, encode_sequence_tagged, ReverseBuffer,
};
use crate::message::{
    AddRequest, BindCredentials, BindRequest, BindResponse, CompareRequest, DerefAliases,
    ExtendedRequest, ExtendedResponse, IntermediateResponse, LdapResult, ModifyDnRequest,
    ModifyOperation, ModifyOperationKind, ModifyRequest, Operation, Scope, SearchRequest,
    SearchResultEntry,
};
use crate::model::{Attribute, Dn, Entry, ExtensibleMatch, Filter, SubstringFilter};
use crate::tags;

/// Encodes `operation`'s protocolOp TLV, tag included, into `buf`.
pub(super) fn encode_operation(buf: &mut ReverseBuffer, operation: &Operation) {
    match operation {
        Operation::BindRequest(req) => encode_bind_request(buf, req),
        Operation::BindResponse(resp) => encode_bind_response(buf, resp),
        Operation::UnbindRequest => buf.prepend_tag_length(tags::OP_UNBIND_REQUEST, 0),
        Operation::SearchRequest(req) => encode_search_request(buf, req),
        Operation::SearchResultEntry(entry) => encode_search_result_entry(buf, entry),
        Operation::SearchResultReference(uris) => {
            encode_uri_list(buf, tags::OP_SEARCH_RESULT_REFERENCE, uris)
        }
        Operation::SearchResultDone(result) => {
            encode_ldap_result(buf, tags::OP_SEARCH_RESULT_DONE, result)
        }
        Operation::ModifyRequest(req) => encode_modify_request(buf, req),
        Operation::ModifyResponse(result) => {
            encode_ldap_result(buf, tags::OP_MODIFY_RESPONSE, result)
        }
        Operation::AddRequest(req) => encode_add_request(buf, req),
        Operation::AddResponse(result) => encode_ldap_result(buf, tags::OP_ADD_RESPONSE, result),
        Operation::DelRequest(dn) => {
            let bytes = dn.up_name().as_bytes();
            buf.push_front(bytes);
            buf.prepend_tag_length(tags::OP_DEL_REQUEST, bytes.len());
        }
        Operation::DelResponse(result) => encode_ldap_result(buf, tags::OP_DEL_RESPONSE, result),
        Operation::ModifyDnRequest(req) => encode_modify_dn_request(buf, req),
        Operation::ModifyDnResponse(result) => {
            encode_ldap_result(buf, tags::OP_MODIFY_DN_RESPONSE, result)
        }
        Operation::CompareRequest(req) => encode_compare_request(buf, req),
        Operation::CompareResponse(result) => {
            encode_ldap_result(buf, tags::OP_COMPARE_RESPONSE, result)
        }
        Operation::AbandonRequest(id) => {
            encode_integer_tagged(buf, tags::OP_ABANDON_REQUEST, *id as i64)
        }
        Operation::ExtendedRequest(req) => encode_extended_request(buf, req),
        Operation::ExtendedResponse(resp) => encode_extended_response(buf, resp),
        Operation::IntermediateResponse(resp) => encode_intermediate_response(buf, resp),
    }
}

fn encode_dn(buf: &mut ReverseBuffer, dn: &Dn) {
    encode_octet_string(buf, dn.up_name().as_bytes());
}

/// Writes `result`'s fields (no outer tag) in reverse field order:
/// referral, diagnosticMessage, matchedDN, resultCode.
fn encode_ldap_result_fields(buf: &mut ReverseBuffer, result: &LdapResult) {
    if let Some(referral) = &result.referral {
        let start = buf.pos();
        for uri in referral.iter().rev() {
            encode_octet_string(buf, uri.as_bytes());
        }
        encode_sequence_tagged(buf, tags::RESULT_REFERRAL, start);
    }
    encode_octet_string(buf, result.diagnostic_message.as_bytes());
    encode_dn(buf, &result.matched_dn);
    encode_enumerated(buf, result.result_code.code() as i64);
}

fn encode_ldap_result(buf: &mut ReverseBuffer, tag: u8, result: &LdapResult) {
    let start = buf.pos();
    encode_ldap_result_fields(buf, result);
    encode_sequence_tagged(buf, tag, start);
}

fn encode_bind_request(buf: &mut ReverseBuffer, req: &BindRequest) {
    let start = buf.pos();
    match &req.credentials {
        BindCredentials::Simple(creds) => {
            encode_octet_string_tagged(buf, tags::BIND_AUTH_SIMPLE, creds)
        }
        BindCredentials::Sasl {
            mechanism,
            credentials,
        } => {
            let sasl_start = buf.pos();
            if let Some(creds) = credentials {
                encode_octet_string(buf, creds);
            }
            encode_octet_string(buf, mechanism.as_bytes());
            encode_sequence_tagged(buf, tags::BIND_AUTH_SASL, sasl_start);
        }
    }
    encode_dn(buf, &req.name);
    encode_integer(buf, req.version as i64);
    encode_sequence_tagged(buf, tags::OP_BIND_REQUEST, start);
}

fn encode_bind_response(buf: &mut ReverseBuffer, resp: &BindResponse) {
    let start = buf.pos();
    if let Some(creds) = &resp.server_sasl_creds {
        encode_octet_string_tagged(buf, tags::BIND_RESPONSE_SASL_CREDS, creds);
    }
    encode_ldap_result_fields(buf, &resp.result);
    encode_sequence_tagged(buf, tags::OP_BIND_RESPONSE, start);
}

fn scope_code(scope: Scope) -> i64 {
    match scope {
        Scope::BaseObject => 0,
        Scope::SingleLevel => 1,
        Scope::WholeSubtree => 2,
    }
}

fn deref_aliases_code(deref: DerefAliases) -> i64 {
    match deref {
        DerefAliases::Never => 0,
        DerefAliases::InSearching => 1,
        DerefAliases::FindingBase => 2,
        DerefAliases::Always => 3,
    }
}

fn encode_search_request(buf: &mut ReverseBuffer, req: &SearchRequest) {
    let start = buf.pos();
    let attrs_start = buf.pos();
    for attr in req.attributes.iter().rev() {
        encode_octet_string(buf, attr.as_bytes());
    }
    encode_sequence(buf, attrs_start);
    encode_filter(buf, &req.filter);
    encode_boolean(buf, req.types_only);
    encode_integer(buf, req.time_limit as i64);
    encode_integer(buf, req.size_limit as i64);
    encode_enumerated(buf, deref_aliases_code(req.deref_aliases));
    encode_enumerated(buf, scope_code(req.scope));
    encode_dn(buf, &req.base_object);
    encode_sequence_tagged(buf, tags::OP_SEARCH_REQUEST, start);
}

fn encode_filter(buf: &mut ReverseBuffer, filter: &Filter) {
    match filter {
        Filter::And(children) => encode_filter_set(buf, tags::FILTER_AND, children),
        Filter::Or(children) => encode_filter_set(buf, tags::FILTER_OR, children),
        Filter::Not(child) => {
            let start = buf.pos();
            encode_filter(buf, child);
            encode_sequence_tagged(buf, tags::FILTER_NOT, start);
        }
        Filter::Equality(attr, value) => encode_ava_filter(buf, tags::FILTER_EQUALITY, attr, value),
        Filter::GreaterOrEqual(attr, value) => {
            encode_ava_filter(buf, tags::FILTER_GREATER_OR_EQUAL, attr, value)
        }
        Filter::LessOrEqual(attr, value) => {
            encode_ava_filter(buf, tags::FILTER_LESS_OR_EQUAL, attr, value)
        }
        Filter::ApproxMatch(attr, value) => {
            encode_ava_filter(buf, tags::FILTER_APPROX_MATCH, attr, value)
        }
        Filter::Present(attr) => {
            let bytes = attr.as_bytes();
            buf.push_front(bytes);
            buf.prepend_tag_length(tags::FILTER_PRESENT, bytes.len());
        }
        Filter::Substring(attr, subs) => encode_substring_filter(buf, attr, subs),
        Filter::ExtensibleMatch(ext) => encode_extensible_match(buf, ext),
    }
}

fn encode_filter_set(buf: &mut ReverseBuffer, tag: u8, children: &[Filter]) {
    let start = buf.pos();
    for child in children.iter().rev() {
        encode_filter(buf, child);
    }
    encode_sequence_tagged(buf, tag, start);
}

fn encode_ava_filter(buf: &mut ReverseBuffer, tag: u8, attr: &str, value: &[u8]) {
    let start = buf.pos();
    encode_octet_string(buf, value);
    encode_octet_string(buf, attr.as_bytes());
    encode_sequence_tagged(buf, tag, start);
}

fn encode_substring_filter(buf: &mut ReverseBuffer, attr: &str, subs: &SubstringFilter) {
    let start = buf.pos();
    let subs_start = buf.pos();
    if let Some(r#final) = &subs.r#final {
        encode_octet_string_tagged(buf, tags::SUBSTRING_FINAL, r#final);
    }
    for any in subs.any.iter().rev() {
        encode_octet_string_tagged(buf, tags::SUBSTRING_ANY, any);
    }
    if let Some(initial) = &subs.initial {
        encode_octet_string_tagged(buf, tags::SUBSTRING_INITIAL, initial);
    }
    encode_sequence(buf, subs_start);
    encode_octet_string(buf, attr.as_bytes());
    encode_sequence_tagged(buf, tags::FILTER_SUBSTRINGS, start);
}

fn encode_extensible_match(buf: &mut ReverseBuffer, ext: &ExtensibleMatch) {
    let start = buf.pos();
    if ext.dn_attributes {
        crate::ber::encode_boolean_tagged(buf, tags::EXTENSIBLE_DN_ATTRIBUTES, true);
    }
    encode_octet_string_tagged(buf, tags::EXTENSIBLE_MATCH_VALUE, &ext.value);
    if let Some(attr_type) = &ext.attr_type {
        encode_octet_string_tagged(buf, tags::EXTENSIBLE_TYPE, attr_type.as_bytes());
    }
    if let Some(matching_rule) = &ext.matching_rule {
        encode_octet_string_tagged(buf, tags::EXTENSIBLE_MATCHING_RULE, matching_rule.as_bytes());
    }
    encode_sequence_tagged(buf, tags::FILTER_EXTENSIBLE_MATCH, start);
}

/// Writes `entry`'s `objectName`/`attributes` fields (no outer tag):
/// shared by `SearchResultEntry` and `AddRequest`, whose ASN.1 shapes
/// only differ in their outer APPLICATION tag.
fn encode_entry_body(buf: &mut ReverseBuffer, entry: &Entry) {
    let attrs: Vec<&Attribute> = entry.attributes().collect();
    let attrs_start = buf.pos();
    for attribute in attrs.iter().rev() {
        encode_partial_attribute(buf, attribute);
    }
    encode_sequence(buf, attrs_start);
    encode_dn(buf, entry.dn());
}

fn encode_partial_attribute(buf: &mut ReverseBuffer, attribute: &Attribute) {
    let start = buf.pos();
    let values_start = buf.pos();
    for value in attribute.values().iter().rev() {
        encode_octet_string(buf, value.as_bytes());
    }
    crate::ber::encode_set(buf, values_start);
    encode_octet_string(buf, attribute.user_provided_id().as_bytes());
    encode_sequence(buf, start);
}

fn encode_search_result_entry(buf: &mut ReverseBuffer, search_entry: &SearchResultEntry) {
    let start = buf.pos();
    encode_entry_body(buf, &search_entry.entry);
    encode_sequence_tagged(buf, tags::OP_SEARCH_RESULT_ENTRY, start);
}

fn encode_add_request(buf: &mut ReverseBuffer, req: &AddRequest) {
    let start = buf.pos();
    encode_entry_body(buf, &req.entry);
    encode_sequence_tagged(buf, tags::OP_ADD_REQUEST, start);
}

fn encode_uri_list(buf: &mut ReverseBuffer, tag: u8, uris: &[String]) {
    let start = buf.pos();
    for uri in uris.iter().rev() {
        encode_octet_string(buf, uri.as_bytes());
    }
    encode_sequence_tagged(buf, tag, start);
}

fn modify_operation_code(kind: ModifyOperationKind) -> i64 {
    match kind {
        ModifyOperationKind::Add => 0,
        ModifyOperationKind::Delete => 1,
        ModifyOperationKind::Replace => 2,
        ModifyOperationKind::Increment => 3,
    }
}

fn encode_modify_request(buf: &mut ReverseBuffer, req: &ModifyRequest) {
    let start = buf.pos();
    let changes_start = buf.pos();
    for change in req.changes.iter().rev() {
        encode_modify_change(buf, change);
    }
    encode_sequence(buf, changes_start);
    encode_dn(buf, &req.object);
    encode_sequence_tagged(buf, tags::OP_MODIFY_REQUEST, start);
}

fn encode_modify_change(buf: &mut ReverseBuffer, change: &ModifyOperation) {
    let start = buf.pos();
    encode_partial_attribute(buf, &change.modification);
    encode_enumerated(buf, modify_operation_code(change.kind));
    encode_sequence(buf, start);
}

fn encode_modify_dn_request(buf: &mut ReverseBuffer, req: &ModifyDnRequest) {
    let start = buf.pos();
    if let Some(new_superior) = &req.new_superior {
        encode_octet_string_tagged(
            buf,
            tags::MODIFY_DN_NEW_SUPERIOR,
            new_superior.up_name().as_bytes(),
        );
    }
    encode_boolean(buf, req.delete_old_rdn);
    encode_octet_string(buf, req.new_rdn.as_bytes());
    encode_dn(buf, &req.entry);
    encode_sequence_tagged(buf, tags::OP_MODIFY_DN_REQUEST, start);
}

fn encode_compare_request(buf: &mut ReverseBuffer, req: &CompareRequest) {
    let start = buf.pos();
    let ava_start = buf.pos();
    encode_octet_string(buf, &req.assertion_value);
    encode_octet_string(buf, req.attribute_desc.as_bytes());
    encode_sequence(buf, ava_start);
    encode_dn(buf, &req.entry);
    encode_sequence_tagged(buf, tags::OP_COMPARE_REQUEST, start);
}

fn encode_extended_request(buf: &mut ReverseBuffer, req: &ExtendedRequest) {
    let start = buf.pos();
    if let Some(value) = &req.request_value {
        encode_octet_string_tagged(buf, tags::EXTENDED_REQUEST_VALUE, value);
    }
    encode_octet_string_tagged(buf, tags::EXTENDED_REQUEST_NAME, req.request_name.as_bytes());
    encode_sequence_tagged(buf, tags::OP_EXTENDED_REQUEST, start);
}

fn encode_extended_response(buf: &mut ReverseBuffer, resp: &ExtendedResponse) {
    let start = buf.pos();
    if let Some(value) = &resp.response_value {
        encode_octet_string_tagged(buf, tags::EXTENDED_RESPONSE_VALUE, value);
    }
    if let Some(name) = &resp.response_name {
        encode_octet_string_tagged(buf, tags::EXTENDED_RESPONSE_NAME, name.as_bytes());
    }
    encode_ldap_result_fields(buf, &resp.result);
    encode_sequence_tagged(buf, tags::OP_EXTENDED_RESPONSE, start);
}

fn encode_intermediate_response(buf: &mut ReverseBuffer, resp: &IntermediateResponse) {
    let start = buf.pos();
    if let Some(value) = &resp.response_value {
        encode_octet_string_tagged(buf, tags::INTERMEDIATE_RESPONSE_VALUE, value);
    }
    if let Some(name) = &resp.response_name {
        encode_octet_string_tagged(buf, tags::INTERMEDIATE_RESPONSE_NAME, name.as_bytes());
    }
    encode_sequence_tagged(buf, tags::OP_INTERMEDIATE_RESPONSE, start);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::Decoder;
    use crate::message::{LdapResult, Message, ResultCode};
    use crate::model::Dn;

    fn round_trip(operation: Operation) -> Message {
        let message = Message::new(1, operation);
        let bytes = crate::encode::encode_message(&message).unwrap();
        let mut decoder = Decoder::default();
        decoder.feed(&bytes).unwrap().pop().unwrap()
    }

    #[test]
    fn add_response_referral_round_trips_exact_bytes() {
        // §8 scenario b.
        let expected = hex_literal::hex!("301802010169130a010a04000400a30a04086c6461703a2f2f2f");
        let mut result = LdapResult::success();
        result.result_code = ResultCode::Referral;
        result.referral = Some(vec!["ldap:///".to_string()]);
        let message = Message::new(1, Operation::AddResponse(result));
        let bytes = crate::encode::encode_message(&message).unwrap();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn search_request_filter_round_trips() {
        let filter = Filter::parse("(&(objectClass=Person)(|(sn=Jensen)(cn=Babs J*)))").unwrap();
        let request = SearchRequest {
            base_object: Dn::empty(),
            scope: Scope::WholeSubtree,
            deref_aliases: DerefAliases::Never,
            size_limit: 0,
            time_limit: 0,
            types_only: false,
            filter: filter.clone(),
            attributes: vec!["cn".to_string()],
        };
        let message = round_trip(Operation::SearchRequest(request));
        match message.operation {
            Operation::SearchRequest(decoded) => assert_eq!(decoded.filter, filter),
            other => panic!("unexpected {other:?}"),
        }
    }
}
