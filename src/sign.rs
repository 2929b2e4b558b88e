//! TOS V4 request signing.
//!
//! 签名文档：<https://www.volcengine.com/docs/6349/74839>

use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

pub(crate) const ALGORITHM: &str = "TOS4-HMAC-SHA256";
pub(crate) const SERVICE: &str = "tos";
pub(crate) const REQUEST: &str = "request";
pub(crate) const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";
// sha256 of an empty body, used when signing via headers
pub(crate) const EMPTY_SHA256: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

// RFC 3986 unreserved characters stay as-is, everything else is escaped as
// uppercase %XX. Object keys additionally keep `/` as path separator.
const STRICT_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');
const KEY_ENCODE: &AsciiSet = &STRICT_ENCODE.remove(b'/');

pub(crate) fn url_encode(input: &str) -> String {
    utf8_percent_encode(input, STRICT_ENCODE).to_string()
}

pub(crate) fn url_encode_key(input: &str) -> String {
    utf8_percent_encode(input, KEY_ENCODE).to_string()
}

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(key).unwrap();
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

pub(crate) fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// `YYYYMMDDTHHMMSSZ`, the `X-Tos-Date` value.
pub(crate) fn long_date(date_time: &OffsetDateTime) -> String {
    date_time
        .format(&format_description!(
            "[year][month][day]T[hour][minute][second]Z"
        ))
        .unwrap()
}

/// `YYYYMMDD`, the date component of the credential scope.
pub(crate) fn short_date(date_time: &OffsetDateTime) -> String {
    date_time
        .format(&format_description!("[year][month][day]"))
        .unwrap()
}

/// `{date}/{region}/tos/request`
pub(crate) fn credential_scope(date_time: &OffsetDateTime, region: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        short_date(date_time),
        region,
        SERVICE,
        REQUEST
    )
}

/// `{ak}/{date}/{region}/tos/request`, the `x-tos-credential` form field.
pub(crate) fn credential(access_key: &str, date_time: &OffsetDateTime, region: &str) -> String {
    format!("{}/{}", access_key, credential_scope(date_time, region))
}

// date -> region -> service -> request key derivation chain
fn signing_key(secret_key: &str, date_time: &OffsetDateTime, region: &str) -> Vec<u8> {
    let date_key = hmac_sha256(secret_key.as_bytes(), short_date(date_time).as_bytes());
    let region_key = hmac_sha256(&date_key, region.as_bytes());
    let service_key = hmac_sha256(&region_key, SERVICE.as_bytes());
    hmac_sha256(&service_key, REQUEST.as_bytes())
}

/// Sign `string_to_sign` with the derived key; lowercase hex output.
pub(crate) fn sign(
    string_to_sign: &str,
    secret_key: &str,
    date_time: &OffsetDateTime,
    region: &str,
) -> String {
    let key = signing_key(secret_key, date_time, region);
    hex::encode(hmac_sha256(&key, string_to_sign.as_bytes()))
}

/// Sorted `k=v` pairs joined with `&`, keys and values strictly encoded.
/// The same string doubles as the final query string of a pre-signed URL.
pub(crate) fn canonical_query(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(k, v)| {
            if v.is_empty() {
                format!("{}=", url_encode(k))
            } else {
                format!("{}={}", url_encode(k), url_encode(v))
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn canonical_request(
    method: &str,
    key: &str,
    canonical_query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload: &str,
) -> String {
    let res = format!(
        "{}\n/{}\n{}\n{}\n{}\n{}",
        method,
        url_encode_key(key),
        canonical_query,
        canonical_headers,
        signed_headers,
        payload
    );
    debug!("canonical_request: {}", res);
    res
}

pub(crate) fn string_to_sign(
    long_date: &str,
    credential_scope: &str,
    canonical_request: &str,
) -> String {
    let res = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        long_date,
        credential_scope,
        hex_sha256(canonical_request.as_bytes())
    );
    debug!("string_to_sign: {}", res);
    res
}
