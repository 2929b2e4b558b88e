use crate::Error;
use percent_encoding::percent_decode_str;
use time::OffsetDateTime;
use time::macros::format_description;
use uuid::Uuid;

/// Split an endpoint that may or may not carry a scheme; `https` by default.
pub(crate) fn split_endpoint(endpoint: &str) -> (&str, &str) {
    match endpoint.split_once("://") {
        Some((scheme, host)) => (scheme, host),
        None => ("https", endpoint),
    }
}

pub(crate) fn validate_object_key(key: &str) -> Result<(), Error> {
    let len = key.len();
    if len == 0 {
        return Err(Error::Common("object key cannot be empty".to_owned()));
    }
    if len > 696 {
        return Err(Error::Common(
            "object key is too long, max is 696 bytes".to_owned(),
        ));
    }
    if key.bytes().any(|b| b == b'\r' || b == b'\n') {
        return Err(Error::Common(
            "object key cannot contain control characters".to_owned(),
        ));
    }
    Ok(())
}

/// File extension of the request title, dot included. The title arrives
/// URL-encoded from the query string.
pub(crate) fn ext_from_title(title: &str) -> Option<String> {
    let decoded = percent_decode_str(title).decode_utf8().ok()?;
    let name = decoded.rsplit('/').next()?;
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(format!(".{ext}")),
        _ => None,
    }
}

/// Generated object name: `{dir}/{yyyymmdd}/{uuid}{ext}`, no leading `/`.
pub(crate) fn gen_object_key(dir: &str, ext: &str, now: &OffsetDateTime) -> String {
    let date = now
        .format(&format_description!("[year][month][day]"))
        .unwrap();
    let name = format!("{}/{}{}", date, Uuid::new_v4().simple(), ext);
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        name
    } else {
        format!("{dir}/{name}")
    }
}
