//! Upload callbacks.
//!
//! TOS calls the application back after a form POST upload completes. The
//! callback request body is rendered from `callbackBody`, with `${object}`
//! style placeholders filled in server side and `${x:...}` variables taken
//! from the `x-tos-callback-var` form field.
//!
//! [上传回调文档](https://www.volcengine.com/docs/6349/1190306)

use crate::config::{UploadRequest, UploadTypeConfig};
use crate::{Error, VENDOR_TYPE};
use base64::{Engine, engine::general_purpose};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CallbackParam<'a> {
    callback_url: &'a str,
    callback_body: String,
    callback_body_type: &'a str,
}

/// The pair of base64 strings sent as `x-tos-callback` / `x-tos-callback-var`.
pub(crate) struct EncodedCallback {
    pub(crate) callback: String,
    pub(crate) callback_var: String,
}

/// Build the callback parameter pair for one policy request. Placeholders for
/// `title` / `hash_id` / `resize` only appear when the request carries them,
/// and the variable map mirrors exactly those keys.
pub(crate) fn encode_callback(
    upload_type: &str,
    config: &UploadTypeConfig,
    request: &UploadRequest,
) -> EncodedCallback {
    let callback_url = callback_url(upload_type, config, request);

    let mut body =
        "filename=${object}&size=${size}&mimeType=${mimeType}&upload_type=${x:upload_type}"
            .to_owned();
    // serde_json::Map keeps keys sorted, so the encoding is deterministic
    let mut vars = serde_json::Map::new();
    vars.insert("x:upload_type".to_owned(), upload_type.into());
    if let Some(title) = request.title.as_deref() {
        body.push_str("&title=${x:title}");
        vars.insert("x:title".to_owned(), title.into());
    }
    if let Some(hash_id) = request.hash_id.as_deref() {
        body.push_str("&hash_id=${x:hash_id}");
        vars.insert("x:hash_id".to_owned(), hash_id.into());
    }
    if let Some(resize) = request.resize.as_deref() {
        body.push_str("&resize=${x:resize}");
        vars.insert("x:resize".to_owned(), resize.into());
    }

    let param = CallbackParam {
        callback_url: &callback_url,
        callback_body: body,
        callback_body_type: "application/x-www-form-urlencoded",
    };
    EncodedCallback {
        callback: general_purpose::STANDARD.encode(serde_json::to_string(&param).unwrap()),
        callback_var: general_purpose::STANDARD
            .encode(serde_json::to_string(&serde_json::Value::Object(vars)).unwrap()),
    }
}

// The configured callback endpoint plus the request context the application
// needs to route the notification.
fn callback_url(upload_type: &str, config: &UploadTypeConfig, request: &UploadRequest) -> String {
    let mut url = match url::Url::parse(&config.callback_url) {
        Ok(url) => url,
        Err(_) => return config.callback_url.clone(),
    };
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("upload_type", upload_type);
        pairs.append_pair("vendor_type", VENDOR_TYPE);
        if let Some(title) = request.title.as_deref() {
            pairs.append_pair("title", title);
        }
        if let Some(hash_id) = request.hash_id.as_deref() {
            pairs.append_pair("hash_id", hash_id);
        }
        if let Some(resize) = request.resize.as_deref() {
            pairs.append_pair("resize", resize);
        }
    }
    url.into()
}

/// Metadata extracted from the URL-encoded callback body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadCallback {
    /// Object key of the stored file.
    pub filename: String,
    pub mime_type: String,
    pub size: u64,
    pub upload_type: Option<String>,
    pub title: Option<String>,
    pub hash_id: Option<String>,
    pub resize: Option<String>,
}

/// Parse the body TOS posts to the callback endpoint.
pub fn parse_callback_body(body: &str) -> Result<UploadCallback, Error> {
    let mut fields: HashMap<String, String> = url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let filename = fields
        .remove("filename")
        .filter(|f| !f.is_empty())
        .ok_or_else(|| Error::InvalidCallback("missing filename".to_owned()))?;
    let size = fields
        .remove("size")
        .ok_or_else(|| Error::InvalidCallback("missing size".to_owned()))?
        .parse::<u64>()
        .map_err(|e| Error::InvalidCallback(format!("invalid size: {e}")))?;
    let mime_type = fields
        .remove("mimeType")
        .ok_or_else(|| Error::InvalidCallback("missing mimeType".to_owned()))?;

    Ok(UploadCallback {
        filename,
        mime_type,
        size,
        upload_type: fields.remove("upload_type"),
        title: fields.remove("title"),
        hash_id: fields.remove("hash_id"),
        resize: fields.remove("resize"),
    })
}

/// The record the calling application persists for an uploaded file.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileRecord {
    pub title: String,
    pub url: String,
    pub size: u64,
    pub security: bool,
    pub vendor_type: &'static str,
}

/// Map callback data onto a [`FileRecord`]. The title falls back to the last
/// path segment of the object key when the upload page did not send one.
pub fn extract_file(config: &UploadTypeConfig, callback: &UploadCallback) -> FileRecord {
    let title = match callback.title.as_deref() {
        Some(t) if !t.is_empty() => t.to_owned(),
        _ => callback
            .filename
            .rsplit('/')
            .next()
            .unwrap_or(&callback.filename)
            .to_owned(),
    };
    FileRecord {
        title,
        url: format!(
            "{}/{}",
            config.tos_host.trim_end_matches('/'),
            callback.filename.trim_start_matches('/')
        ),
        size: callback.size,
        security: config.security,
        vendor_type: VENDOR_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{Engine, engine::general_purpose};

    fn test_config() -> UploadTypeConfig {
        UploadTypeConfig::builder()
            .tos_host("https://media-bucket.tos-cn-beijing.volces.com")
            .callback_url("https://example.com/upload/callback")
            .build()
    }

    #[test]
    fn callback_body_template_mirrors_request_params() {
        let config = test_config();
        let request = UploadRequest {
            title: Some("demo.png".to_owned()),
            hash_id: Some("h1".to_owned()),
            ..Default::default()
        };
        let encoded = encode_callback("image", &config, &request);

        let param: serde_json::Value = serde_json::from_slice(
            &general_purpose::STANDARD.decode(&encoded.callback).unwrap(),
        )
        .unwrap();
        let body = param["callbackBody"].as_str().unwrap();
        assert!(body.starts_with(
            "filename=${object}&size=${size}&mimeType=${mimeType}&upload_type=${x:upload_type}"
        ));
        assert!(body.contains("&title=${x:title}"));
        assert!(body.contains("&hash_id=${x:hash_id}"));
        assert!(!body.contains("resize"));
        assert_eq!(
            param["callbackBodyType"],
            "application/x-www-form-urlencoded"
        );
        let url = param["callbackUrl"].as_str().unwrap();
        assert!(url.contains("upload_type=image"));
        assert!(url.contains("vendor_type=volcengine_tos"));
        assert!(url.contains("title=demo.png"));

        let vars: serde_json::Value = serde_json::from_slice(
            &general_purpose::STANDARD
                .decode(&encoded.callback_var)
                .unwrap(),
        )
        .unwrap();
        assert_eq!(vars["x:upload_type"], "image");
        assert_eq!(vars["x:title"], "demo.png");
        assert_eq!(vars["x:hash_id"], "h1");
        assert!(vars.get("x:resize").is_none());
    }

    #[test]
    fn parse_callback_body_test() {
        let body = "filename=image%2F20240801%2Fabc.png&size=10240&mimeType=image%2Fpng&upload_type=image&title=demo.png";
        let callback = parse_callback_body(body).unwrap();
        assert_eq!(callback.filename, "image/20240801/abc.png");
        assert_eq!(callback.size, 10240);
        assert_eq!(callback.mime_type, "image/png");
        assert_eq!(callback.upload_type.as_deref(), Some("image"));
        assert_eq!(callback.title.as_deref(), Some("demo.png"));
        assert_eq!(callback.hash_id, None);
    }

    #[test]
    fn parse_callback_body_rejects_bad_input() {
        assert!(parse_callback_body("size=1&mimeType=a/b").is_err());
        assert!(parse_callback_body("filename=a&size=NaN&mimeType=a/b").is_err());
        assert!(parse_callback_body("filename=a&mimeType=a/b").is_err());
    }

    #[test]
    fn extract_file_title_falls_back_to_key_tail() {
        let config = test_config();
        let callback = UploadCallback {
            filename: "image/20240801/abc.png".to_owned(),
            mime_type: "image/png".to_owned(),
            size: 10240,
            upload_type: Some("image".to_owned()),
            title: None,
            hash_id: None,
            resize: None,
        };
        let record = extract_file(&config, &callback);
        assert_eq!(record.title, "abc.png");
        assert_eq!(
            record.url,
            "https://media-bucket.tos-cn-beijing.volces.com/image/20240801/abc.png"
        );
        assert!(!record.security);
        assert_eq!(record.vendor_type, VENDOR_TYPE);
    }
}
