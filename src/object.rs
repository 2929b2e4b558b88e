//! Object metadata via a header-signed `HeadObject` request.
//!
//! Used as fallback when upload metadata cannot be taken from the callback
//! body, e.g. when the callback was lost and the application re-checks the
//! stored object.

use crate::callback::UploadCallback;
use crate::sign;
use crate::utils::{split_endpoint, validate_object_key};
use crate::{Client, Error};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, ETAG};

#[derive(Debug, Clone, Default)]
pub struct ObjectMeta {
    pub content_type: String,
    pub content_length: u64,
    pub etag: Option<String>,
}

impl Client {
    /// HEAD the object and return its metadata.
    pub async fn head_object(&self, key: &str) -> Result<ObjectMeta, Error> {
        let key = key.trim_start_matches('/');
        validate_object_key(key)?;

        let (scheme, endpoint_host) = split_endpoint(&self.endpoint);
        let host = format!("{}.{}", self.bucket, endpoint_host);
        let now = time::OffsetDateTime::now_utc();
        let long_date = sign::long_date(&now);
        let scope = sign::credential_scope(&now, &self.region);

        // only host and x-tos-date participate in the signature
        let canonical_headers = format!("host:{host}\nx-tos-date:{long_date}\n");
        let signed_headers = "host;x-tos-date";
        let canonical_request = sign::canonical_request(
            "HEAD",
            key,
            "",
            &canonical_headers,
            signed_headers,
            sign::EMPTY_SHA256,
        );
        let string_to_sign = sign::string_to_sign(&long_date, &scope, &canonical_request);
        let signature = sign::sign(&string_to_sign, &self.secret_key, &now, &self.region);
        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            sign::ALGORITHM,
            self.access_key,
            scope,
            signed_headers,
            signature
        );

        let url = format!("{}://{}/{}", scheme, host, sign::url_encode_key(key));
        let resp = self
            .http_client
            .head(url)
            .header("Host", &host)
            .header("x-tos-date", &long_date)
            .header("Authorization", authorization)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::RequestAPIFailed {
                status: status.to_string(),
                text: resp.text().await.unwrap_or_default(),
            });
        }

        let header_str = |name| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let content_length = header_str(CONTENT_LENGTH)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        Ok(ObjectMeta {
            content_type: header_str(CONTENT_TYPE).unwrap_or_default(),
            content_length,
            etag: header_str(ETAG),
        })
    }

    /// Reconstruct callback-style metadata from a HEAD request on the stored
    /// object.
    pub async fn callback_from_head(&self, key: &str) -> Result<UploadCallback, Error> {
        let meta = self.head_object(key).await?;
        Ok(UploadCallback {
            filename: key.trim_start_matches('/').to_owned(),
            mime_type: meta.content_type,
            size: meta.content_length,
            upload_type: None,
            title: None,
            hash_id: None,
            resize: None,
        })
    }
}
