//! Pre-signed URLs.
//!
//! [预签名URL文档](https://www.volcengine.com/docs/6349/74839)

use crate::sign;
use crate::utils::{split_endpoint, validate_object_key};
use crate::{Client, Error};
use bon::Builder;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use time::OffsetDateTime;

// 使用AccessKey生成签名URL时的最大有效期：7天
const MAX_EXPIRES: i64 = 604800;
const DEFAULT_EXPIRES: i64 = 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Put,
    Post,
    Delete,
    Head,
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Delete => write!(f, "DELETE"),
            HttpMethod::Head => write!(f, "HEAD"),
        }
    }
}

/// A signed URL together with the headers the requester must send along.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Builder)]
pub struct PresignUrl<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    // extra query parameters carried into the signature, e.g. callbacks
    #[builder(field)]
    pub(crate) query: Vec<(String, String)>,
    #[builder(default)]
    pub(crate) method: HttpMethod,
}

impl<'a, S: presign_url_builder::State> PresignUrlBuilder<'a, S> {
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn queries(
        mut self,
        pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        for (key, value) in pairs {
            self.query.push((key.into(), value.into()));
        }
        self
    }
}

impl PresignUrl<'_> {
    /// - `key`：对象名称。A leading `/` is stripped.
    /// - `expires`：URL有效期，单位秒。Values `<= 0` fall back to one hour,
    ///   values past 7 days are rejected.
    pub fn generate(&self, key: &str, expires: i64) -> Result<PresignedUrl, Error> {
        self.generate_at(key, expires, &OffsetDateTime::now_utc())
    }

    pub(crate) fn generate_at(
        &self,
        key: &str,
        expires: i64,
        date_time: &OffsetDateTime,
    ) -> Result<PresignedUrl, Error> {
        let key = key.trim_start_matches('/');
        validate_object_key(key)?;
        let expires = if expires <= 0 { DEFAULT_EXPIRES } else { expires };
        if expires > MAX_EXPIRES {
            return Err(Error::Common(format!(
                "expires must be no more than {MAX_EXPIRES} seconds"
            )));
        }

        let client = self.client;
        let (scheme, endpoint_host) = split_endpoint(&client.endpoint);
        let host = format!("{}.{}", client.bucket, endpoint_host);

        let long_date = sign::long_date(date_time);
        let scope = sign::credential_scope(date_time, &client.region);

        let mut query: BTreeMap<String, String> = self.query.iter().cloned().collect();
        query.insert("X-Tos-Algorithm".to_owned(), sign::ALGORITHM.to_owned());
        query.insert(
            "X-Tos-Credential".to_owned(),
            format!("{}/{}", client.access_key, scope),
        );
        query.insert("X-Tos-Date".to_owned(), long_date.clone());
        query.insert("X-Tos-Expires".to_owned(), expires.to_string());
        query.insert("X-Tos-SignedHeaders".to_owned(), "host".to_owned());

        let canonical_query = sign::canonical_query(&query);
        let canonical_request = sign::canonical_request(
            &self.method.to_string(),
            key,
            &canonical_query,
            &format!("host:{host}\n"),
            "host",
            sign::UNSIGNED_PAYLOAD,
        );
        let string_to_sign = sign::string_to_sign(&long_date, &scope, &canonical_request);
        let signature = sign::sign(
            &string_to_sign,
            &client.secret_key,
            date_time,
            &client.region,
        );
        query.insert("X-Tos-Signature".to_owned(), signature);

        let url = format!(
            "{}://{}/{}?{}",
            scheme,
            host,
            sign::url_encode_key(key),
            sign::canonical_query(&query)
        );
        Ok(PresignedUrl {
            url,
            headers: vec![("Host".to_owned(), host)],
        })
    }
}

impl Client {
    /// 生成预签名URL，默认GET方法
    pub fn presign_url(&self) -> PresignUrlBuilder<'_> {
        PresignUrl::builder(self)
    }
}
