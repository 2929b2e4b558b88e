//! Browser form POST upload policies.
//!
//! The policy document is a JSON object with an `expiration` and a list of
//! `conditions` (exact matches plus a `starts-with` restriction on the object
//! key). It is base64 encoded, signed with the date → region → service →
//! request derived key, and returned together with every form field the
//! upload page must post.
//!
//! [PostObject签名文档](https://www.volcengine.com/docs/6349/74839)

use crate::callback::encode_callback;
use crate::config::{UploadRequest, UploadTypeConfig};
use crate::sign;
use crate::utils::{ext_from_title, gen_object_key};
use crate::{Client, Error};
use base64::{Engine, engine::general_purpose};
use bon::Builder;
use serde_json::{Value, json};
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

// 签名有效期内可以重复上传，所以默认给一个很短的窗口
const DEFAULT_POLICY_TTL: i64 = 10;

/// Everything the upload page needs for a direct-to-storage form POST.
#[derive(Debug, Clone)]
pub struct PostPolicyForm {
    /// POST target, upload host plus the generated object path.
    pub url: String,
    /// Object key the file will be stored under.
    pub dir: String,
    /// Form fields, policy and signature included.
    pub params: Vec<(String, String)>,
}

impl PostPolicyForm {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Builder)]
pub struct PostPolicy<'a> {
    #[builder(start_fn)]
    pub(crate) client: &'a Client,
    pub(crate) upload_type: &'a str,
    pub(crate) config: &'a UploadTypeConfig,
    pub(crate) request: &'a UploadRequest,
    /// Policy lifetime in seconds.
    #[builder(default = DEFAULT_POLICY_TTL)]
    pub(crate) expires: i64,
}

impl PostPolicy<'_> {
    pub fn generate(&self) -> Result<PostPolicyForm, Error> {
        self.generate_at(&OffsetDateTime::now_utc())
    }

    pub(crate) fn generate_at(&self, now: &OffsetDateTime) -> Result<PostPolicyForm, Error> {
        // the upload page must tell us what it is about to send
        let title = self.request.title()?;
        let file_type = self.request.file_type()?;
        self.config.check()?;

        let client = self.client;
        let ext = ext_from_title(title).unwrap_or_default();
        let dir = gen_object_key(&self.config.dir, &ext, now);

        let encoded = encode_callback(self.upload_type, self.config, self.request);
        let credential = sign::credential(&client.access_key, now, &client.region);
        let date = sign::long_date(now);

        let common_params: Vec<(String, String)> = vec![
            ("Content-Type".to_owned(), file_type.to_owned()),
            ("name".to_owned(), title.to_owned()),
            ("x-tos-callback".to_owned(), encoded.callback),
            ("x-tos-callback-var".to_owned(), encoded.callback_var),
            ("x-tos-credential".to_owned(), credential),
            ("x-tos-algorithm".to_owned(), sign::ALGORITHM.to_owned()),
            ("x-tos-date".to_owned(), date),
        ];

        let policy = self.encode_policy(&dir, now, &common_params);
        let signature = sign::sign(&policy, &client.secret_key, now, &client.region);

        let mut params = common_params;
        params.push(("key".to_owned(), dir.clone()));
        params.push(("policy".to_owned(), policy));
        params.push(("x-tos-signature".to_owned(), signature));

        Ok(PostPolicyForm {
            url: format!(
                "{}/{}",
                self.config.upload_host().trim_end_matches('/'),
                dir
            ),
            dir,
            params,
        })
    }

    // base64 of {"expiration": ..., "conditions": [...]}
    fn encode_policy(
        &self,
        dir: &str,
        now: &OffsetDateTime,
        common_params: &[(String, String)],
    ) -> String {
        let expiration = (*now + Duration::seconds(self.expires))
            .format(&format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
            ))
            .unwrap();

        let mut conditions = Vec::with_capacity(common_params.len() + 2);
        conditions.push(json!({ "bucket": self.client.bucket }));
        conditions.push(json!(["starts-with", "$key", dir]));
        for (key, value) in common_params {
            conditions.push(json!({ key.as_str(): value }));
        }

        let policy = json!({
            "expiration": expiration,
            "conditions": Value::Array(conditions),
        });
        general_purpose::STANDARD.encode(policy.to_string())
    }
}

impl Client {
    /// 生成浏览器直传所需要的表单内容
    pub fn post_policy(&self) -> PostPolicyBuilder<'_> {
        PostPolicy::builder(self)
    }
}
