#![doc = include_str!("../README.md")]

pub mod callback;
pub mod config;
pub mod imgopt;
pub mod object;
pub mod policy;
pub mod presign;

mod error;
pub use error::Error;

pub(crate) mod sign;
pub(crate) mod utils;

pub use callback::{FileRecord, UploadCallback};
pub use config::{UploadRequest, UploadTypeConfig};
pub use object::ObjectMeta;
pub use policy::PostPolicyForm;
pub use presign::{HttpMethod, PresignedUrl};

use bon::bon;

/// Vendor tag stored alongside uploaded file records, so the calling
/// application can dispatch follow-up operations back to this adapter.
pub const VENDOR_TYPE: &str = "volcengine_tos";

pub struct Client {
    access_key: String,
    secret_key: String,
    endpoint: String,
    region: String,
    bucket: String,
    http_client: reqwest::Client,
}

/// 创建TOS客户端
#[bon]
impl Client {
    /// region和endpoint：<https://www.volcengine.com/docs/6349/107356>
    #[builder(on(String, into))]
    pub fn new(
        access_key: String,
        secret_key: String,
        endpoint: String,
        region: String,
        bucket: String,
    ) -> Self {
        Self {
            access_key,
            secret_key,
            endpoint,
            region,
            bucket,
            http_client: reqwest::Client::new(),
        }
    }

    /// Build a client from the `VOLC_*` environment variables.
    pub fn from_env() -> Result<Self, Error> {
        Ok(Self::builder()
            .access_key(config::env_var(config::ENV_ACCESS_KEY)?)
            .secret_key(config::env_var(config::ENV_SECRET_KEY)?)
            .bucket(config::env_var(config::ENV_BUCKET)?)
            .endpoint(config::env_var(config::ENV_ENDPOINT)?)
            .region(config::env_var(config::ENV_REGION)?)
            .build())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
