//! Configuration the surrounding application feeds into the adapter: vendor
//! credentials from the environment and the per-upload-type settings that the
//! plugin keeps under `UPLOAD_TYPE_{TYPE}`.

use crate::Error;
use bon::Builder;
use serde::Deserialize;

pub const ENV_ACCESS_KEY: &str = "VOLC_ACCESS_KEY";
pub const ENV_SECRET_KEY: &str = "VOLC_SECRET_KEY";
pub const ENV_BUCKET: &str = "VOLC_BUCKET";
pub const ENV_ENDPOINT: &str = "VOLC_ENDPOINT";
pub const ENV_REGION: &str = "VOLC_REGION";

pub(crate) fn env_var(name: &'static str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::MissingEnv(name))
}

/// Per-upload-type configuration.
///
/// `tos_host` is the public host objects are served from; `upload_tos_host`
/// may point browsers at a different host for the form POST itself and falls
/// back to `tos_host` when absent.
#[derive(Debug, Clone, Deserialize, Builder)]
#[builder(on(String, into))]
pub struct UploadTypeConfig {
    pub tos_host: String,
    pub upload_tos_host: Option<String>,
    /// Key prefix generated object names are placed under, e.g. `image`.
    #[serde(default)]
    #[builder(default)]
    pub dir: String,
    /// The application endpoint TOS notifies after a successful upload.
    pub callback_url: String,
    #[serde(default)]
    #[builder(default)]
    pub security: bool,
}

impl UploadTypeConfig {
    pub fn upload_host(&self) -> &str {
        self.upload_tos_host.as_deref().unwrap_or(&self.tos_host)
    }

    pub(crate) fn check(&self) -> Result<(), Error> {
        if self.tos_host.is_empty() {
            return Err(Error::Common("upload config has no tos_host".to_owned()));
        }
        Ok(())
    }
}

/// Query parameters of the policy request, as sent by the uploading page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadRequest {
    pub title: Option<String>,
    pub hash_id: Option<String>,
    pub resize: Option<String>,
    pub file_type: Option<String>,
}

impl UploadRequest {
    pub(crate) fn title(&self) -> Result<&str, Error> {
        match self.title.as_deref() {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(Error::MissingParam("title")),
        }
    }

    pub(crate) fn file_type(&self) -> Result<&str, Error> {
        match self.file_type.as_deref() {
            Some(t) if !t.is_empty() => Ok(t),
            _ => Err(Error::MissingParam("file_type")),
        }
    }
}
