#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("error: {0}")]
    Common(String),
    #[error("missing required parameter `{0}`")]
    MissingParam(&'static str),
    #[error("environment variable `{0}` is not set")]
    MissingEnv(&'static str),
    #[error("reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("response status is not success: {status}, text: {text}")]
    RequestAPIFailed { status: String, text: String },
    #[error("invalid callback body: {0}")]
    InvalidCallback(String),
}
