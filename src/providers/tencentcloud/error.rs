use thiserror::Error;

#[derive(Error, Debug)]
pub enum TencentCloudError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("invalid endpoint: {0}")]
    Endpoint(String),
}
