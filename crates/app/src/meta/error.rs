use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("{0} contains characters not allowed in a header")]
    InvalidHeader(String),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
    #[error("could not decode meta server response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("meta server call {method} failed with code {code}: {message}")]
    Rpc {
        method: String,
        code: String,
        message: String,
    },
    #[error("meta server call {0} succeeded but returned no data")]
    MissingData(String),
}
