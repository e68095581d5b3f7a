use thiserror::Error;

#[derive(Error, Debug)]
pub enum EastmoneyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response carried no data")]
    MissingData,
}
