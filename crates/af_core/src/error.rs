use thiserror::Error;

/// Failure decoding a strategy data code.
///
/// Any step of the pipeline (base64 → gzip → JSON → scenario selection) maps
/// to one variant. Callers treat all variants the same way: keep the previous
/// plan if any, otherwise fall back to reactive mode.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("data code is empty")]
    EmptyCode,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("gzip decompression failed: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("invalid strategy document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("strategy document contains no scenario")]
    NoScenario,
}
