use std::path::PathBuf;
use thiserror::Error;

/// Failures turning an incoming message into a model input.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("request payload is not a valid classification request: {0}")]
    Payload(#[source] serde_json::Error),
    #[error("image data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("image bytes could not be decoded: {0}")]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("model execution failed: {0}")]
    Execution(#[from] ort::Error),
    #[error("model session unavailable: {0}")]
    Session(String),
    #[error("unexpected model output shape: {0}")]
    OutputShape(String),
    #[error("model returned class index {0} outside the label table")]
    UnknownClass(usize),
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to serialize record for `{topic}`: {source}")]
    Serialize {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to deliver message to `{topic}`: {source}")]
    Delivery {
        topic: String,
        #[source]
        source: rdkafka::error::KafkaError,
    },
}

/// Per-request error, caught at the top of the processing loop.
/// None of these variants terminate the process.
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Startup-only failure while locating or fetching the model checkpoint.
#[derive(Debug, Error)]
pub enum ModelFetchError {
    #[error("model file not found at {0:?} and no download url configured")]
    MissingModel(PathBuf),
    #[error("failed to download model: {0}")]
    Http(#[from] reqwest::Error),
    #[error("model download returned status {0}")]
    UnexpectedStatus(reqwest::StatusCode),
    #[error("failed to write model file: {0}")]
    Io(#[from] std::io::Error),
}
