use serde::{Deserialize, Serialize};

/// One incoming message from the input topic. Field names match the wire
/// format emitted by the producers.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationRequest {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Data")]
    pub data: String,
    pub producer_id: String,
}

/// Published to the predictions topic for downstream storage.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "InferredValue")]
    pub inferred_value: String,
}

/// Published to the producer-ack topic to close the loop with the
/// originating producer.
#[derive(Debug, Clone, Serialize)]
pub struct AckRecord {
    #[serde(rename = "ID")]
    pub id: String,
    pub producer_id: String,
}
