use crate::{
    config::KafkaSettings,
    error::PublishError,
    records::{AckRecord, PredictionRecord},
};
use async_trait::async_trait;
use rdkafka::{
    config::ClientConfig,
    error::KafkaError,
    producer::{FutureProducer, FutureRecord, Producer},
    util::Timeout,
};
use std::time::Duration;

/// Destination for classification results. Implementations must confirm
/// delivery before returning.
#[async_trait]
pub trait ResultSink: Send + Sync + 'static {
    async fn publish_prediction(&self, id: &str, label: &str) -> Result<(), PublishError>;
    async fn publish_ack(&self, id: &str, producer_id: &str) -> Result<(), PublishError>;
}

/// Kafka-backed publisher for the predictions and producer-ack topics.
/// Each send awaits its delivery report, preserving the per-message flush
/// semantics of the original producer.
pub struct KafkaPublisher {
    producer: FutureProducer,
    predictions_topic: String,
    ack_topic: String,
}

impl KafkaPublisher {
    pub fn new(settings: &KafkaSettings) -> Result<Self, KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("message.timeout.ms", settings.message_timeout_ms.to_string())
            .create()?;

        Ok(Self {
            producer,
            predictions_topic: settings.predictions_topic.clone(),
            ack_topic: settings.ack_topic.clone(),
        })
    }

    async fn send_json(&self, topic: &str, key: &str, payload: String) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).key(key).payload(&payload);

        self.producer
            .send(record, Timeout::Never)
            .await
            .map_err(|(source, _message)| PublishError::Delivery {
                topic: topic.to_string(),
                source,
            })?;

        Ok(())
    }

    pub fn close(&self) {
        if let Err(e) = self.producer.flush(Duration::from_secs(5)) {
            tracing::warn!("Failed to flush producer on shutdown: {}", e);
        }
        tracing::info!("Producer flushed");
    }
}

#[async_trait]
impl ResultSink for KafkaPublisher {
    async fn publish_prediction(&self, id: &str, label: &str) -> Result<(), PublishError> {
        let record = PredictionRecord {
            id: id.to_string(),
            inferred_value: label.to_string(),
        };
        let payload = serde_json::to_string(&record).map_err(|e| PublishError::Serialize {
            topic: self.predictions_topic.clone(),
            source: e,
        })?;

        self.send_json(&self.predictions_topic, id, payload).await
    }

    async fn publish_ack(&self, id: &str, producer_id: &str) -> Result<(), PublishError> {
        let record = AckRecord {
            id: id.to_string(),
            producer_id: producer_id.to_string(),
        };
        let payload = serde_json::to_string(&record).map_err(|e| PublishError::Serialize {
            topic: self.ack_topic.clone(),
            source: e,
        })?;

        self.send_json(&self.ack_topic, id, payload).await
    }
}
