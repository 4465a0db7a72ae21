use crate::config::KafkaSettings;
use rdkafka::{
    config::ClientConfig,
    consumer::{Consumer, StreamConsumer},
    error::KafkaError,
    Message,
};

/// Kafka-backed source of classification requests. Offset management and
/// commits are delegated entirely to librdkafka.
pub struct RequestSource {
    consumer: StreamConsumer,
}

impl RequestSource {
    pub fn new(settings: &KafkaSettings) -> Result<Self, KafkaError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &settings.brokers)
            .set("group.id", &settings.group_id)
            .set("auto.offset.reset", &settings.auto_offset_reset)
            .set(
                "enable.auto.commit",
                if settings.enable_auto_commit {
                    "true"
                } else {
                    "false"
                },
            )
            .create()?;

        consumer.subscribe(&[settings.input_topic.as_str()])?;
        tracing::info!("Subscribed to input topic `{}`", settings.input_topic);

        Ok(Self { consumer })
    }

    /// Waits for the next message and returns its payload. An absent
    /// payload comes back as an empty buffer and fails request decoding
    /// downstream.
    pub async fn next_payload(&self) -> Result<Vec<u8>, KafkaError> {
        let message = self.consumer.recv().await?;
        Ok(message.payload().map(|p| p.to_vec()).unwrap_or_default())
    }

    pub fn close(&self) {
        self.consumer.unsubscribe();
        tracing::info!("Consumer unsubscribed");
    }
}
