use crate::{
    config::Settings, labels::LabelTable, model_fetch, ort_service::OrtModelService,
    pipeline::Pipeline, publisher::KafkaPublisher, source::RequestSource,
};
use std::error::Error;
use tokio::signal;

/// Acquires every startup resource (model checkpoint, ONNX session, Kafka
/// consumer and producer), then runs the processing loop until a shutdown
/// signal arrives. Acquisition failures abort before the loop begins;
/// the consumer and producer are released on every exit path after it.
pub async fn start_app(config: Settings) -> Result<(), Box<dyn Error>> {
    let model_path = match model_fetch::ensure_model(&config.model).await {
        Ok(path) => path,
        Err(e) => {
            tracing::error!("Failed to resolve model checkpoint: {}", e);
            return Err(Box::new(e));
        }
    };

    let model_service = OrtModelService::new(&model_path)?;
    let labels = LabelTable::cifar10();

    let source = match RequestSource::new(&config.kafka) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!("Failed to create Kafka consumer: {}", e);
            return Err(Box::new(e));
        }
    };

    let publisher = match KafkaPublisher::new(&config.kafka) {
        Ok(publisher) => publisher,
        Err(e) => {
            tracing::error!("Failed to create Kafka producer: {}", e);
            return Err(Box::new(e));
        }
    };

    let pipeline = Pipeline::new(model_service, publisher, labels);
    tracing::info!(
        "Pipeline started: `{}` -> [`{}`, `{}`]",
        config.kafka.input_topic,
        config.kafka.predictions_topic,
        config.kafka.ack_topic
    );

    tokio::select! {
        _ = pipeline.run(&source) => {},
        _ = shutdown_signal() => {
            tracing::info!("Shutdown signal received, starting graceful shutdown");
        }
    }

    source.close();
    pipeline.sink().close();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
