use crate::{
    error::{DecodeError, InferenceError, ProcessingError},
    labels::LabelTable,
    model_service::ModelService,
    preprocess,
    publisher::ResultSink,
    records::ClassificationRequest,
    source::RequestSource,
};

/// Outcome of one successfully processed request, kept for logging.
#[derive(Debug)]
pub struct ClassifiedRequest {
    pub id: String,
    pub label: String,
}

pub struct Pipeline<M: ModelService, S: ResultSink> {
    model_service: M,
    sink: S,
    labels: LabelTable,
}

impl<M: ModelService, S: ResultSink> Pipeline<M, S> {
    pub fn new(model_service: M, sink: S, labels: LabelTable) -> Self {
        Self {
            model_service,
            sink,
            labels,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes requests until the task is cancelled. Per-request failures
    /// are logged here and never terminate the loop.
    pub async fn run(&self, source: &RequestSource) {
        loop {
            let payload = match source.next_payload().await {
                Ok(payload) => payload,
                Err(e) => {
                    tracing::error!("Consumer poll failed: {}", e);
                    continue;
                }
            };

            match self.process(&payload).await {
                Ok(outcome) => {
                    tracing::info!(id = %outcome.id, label = %outcome.label, "Request classified");
                }
                Err(ProcessingError::Decode(e)) => {
                    tracing::warn!("Dropping undecodable request: {}", e);
                }
                Err(ProcessingError::Inference(e)) => {
                    tracing::error!("Dropping request after inference failure: {}", e);
                }
                Err(ProcessingError::Publish(e)) => {
                    tracing::error!("Result lost, publish failed: {}", e);
                }
            }
        }
    }

    /// One full pass: decode the request, preprocess the image, classify,
    /// then publish the prediction and the producer acknowledgment.
    pub async fn process(&self, payload: &[u8]) -> Result<ClassifiedRequest, ProcessingError> {
        let request: ClassificationRequest =
            serde_json::from_slice(payload).map_err(DecodeError::Payload)?;

        let input = preprocess::tensor_from_base64(&request.data)?;
        let class_index = self.model_service.classify(&input)?;
        let label = self
            .labels
            .get(class_index)
            .ok_or(InferenceError::UnknownClass(class_index))?
            .to_string();

        self.sink.publish_prediction(&request.id, &label).await?;
        self.sink
            .publish_ack(&request.id, &request.producer_id)
            .await?;

        Ok(ClassifiedRequest {
            id: request.id,
            label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PublishError;
    use async_trait::async_trait;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{ImageBuffer, Rgb};
    use ndarray::{Array, Ix4};
    use std::io::Cursor;
    use std::sync::Mutex;

    struct MockModelService {
        class_index: usize,
    }

    impl ModelService for MockModelService {
        fn classify(&self, input: &Array<f32, Ix4>) -> Result<usize, InferenceError> {
            assert_eq!(input.shape(), &[1, 3, 32, 32]);
            Ok(self.class_index)
        }
    }

    #[derive(Default)]
    struct MockSink {
        predictions: Mutex<Vec<(String, String)>>,
        acks: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ResultSink for MockSink {
        async fn publish_prediction(&self, id: &str, label: &str) -> Result<(), PublishError> {
            self.predictions
                .lock()
                .unwrap()
                .push((id.to_string(), label.to_string()));
            Ok(())
        }

        async fn publish_ack(&self, id: &str, producer_id: &str) -> Result<(), PublishError> {
            self.acks
                .lock()
                .unwrap()
                .push((id.to_string(), producer_id.to_string()));
            Ok(())
        }
    }

    fn test_request_payload(id: &str, producer_id: &str) -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(32, 32, Rgb([40, 80, 120]));
        let mut image_data: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut image_data);
        img.write_to(&mut cursor, image::ImageFormat::Png).unwrap();

        format!(
            r#"{{"ID": "{}", "Data": "{}", "producer_id": "{}"}}"#,
            id,
            STANDARD.encode(&image_data),
            producer_id
        )
        .into_bytes()
    }

    fn test_pipeline(class_index: usize) -> Pipeline<MockModelService, MockSink> {
        Pipeline::new(
            MockModelService { class_index },
            MockSink::default(),
            LabelTable::cifar10(),
        )
    }

    #[tokio::test]
    async fn valid_request_publishes_prediction_and_ack() {
        let pipeline = test_pipeline(3);
        let payload = test_request_payload("img-1", "p1");

        let outcome = pipeline.process(&payload).await.unwrap();
        assert_eq!(outcome.id, "img-1");
        assert_eq!(outcome.label, "cat");

        let predictions = pipeline.sink.predictions.lock().unwrap();
        let acks = pipeline.sink.acks.lock().unwrap();
        assert_eq!(predictions.as_slice(), &[("img-1".into(), "cat".into())]);
        assert_eq!(acks.as_slice(), &[("img-1".into(), "p1".into())]);
    }

    #[tokio::test]
    async fn label_is_drawn_from_the_fixed_table() {
        for class_index in 0..10 {
            let pipeline = test_pipeline(class_index);
            let payload = test_request_payload("img-x", "p1");
            let outcome = pipeline.process(&payload).await.unwrap();
            assert!(LabelTable::cifar10().get(class_index) == Some(outcome.label.as_str()));
        }
    }

    #[tokio::test]
    async fn malformed_payload_is_a_decode_error() {
        let pipeline = test_pipeline(0);

        let result = pipeline.process(b"not json").await;
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
        assert!(pipeline.sink.predictions.lock().unwrap().is_empty());
        assert!(pipeline.sink.acks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bad_base64_does_not_poison_later_requests() {
        let pipeline = test_pipeline(7);

        let bad = br#"{"ID": "img-bad", "Data": "!!!", "producer_id": "p1"}"#;
        let result = pipeline.process(bad).await;
        assert!(matches!(
            result,
            Err(ProcessingError::Decode(DecodeError::Base64(_)))
        ));

        let good = test_request_payload("img-2", "p2");
        let outcome = pipeline.process(&good).await.unwrap();
        assert_eq!(outcome.id, "img-2");
        assert_eq!(outcome.label, "horse");

        assert_eq!(pipeline.sink.predictions.lock().unwrap().len(), 1);
        assert_eq!(pipeline.sink.acks.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn out_of_table_class_index_is_an_inference_error() {
        let pipeline = test_pipeline(42);
        let payload = test_request_payload("img-3", "p1");

        let result = pipeline.process(&payload).await;
        assert!(matches!(
            result,
            Err(ProcessingError::Inference(InferenceError::UnknownClass(42)))
        ));
        assert!(pipeline.sink.predictions.lock().unwrap().is_empty());
    }
}
