use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use serde::Serialize;
use thiserror::Error;

use crate::config::KafkaConfig;
use crate::domain::errors::EventPublisherError;
use crate::domain::payment::events::PaymentFailedEvent;
use crate::domain::payment::events::PaymentSettledEvent;
use crate::outbound::events::messages::PaymentEventMessage;
use crate::payment::ports::EventPublisher;

#[derive(Debug, Error)]
pub enum KafkaProducerError {
    #[error("Failed to send message to Kafka: {0}")]
    SendError(String),

    #[error("Failed to serialize message: {0}")]
    SerializationError(String),
}

impl From<KafkaProducerError> for EventPublisherError {
    fn from(err: KafkaProducerError) -> Self {
        match err {
            KafkaProducerError::SerializationError(msg) => {
                EventPublisherError::SerializationFailed(msg)
            }
            KafkaProducerError::SendError(msg) => EventPublisherError::PublishFailed(msg),
        }
    }
}

pub struct KafkaEventProducer {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaEventProducer {
    /// Create a Kafka producer for payment events with at-least-once delivery.
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Broker drops duplicates from producer retries
    /// - `max.in.flight.requests.per.connection=5`: Pipelining with ordering kept
    pub fn new(config: &KafkaConfig) -> Result<Self, anyhow::Error> {
        tracing::info!(
            "Initializing Kafka producer for payment events: brokers={}, topic={}",
            &config.brokers,
            &config.topic
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("message.timeout.ms", config.message_timeout_ms.to_string())
            .set("queue.buffering.max.messages", "10000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        tracing::info!("Kafka producer initialized successfully");

        Ok(Self {
            producer,
            topic: config.topic.to_string(),
            timeout: Duration::from_millis(config.message_timeout_ms),
        })
    }

    /// Publish one message keyed by payment id, so every event of a payment
    /// lands on the same partition in order.
    async fn publish<T: Serialize>(
        &self,
        payment_id: &str,
        message: &T,
    ) -> Result<(), KafkaProducerError> {
        let payload = serde_json::to_string(message)
            .map_err(|e| KafkaProducerError::SerializationError(e.to_string()))?;

        tracing::debug!(
            "Publishing event to topic '{}' (payment_id: {})",
            self.topic,
            payment_id
        );

        let record = FutureRecord::to(&self.topic)
            .key(payment_id)
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(
                    "Event published to topic '{}' for payment {}",
                    self.topic,
                    payment_id
                );
            })
            .map_err(|(err, _)| KafkaProducerError::SendError(err.to_string()))
    }
}

#[async_trait]
impl EventPublisher for KafkaEventProducer {
    async fn publish_payment_settled(
        &self,
        event: &PaymentSettledEvent,
    ) -> Result<(), EventPublisherError> {
        let message = PaymentEventMessage::from(event);

        self.publish(event.payment_id.as_str(), &message)
            .await
            .map_err(Into::into)
    }

    async fn publish_payment_failed(
        &self,
        event: &PaymentFailedEvent,
    ) -> Result<(), EventPublisherError> {
        let message = PaymentEventMessage::from(event);

        self.publish(event.payment_id.as_str(), &message)
            .await
            .map_err(Into::into)
    }
}
