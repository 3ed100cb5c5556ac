use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;
use serde::Serialize;

use crate::account::errors::NotificationError;
use crate::account::models::EmailAddress;
use crate::account::ports::ResetNotifier;
use crate::config::Config;

/// Wire message consumed by the mail-sender service.
///
/// Carries the plaintext secret exactly once; it is never written anywhere
/// else. The deadline tells the sender when delivery stops being useful
/// (the secret expires then anyway).
#[derive(Debug, Serialize)]
struct ResetMailMessage<'a> {
    email: &'a str,
    secret: &'a str,
    deadline: DateTime<Utc>,
}

/// Publishes reset-secret delivery requests to the notification topic.
pub struct KafkaResetNotifier {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaResetNotifier {
    /// Create a new notifier with "at least once" delivery semantics.
    ///
    /// # Notes:
    /// - `acks=all`: Wait for all in-sync replicas to acknowledge
    /// - `enable.idempotence=true`: Prevents duplicate messages during retries
    /// - `retry.backoff.ms=100`: Backoff between retry attempts
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            topic = %config.kafka.topic,
            "Initializing Kafka producer for reset notifications"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("message.timeout.ms", "30000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            topic: config.kafka.topic.to_string(),
            timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl ResetNotifier for KafkaResetNotifier {
    async fn send_reset_secret(
        &self,
        email: &EmailAddress,
        secret: &str,
        deadline: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let message = ResetMailMessage {
            email: email.as_str(),
            secret,
            deadline,
        };

        let payload = serde_json::to_string(&message)
            .map_err(|e| NotificationError::SerializationFailed(e.to_string()))?;

        // Keyed by destination so retries for the same account stay ordered.
        let record = FutureRecord::to(&self.topic)
            .key(email.as_str())
            .payload(&payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(topic = %self.topic, "Reset notification published");
            })
            .map_err(|(err, _)| {
                // The caller rolls back the reset material on this path; do
                // not log the payload, it holds the plaintext secret.
                tracing::error!(
                    topic = %self.topic,
                    error = %err,
                    "Failed to publish reset notification"
                );
                NotificationError::DeliveryFailed(err.to_string())
            })
    }
}
