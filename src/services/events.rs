//! Domain event fan-out: every event is logged, and published to NATS when a
//! client is configured. Publishing failures never fail the operation.

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    nats: Option<async_nats::Client>,
}

impl EventPublisher {
    pub fn disabled() -> Self { Self::default() }

    pub fn nats(client: async_nats::Client) -> Self { Self { nats: Some(client) } }

    /// Connects when `url` is set. A failed connection degrades to log-only.
    pub async fn connect(url: Option<&str>) -> Self {
        let Some(url) = url else { return Self::disabled() };
        match async_nats::connect(url).await {
            Ok(client) => {
                tracing::info!(%url, "publishing domain events to NATS");
                Self::nats(client)
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "NATS unavailable, events will only be logged");
                Self::disabled()
            }
        }
    }

    pub async fn publish(&self, events: Vec<DomainEvent>) {
        for event in events {
            let subject = event.subject();
            tracing::info!(%subject, ?event, "domain event");
            let Some(client) = &self.nats else { continue };
            match serde_json::to_vec(&event) {
                Ok(payload) => {
                    if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                        tracing::warn!(%subject, error = %e, "failed to publish event");
                    }
                }
                Err(e) => tracing::warn!(%subject, error = %e, "failed to encode event"),
            }
        }
    }
}
