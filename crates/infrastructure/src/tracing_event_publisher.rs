use async_trait::async_trait;
use rolegate_application::EventPublisher;
use rolegate_core::{AppError, AppResult};
use rolegate_domain::RbacEvent;

/// Event publisher emitting structured `tracing` records.
///
/// Default bus adapter for deployments whose audit consumer tails the
/// structured log stream. Publishing happens synchronously on the caller's
/// task, preserving the manager's ordering guarantee.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventPublisher;

impl TracingEventPublisher {
    /// Creates the publisher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventPublisher for TracingEventPublisher {
    async fn publish(&self, event: RbacEvent) -> AppResult<()> {
        let payload = serde_json::to_value(&event)
            .map_err(|error| AppError::Internal(format!("failed to encode event: {error}")))?;

        tracing::info!(event = event.name(), %payload, "rbac event published");
        Ok(())
    }
}
