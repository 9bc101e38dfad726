//! Log-based notification dispatch.
//!
//! Stands in for an outbound delivery channel (email, webhook). Every event
//! is emitted as a structured log record so operators can trace the booking
//! lifecycle without a delivery backend configured.

use async_trait::async_trait;
use praxis_core::scheduling::ports::NotificationDispatcher;
use praxis_domain::{Appointment, RescheduleToken, Result, WorkflowStatus};
use tracing::info;

/// Notifier that writes events to the tracing pipeline.
#[derive(Debug, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationDispatcher for LoggingNotifier {
    async fn booking_created(
        &self,
        appointment: &Appointment,
        token: &RescheduleToken,
    ) -> Result<()> {
        info!(
            appointment_id = %appointment.id,
            provider_id = %appointment.provider_id,
            start = %appointment.start,
            status = %appointment.status,
            token_expires_at = %token.expires_at,
            "booking created"
        );
        Ok(())
    }

    async fn appointment_rescheduled(&self, appointment: &Appointment) -> Result<()> {
        info!(
            appointment_id = %appointment.id,
            provider_id = %appointment.provider_id,
            start = %appointment.start,
            end = %appointment.end,
            "appointment rescheduled"
        );
        Ok(())
    }

    async fn status_changed(&self, appointment: &Appointment, from: WorkflowStatus) -> Result<()> {
        info!(
            appointment_id = %appointment.id,
            from = %from,
            to = %appointment.status,
            "workflow status changed"
        );
        Ok(())
    }
}
