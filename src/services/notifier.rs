//! Best-effort customer notifications.
//!
//! Delivery is a placeholder that logs; a failed notification must never
//! roll back the operation it follows, so callers log and move on.

pub struct Notifier;

impl Notifier {
    pub fn order_confirmation(email: &str, tracking_number: &str) -> anyhow::Result<()> {
        tracing::info!(
            email = %email,
            tracking = %tracking_number,
            "sending order confirmation"
        );
        Ok(())
    }

    pub fn order_status_change(email: &str, tracking_number: &str, status: &str) -> anyhow::Result<()> {
        tracing::info!(
            email = %email,
            tracking = %tracking_number,
            status = %status,
            "sending order status notification"
        );
        Ok(())
    }
}
