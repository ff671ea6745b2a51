use tracing::info;

use crate::models::{Notification, NotificationChannel, NotificationStatus};

/// Where a real email/SMS/push provider would be wired in. Delivery here is
/// simulated: the stub logs the attempt and reports success, and the caller
/// records the resulting status on the row in the same request.
pub struct DeliveryStub;

impl DeliveryStub {
    pub fn new() -> Self {
        Self
    }

    pub fn deliver(&self, notification: &Notification) -> NotificationStatus {
        let channel = match notification.channel {
            NotificationChannel::Email => "email",
            NotificationChannel::Sms => "sms",
            NotificationChannel::Push => "push",
        };

        info!(
            "Simulated {} delivery of notification {} to user {}",
            channel, notification.id, notification.user_id
        );

        NotificationStatus::Sent
    }
}

impl Default for DeliveryStub {
    fn default() -> Self {
        Self::new()
    }
}
