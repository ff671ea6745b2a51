use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared_database::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationChannel {
    Email,
    #[serde(rename = "SMS")]
    Sms,
    Push,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationStatus {
    Pending,
    Sent,
    Failed,
    Read,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub appointment_id: Uuid,
    pub message: String,
    pub channel: NotificationChannel,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
    /// Null until delivery is recorded.
    pub sent_at: Option<DateTime<Utc>>,
}

impl Record for Notification {
    const TABLE: &'static str = "notifications";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
}

impl Record for UserRef {
    const TABLE: &'static str = "users";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentRef {
    pub id: Uuid,
}

impl Record for AppointmentRef {
    const TABLE: &'static str = "appointments";
}

#[derive(Debug, Deserialize, Validate)]
pub struct NotificationToAddRequest {
    pub user_id: Uuid,
    pub appointment_id: Uuid,
    #[validate(length(min = 1, max = 1000))]
    pub message: String,
    pub channel: NotificationChannel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sms_channel_keeps_its_stored_spelling() {
        assert_eq!(
            serde_json::to_value(NotificationChannel::Sms).unwrap(),
            "SMS"
        );
        let parsed: NotificationChannel = serde_json::from_value("SMS".into()).unwrap();
        assert_eq!(parsed, NotificationChannel::Sms);
    }
}
