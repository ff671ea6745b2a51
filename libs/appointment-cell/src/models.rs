use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use shared_database::{Record, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    pub reminder_sent: bool,
    /// Owning user; the user endpoint refuses deletion while this reference
    /// exists.
    pub user_id: Uuid,
    /// Nulled by the store when the referenced service is deleted.
    pub service_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Appointment {
    const TABLE: &'static str = "appointments";
}

/// Projections used for foreign-key validation without pulling whole rows.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserRef {
    pub id: Uuid,
}

impl Record for UserRef {
    const TABLE: &'static str = "users";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: Uuid,
}

impl Record for ServiceRef {
    const TABLE: &'static str = "services";
}

/// Seeded status vocabulary. History rows reference these names rather than
/// mutating a field on the appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusName {
    Booked,
    Completed,
    Cancelled,
}

/// Append-only status log entry for an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    pub id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub name: StatusName,
    pub description: Option<String>,
}

impl Record for StatusRecord {
    const TABLE: &'static str = "appointment_status_history";
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddStatusRequest {
    pub name: StatusName,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BookAppointmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub appointment_date: DateTime<Utc>,
    pub user_id: Uuid,
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAppointmentRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub appointment_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("User with ID {0} not found")]
    UserNotFound(Uuid),

    #[error("Service with ID {0} not found")]
    ServiceNotFound(Uuid),

    #[error("Appointment conflicts with an existing booking")]
    ConflictDetected,

    #[error("No rows affected")]
    CommitFailed,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NothingApplied => AppointmentError::CommitFailed,
            other => AppointmentError::DatabaseError(other.to_string()),
        }
    }
}
