use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreClient;

use crate::models::{
    Appointment, AppointmentError, BookAppointmentRequest, ServiceRef, StatusName, StatusRecord,
    UpdateAppointmentRequest, UserRef,
};

/// Minimum spacing between two appointments of the same user. Fixed, not
/// configurable.
pub const CONFLICT_WINDOW_MINUTES: i64 = 60;

/// Open interval of bounds: an existing appointment starting strictly
/// inside (start - window, start + window) conflicts. Starts exactly one
/// window apart do not.
pub fn conflict_window(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let window = Duration::minutes(CONFLICT_WINDOW_MINUTES);
    (start - window, start + window)
}

pub struct BookingService {
    store: StoreClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Existence probe for the overlap rule; never materializes rows.
    pub async fn has_conflict(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        auth_token: Option<&str>,
    ) -> Result<bool, AppointmentError> {
        let (window_start, window_end) = conflict_window(start);
        debug!(
            "Checking booking conflicts for user {} between {} and {}",
            user_id, window_start, window_end
        );

        let conflict = self
            .store
            .select::<Appointment>()
            .eq("user_id", user_id)
            .gt("appointment_date", window_start.to_rfc3339())
            .lt("appointment_date", window_end.to_rfc3339())
            .exists(auth_token)
            .await?;

        Ok(conflict)
    }

    /// Book a new appointment. Order matters: conflict check, then user
    /// validation, then service validation, then the single commit. The
    /// check and the insert are separate store transactions, so two
    /// concurrent bookings can race past each other; the store is the final
    /// arbiter.
    pub async fn book(
        &self,
        request: BookAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        if self
            .has_conflict(request.user_id, request.appointment_date, auth_token)
            .await?
        {
            warn!(
                "Booking conflict for user {} at {}",
                request.user_id, request.appointment_date
            );
            return Err(AppointmentError::ConflictDetected);
        }

        let user_exists = self
            .store
            .select::<UserRef>()
            .eq("id", request.user_id)
            .exists(auth_token)
            .await?;
        if !user_exists {
            return Err(AppointmentError::UserNotFound(request.user_id));
        }

        if let Some(service_id) = request.service_id {
            let service_exists = self
                .store
                .select::<ServiceRef>()
                .eq("id", service_id)
                .exists(auth_token)
                .await?;
            if !service_exists {
                return Err(AppointmentError::ServiceNotFound(service_id));
            }
        }

        let now = Utc::now();
        // Foreign keys only; attaching row objects here would re-insert them.
        let row = json!({
            "title": request.title,
            "description": request.description,
            "appointment_date": request.appointment_date.to_rfc3339(),
            "reminder_sent": false,
            "user_id": request.user_id,
            "service_id": request.service_id,
            "created_at": now.to_rfc3339(),
            "updated_at": now.to_rfc3339()
        });

        let appointment = self.store.insert::<Appointment>(row, auth_token).await?;

        // Open the status log with the seeded Booked entry.
        self.record_status(appointment.id, StatusName::Booked, None, auth_token)
            .await?;

        info!(
            "Appointment {} booked for user {} at {}",
            appointment.id, appointment.user_id, appointment.appointment_date
        );
        Ok(appointment)
    }

    /// Append a status entry to the appointment's history log.
    pub async fn record_status(
        &self,
        appointment_id: Uuid,
        name: StatusName,
        description: Option<String>,
        auth_token: Option<&str>,
    ) -> Result<StatusRecord, AppointmentError> {
        let row = json!({
            "appointment_id": appointment_id,
            "name": name,
            "description": description
        });

        Ok(self.store.insert::<StatusRecord>(row, auth_token).await?)
    }

    pub async fn status_history(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<StatusRecord>, AppointmentError> {
        // 404 for an unknown appointment rather than an empty log.
        self.get(appointment_id, auth_token).await?;

        Ok(self
            .store
            .select::<StatusRecord>()
            .eq("appointment_id", appointment_id)
            .fetch(auth_token)
            .await?)
    }

    pub async fn get(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        self.store
            .find_by_id::<Appointment>(appointment_id, auth_token)
            .await?
            .ok_or(AppointmentError::NotFound)
    }

    pub async fn list(&self, auth_token: Option<&str>) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self.store.fetch_all::<Appointment>(auth_token).await?)
    }

    pub async fn update(
        &self,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        // Load first so a missing id is a 404, not a zero-row commit.
        self.get(appointment_id, auth_token).await?;

        let mut patch = serde_json::Map::new();
        if let Some(title) = request.title {
            patch.insert("title".to_string(), json!(title));
        }
        if let Some(description) = request.description {
            patch.insert("description".to_string(), json!(description));
        }
        if let Some(appointment_date) = request.appointment_date {
            patch.insert(
                "appointment_date".to_string(),
                json!(appointment_date.to_rfc3339()),
            );
        }
        patch.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let updated = self
            .store
            .update::<Appointment>(appointment_id, serde_json::Value::Object(patch), auth_token)
            .await?;

        debug!("Appointment {} updated", appointment_id);
        Ok(updated)
    }

    /// The store cascades payments, status history, review and notifications
    /// on appointment delete.
    pub async fn remove(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), AppointmentError> {
        self.get(appointment_id, auth_token).await?;

        let removed = self
            .store
            .delete::<Appointment>(appointment_id, auth_token)
            .await?;

        if !removed {
            return Err(AppointmentError::CommitFailed);
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }
}
