use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared_database::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// One review per appointment.
    pub appointment_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
}

impl Record for Review {
    const TABLE: &'static str = "reviews";
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentRef {
    pub id: Uuid,
}

impl Record for AppointmentRef {
    const TABLE: &'static str = "appointments";
}

/// Response shape; the reviewer's id stays internal.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub review_date: DateTime<Utc>,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            appointment_id: review.appointment_id,
            rating: review.rating,
            comment: review.comment,
            review_date: review.review_date,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewToAddRequest {
    pub appointment_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_one_to_five() {
        let base = |rating| ReviewToAddRequest {
            appointment_id: Uuid::new_v4(),
            rating,
            comment: None,
        };
        assert!(base(0).validate().is_err());
        assert!(base(1).validate().is_ok());
        assert!(base(5).validate().is_ok());
        assert!(base(6).validate().is_err());
    }

    #[test]
    fn view_hides_the_reviewer() {
        let review = Review {
            id: Uuid::new_v4(),
            appointment_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            rating: 4,
            comment: Some("Great service".to_string()),
            review_date: Utc::now(),
        };
        let view = serde_json::to_value(ReviewView::from(review)).unwrap();
        assert!(view.get("user_id").is_none());
    }
}
