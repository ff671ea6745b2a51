use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared_database::Record;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i32,
    pub price: Decimal,
    pub description: Option<String>,
}

impl Record for Service {
    const TABLE: &'static str = "services";
}

#[derive(Debug, Deserialize, Validate)]
pub struct ServiceToAddRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Textual duration in `hh:mm:ss` form, e.g. "00:30:00".
    pub duration: String,
    pub price: Decimal,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ServiceToUpdateRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub duration: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

/// Parse a catalog duration written as `hh:mm:ss` into whole minutes.
/// Catalog durations are minute-granular; a non-zero seconds field is
/// rejected along with everything else unparsable.
pub fn parse_duration_minutes(text: &str) -> Option<i32> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return None;
    }

    let hours: i32 = parts[0].parse().ok()?;
    let minutes: i32 = parts[1].parse().ok()?;
    let seconds: i32 = parts[2].parse().ok()?;

    if hours < 0 || !(0..60).contains(&minutes) || seconds != 0 {
        return None;
    }

    Some(hours * 60 + minutes)
}
