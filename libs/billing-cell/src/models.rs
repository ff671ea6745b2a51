use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use shared_database::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    PayPal,
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "CreditCard"),
            PaymentMethod::PayPal => write!(f, "PayPal"),
            PaymentMethod::Cash => write!(f, "Cash"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
    /// Unique when present; empty until the gateway reports back.
    pub transaction_id: Option<String>,
}

impl Record for Payment {
    const TABLE: &'static str = "payments";
}

/// Projection for the appointment foreign-key check.
#[derive(Debug, Serialize, Deserialize)]
pub struct AppointmentRef {
    pub id: Uuid,
}

impl Record for AppointmentRef {
    const TABLE: &'static str = "appointments";
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    pub appointment_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PaymentUpdateRequest {
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
    #[validate(length(max = 100))]
    pub transaction_id: Option<String>,
}
