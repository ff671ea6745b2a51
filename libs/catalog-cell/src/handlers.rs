use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::error::AppError;

use crate::models::{parse_duration_minutes, Service, ServiceToAddRequest, ServiceToUpdateRequest};

#[axum::debug_handler]
pub async fn get_services(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<Service>>, AppError> {
    let store = StoreClient::new(&state);
    let services = store
        .fetch_all::<Service>(None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn get_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<Service>, AppError> {
    let store = StoreClient::new(&state);
    let service = store
        .find_by_id::<Service>(service_id, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Service not found.".to_string()))?;

    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn add_service(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<ServiceToAddRequest>,
) -> Result<Json<Service>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let duration_minutes = parse_duration_minutes(&request.duration).ok_or_else(|| {
        AppError::BadRequest("Invalid duration format. Use hh:mm:ss".to_string())
    })?;

    let store = StoreClient::new(&state);

    let name_taken = store
        .select::<Service>()
        .eq("name", &request.name)
        .exists(None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if name_taken {
        return Err(AppError::BadRequest(
            "Service name already in use.".to_string(),
        ));
    }

    let row = json!({
        "name": request.name,
        "duration_minutes": duration_minutes,
        "price": request.price,
        "description": request.description
    });

    let service = store
        .insert::<Service>(row, None)
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to add service.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!("Service {} ({}) added", service.id, service.name);
    Ok(Json(service))
}

#[axum::debug_handler]
pub async fn update_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
    Json(request): Json<ServiceToUpdateRequest>,
) -> Result<Json<Service>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    store
        .find_by_id::<Service>(service_id, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Service not found.".to_string()))?;

    let mut patch = serde_json::Map::new();
    if let Some(name) = request.name {
        patch.insert("name".to_string(), json!(name));
    }
    if let Some(duration) = request.duration {
        let duration_minutes = parse_duration_minutes(&duration).ok_or_else(|| {
            AppError::BadRequest("Invalid duration format. Use hh:mm:ss".to_string())
        })?;
        patch.insert("duration_minutes".to_string(), json!(duration_minutes));
    }
    if let Some(price) = request.price {
        patch.insert("price".to_string(), json!(price));
    }
    if let Some(description) = request.description {
        patch.insert("description".to_string(), json!(description));
    }

    let updated = store
        .update::<Service>(service_id, serde_json::Value::Object(patch), None)
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update service.".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    debug!("Service {} updated", service_id);
    Ok(Json(updated))
}

/// Deleting a service is always allowed; the store nulls `service_id` on any
/// appointment that referenced it rather than deleting those rows.
#[axum::debug_handler]
pub async fn delete_service(
    State(state): State<Arc<AppConfig>>,
    Path(service_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let store = StoreClient::new(&state);

    store
        .find_by_id::<Service>(service_id, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("Service not found.".to_string()))?;

    let removed = store
        .delete::<Service>(service_id, None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !removed {
        return Err(AppError::BadRequest("Failed to delete service.".to_string()));
    }

    info!("Service {} deleted", service_id);
    Ok(Json(json!({ "message": "Service deleted." })))
}
