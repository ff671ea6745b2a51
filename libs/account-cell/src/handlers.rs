use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use tracing::{debug, info};
use validator::Validate;

use appointment_cell::models::Appointment;
use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::auth::AuthUser;
use shared_models::error::AppError;
use shared_utils::password::{hash_password, verify_password};
use user_cell::models::{User, UserView};

async fn load_caller(
    store: &StoreClient,
    caller: &AuthUser,
    token: &str,
) -> Result<User, AppError> {
    store
        .find_by_id::<User>(caller.id, Some(token))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<UserView>, AppError> {
    debug!("Getting profile for user: {}", caller.id);

    let store = StoreClient::new(&state);
    let user = load_caller(&store, &caller, auth.token()).await?;

    Ok(Json(UserView::from(user)))
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<crate::models::ProfileUpdateRequest>,
) -> Result<Json<UserView>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);
    let user = load_caller(&store, &caller, auth.token()).await?;

    // A changed email must stay unique across every other account.
    if let Some(email) = &request.email {
        if *email != user.email {
            let email_taken = store
                .select::<User>()
                .eq("email", email)
                .neq("id", caller.id)
                .exists(Some(auth.token()))
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if email_taken {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
        }
    }

    let mut patch = serde_json::Map::new();
    if let Some(first_name) = request.first_name {
        patch.insert("first_name".to_string(), json!(first_name));
    }
    if let Some(last_name) = request.last_name {
        patch.insert("last_name".to_string(), json!(last_name));
    }
    if let Some(email) = request.email {
        patch.insert("email".to_string(), json!(email));
    }

    let updated = store
        .update::<User>(caller.id, serde_json::Value::Object(patch), Some(auth.token()))
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to update profile".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!("Profile updated for user {}", caller.id);
    Ok(Json(UserView::from(updated)))
}

#[axum::debug_handler]
pub async fn change_password(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<crate::models::ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);
    let user = load_caller(&store, &caller, auth.token()).await?;

    let current_ok = verify_password(&request.current_password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !current_ok {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash =
        hash_password(&request.new_password).map_err(|e| AppError::Internal(e.to_string()))?;

    store
        .update::<User>(
            caller.id,
            json!({ "password_hash": password_hash }),
            Some(auth.token()),
        )
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to change password".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    info!("Password changed for user {}", caller.id);
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

#[axum::debug_handler]
pub async fn get_my_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let store = StoreClient::new(&state);

    let appointments = store
        .select::<Appointment>()
        .eq("user_id", caller.id)
        .order_desc("appointment_date")
        .fetch(Some(auth.token()))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(Json(appointments))
}
