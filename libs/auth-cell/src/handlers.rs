use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    Json,
};
use axum_extra::TypedHeader;
use chrono::Utc;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreError};
use shared_models::auth::{AuthUser, Role, TokenResponse};
use shared_models::error::AppError;
use shared_utils::extractor::require_admin;
use shared_utils::jwt::issue_token;
use shared_utils::password::{hash_password, verify_password};
use user_cell::models::User;

use crate::models::{LoginRequest, RegisterRequest};

async fn create_account(
    state: &AppConfig,
    request: RegisterRequest,
    role: Role,
    auth_token: Option<&str>,
) -> Result<TokenResponse, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(state);

    // Case-sensitive equality on the stored column, same as the unique index.
    let email_taken = store
        .select::<User>()
        .eq("email", &request.email)
        .exists(auth_token)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if email_taken {
        warn!("Registration attempt with existing email: {}", request.email);
        return Err(AppError::BadRequest("Email already registered".to_string()));
    }

    let password_hash =
        hash_password(&request.password).map_err(|e| AppError::Internal(e.to_string()))?;

    let row = json!({
        "first_name": request.first_name,
        "last_name": request.last_name,
        "email": request.email,
        "password_hash": password_hash,
        "role": role,
        "created_at": Utc::now().to_rfc3339()
    });

    let user = store
        .insert::<User>(row, auth_token)
        .await
        .map_err(|e| match e {
            StoreError::NothingApplied => {
                AppError::BadRequest("Failed to register user".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

    token_response(&user, state)
}

fn token_response(user: &User, state: &AppConfig) -> Result<TokenResponse, AppError> {
    let auth_user = AuthUser {
        id: user.id,
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        role: user.role,
    };

    let (token, token_expiration) =
        issue_token(&auth_user, &state.jwt_secret).map_err(AppError::Internal)?;

    Ok(TokenResponse {
        user_id: user.id,
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        email: user.email.clone(),
        role: user.role,
        token,
        token_expiration,
    })
}

/// Self-service registration; new accounts always start as clients and are
/// logged straight in.
#[axum::debug_handler]
pub async fn register(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let response = create_account(&state, request, Role::Client, None).await?;
    info!("User registered: {}", response.email);
    Ok(Json(response))
}

/// Admin-provisioned admin accounts. The caller must already hold Admin.
#[axum::debug_handler]
pub async fn register_admin(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(caller): Extension<AuthUser>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    require_admin(&caller)?;

    let response = create_account(&state, request, Role::Admin, Some(auth.token())).await?;
    info!("Admin account registered: {}", response.email);
    Ok(Json(response))
}

/// Credential login. Unknown email and wrong password produce the identical
/// response so the failure mode cannot be distinguished.
#[axum::debug_handler]
pub async fn login(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let store = StoreClient::new(&state);

    let user = store
        .select::<User>()
        .eq("email", &request.email)
        .fetch_one(None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let user = match user {
        Some(user) => user,
        None => {
            warn!("Login attempt with non-existent email: {}", request.email);
            return Err(AppError::Auth("Invalid credentials".to_string()));
        }
    };

    let password_ok = verify_password(&request.password, &user.password_hash)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    if !password_ok {
        warn!("Failed login attempt for user: {}", request.email);
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    info!("User logged in: {}", user.email);
    Ok(Json(token_response(&user, &state)?))
}
