use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::{AuthUser, Role};
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Bearer-token middleware: validates the token and stores the caller
/// identity in request extensions for handlers to pick up via `Extension`.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .ok_or_else(|| AppError::Auth("Missing authorization header".to_string()))?;

    let auth_value = auth_header
        .to_str()
        .map_err(|_| AppError::Auth("Invalid authorization header format".to_string()))?;

    if !auth_value.starts_with("Bearer ") {
        return Err(AppError::Auth("Invalid authorization header format".to_string()));
    }

    let token = &auth_value[7..];

    let user = validate_token(token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Gate for staff-or-admin surfaces. Matches exhaustively so a new role
/// variant forces a decision here.
pub fn require_privileged(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::Staff | Role::Admin => Ok(()),
        Role::Client => Err(AppError::Forbidden(
            "Staff or Admin role required".to_string(),
        )),
    }
}

/// Gate for admin-only surfaces.
pub fn require_admin(user: &AuthUser) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::Staff | Role::Client => {
            Err(AppError::Forbidden("Admin role required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user_with_role(role: Role) -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        }
    }

    #[test]
    fn privileged_gate_admits_staff_and_admin() {
        assert!(require_privileged(&user_with_role(Role::Staff)).is_ok());
        assert!(require_privileged(&user_with_role(Role::Admin)).is_ok());
        assert!(require_privileged(&user_with_role(Role::Client)).is_err());
    }

    #[test]
    fn admin_gate_admits_only_admin() {
        assert!(require_admin(&user_with_role(Role::Admin)).is_ok());
        assert!(require_admin(&user_with_role(Role::Staff)).is_err());
        assert!(require_admin(&user_with_role(Role::Client)).is_err());
    }
}
