//! Authentication middleware
//!
//! JWT authentication and permission checks

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::{Action, Resource};

use crate::error::{AppError, AppResult, ErrorDetail, ErrorResponse};
use crate::services::AuthService;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: uuid::Uuid,
    pub role: String,
    pub permissions: Vec<String>,
}

impl AuthUser {
    /// Check if user has a specific permission
    pub fn has_permission(&self, resource: Resource, action: Action) -> bool {
        let permission = format!("{}:{}", resource.as_str(), action.as_str());
        self.permissions.contains(&permission)
    }

    /// Permission guard for handlers
    pub fn require(&self, resource: Resource, action: Action) -> AppResult<()> {
        if self.has_permission(resource, action) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions(format!(
                "{}:{}",
                resource.as_str(),
                action.as_str()
            )))
        }
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return unauthorized_response("Missing or invalid Authorization header"),
    };

    let claims = match AuthService::decode_claims(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(_) => return unauthorized_response("Invalid or expired token"),
    };

    let user_id = match uuid::Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let auth_user = AuthUser {
        user_id,
        role: claims.role,
        permissions: claims.permissions,
    };

    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(permissions: &[&str]) -> AuthUser {
        AuthUser {
            user_id: uuid::Uuid::new_v4(),
            role: "custom".to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_require_permission() {
        let viewer = user(&["analytics:view"]);

        assert!(viewer.require(Resource::Analytics, Action::View).is_ok());
        assert!(matches!(
            viewer.require(Resource::Imports, Action::Create),
            Err(AppError::InsufficientPermissions(_))
        ));
        assert!(!viewer.has_permission(Resource::Analytics, Action::Export));
    }
}
