//! Custom Axum extractors
//!
//! Identity is established upstream (the edge proxy terminates the session
//! and forwards trusted headers); this layer only reads the result. Requests
//! without a parsable identity are rejected before any handler runs.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

const USER_ID_HEADER: &str = "x-user-id";
const USER_ROLE_HEADER: &str = "x-user-role";

/// Authenticated principal forwarded by the identity edge
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
            .ok_or(ApiError::Unauthorized)?;

        let role = parts
            .headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("user")
            .to_string();

        Ok(AuthenticatedUser { user_id, role })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<AuthenticatedUser, ApiError> {
        let (mut parts, _) = req.into_parts();
        AuthenticatedUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_identity() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header("x-user-id", id.to_string())
            .header("x-user-role", "admin")
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.user_id, id);
        assert!(user.is_admin());
    }

    #[tokio::test]
    async fn test_missing_identity_rejected() {
        let req = Request::builder().body(()).unwrap();
        assert!(extract(req).await.is_err());
    }

    #[tokio::test]
    async fn test_role_defaults_to_user() {
        let req = Request::builder()
            .header("x-user-id", Uuid::new_v4().to_string())
            .body(())
            .unwrap();
        let user = extract(req).await.unwrap();
        assert_eq!(user.role, "user");
        assert!(!user.is_admin());
    }

    #[tokio::test]
    async fn test_garbage_user_id_rejected() {
        let req = Request::builder()
            .header("x-user-id", "not-a-uuid")
            .body(())
            .unwrap();
        assert!(extract(req).await.is_err());
    }
}
