use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// The caller, resolved from `Authorization: Bearer <supabase jwt>`.
/// Extracting it rejects the request with 401 when the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    /// Raw access token, needed to sign the session out upstream.
    pub token: String,
}

impl AuthUser {
    /// 403 unless `user_id` is the caller.
    pub fn ensure_is(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.id == user_id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub(crate) fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let (id, claims) = state.jwt.verify(token).map_err(|e| {
            debug!("Rejected bearer token: {e}");
            AppError::Unauthorized
        })?;
        Ok(AuthUser {
            id,
            email: claims.email,
            token: token.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(Some("Bearer abc"))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("bearer  abc "))), Some("abc"));
        assert_eq!(bearer_token(&parts_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with(None)), None);
    }

    #[test]
    fn test_ensure_is() {
        let id = Uuid::new_v4();
        let user = AuthUser {
            id,
            email: None,
            token: "t".to_string(),
        };
        assert!(user.ensure_is(id).is_ok());
        assert!(matches!(user.ensure_is(Uuid::new_v4()), Err(AppError::Forbidden)));
    }
}
