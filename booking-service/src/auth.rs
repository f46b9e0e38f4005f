use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use base64::prelude::{Engine, BASE64_STANDARD};

use crate::{ApiError, AppState};

/// The only admin account; authentication is a single shared password.
const ADMIN_USER: &str = "admin";

/// Extractor guarding the admin endpoints.
///
/// Fails closed with a server error when no admin password is configured at
/// all, and with a 401 + `WWW-Authenticate` challenge on bad credentials.
pub struct AdminAuth;

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(expected) = state.config.admin.password.as_deref() else {
            return Err(ApiError::admin_password_missing());
        };

        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let Some((user, password)) = header.and_then(decode_basic) else {
            return Err(ApiError::bad_credentials());
        };

        if user != ADMIN_USER || password != expected {
            tracing::warn!(user = %user, "rejected admin credentials");
            return Err(ApiError::bad_credentials());
        }
        Ok(AdminAuth)
    }
}

fn decode_basic(header: &str) -> Option<(String, String)> {
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic(user: &str, password: &str) -> String {
        format!(
            "Basic {}",
            BASE64_STANDARD.encode(format!("{user}:{password}"))
        )
    }

    #[test]
    fn decodes_well_formed_headers() {
        assert_eq!(
            decode_basic(&basic("admin", "s3gr3to")),
            Some(("admin".to_string(), "s3gr3to".to_string()))
        );
        // colons in the password survive
        assert_eq!(
            decode_basic(&basic("admin", "a:b:c")),
            Some(("admin".to_string(), "a:b:c".to_string()))
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(decode_basic("Bearer abc"), None);
        assert_eq!(decode_basic("Basic not-base64!"), None);
        assert_eq!(
            decode_basic(&format!("Basic {}", BASE64_STANDARD.encode("no-colon"))),
            None
        );
    }
}
