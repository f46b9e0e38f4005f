use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// HTTP-side wrapper around [`abi::Error`].
///
/// Body shape is `{"detail": "..."}`, the contract the frontend already
/// speaks. Server errors are logged here with their cause; the client only
/// ever sees a generic message for those.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    pub fn bad_credentials() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            detail: "Credenziali non valide".to_string(),
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        tracing::error!(error = %cause, "internal error");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "Errore interno del server.".to_string(),
        }
    }

    pub fn admin_password_missing() -> Self {
        tracing::error!("ADMIN_PASSWORD is not configured, admin endpoints fail closed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: "ADMIN_PASSWORD non configurata nel backend. Contatta l'amministratore."
                .to_string(),
        }
    }
}

impl From<abi::Error> for ApiError {
    fn from(err: abi::Error) -> Self {
        let status = match &err {
            abi::Error::DuplicateBooking
            | abi::Error::NoCapacity { .. }
            | abi::Error::BookingsClosed
            | abi::Error::InvalidEmail(_)
            | abi::Error::InvalidGuests(_)
            | abi::Error::MissingField(_) => StatusCode::BAD_REQUEST,
            abi::Error::UnknownToken | abi::Error::EventNotFound | abi::Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            abi::Error::MissingConfig(_) | abi::Error::InvalidConfig(_) | abi::Error::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "internal error");
            "Errore interno del server.".to_string()
        } else {
            err.to_string()
        };
        Self { status, detail }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, header::HeaderValue::from_static("Basic"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_are_bad_requests() {
        let err = ApiError::from(abi::Error::DuplicateBooking);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.detail.contains("già una prenotazione"));
    }

    #[test]
    fn unknown_token_is_not_found() {
        let err = ApiError::from(abi::Error::UnknownToken);
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn database_details_never_leak() {
        let err = ApiError::from(abi::Error::Db(sqlx::Error::PoolClosed));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail, "Errore interno del server.");
    }

    #[test]
    fn unauthorized_carries_the_challenge_header() {
        let response = ApiError::bad_credentials().into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic"
        );
    }
}
