use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Local;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

use booking::{Rsvp, SpecialEvents};

use crate::{pdf, AdminAuth, ApiError, AppState, MailJob};

pub fn router(state: AppState) -> Router {
    // the public frontend is served from elsewhere; Content-Disposition must
    // be exposed or the browser cannot read the export filename
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers([header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(root))
        .route("/api/bookable-events", get(bookable_events))
        .route("/api/bookings", post(create_booking))
        .route("/api/bookings/cancel/{token}", get(cancel_booking))
        .route("/api/bookings/pdf", get(export_pdf))
        .route("/api/admin/bookings", get(admin_bookings))
        .route(
            "/api/admin/special-events",
            get(list_special_events).post(create_special_event),
        )
        .route("/api/admin/special-events/{id}", delete(delete_special_event))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "Benvenuto nel backend di La Tavola. Il sistema è operativo."
    }))
}

async fn bookable_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<abi::BookableEvent>>, ApiError> {
    let today = Local::now().date_naive();
    Ok(Json(state.manager.bookable(today).await?))
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<abi::NewBooking>,
) -> Result<Json<abi::Booking>, ApiError> {
    let booking = state.manager.reserve(request).await?;

    // best effort: the booking stands whatever happens to the mail
    if state
        .mail
        .send(MailJob {
            booking: booking.clone(),
        })
        .is_err()
    {
        tracing::warn!(booking_id = booking.id, "mail worker gone, confirmation skipped");
    }

    Ok(Json(booking))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cancelled = state.manager.cancel(&token).await?;
    tracing::info!(booking_id = cancelled.id, "booking cancelled by guest");
    Ok(Json(json!({
        "message": "La tua prenotazione è stata cancellata con successo."
    })))
}

async fn admin_bookings(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<abi::BookingQuery>,
) -> Result<Json<abi::BookingPage>, ApiError> {
    Ok(Json(state.manager.query(query).await?))
}

async fn export_pdf(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(filter): Query<abi::BookingFilter>,
) -> Result<impl IntoResponse, ApiError> {
    // an unknown event id still filters (to nothing); it only loses the
    // dedicated title, as before
    let event = match filter.event_id {
        Some(id) => state.manager.get_event(id).await.ok(),
        None => None,
    };
    let context = pdf::export_context(&filter, event.as_ref());
    let bookings = state.manager.export(filter).await?;
    let bytes = pdf::render(&context.title, &bookings)
        .map_err(|e| ApiError::internal(format!("pdf rendering failed: {e}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}.pdf", context.file_name),
            ),
        ],
        bytes,
    ))
}

async fn create_special_event(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(event): Json<abi::NewSpecialEvent>,
) -> Result<Json<abi::SpecialEvent>, ApiError> {
    Ok(Json(state.manager.create_event(event).await?))
}

async fn list_special_events(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<abi::SpecialEvent>>, ApiError> {
    Ok(Json(state.manager.list_events().await?))
}

async fn delete_special_event(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<abi::SpecialEvent>, ApiError> {
    Ok(Json(state.manager.delete_event(id).await?))
}
