use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::{
    AppState,
    clock::Clock,
    error::ApiError,
    expander::TimeSlot,
    models::{AvailableDates, BookingDraft, BookingRequest, SlotList, SlotView},
    validation::{validate_duration, validate_horizon, validate_tutor_id},
};

#[derive(Debug, serde::Deserialize)]
pub struct DatesQuery {
    pub horizon_days: Option<u32>,
}

#[derive(Debug, serde::Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_duration() -> u32 {
    60
}

fn bearer_token(auth: Option<TypedHeader<Authorization<Bearer>>>) -> Option<String> {
    auth.map(|TypedHeader(a)| a.token().to_string())
}

/// Fetches availability and expands it for one date. An unparsable date
/// yields no slots rather than an error.
async fn bookable_slots(
    state: &AppState,
    tutor_id: &str,
    query: &SlotsQuery,
    bearer: Option<&str>,
) -> Result<(Option<NaiveDate>, Vec<TimeSlot>), ApiError> {
    validate_tutor_id(tutor_id)?;
    let duration = validate_duration(query.duration)?;
    let Ok(date) = NaiveDate::parse_from_str(query.date.trim(), "%Y-%m-%d") else {
        info!(date = %query.date, "unparsable slot date, returning no slots");
        return Ok((None, Vec::new()));
    };

    let availability = state.backend.fetch_availability(tutor_id, bearer).await?;
    let slots = state
        .expander
        .compute_time_slots(&availability, date, duration);
    Ok((Some(date), slots))
}

#[utoipa::path(get, path = "/", tag = "slots")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Tutor Slots API",
        "endpoints": {
            "/tutors/{tutor_id}/dates": "Dates with bookable availability",
            "/tutors/{tutor_id}/slots": "Bookable slots for a date and duration",
            "/tutors/{tutor_id}/slots.ical": "Bookable slots as an iCal file",
            "/tutors/{tutor_id}/bookings": "Book one of the offered slots"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "slots")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "slots")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/tutors/{tutor_id}/dates",
    params(
        ("tutor_id" = String, Path, description = "Tutor identifier"),
        ("horizon_days" = Option<u32>, Query, description = "Days ahead to scan (1-31)")
    ),
    responses(
        (
            status = 200,
            description = "Dates with at least one availability window",
            body = AvailableDates
        ),
        (status = 400, description = "Invalid tutor id or horizon"),
        (status = 404, description = "Tutor or availability endpoint not found"),
        (status = 502, description = "Backend failure")
    ),
    security((), ("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn get_available_dates(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<AvailableDates>, ApiError> {
    validate_tutor_id(&tutor_id)?;
    let horizon = validate_horizon(query.horizon_days.unwrap_or(state.settings.horizon_days))?;
    let bearer = bearer_token(auth);

    let availability = state
        .backend
        .fetch_availability(&tutor_id, bearer.as_deref())
        .await?;
    let dates = state
        .expander
        .compute_available_dates(&availability, horizon);

    Ok(Json(AvailableDates { tutor_id, dates }))
}

#[utoipa::path(
    get,
    path = "/tutors/{tutor_id}/slots",
    params(
        ("tutor_id" = String, Path, description = "Tutor identifier"),
        ("date" = String, Query, description = "Calendar date, YYYY-MM-DD"),
        (
            "duration" = Option<u32>,
            Query,
            description = "Session length in minutes (60, 90, 120, 150, 180)"
        )
    ),
    responses(
        (status = 200, description = "Bookable slots, possibly empty", body = SlotList),
        (status = 400, description = "Invalid tutor id or duration"),
        (status = 404, description = "Tutor or availability endpoint not found"),
        (status = 502, description = "Backend failure")
    ),
    security((), ("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn get_slots(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotList>, ApiError> {
    let bearer = bearer_token(auth);
    let (date, slots) = bookable_slots(&state, &tutor_id, &query, bearer.as_deref()).await?;

    Ok(Json(SlotList {
        tutor_id,
        date,
        duration_min: query.duration,
        slots: slots.iter().map(SlotView::from).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/tutors/{tutor_id}/slots.ical",
    params(
        ("tutor_id" = String, Path, description = "Tutor identifier"),
        ("date" = String, Query, description = "Calendar date, YYYY-MM-DD"),
        (
            "duration" = Option<u32>,
            Query,
            description = "Session length in minutes (60, 90, 120, 150, 180)"
        )
    ),
    responses(
        (status = 200, description = "iCal file", content_type = "text/calendar"),
        (status = 400, description = "Invalid tutor id or duration"),
        (status = 404, description = "No bookable slots")
    ),
    security((), ("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn get_slots_ical(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bearer = bearer_token(auth);
    let (_, slots) = bookable_slots(&state, &tutor_id, &query, bearer.as_deref()).await?;

    if slots.is_empty() {
        return Err(ApiError::NotFound("No bookable slots".into()));
    }

    let body = state.exporter.generate(&tutor_id, &slots);
    Ok((
        StatusCode::OK,
        [
            ("content-type", "text/calendar"),
            (
                "content-disposition",
                "attachment; filename=tutor_slots.ics",
            ),
        ],
        body,
    ))
}

#[utoipa::path(
    post,
    path = "/tutors/{tutor_id}/bookings",
    params(
        ("tutor_id" = String, Path, description = "Tutor identifier")
    ),
    request_body = BookingDraft,
    responses(
        (status = 201, description = "Booking created by the backend"),
        (status = 400, description = "Invalid tutor id or duration"),
        (status = 409, description = "Start is not a bookable slot"),
        (status = 502, description = "Backend failure")
    ),
    security((), ("bearer_auth" = [])),
    tag = "slots"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Path(tutor_id): Path<String>,
    auth: Option<TypedHeader<Authorization<Bearer>>>,
    Json(draft): Json<BookingDraft>,
) -> Result<impl IntoResponse, ApiError> {
    validate_tutor_id(&tutor_id)?;
    let duration = validate_duration(draft.duration_min)?;
    let bearer = bearer_token(auth);

    let tz = state.expander.clock().now().timezone();
    let date = draft.start.with_timezone(&tz).date_naive();

    let availability = state
        .backend
        .fetch_availability(&tutor_id, bearer.as_deref())
        .await?;
    let Some(slot) = state
        .expander
        .compute_time_slots(&availability, date, duration)
        .into_iter()
        .find(|slot| slot.start == draft.start)
    else {
        warn!(%tutor_id, start = %draft.start, duration, "rejected booking for unavailable slot");
        return Err(ApiError::Conflict(
            "Selected slot is not available".into(),
        ));
    };

    let request = BookingRequest::from_slot(&tutor_id, &slot, draft);
    let created = state
        .backend
        .create_booking(&request, bearer.as_deref())
        .await?;
    info!(%tutor_id, start = %request.start_time, "booking created");

    Ok((StatusCode::CREATED, Json(created)))
}
