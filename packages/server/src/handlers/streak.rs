use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use sea_orm::EntityTrait;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::{AppJson, AuthUser};
use crate::models::streak::{RecordActivityRequest, StreakResponse, validate_record_activity};
use crate::state::AppState;
use crate::streak;

/// Fetch the caller's current streak state.
#[utoipa::path(
    get,
    path = "/",
    tag = "Streak",
    operation_id = "getStreak",
    summary = "Current streak",
    description = "Returns the caller's streak counters. A brand-new user gets zeroes, never nulls.",
    responses(
        (status = 200, description = "Streak state", body = StreakResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_streak(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StreakResponse>, AppError> {
    let found = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(StreakResponse::from(found)))
}

/// Record a generic activity for the caller.
#[utoipa::path(
    post,
    path = "/activity",
    tag = "Streak",
    operation_id = "recordActivity",
    summary = "Record an activity",
    description = "Appends to the activity history and stamps the last-active timestamp. \
                   Does not move the streak counter; only logins and accepted solutions do.",
    request_body = RecordActivityRequest,
    responses(
        (status = 201, description = "Activity recorded", body = StreakResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn record_activity(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RecordActivityRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_record_activity(&payload)?;

    let updated = streak::record_activity(
        &state.db,
        auth_user.user_id,
        payload.activity.trim(),
        state.clock.now(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(StreakResponse::from(updated))))
}
