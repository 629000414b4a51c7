use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Duration;
use common::evaluation::TestCaseData;
use judge::RunLimits;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::{submission, test_case};
use crate::error::{AppError, ErrorBody};
use crate::extractors::{AppJson, AuthUser};
use crate::handlers::problem::find_problem;
use crate::models::shared::Pagination;
use crate::models::submission::*;
use crate::state::AppState;
use crate::streak;

/// Check the per-user submission rate limit.
///
/// Optimistic (non-locking): concurrent requests inside a very short
/// window may both pass the count before either insert lands. Accepted
/// trade-off against adding lock latency to every submission.
async fn check_rate_limit(state: &AppState, user_id: i32) -> Result<(), AppError> {
    let limit_per_minute = state.config.submission.rate_limit_per_minute;
    if limit_per_minute == 0 {
        return Ok(()); // Rate limiting disabled
    }

    let one_minute_ago = state.clock.now() - Duration::minutes(1);

    let count = submission::Entity::find()
        .filter(submission::Column::UserId.eq(user_id))
        .filter(submission::Column::CreatedAt.gt(one_minute_ago))
        .count(&state.db)
        .await?;

    if count >= limit_per_minute as u64 {
        let oldest = submission::Entity::find()
            .filter(submission::Column::UserId.eq(user_id))
            .filter(submission::Column::CreatedAt.gt(one_minute_ago))
            .order_by_asc(submission::Column::CreatedAt)
            .one(&state.db)
            .await?;

        let retry_after = oldest
            .map(|s| {
                let expires = s.created_at + Duration::minutes(1);
                cmp::max((expires - state.clock.now()).num_seconds(), 1) as u64
            })
            .unwrap_or(60);

        return Err(AppError::RateLimited { retry_after });
    }

    Ok(())
}

/// Find a submission by ID or return 404.
async fn find_submission<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<submission::Model, AppError> {
    submission::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))
}

/// Submit code for grading.
#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "createSubmission",
    summary = "Submit a solution to a problem",
    description = "Runs the submitted code against every test case of the problem inside an \
                   isolated, time-limited process, persists the graded submission, and \
                   advances the solve streak on acceptance.",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = CreateSubmissionRequest,
    responses(
        (status = 201, description = "Submission graded", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "No execution backend (UNSUPPORTED_LANGUAGE)", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded (RATE_LIMITED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(problem_id = %problem_id, user_id = auth_user.user_id))]
pub async fn create_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(problem_id): Path<i32>,
    AppJson(payload): AppJson<CreateSubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    validate_create_submission(&payload, state.config.submission.max_code_size)?;

    let language = payload.language.trim().to_string();
    if !judge::is_supported_language(&language) {
        return Err(AppError::UnsupportedLanguage(language));
    }

    check_rate_limit(&state, auth_user.user_id).await?;

    let _ = find_problem(&state.db, problem_id).await?;

    let cases: Vec<TestCaseData> = test_case::Entity::find()
        .filter(test_case::Column::ProblemId.eq(problem_id))
        .order_by_asc(test_case::Column::Position)
        .all(&state.db)
        .await?
        .into_iter()
        .map(|tc| TestCaseData {
            input: tc.input,
            expected_output: tc.expected_output,
        })
        .collect();

    if cases.is_empty() {
        return Err(AppError::Validation(
            "Problem has no test cases to grade against".into(),
        ));
    }

    let limits = RunLimits::from_millis(state.config.judge.time_limit_ms);
    let evaluation = judge::evaluate(state.runner.as_ref(), &payload.code, &cases, &limits).await?;

    let new_submission = submission::ActiveModel {
        language: Set(language),
        code: Set(payload.code),
        verdict: Set(evaluation.verdict),
        test_cases_passed: Set(evaluation.test_cases_passed),
        total_test_cases: Set(evaluation.total_test_cases),
        user_id: Set(auth_user.user_id),
        problem_id: Set(problem_id),
        created_at: Set(state.clock.now()),
        ..Default::default()
    };
    let model = new_submission.insert(&state.db).await?;

    info!(
        submission_id = model.id,
        verdict = %model.verdict,
        passed = model.test_cases_passed,
        total = model.total_test_cases,
        "Submission graded"
    );

    let solve_report = if evaluation.is_accepted() {
        Some(streak::record_problem_solved(&state.db, auth_user.user_id, state.clock.now()).await?)
    } else {
        None
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmissionResponse::from_model(model, solve_report)),
    ))
}

/// List the caller's submission history.
#[utoipa::path(
    get,
    path = "/",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List submissions",
    description = "Returns a paginated list of the caller's submissions, newest first. \
                   Admins see all users' submissions.",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "List of submissions", body = SubmissionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<SubmissionListResponse>, AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = submission::Entity::find();

    if !auth_user.is_admin() {
        select = select.filter(submission::Column::UserId.eq(auth_user.user_id));
    }
    if let Some(pid) = query.problem_id {
        select = select.filter(submission::Column::ProblemId.eq(pid));
    }
    if let Some(verdict) = query.verdict {
        select = select.filter(submission::Column::Verdict.eq(verdict));
    }

    let total = select.clone().count(&state.db).await?;

    let submissions = select
        .order_by_desc(submission::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let total_pages = total.div_ceil(per_page);

    Ok(Json(SubmissionListResponse {
        data: submissions
            .into_iter()
            .map(SubmissionListItem::from)
            .collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// Get a single submission by ID.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get submission details",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission details", body = SubmissionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(submission_id = %id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let sub = find_submission(&state.db, id).await?;

    // Non-owners get a 404 rather than a 403 to prevent enumeration.
    if !auth_user.is_admin() && sub.user_id != auth_user.user_id {
        return Err(AppError::NotFound("Submission not found".into()));
    }

    Ok(Json(SubmissionResponse::from_model(sub, None)))
}
