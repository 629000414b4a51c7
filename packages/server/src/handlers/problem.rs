use std::cmp;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{problem, test_case};
use crate::error::{AppError, ErrorBody};
use crate::extractors::{AppJson, AuthUser};
use crate::models::problem::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;

/// Find a problem by ID or return 404.
pub(crate) async fn find_problem<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<problem::Model, AppError> {
    problem::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Problem not found".into()))
}

/// List problems.
#[utoipa::path(
    get,
    path = "/",
    tag = "Problems",
    operation_id = "listProblems",
    summary = "List problems",
    params(ProblemListQuery),
    responses(
        (status = 200, description = "List of problems", body = ProblemListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_problems(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ProblemListQuery>,
) -> Result<Json<ProblemListResponse>, AppError> {
    let page = cmp::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = problem::Entity::find();

    if let Some(ref search) = query.search {
        let pattern = format!("%{}%", escape_like(search.trim()));
        select = select.filter(problem::Column::Title.like(&pattern));
    }
    if let Some(difficulty) = query.difficulty {
        select = select.filter(problem::Column::Difficulty.eq(difficulty));
    }
    if let Some(ref language) = query.language {
        select = select.filter(problem::Column::Language.eq(language.trim()));
    }

    let total = select.clone().count(&state.db).await?;

    let problems = select
        .order_by_asc(problem::Column::Id)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let total_pages = total.div_ceil(per_page);

    Ok(Json(ProblemListResponse {
        data: problems.into_iter().map(ProblemListItem::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

/// Get one problem.
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Problems",
    operation_id = "getProblem",
    summary = "Get problem details",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Problem details", body = ProblemResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(problem_id = %id))]
pub async fn get_problem(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ProblemResponse>, AppError> {
    let found = find_problem(&state.db, id).await?;
    Ok(Json(ProblemResponse::from(found)))
}

/// Create a problem. Admin only.
#[utoipa::path(
    post,
    path = "/",
    tag = "Problems",
    operation_id = "createProblem",
    summary = "Create a problem",
    request_body = CreateProblemRequest,
    responses(
        (status = 201, description = "Problem created", body = ProblemResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_problem(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateProblemRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_problem(&payload)?;

    let new_problem = problem::ActiveModel {
        language: Set(payload.language.trim().to_string()),
        title: Set(payload.title.trim().to_string()),
        difficulty: Set(payload.difficulty),
        description: Set(payload.description),
        created_at: Set(state.clock.now()),
        ..Default::default()
    };

    let created = new_problem.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(ProblemResponse::from(created))))
}

/// List a problem's test cases, hidden ones redacted for non-admins.
#[utoipa::path(
    get,
    path = "/{id}/test-cases",
    tag = "Test Cases",
    operation_id = "listTestCases",
    summary = "List test cases",
    params(("id" = i32, Path, description = "Problem ID")),
    responses(
        (status = 200, description = "Test cases in evaluation order", body = [TestCaseResponse]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(problem_id = %id))]
pub async fn list_test_cases(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<TestCaseResponse>>, AppError> {
    let _ = find_problem(&state.db, id).await?;

    let cases = test_case::Entity::find()
        .filter(test_case::Column::ProblemId.eq(id))
        .order_by_asc(test_case::Column::Position)
        .all(&state.db)
        .await?;

    let can_see_hidden = auth_user.is_admin();
    Ok(Json(
        cases
            .into_iter()
            .map(|tc| TestCaseResponse::redacted_for(tc, can_see_hidden))
            .collect(),
    ))
}

/// Add a test case to a problem. Admin only.
#[utoipa::path(
    post,
    path = "/{id}/test-cases",
    tag = "Test Cases",
    operation_id = "createTestCase",
    summary = "Add a test case",
    params(("id" = i32, Path, description = "Problem ID")),
    request_body = CreateTestCaseRequest,
    responses(
        (status = 201, description = "Test case created", body = TestCaseResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Problem not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(problem_id = %id))]
pub async fn create_test_case(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<CreateTestCaseRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_create_test_case(&payload)?;

    let txn = state.db.begin().await?;

    let _ = find_problem(&txn, id).await?;

    let position = match payload.position {
        Some(pos) => pos,
        None => {
            let last: Option<i32> = test_case::Entity::find()
                .filter(test_case::Column::ProblemId.eq(id))
                .select_only()
                .column(test_case::Column::Position)
                .order_by_desc(test_case::Column::Position)
                .into_tuple()
                .one(&txn)
                .await?;
            last.map_or(0, |p| p + 1)
        }
    };

    let new_case = test_case::ActiveModel {
        input: Set(payload.input),
        expected_output: Set(payload.expected_output),
        is_public: Set(payload.is_public),
        position: Set(position),
        problem_id: Set(id),
        created_at: Set(state.clock.now()),
        ..Default::default()
    };

    let created = new_case.insert(&txn).await?;
    txn.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(TestCaseResponse::redacted_for(created, true)),
    ))
}
