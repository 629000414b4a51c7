use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::problem::{self, Difficulty};
use crate::entity::test_case;
use crate::error::AppError;

use super::shared::{Pagination, validate_title};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateProblemRequest {
    /// Language the problem is authored for.
    #[schema(example = "javascript")]
    pub language: String,
    #[schema(example = "Two Sum")]
    pub title: String,
    pub difficulty: Difficulty,
    /// Problem statement in Markdown.
    pub description: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemResponse {
    pub id: i32,
    pub language: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl From<problem::Model> for ProblemResponse {
    fn from(m: problem::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            title: m.title,
            difficulty: m.difficulty,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

/// Problem summary for list views (description omitted).
#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemListItem {
    pub id: i32,
    pub language: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
}

impl From<problem::Model> for ProblemListItem {
    fn from(m: problem::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            title: m.title,
            difficulty: m.difficulty,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProblemListResponse {
    pub data: Vec<ProblemListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProblemListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Case-insensitive title search.
    pub search: Option<String>,
    /// Filter by difficulty.
    pub difficulty: Option<Difficulty>,
    /// Filter by authored language.
    pub language: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTestCaseRequest {
    #[schema(example = "[5,10]")]
    pub input: String,
    #[schema(example = "15")]
    pub expected_output: String,
    /// Public cases are visible to learners; hidden cases only grade.
    pub is_public: bool,
    /// Evaluation order. Appended after existing cases when omitted.
    pub position: Option<i32>,
}

/// Test case as seen through the API.
///
/// For hidden cases, non-admin callers receive `input` and
/// `expected_output` as `None`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TestCaseResponse {
    pub id: i32,
    pub input: Option<String>,
    pub expected_output: Option<String>,
    pub is_public: bool,
    pub position: i32,
    pub problem_id: i32,
}

impl TestCaseResponse {
    pub fn redacted_for(tc: test_case::Model, can_see_hidden: bool) -> Self {
        let visible = can_see_hidden || tc.is_public;
        Self {
            id: tc.id,
            input: visible.then_some(tc.input),
            expected_output: visible.then_some(tc.expected_output),
            is_public: tc.is_public,
            position: tc.position,
            problem_id: tc.problem_id,
        }
    }
}

pub fn validate_create_problem(req: &CreateProblemRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.language.trim().is_empty() {
        return Err(AppError::Validation("Language is required".into()));
    }
    if req.description.trim().is_empty() {
        return Err(AppError::Validation("Description is required".into()));
    }
    Ok(())
}

pub fn validate_create_test_case(req: &CreateTestCaseRequest) -> Result<(), AppError> {
    if req.expected_output.is_empty() {
        return Err(AppError::Validation("Expected output is required".into()));
    }
    if let Some(pos) = req.position
        && pos < 0
    {
        return Err(AppError::Validation("Position must be >= 0".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_case(is_public: bool) -> test_case::Model {
        test_case::Model {
            id: 1,
            input: "[5,10]".into(),
            expected_output: "15".into(),
            is_public,
            position: 0,
            problem_id: 7,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hidden_cases_are_redacted_for_learners() {
        let resp = TestCaseResponse::redacted_for(sample_case(false), false);
        assert!(resp.input.is_none());
        assert!(resp.expected_output.is_none());
        assert_eq!(resp.position, 0);
    }

    #[test]
    fn public_cases_and_admins_see_everything() {
        let public = TestCaseResponse::redacted_for(sample_case(true), false);
        assert_eq!(public.input.as_deref(), Some("[5,10]"));

        let admin = TestCaseResponse::redacted_for(sample_case(false), true);
        assert_eq!(admin.expected_output.as_deref(), Some("15"));
    }

    #[test]
    fn test_case_validation() {
        let ok = CreateTestCaseRequest {
            input: "[1,2]".into(),
            expected_output: "3".into(),
            is_public: true,
            position: None,
        };
        assert!(validate_create_test_case(&ok).is_ok());

        let negative = CreateTestCaseRequest {
            position: Some(-1),
            ..ok
        };
        assert!(validate_create_test_case(&negative).is_err());
    }
}
