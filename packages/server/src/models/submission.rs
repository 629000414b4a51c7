use chrono::{DateTime, Utc};
use common::Verdict;
use common::streak::SolveOutcome;
use serde::{Deserialize, Serialize};

use crate::entity::submission;
use crate::error::AppError;
use crate::streak::SolveReport;

use super::shared::Pagination;

/// Request body for submitting code to a problem.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubmissionRequest {
    /// Programming language of the submission.
    #[schema(example = "javascript")]
    pub language: String,
    /// Source text defining a `solution` entry point.
    #[schema(example = "function solution(a) { return a[0] + a[1]; }")]
    pub code: String,
}

/// Streak movement triggered by an accepted submission.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StreakReport {
    #[schema(example = 3)]
    pub streak: i32,
    #[schema(example = 7)]
    pub longest_streak: i32,
    pub outcome: SolveOutcome,
    #[schema(example = "Streak extended!")]
    pub message: &'static str,
}

impl From<SolveReport> for StreakReport {
    fn from(r: SolveReport) -> Self {
        Self {
            streak: r.streak,
            longest_streak: r.longest_streak,
            outcome: r.outcome,
            message: r.outcome.message(),
        }
    }
}

/// Full submission details.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub language: String,
    pub code: String,
    pub verdict: Verdict,
    #[schema(example = 2)]
    pub test_cases_passed: i32,
    #[schema(example = 2)]
    pub total_test_cases: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub created_at: DateTime<Utc>,
    /// Present when the submission was accepted and moved the solve
    /// streak.
    pub streak: Option<StreakReport>,
}

impl SubmissionResponse {
    pub fn from_model(m: submission::Model, streak: Option<SolveReport>) -> Self {
        Self {
            id: m.id,
            language: m.language,
            code: m.code,
            verdict: m.verdict,
            test_cases_passed: m.test_cases_passed,
            total_test_cases: m.total_test_cases,
            user_id: m.user_id,
            problem_id: m.problem_id,
            created_at: m.created_at,
            streak: streak.map(StreakReport::from),
        }
    }
}

/// Submission summary for list views (code omitted).
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListItem {
    pub id: i32,
    pub language: String,
    pub verdict: Verdict,
    pub test_cases_passed: i32,
    pub total_test_cases: i32,
    pub user_id: i32,
    pub problem_id: i32,
    pub created_at: DateTime<Utc>,
}

impl From<submission::Model> for SubmissionListItem {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            language: m.language,
            verdict: m.verdict,
            test_cases_passed: m.test_cases_passed,
            total_test_cases: m.total_test_cases,
            user_id: m.user_id,
            problem_id: m.problem_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionListResponse {
    pub data: Vec<SubmissionListItem>,
    pub pagination: Pagination,
}

/// Query parameters for submission listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SubmissionListQuery {
    #[param(example = 1)]
    pub page: Option<u64>,
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// Filter by problem ID.
    pub problem_id: Option<i32>,
    /// Filter by verdict.
    pub verdict: Option<Verdict>,
}

/// Validate a submission before any execution or side effect.
pub fn validate_create_submission(
    req: &CreateSubmissionRequest,
    max_code_size: usize,
) -> Result<(), AppError> {
    if req.language.trim().is_empty() {
        return Err(AppError::Validation("Language is required".into()));
    }
    if req.code.trim().is_empty() {
        return Err(AppError::Validation("Code must not be empty".into()));
    }
    if req.code.len() > max_code_size {
        return Err(AppError::Validation(format!(
            "Code size ({} bytes) exceeds maximum ({} bytes)",
            req.code.len(),
            max_code_size
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(language: &str, code: &str) -> CreateSubmissionRequest {
        CreateSubmissionRequest {
            language: language.into(),
            code: code.into(),
        }
    }

    #[test]
    fn accepts_a_normal_submission() {
        let r = req("javascript", "function solution(a) { return a; }");
        assert!(validate_create_submission(&r, 1024).is_ok());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(validate_create_submission(&req("", "code"), 1024).is_err());
        assert!(validate_create_submission(&req("javascript", "   "), 1024).is_err());
    }

    #[test]
    fn rejects_oversized_code() {
        let r = req("javascript", &"x".repeat(2048));
        assert!(validate_create_submission(&r, 1024).is_err());
    }
}
