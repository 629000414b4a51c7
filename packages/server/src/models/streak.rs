use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;

/// Current streak state for the authenticated user.
///
/// Always definite integers: a brand-new user reports zeroes, never null.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StreakResponse {
    #[schema(example = 3)]
    pub streak: i32,
    #[schema(example = 7)]
    pub longest_streak: i32,
    pub last_active_date: Option<DateTime<Utc>>,
    pub last_solved_date: Option<DateTime<Utc>>,
}

impl From<user::Model> for StreakResponse {
    fn from(m: user::Model) -> Self {
        Self {
            streak: m.streak,
            longest_streak: m.longest_streak,
            last_active_date: m.last_active_date,
            last_solved_date: m.last_solved_date,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordActivityRequest {
    /// Label describing what the user did (e.g. "completed_topic").
    #[schema(example = "completed_topic")]
    pub activity: String,
}

pub fn validate_record_activity(req: &RecordActivityRequest) -> Result<(), AppError> {
    let activity = req.activity.trim();
    if activity.is_empty() || activity.chars().count() > 128 {
        return Err(AppError::Validation(
            "Activity label must be 1-128 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_label_bounds() {
        let ok = RecordActivityRequest {
            activity: "completed_topic".into(),
        };
        assert!(validate_record_activity(&ok).is_ok());

        let empty = RecordActivityRequest {
            activity: "  ".into(),
        };
        assert!(validate_record_activity(&empty).is_err());

        let long = RecordActivityRequest {
            activity: "a".repeat(200),
        };
        assert!(validate_record_activity(&long).is_err());
    }
}
