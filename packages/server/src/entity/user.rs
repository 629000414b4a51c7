use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role assigned to newly registered users.
pub const DEFAULT_ROLE: &str = "member";
pub const ADMIN_ROLE: &str = "admin";

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    pub role: String,

    /// Current consecutive-day solve streak. Never negative.
    pub streak: i32,
    /// Historical maximum of `streak`. Invariant: `longest_streak >= streak`.
    pub longest_streak: i32,
    /// Last generic-activity timestamp, unnormalized.
    pub last_active_date: Option<DateTimeUtc>,
    /// Last problem-solve day. Always UTC midnight when set.
    pub last_solved_date: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub submissions: HasMany<super::submission::Entity>,

    #[sea_orm(has_many)]
    pub activities: HasMany<super::activity_log::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
