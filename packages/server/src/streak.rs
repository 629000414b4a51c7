//! Streak persistence orchestration.
//!
//! The pure transition rules live in `common::streak`; this module owns the
//! read-modify-write cycle. Every update runs in a transaction holding a
//! `FOR UPDATE` lock on the user row, so concurrent updates for the same
//! user (e.g. a rapid double submission) serialize instead of losing an
//! increment.

use chrono::{DateTime, Local, Utc};
use common::streak::{SolveOutcome, apply_login, apply_solve};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};

use crate::entity::{activity_log, user};
use crate::error::AppError;

/// Result of a problem-solved streak update, surfaced to the client.
#[derive(Clone, Copy, Debug)]
pub struct SolveReport {
    pub streak: i32,
    pub longest_streak: i32,
    pub outcome: SolveOutcome,
}

async fn find_user_for_update<C>(txn: &C, user_id: i32) -> Result<user::Model, AppError>
where
    C: sea_orm::ConnectionTrait,
{
    user::Entity::find_by_id(user_id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Record a generic activity: append to the history log and stamp
/// `last_active_date`. Deliberately does not touch the streak counter;
/// streak movement for logins happens in [`record_login`].
pub async fn record_activity(
    db: &DatabaseConnection,
    user_id: i32,
    activity: &str,
    now: DateTime<Utc>,
) -> Result<user::Model, AppError> {
    let txn = db.begin().await?;

    let user = find_user_for_update(&txn, user_id).await?;

    let entry = activity_log::ActiveModel {
        activity: Set(activity.to_string()),
        user_id: Set(user_id),
        created_at: Set(now),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    let mut active: user::ActiveModel = user.into();
    active.last_active_date = Set(Some(now));
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Advance the login streak on successful authentication.
///
/// Works on local calendar days, unlike the problem-solved path. Returns
/// the new streak value.
pub async fn record_login(
    db: &DatabaseConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<i32, AppError> {
    let txn = db.begin().await?;

    let user = find_user_for_update(&txn, user_id).await?;

    let today = now.with_timezone(&Local).date_naive();
    let last_day = user
        .last_active_date
        .map(|d| d.with_timezone(&Local).date_naive());

    let streak = apply_login(user.streak, last_day, today);
    let longest = user.longest_streak.max(streak);

    let mut active: user::ActiveModel = user.into();
    active.streak = Set(streak);
    active.longest_streak = Set(longest);
    active.last_active_date = Set(Some(now));
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(streak)
}

/// Advance the problem-solved streak. UTC-midnight day arithmetic; at most
/// one increment per UTC calendar day.
pub async fn record_problem_solved(
    db: &DatabaseConnection,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<SolveReport, AppError> {
    let txn = db.begin().await?;

    let user = find_user_for_update(&txn, user_id).await?;

    let update = apply_solve(user.streak, user.longest_streak, user.last_solved_date, now);

    if update.outcome == SolveOutcome::DateAnomaly {
        warn!(
            user_id,
            last_solved = ?user.last_solved_date,
            "Solve date ahead of clock; streak not advanced"
        );
    }

    let mut active: user::ActiveModel = user.into();
    active.streak = Set(update.streak);
    active.longest_streak = Set(update.longest_streak);
    active.last_solved_date = Set(update.last_solved_date);
    active.update(&txn).await?;

    txn.commit().await?;

    info!(
        user_id,
        streak = update.streak,
        longest_streak = update.longest_streak,
        outcome = ?update.outcome,
        "Solve streak updated"
    );

    Ok(SolveReport {
        streak: update.streak,
        longest_streak: update.longest_streak,
        outcome: update.outcome,
    })
}
