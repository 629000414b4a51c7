pub mod auth;
pub mod problem;
pub mod shared;
pub mod streak;
pub mod submission;
