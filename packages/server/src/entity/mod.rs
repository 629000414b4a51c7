pub mod activity_log;
pub mod problem;
pub mod submission;
pub mod test_case;
pub mod user;
