use std::sync::Arc;

use common::Clock;
use judge::CodeRunner;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub runner: Arc<dyn CodeRunner>,
    pub clock: Arc<dyn Clock>,
}
