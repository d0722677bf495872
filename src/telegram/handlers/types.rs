//! Handler types and dependencies

use std::sync::Arc;

use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::core::cycle::ReportingCycle;
use crate::storage::db::DbPool;
use crate::survey::SurveyStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub surveys: Arc<SurveyStore>,
    pub cycle: Arc<Mutex<ReportingCycle>>,
    pub admin_chat: ChatId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(db_pool: Arc<DbPool>, admin_chat: ChatId) -> Self {
        Self {
            db_pool,
            surveys: Arc::new(SurveyStore::new()),
            cycle: Arc::new(Mutex::new(ReportingCycle::default())),
            admin_chat,
        }
    }
}
