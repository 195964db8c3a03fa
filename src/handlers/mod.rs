pub mod analytics;
pub mod batches;
pub mod common;
pub mod farms;
pub mod public;
pub mod users;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    analytics::AnalyticsService, farms::FarmService, lifecycle::LifecycleService,
    public_trace::PublicTraceService, users::UserService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub lifecycle: Arc<LifecycleService>,
    pub farms: Arc<FarmService>,
    pub users: Arc<UserService>,
    pub analytics: Arc<AnalyticsService>,
    pub public_trace: Arc<PublicTraceService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            lifecycle: Arc::new(LifecycleService::new(db_pool.clone(), event_sender.clone())),
            farms: Arc::new(FarmService::new(db_pool.clone(), event_sender.clone())),
            users: Arc::new(UserService::new(db_pool.clone())),
            analytics: Arc::new(AnalyticsService::new(db_pool.clone(), event_sender)),
            public_trace: Arc::new(PublicTraceService::new(db_pool)),
        }
    }
}
