//! Consumer-facing provenance view, looked up by batch code.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::entities::{batch, batch_update};
use crate::errors::ServiceError;
use crate::models::codes::normalize_batch_code;
use crate::models::{
    BatchStatus, Certification, Location, QualityMetrics, Stage, TimelineSegment, Weight,
};
use crate::services::lifecycle::load_history;

/// One journey step with actor identity, notes and measurements removed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicJourneyEntry {
    pub stage: Stage,
    pub status: BatchStatus,
    pub location: Location,
    pub timestamp: DateTime<Utc>,
    pub quality_check_passed: Option<bool>,
}

impl From<&batch_update::Model> for PublicJourneyEntry {
    fn from(event: &batch_update::Model) -> Self {
        Self {
            stage: event.stage,
            status: event.status,
            location: event.location.coarse(),
            timestamp: event.timestamp,
            quality_check_passed: event.quality_check.as_ref().and_then(|c| c.outcome()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicBatchView {
    pub batch_code: String,
    pub farm_name: String,
    pub shearing_date: DateTime<Utc>,
    pub current_stage: Stage,
    pub status: BatchStatus,
    pub progress_percentage: u8,
    pub current_location: Location,
    pub weight: Weight,
    pub quality_metrics: QualityMetrics,
    pub certifications: Vec<Certification>,
    pub timeline: Vec<TimelineSegment>,
    pub journey: Vec<PublicJourneyEntry>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl PublicBatchView {
    pub fn build(batch: batch::Model, history: &[batch_update::Model]) -> Self {
        Self {
            progress_percentage: batch.progress_percentage(),
            weight: batch.weight(),
            current_location: batch.current_location.coarse(),
            journey: history.iter().map(PublicJourneyEntry::from).collect(),
            batch_code: batch.batch_code,
            farm_name: batch.farm_name,
            shearing_date: batch.shearing_date,
            current_stage: batch.current_stage,
            status: batch.status,
            quality_metrics: batch.quality_metrics,
            certifications: batch.certifications.0,
            timeline: batch.timeline.0,
            completed_at: batch.actual_completion_date,
        }
    }
}

#[derive(Clone)]
pub struct PublicTraceService {
    db: Arc<DbPool>,
}

impl PublicTraceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Unknown and hidden batches are indistinguishable to the caller.
    #[instrument(skip(self))]
    pub async fn get_public_trace(&self, batch_code: &str) -> Result<PublicBatchView, ServiceError> {
        let not_found = || ServiceError::not_found("Batch", batch_code.trim());
        let code = normalize_batch_code(batch_code).ok_or_else(not_found)?;

        let batch = batch::Entity::find()
            .filter(batch::Column::BatchCode.eq(code.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(not_found)?;

        if !batch.is_publicly_visible {
            debug!(batch_code = %code, "trace requested for hidden batch");
            return Err(not_found());
        }

        let history = load_history(&*self.db, batch.id).await?;
        Ok(PublicBatchView::build(batch, &history))
    }
}
