use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Actor, BatchStatus, Documents, Location, Measurements, ProcessingDetails, QualityCheck, QualityIssues,
    Stage,
};

/// One accepted lifecycle event. Rows are never updated after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_updates")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub batch_id: Uuid,
    pub batch_code: String,
    /// Acceptance order within the batch, starting at 1 for the genesis event.
    pub sequence: i32,
    pub stage: Stage,
    pub status: BatchStatus,
    pub flagged_stage: Option<Stage>,
    #[sea_orm(column_type = "Json")]
    pub location: Location,
    #[sea_orm(column_type = "Json")]
    pub updated_by: Actor,
    pub timestamp: DateTime<Utc>,
    pub notes: Option<String>,
    #[sea_orm(column_type = "Json")]
    pub documents: Documents,
    #[sea_orm(column_type = "Json", nullable)]
    pub measurements: Option<Measurements>,
    #[sea_orm(column_type = "Json", nullable)]
    pub quality_check: Option<QualityCheck>,
    #[sea_orm(column_type = "Json", nullable)]
    pub processing_details: Option<ProcessingDetails>,
    #[sea_orm(column_type = "Json")]
    pub issues: QualityIssues,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub previous_stage: Option<Stage>,
    pub next_stage: Option<Stage>,
    pub is_realtime_update: bool,
    pub notifications_sent: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::batch::Entity",
        from = "Column::BatchId",
        to = "super::batch::Column::Id"
    )]
    Batch,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
