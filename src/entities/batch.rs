use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    BatchProjection, BatchStatus, Certifications, Custodian, Documents, Location, QualityIssues,
    QualityMetrics, RevenueEstimate, Stage, Timeline, Weight, WeightUnit,
};

/// A wool batch. Stage, status, location, processor, timeline and the
/// statistics columns are a projection of the batch's event log and are
/// only written by the lifecycle service.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub batch_code: String,
    pub farm_id: Uuid,
    pub farm_name: String,
    pub weight_value: f64,
    pub weight_unit: WeightUnit,
    pub shearing_date: DateTime<Utc>,
    #[sea_orm(column_type = "Json")]
    pub quality_metrics: QualityMetrics,
    pub current_stage: Stage,
    pub status: BatchStatus,
    #[sea_orm(column_type = "Json")]
    pub current_location: Location,
    #[sea_orm(column_type = "Json", nullable)]
    pub current_processor: Option<Custodian>,
    #[sea_orm(column_type = "Json")]
    pub certifications: Certifications,
    #[sea_orm(column_type = "Json")]
    pub quality_issues: QualityIssues,
    #[sea_orm(column_type = "Json")]
    pub documents: Documents,
    #[sea_orm(column_type = "Json")]
    pub timeline: Timeline,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub actual_completion_date: Option<DateTime<Utc>>,
    /// Whole days from shearing to completion.
    pub processing_duration: Option<i64>,
    #[sea_orm(column_type = "Json", nullable)]
    pub revenue_estimate: Option<RevenueEstimate>,
    pub notes: Option<String>,
    pub is_publicly_visible: bool,
    pub total_updates: i32,
    pub last_update_date: Option<DateTime<Utc>>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::farm::Entity",
        from = "Column::FarmId",
        to = "super::farm::Column::Id"
    )]
    Farm,
    #[sea_orm(has_many = "super::batch_update::Entity")]
    Updates,
}

impl Related<super::farm::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Farm.def()
    }
}

impl Related<super::batch_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Updates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn weight(&self) -> Weight {
        Weight {
            value: self.weight_value,
            unit: self.weight_unit,
        }
    }

    pub fn weight_in_kg(&self) -> f64 {
        self.weight().in_kg()
    }

    pub fn has_active_quality_issues(&self) -> bool {
        self.quality_issues.has_unresolved()
    }

    pub fn progress_percentage(&self) -> u8 {
        self.current_stage.progress_percentage()
    }

    /// The projected fields as currently stored.
    pub fn stored_projection(&self) -> BatchProjection {
        BatchProjection {
            shearing_date: self.shearing_date,
            current_stage: self.current_stage,
            status: self.status,
            current_location: self.current_location.clone(),
            current_processor: self.current_processor.clone(),
            timeline: self.timeline.0.clone(),
            total_updates: self.total_updates,
            last_update_date: self.last_update_date,
            actual_completion_date: self.actual_completion_date,
            processing_duration: self.processing_duration,
        }
    }
}
