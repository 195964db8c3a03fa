use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ApprovalStatus, FarmCertifications, FarmContact, FarmLocation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "farms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub farm_code: String,
    pub owner_id: Uuid,
    #[sea_orm(column_type = "Json")]
    pub location: FarmLocation,
    #[sea_orm(column_type = "Json")]
    pub contact: FarmContact,
    #[sea_orm(column_type = "Json")]
    pub certifications: FarmCertifications,
    pub sheep_count: i32,
    pub description: Option<String>,
    pub approval_status: ApprovalStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub total_batches: i32,
    /// Kilograms.
    pub total_wool_produced: f64,
    pub last_batch_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::batch::Entity")]
    Batches,
}

impl Related<super::batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Batches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Only approved, active farms may register new batches.
    pub fn can_originate_batches(&self) -> bool {
        self.is_active && self.approval_status == ApprovalStatus::Approved
    }

    pub fn has_valid_organic_certification(&self, at: DateTime<Utc>) -> bool {
        self.certifications.has_valid_organic(at)
    }
}
