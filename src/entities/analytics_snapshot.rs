use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::snapshot::SnapshotMetrics;
use crate::models::SnapshotPeriod;

/// Persisted rollup, unique per `(date, period)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "analytics_snapshots")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: NaiveDate,
    pub period: SnapshotPeriod,
    #[sea_orm(column_type = "Json")]
    pub metrics: SnapshotMetrics,
    pub calculated_at: DateTime<Utc>,
    pub calculated_by: String,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
