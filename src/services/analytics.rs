use chrono::{DateTime, NaiveDate, Utc};
use metrics::{counter, histogram};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, QuerySelect, Set,
    SqlErr,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{analytics_snapshot, batch, batch_update, farm, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::snapshot::{SnapshotMetrics, StageCount};
use crate::models::{SnapshotPeriod, Stage};
use crate::services::rollup::{self, RollupInput};
use crate::services::timeline::EventSequence;

pub const MAX_RECENT_UPDATES: u64 = 100;

/// `(current - previous) / previous * 100`, undefined when `previous` is 0.
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDeltas {
    pub total_batches: Option<f64>,
    pub new_batches: Option<f64>,
    pub completed_in_period: Option<f64>,
    pub wool_kg_in_period: Option<f64>,
    pub updates_recorded: Option<f64>,
    pub issues_reported: Option<f64>,
    pub total_farms: Option<f64>,
    pub total_users: Option<f64>,
    pub completion_rate: Option<f64>,
    pub quality_pass_rate: Option<f64>,
    pub on_time_rate: Option<f64>,
}

impl TrendDeltas {
    pub fn between(current: &SnapshotMetrics, previous: &SnapshotMetrics) -> Self {
        let delta = |f: fn(&SnapshotMetrics) -> f64| percent_change(f(current), f(previous));
        Self {
            total_batches: delta(|m| m.batches.total as f64),
            new_batches: delta(|m| m.batches.new_batches as f64),
            completed_in_period: delta(|m| m.batches.completed_in_period as f64),
            wool_kg_in_period: delta(|m| m.production.wool_kg_in_period),
            updates_recorded: delta(|m| m.activity.updates_recorded as f64),
            issues_reported: delta(|m| m.quality.issues_reported as f64),
            total_farms: delta(|m| m.farms.total as f64),
            total_users: delta(|m| m.users.total as f64),
            completion_rate: delta(|m| m.rates.completion_rate),
            quality_pass_rate: delta(|m| m.rates.quality_pass_rate),
            on_time_rate: delta(|m| m.rates.on_time_rate),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub period: SnapshotPeriod,
    pub current: analytics_snapshot::Model,
    pub previous: analytics_snapshot::Model,
    pub deltas: TrendDeltas,
}

#[derive(Debug, Clone, Serialize)]
pub struct FarmSummary {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub total_batches: u64,
    pub active_batches: u64,
    pub completed_batches: u64,
    pub batches_with_active_issues: u64,
    pub total_wool_kg: f64,
    pub by_stage: Vec<StageCount>,
    pub last_batch_date: Option<DateTime<Utc>>,
}

/// Snapshot computation, persistence and trend queries.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Loads every row visible at `as_of` and folds it into metrics.
    #[instrument(skip(self))]
    pub async fn compute_snapshot(
        &self,
        period: SnapshotPeriod,
        as_of: DateTime<Utc>,
    ) -> Result<SnapshotMetrics, ServiceError> {
        let started = Instant::now();
        let db = &*self.db;

        let farms = farm::Entity::find()
            .filter(farm::Column::CreatedAt.lte(as_of))
            .all(db)
            .await?;
        let users = user::Entity::find()
            .filter(user::Column::CreatedAt.lte(as_of))
            .all(db)
            .await?;
        let batches = batch::Entity::find()
            .filter(batch::Column::ShearingDate.lte(as_of))
            .all(db)
            .await?;
        let events = batch_update::Entity::find()
            .filter(batch_update::Column::Timestamp.lte(as_of))
            .all(db)
            .await?;

        let metrics = rollup::compute_snapshot(
            &RollupInput {
                farms: &farms,
                users: &users,
                batches: &batches,
                events: &events,
            },
            period,
            as_of,
        );

        histogram!("woolchain.snapshot.compute_ms", started.elapsed().as_millis() as f64);
        Ok(metrics)
    }

    /// Computes and stores the snapshot for `(as_of.date, period)`,
    /// replacing an existing one.
    #[instrument(skip(self))]
    pub async fn generate_snapshot(
        &self,
        period: SnapshotPeriod,
        as_of: DateTime<Utc>,
        calculated_by: &str,
    ) -> Result<analytics_snapshot::Model, ServiceError> {
        let metrics = self.compute_snapshot(period, as_of).await?;
        let date = as_of.date_naive();

        let stored = match self.get_snapshot(period, date).await? {
            Some(existing) => self.overwrite(existing, metrics, calculated_by).await?,
            None => {
                let inserted = analytics_snapshot::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    date: Set(date),
                    period: Set(period),
                    metrics: Set(metrics.clone()),
                    calculated_at: Set(Utc::now()),
                    calculated_by: Set(calculated_by.to_string()),
                    notes: Set(None),
                }
                .insert(&*self.db)
                .await;
                match inserted {
                    Ok(model) => model,
                    Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                        let existing = self
                            .get_snapshot(period, date)
                            .await?
                            .ok_or_else(|| ServiceError::InternalError("snapshot vanished during upsert".into()))?;
                        self.overwrite(existing, metrics, calculated_by).await?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        counter!("woolchain.snapshot.generated", 1, "period" => period.as_str());
        info!(%period, %date, "analytics snapshot stored");
        self.event_sender
            .emit(Event::SnapshotComputed { period, date });
        Ok(stored)
    }

    async fn overwrite(
        &self,
        existing: analytics_snapshot::Model,
        metrics: SnapshotMetrics,
        calculated_by: &str,
    ) -> Result<analytics_snapshot::Model, ServiceError> {
        let mut active = existing.into_active_model();
        active.metrics = Set(metrics);
        active.calculated_at = Set(Utc::now());
        active.calculated_by = Set(calculated_by.to_string());
        Ok(active.update(&*self.db).await?)
    }

    pub async fn get_snapshot(
        &self,
        period: SnapshotPeriod,
        date: NaiveDate,
    ) -> Result<Option<analytics_snapshot::Model>, ServiceError> {
        Ok(analytics_snapshot::Entity::find()
            .filter(analytics_snapshot::Column::Period.eq(period))
            .filter(analytics_snapshot::Column::Date.eq(date))
            .one(&*self.db)
            .await?)
    }

    pub async fn get_latest(&self, period: SnapshotPeriod) -> Result<Option<analytics_snapshot::Model>, ServiceError> {
        Ok(analytics_snapshot::Entity::find()
            .filter(analytics_snapshot::Column::Period.eq(period))
            .order_by_desc(analytics_snapshot::Column::Date)
            .one(&*self.db)
            .await?)
    }

    /// Snapshots with `from <= date <= to`, oldest first.
    pub async fn get_date_range(
        &self,
        period: SnapshotPeriod,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<analytics_snapshot::Model>, ServiceError> {
        if from > to {
            return Err(ServiceError::ValidationError(
                "range start must not be after its end".into(),
            ));
        }
        Ok(analytics_snapshot::Entity::find()
            .filter(analytics_snapshot::Column::Period.eq(period))
            .filter(analytics_snapshot::Column::Date.between(from, to))
            .order_by_asc(analytics_snapshot::Column::Date)
            .all(&*self.db)
            .await?)
    }

    /// Latest snapshot against the one exactly one period earlier.
    /// `None` when either is missing.
    #[instrument(skip(self))]
    pub async fn get_trend(&self, period: SnapshotPeriod) -> Result<Option<TrendReport>, ServiceError> {
        let Some(current) = self.get_latest(period).await? else {
            return Ok(None);
        };
        let Some(previous_date) = period.previous_date(current.date) else {
            return Ok(None);
        };
        let Some(previous) = self.get_snapshot(period, previous_date).await? else {
            return Ok(None);
        };

        let deltas = TrendDeltas::between(&current.metrics, &previous.metrics);
        Ok(Some(TrendReport {
            period,
            current,
            previous,
            deltas,
        }))
    }

    pub async fn get_batch_timeline(&self, batch_id: Uuid) -> Result<EventSequence, ServiceError> {
        batch::Entity::find_by_id(batch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;
        Ok(EventSequence::new(self.db.clone(), batch_id))
    }

    /// Newest events across all batches.
    pub async fn recent_updates(&self, limit: u64) -> Result<Vec<batch_update::Model>, ServiceError> {
        Ok(batch_update::Entity::find()
            .order_by_desc(batch_update::Column::Timestamp)
            .order_by_desc(batch_update::Column::Sequence)
            .limit(limit.clamp(1, MAX_RECENT_UPDATES))
            .all(&*self.db)
            .await?)
    }

    pub async fn farm_summary(&self, farm_id: Uuid) -> Result<FarmSummary, ServiceError> {
        let farm = farm::Entity::find_by_id(farm_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Farm", farm_id))?;
        let batches = batch::Entity::find()
            .filter(batch::Column::FarmId.eq(farm_id))
            .all(&*self.db)
            .await?;

        let completed = batches.iter().filter(|b| b.current_stage.is_terminal()).count() as u64;
        let by_stage = Stage::ALL
            .iter()
            .map(|&stage| StageCount {
                stage,
                count: batches.iter().filter(|b| b.current_stage == stage).count() as u64,
            })
            .filter(|c| c.count > 0)
            .collect();

        Ok(FarmSummary {
            farm_id,
            farm_name: farm.name,
            total_batches: batches.len() as u64,
            active_batches: batches.len() as u64 - completed,
            completed_batches: completed,
            batches_with_active_issues: batches.iter().filter(|b| b.has_active_quality_issues()).count() as u64,
            total_wool_kg: batches.iter().map(|b| b.weight_in_kg()).sum(),
            by_stage,
            last_batch_date: farm.last_batch_date,
        })
    }
}
