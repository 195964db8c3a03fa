//! Batch lifecycle engine: the only writer of batches and their event log.

use chrono::{DateTime, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{batch, batch_update, farm};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::codes::{batch_code, batch_code_prefix, normalize_batch_code};
use crate::models::{
    Actor, BatchProjection, BatchStatus, Certification, Certifications, Document, DocumentKind, Documents,
    EventFacts, IssueReport, Location, Measurements, ProcessingDetails, Proposal, QualityCheck, QualityIssue,
    QualityIssues, QualityMetrics, RevenueEstimate, Stage, Timeline, Weight,
};

const MAX_DAILY_SEQUENCE: u32 = 9999;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBatchInput {
    pub farm_id: Uuid,
    /// Generated as `WOOL-YYYYMMDD-NNN` when absent.
    pub batch_code: Option<String>,
    pub weight: Weight,
    pub shearing_date: DateTime<Utc>,
    #[serde(default)]
    pub quality_metrics: QualityMetrics,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub revenue_estimate: Option<RevenueEstimate>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    pub is_publicly_visible: Option<bool>,
    pub created_by: Actor,
    /// Defaults to the farm's address.
    pub origin: Option<Location>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub kind: DocumentKind,
    #[validate(url)]
    pub url: String,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

impl DocumentInput {
    fn into_document(self, uploaded_by: Uuid, uploaded_at: DateTime<Utc>) -> Document {
        Document {
            id: Uuid::new_v4(),
            title: self.title,
            kind: self.kind,
            url: self.url,
            uploaded_by: Some(uploaded_by),
            uploaded_at,
            file_size: self.file_size,
            mime_type: self.mime_type,
        }
    }
}

/// Candidate event submitted to [`LifecycleService::apply_update`].
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BatchUpdateInput {
    pub stage: Stage,
    pub status: BatchStatus,
    /// Carries the current location forward when absent.
    pub location: Option<Location>,
    pub updated_by: Actor,
    pub timestamp: DateTime<Utc>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentInput>,
    pub measurements: Option<Measurements>,
    pub quality_check: Option<QualityCheck>,
    pub processing_details: Option<ProcessingDetails>,
    #[serde(default)]
    pub issues: Vec<IssueReport>,
    pub estimated_completion_date: Option<DateTime<Utc>>,
    pub previous_stage: Option<Stage>,
    pub next_stage: Option<Stage>,
    #[serde(default = "default_realtime")]
    pub is_realtime_update: bool,
}

fn default_realtime() -> bool {
    true
}

impl BatchUpdateInput {
    /// Same-stage update with nothing but a note.
    pub fn note(stage: Stage, status: BatchStatus, actor: Actor, timestamp: DateTime<Utc>, note: &str) -> Self {
        Self {
            stage,
            status,
            location: None,
            updated_by: actor,
            timestamp,
            notes: Some(note.to_string()),
            documents: Vec::new(),
            measurements: None,
            quality_check: None,
            processing_details: None,
            issues: Vec::new(),
            estimated_completion_date: None,
            previous_stage: None,
            next_stage: None,
            is_realtime_update: true,
        }
    }

    fn check_payload(&self) -> Result<(), ServiceError> {
        self.validate()?;
        for doc in &self.documents {
            doc.validate()?;
        }
        validate_actor(&self.updated_by)?;
        if let Some(score) = self.quality_check.as_ref().and_then(|c| c.score) {
            if score > 100 {
                return Err(ServiceError::ValidationError(
                    "quality check score must be between 0 and 100".into(),
                ));
            }
        }
        if self.issues.iter().any(|i| i.description.trim().is_empty()) {
            return Err(ServiceError::ValidationError(
                "issue reports need a description".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BatchFilter {
    pub farm_id: Option<Uuid>,
    pub stage: Option<Stage>,
    pub status: Option<BatchStatus>,
}

fn validate_actor(actor: &Actor) -> Result<(), ServiceError> {
    if actor.name.trim().is_empty() {
        return Err(ServiceError::ValidationError("actor name is required".into()));
    }
    Ok(())
}

fn conflict_or_store(err: DbErr, what: &str) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict(format!("{} already exists", what))
        }
        _ => ServiceError::StoreUnavailable(err),
    }
}

/// Writes `active` only if the stored version still equals `read_version`,
/// bumping it by one. Returns the row as written.
async fn commit_versioned<C: ConnectionTrait>(
    conn: &C,
    batch_id: Uuid,
    read_version: i32,
    mut active: batch::ActiveModel,
) -> Result<batch::Model, ServiceError> {
    active.version = Set(read_version + 1);
    active.updated_at = Set(Utc::now());

    let result = batch::Entity::update_many()
        .set(active)
        .filter(batch::Column::Id.eq(batch_id))
        .filter(batch::Column::Version.eq(read_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        counter!("woolchain.batch.version_conflicts", 1);
        warn!(%batch_id, read_version, "batch version advanced concurrently");
        return Err(ServiceError::ConcurrentModification(batch_id));
    }

    batch::Entity::find_by_id(batch_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Batch", batch_id))
}

fn write_projection(active: &mut batch::ActiveModel, projection: &BatchProjection) {
    active.current_stage = Set(projection.current_stage);
    active.status = Set(projection.status);
    active.current_location = Set(projection.current_location.clone());
    active.current_processor = Set(projection.current_processor.clone());
    active.timeline = Set(Timeline(projection.timeline.clone()));
    active.total_updates = Set(projection.total_updates);
    active.last_update_date = Set(projection.last_update_date);
    active.actual_completion_date = Set(projection.actual_completion_date);
    active.processing_duration = Set(projection.processing_duration);
}

/// Accepted events of one batch in (timestamp, sequence) order.
pub(crate) async fn load_history<C: ConnectionTrait>(
    conn: &C,
    batch_id: Uuid,
) -> Result<Vec<batch_update::Model>, DbErr> {
    batch_update::Entity::find()
        .filter(batch_update::Column::BatchId.eq(batch_id))
        .order_by_asc(batch_update::Column::Timestamp)
        .order_by_asc(batch_update::Column::Sequence)
        .all(conn)
        .await
}

#[derive(Clone)]
pub struct LifecycleService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl LifecycleService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a batch for an approved farm and records its genesis event.
    #[instrument(skip(self, input), fields(farm_id = %input.farm_id))]
    pub async fn create_batch(&self, input: CreateBatchInput) -> Result<batch::Model, ServiceError> {
        input.validate()?;
        validate_actor(&input.created_by)?;
        if !input.weight.value.is_finite() || input.weight.value <= 0.0 {
            return Err(ServiceError::ValidationError("weight must be positive".into()));
        }
        let now = Utc::now();
        if input.shearing_date > now {
            return Err(ServiceError::ValidationError(
                "shearing date cannot be in the future".into(),
            ));
        }
        if let Some(field) = input.quality_metrics.out_of_range_field() {
            return Err(ServiceError::ValidationError(format!(
                "quality metric '{}' is out of range",
                field
            )));
        }

        let txn = self.db.begin().await?;

        let farm = farm::Entity::find_by_id(input.farm_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Farm", input.farm_id))?;
        if !farm.can_originate_batches() {
            return Err(ServiceError::FarmNotApproved(farm.id));
        }

        let code = match input.batch_code.as_deref() {
            Some(raw) => {
                let code = normalize_batch_code(raw).ok_or_else(|| {
                    ServiceError::ValidationError(format!(
                        "batch code '{}' must look like WOOL-YYYYMMDD-NNN",
                        raw
                    ))
                })?;
                let taken = batch::Entity::find()
                    .filter(batch::Column::BatchCode.eq(code.as_str()))
                    .count(&txn)
                    .await?
                    > 0;
                if taken {
                    return Err(ServiceError::Conflict(format!("batch code {} already exists", code)));
                }
                code
            }
            None => next_batch_code(&txn, now).await?,
        };

        let batch_id = Uuid::new_v4();
        let origin = input
            .origin
            .clone()
            .unwrap_or_else(|| farm.location.as_origin(&farm.name));

        let genesis = batch_update::ActiveModel {
            id: Set(Uuid::new_v4()),
            batch_id: Set(batch_id),
            batch_code: Set(code.clone()),
            sequence: Set(1),
            stage: Set(Stage::Shearing),
            status: Set(BatchStatus::InProgress),
            flagged_stage: Set(None),
            location: Set(origin.clone()),
            updated_by: Set(input.created_by.clone()),
            timestamp: Set(input.shearing_date),
            notes: Set(Some("Batch registered".to_string())),
            documents: Set(Documents::default()),
            measurements: Set(None),
            quality_check: Set(None),
            processing_details: Set(None),
            issues: Set(QualityIssues::default()),
            estimated_completion_date: Set(input.estimated_completion_date),
            previous_stage: Set(None),
            next_stage: Set(Stage::Shearing.next()),
            is_realtime_update: Set(false),
            notifications_sent: Set(false),
            created_at: Set(now),
        };

        let mut projection = BatchProjection::new(input.shearing_date);
        projection.apply(EventFacts {
            stage: Stage::Shearing,
            status: BatchStatus::InProgress,
            location: &origin,
            actor: &input.created_by,
            timestamp: input.shearing_date,
        });

        let mut active = batch::ActiveModel {
            id: Set(batch_id),
            batch_code: Set(code.clone()),
            farm_id: Set(farm.id),
            farm_name: Set(farm.name.clone()),
            weight_value: Set(input.weight.value),
            weight_unit: Set(input.weight.unit),
            shearing_date: Set(input.shearing_date),
            quality_metrics: Set(input.quality_metrics.clone()),
            certifications: Set(Certifications(input.certifications.clone())),
            quality_issues: Set(QualityIssues::default()),
            documents: Set(Documents::default()),
            estimated_completion_date: Set(input.estimated_completion_date),
            revenue_estimate: Set(input.revenue_estimate.clone()),
            notes: Set(input.notes.clone()),
            is_publicly_visible: Set(input.is_publicly_visible.unwrap_or(true)),
            created_by: Set(input.created_by.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            version: Set(1),
            ..Default::default()
        };
        write_projection(&mut active, &projection);

        let created = active
            .insert(&txn)
            .await
            .map_err(|e| conflict_or_store(e, "batch code"))?;
        genesis.insert(&txn).await?;

        let kg = input.weight.in_kg();
        let last_batch_date = farm
            .last_batch_date
            .map_or(input.shearing_date, |d| d.max(input.shearing_date));
        let mut farm_active = farm.clone().into_active_model();
        farm_active.total_batches = Set(farm.total_batches + 1);
        farm_active.total_wool_produced = Set(farm.total_wool_produced + kg);
        farm_active.last_batch_date = Set(Some(last_batch_date));
        farm_active.updated_at = Set(now);
        farm_active.update(&txn).await?;

        txn.commit().await?;

        counter!("woolchain.batch.created", 1);
        info!(batch_id = %created.id, batch_code = %created.batch_code, weight_kg = kg, "batch registered");
        self.event_sender
            .emit(Event::BatchCreated(Box::new(created.clone())));

        Ok(created)
    }

    /// Validates and appends one event, then republishes the batch projection.
    #[instrument(skip(self, input), fields(stage = %input.stage, status = %input.status))]
    pub async fn apply_update(
        &self,
        batch_id: Uuid,
        expected_version: Option<i32>,
        input: BatchUpdateInput,
    ) -> Result<batch::Model, ServiceError> {
        input.check_payload()?;

        let txn = self.db.begin().await?;

        let batch = batch::Entity::find_by_id(batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;

        if let Some(expected) = expected_version {
            if expected != batch.version {
                counter!("woolchain.batch.version_conflicts", 1);
                return Err(ServiceError::ConcurrentModification(batch_id));
            }
        }

        let history = load_history(&txn, batch_id).await?;
        let mut projection =
            BatchProjection::replay(batch.shearing_date, history.iter().map(EventFacts::from));

        let admission = projection
            .admit(&Proposal {
                stage: input.stage,
                status: input.status,
                timestamp: input.timestamp,
                raises_issues: !input.issues.is_empty(),
            })
            .map_err(|e| {
                counter!("woolchain.batch.updates_rejected", 1);
                warn!(%batch_id, from = %projection.current_stage, to = %input.stage, error = %e, "update rejected");
                ServiceError::from(e)
            })?;

        let event_id = Uuid::new_v4();
        let actor = input.updated_by.clone();
        let location = input
            .location
            .clone()
            .unwrap_or_else(|| projection.current_location.clone());

        let new_issues: Vec<QualityIssue> = input
            .issues
            .iter()
            .map(|report| QualityIssue {
                id: Uuid::new_v4(),
                issue_type: report.issue_type,
                description: report.description.clone(),
                severity: report.severity,
                reported_by: Some(actor.user_id),
                reported_at: input.timestamp,
                source_update: Some(event_id),
                resolved: false,
                resolved_at: None,
                resolution: None,
            })
            .collect();

        let new_documents: Vec<Document> = input
            .documents
            .iter()
            .cloned()
            .map(|doc| doc.into_document(actor.user_id, input.timestamp))
            .collect();

        let event = batch_update::ActiveModel {
            id: Set(event_id),
            batch_id: Set(batch_id),
            batch_code: Set(batch.batch_code.clone()),
            sequence: Set(projection.total_updates + 1),
            stage: Set(admission.stage),
            status: Set(input.status),
            flagged_stage: Set(admission.flagged_stage),
            location: Set(location),
            updated_by: Set(actor),
            timestamp: Set(input.timestamp),
            notes: Set(input.notes.clone()),
            documents: Set(Documents(new_documents.clone())),
            measurements: Set(input.measurements.clone()),
            quality_check: Set(input.quality_check.clone()),
            processing_details: Set(input.processing_details.clone()),
            issues: Set(QualityIssues(new_issues.clone())),
            estimated_completion_date: Set(input.estimated_completion_date),
            previous_stage: Set(input.previous_stage.or(Some(projection.current_stage))),
            next_stage: Set(input.next_stage.or_else(|| admission.stage.next())),
            is_realtime_update: Set(input.is_realtime_update),
            notifications_sent: Set(false),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::ConcurrentModification(batch_id),
            _ => ServiceError::StoreUnavailable(e),
        })?;

        projection.apply(EventFacts::from(&event));

        let read_version = batch.version;
        let mut issues = batch.quality_issues.clone();
        issues.0.extend(new_issues);
        let mut documents = batch.documents.clone();
        documents.0.extend(new_documents);
        let estimated = input
            .estimated_completion_date
            .or(batch.estimated_completion_date);

        let mut active = batch.into_active_model();
        write_projection(&mut active, &projection);
        active.quality_issues = Set(issues);
        active.documents = Set(documents);
        active.estimated_completion_date = Set(estimated);

        let updated = commit_versioned(&txn, batch_id, read_version, active).await?;
        txn.commit().await?;

        counter!("woolchain.batch.updates_accepted", 1);
        info!(
            %batch_id,
            sequence = event.sequence,
            stage = %updated.current_stage,
            status = %updated.status,
            version = updated.version,
            "batch update accepted"
        );
        self.event_sender
            .emit(Event::BatchUpdated(Box::new(updated.clone())));

        Ok(updated)
    }

    /// Marks a quality issue resolved. Resolving twice is a no-op.
    #[instrument(skip(self, resolution))]
    pub async fn resolve_issue(
        &self,
        batch_id: Uuid,
        issue_id: Uuid,
        resolution: String,
        expected_version: Option<i32>,
    ) -> Result<batch::Model, ServiceError> {
        if resolution.trim().is_empty() {
            return Err(ServiceError::ValidationError("resolution is required".into()));
        }

        let txn = self.db.begin().await?;
        let batch = batch::Entity::find_by_id(batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;

        let position = batch
            .quality_issues
            .0
            .iter()
            .position(|issue| issue.id == issue_id)
            .ok_or_else(|| ServiceError::not_found("Quality issue", issue_id))?;

        if batch.quality_issues.0[position].resolved {
            return Ok(batch);
        }

        if let Some(expected) = expected_version {
            if expected != batch.version {
                return Err(ServiceError::ConcurrentModification(batch_id));
            }
        }

        let read_version = batch.version;
        let mut issues = batch.quality_issues.clone();
        let issue = &mut issues.0[position];
        issue.resolved = true;
        issue.resolved_at = Some(Utc::now());
        issue.resolution = Some(resolution);

        let mut active = batch.into_active_model();
        active.quality_issues = Set(issues);
        let updated = commit_versioned(&txn, batch_id, read_version, active).await?;
        txn.commit().await?;

        counter!("woolchain.batch.issues_resolved", 1);
        info!(%batch_id, %issue_id, "quality issue resolved");
        self.event_sender
            .emit(Event::BatchUpdated(Box::new(updated.clone())));

        Ok(updated)
    }

    /// Attaches a document reference; allowed on completed batches.
    #[instrument(skip(self, document))]
    pub async fn attach_document(
        &self,
        batch_id: Uuid,
        document: DocumentInput,
        uploaded_by: Uuid,
        expected_version: Option<i32>,
    ) -> Result<batch::Model, ServiceError> {
        document.validate()?;

        let txn = self.db.begin().await?;
        let batch = batch::Entity::find_by_id(batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;
        if let Some(expected) = expected_version {
            if expected != batch.version {
                return Err(ServiceError::ConcurrentModification(batch_id));
            }
        }

        let read_version = batch.version;
        let mut documents = batch.documents.clone();
        documents.0.push(document.into_document(uploaded_by, Utc::now()));

        let mut active = batch.into_active_model();
        active.documents = Set(documents);
        let updated = commit_versioned(&txn, batch_id, read_version, active).await?;
        txn.commit().await?;

        self.event_sender
            .emit(Event::BatchUpdated(Box::new(updated.clone())));
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn set_public_visibility(
        &self,
        batch_id: Uuid,
        visible: bool,
    ) -> Result<batch::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let batch = batch::Entity::find_by_id(batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;
        if batch.is_publicly_visible == visible {
            return Ok(batch);
        }

        let read_version = batch.version;
        let mut active = batch.into_active_model();
        active.is_publicly_visible = Set(visible);
        let updated = commit_versioned(&txn, batch_id, read_version, active).await?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Removes a batch with its event log and rolls back farm statistics.
    #[instrument(skip(self))]
    pub async fn delete_batch(&self, batch_id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db.begin().await?;
        let batch = batch::Entity::find_by_id(batch_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))?;

        batch_update::Entity::delete_many()
            .filter(batch_update::Column::BatchId.eq(batch_id))
            .exec(&txn)
            .await?;
        batch::Entity::delete_by_id(batch_id).exec(&txn).await?;

        if let Some(farm) = farm::Entity::find_by_id(batch.farm_id).one(&txn).await? {
            let remaining_kg = (farm.total_wool_produced - batch.weight_in_kg()).max(0.0);
            let remaining_batches = (farm.total_batches - 1).max(0);
            let mut farm_active = farm.into_active_model();
            farm_active.total_batches = Set(remaining_batches);
            farm_active.total_wool_produced = Set(remaining_kg);
            farm_active.updated_at = Set(Utc::now());
            farm_active.update(&txn).await?;
        }

        txn.commit().await?;

        counter!("woolchain.batch.deleted", 1);
        info!(%batch_id, batch_code = %batch.batch_code, "batch deleted");
        self.event_sender.emit(Event::BatchDeleted {
            batch_id,
            batch_code: batch.batch_code,
        });
        Ok(())
    }

    pub async fn get_batch(&self, batch_id: Uuid) -> Result<batch::Model, ServiceError> {
        batch::Entity::find_by_id(batch_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", batch_id))
    }

    pub async fn get_batch_by_code(&self, code: &str) -> Result<batch::Model, ServiceError> {
        let code = code.trim().to_ascii_uppercase();
        batch::Entity::find()
            .filter(batch::Column::BatchCode.eq(code.as_str()))
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Batch", code))
    }

    pub async fn has_active_quality_issues(&self, batch_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.get_batch(batch_id).await?.has_active_quality_issues())
    }

    /// Newest first; `page` is 1-based.
    pub async fn list_batches(
        &self,
        filter: &BatchFilter,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<batch::Model>, u64), ServiceError> {
        let mut query = batch::Entity::find();
        if let Some(farm_id) = filter.farm_id {
            query = query.filter(batch::Column::FarmId.eq(farm_id));
        }
        if let Some(stage) = filter.stage {
            query = query.filter(batch::Column::CurrentStage.eq(stage));
        }
        if let Some(status) = filter.status {
            query = query.filter(batch::Column::Status.eq(status));
        }

        let paginator = query
            .order_by_desc(batch::Column::CreatedAt)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((items, total))
    }
}

async fn next_batch_code<C: ConnectionTrait>(conn: &C, now: DateTime<Utc>) -> Result<String, ServiceError> {
    let day = now.date_naive();
    let prefix = batch_code_prefix(day);
    let existing = batch::Entity::find()
        .filter(batch::Column::BatchCode.starts_with(prefix.as_str()))
        .count(conn)
        .await? as u32;

    for sequence in (existing + 1)..=MAX_DAILY_SEQUENCE {
        let candidate = batch_code(day, sequence);
        let taken = batch::Entity::find()
            .filter(batch::Column::BatchCode.eq(candidate.as_str()))
            .count(conn)
            .await?
            > 0;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(ServiceError::Conflict(format!(
        "no batch codes left for {}",
        prefix.trim_end_matches('-')
    )))
}
