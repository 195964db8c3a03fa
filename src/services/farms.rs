use chrono::{Datelike, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{farm, user};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::models::codes::farm_code;
use crate::models::{ApprovalStatus, FarmCertification, FarmCertifications, FarmContact, FarmLocation, UserRole};

const MAX_YEARLY_SEQUENCE: u32 = 9999;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterFarmInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub owner_id: Uuid,
    pub location: FarmLocation,
    #[serde(default)]
    pub contact: FarmContact,
    #[serde(default)]
    pub certifications: Vec<FarmCertification>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub sheep_count: i32,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateFarmInput {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub location: Option<FarmLocation>,
    pub contact: Option<FarmContact>,
    pub certifications: Option<Vec<FarmCertification>>,
    #[validate(range(min = 0))]
    pub sheep_count: Option<i32>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Clone)]
pub struct FarmService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl FarmService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a farm in `Pending` approval with a generated `FARM-YYYY-NNNN` code.
    #[instrument(skip(self, input), fields(owner_id = %input.owner_id))]
    pub async fn register_farm(&self, input: RegisterFarmInput) -> Result<farm::Model, ServiceError> {
        input.validate()?;

        let owner = user::Entity::find_by_id(input.owner_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", input.owner_id))?;
        if !matches!(owner.role, UserRole::Farmer | UserRole::Admin) {
            return Err(ServiceError::ValidationError(format!(
                "a {} cannot own a farm",
                owner.role
            )));
        }

        let now = Utc::now();
        let code = next_farm_code(&*self.db, now.year()).await?;

        let created = farm::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            farm_code: Set(code),
            owner_id: Set(owner.id),
            location: Set(input.location),
            contact: Set(input.contact),
            certifications: Set(FarmCertifications(input.certifications)),
            sheep_count: Set(input.sheep_count),
            description: Set(input.description),
            approval_status: Set(ApprovalStatus::Pending),
            approved_by: Set(None),
            approved_at: Set(None),
            rejection_reason: Set(None),
            is_active: Set(true),
            total_batches: Set(0),
            total_wool_produced: Set(0.0),
            last_batch_date: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict("farm code already issued, retry registration".into())
            }
            _ => ServiceError::StoreUnavailable(e),
        })?;

        info!(farm_id = %created.id, farm_code = %created.farm_code, "farm registered");
        Ok(created)
    }

    pub async fn get_farm(&self, farm_id: Uuid) -> Result<farm::Model, ServiceError> {
        farm::Entity::find_by_id(farm_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Farm", farm_id))
    }

    pub async fn list_farms(
        &self,
        status: Option<ApprovalStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<farm::Model>, u64), ServiceError> {
        let mut query = farm::Entity::find();
        if let Some(status) = status {
            query = query.filter(farm::Column::ApprovalStatus.eq(status));
        }
        let paginator = query
            .order_by_asc(farm::Column::Name)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let farms = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((farms, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_farm(&self, farm_id: Uuid, input: UpdateFarmInput) -> Result<farm::Model, ServiceError> {
        input.validate()?;
        let farm = self.get_farm(farm_id).await?;

        let mut active = farm.into_active_model();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(contact) = input.contact {
            active.contact = Set(contact);
        }
        if let Some(certifications) = input.certifications {
            active.certifications = Set(FarmCertifications(certifications));
        }
        if let Some(sheep_count) = input.sheep_count {
            active.sheep_count = Set(sheep_count);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&*self.db).await?)
    }

    /// Admin-only approval decision. Rejections need a reason.
    #[instrument(skip(self, reason))]
    pub async fn set_approval_status(
        &self,
        actor_id: Uuid,
        farm_id: Uuid,
        status: ApprovalStatus,
        reason: Option<String>,
    ) -> Result<farm::Model, ServiceError> {
        let actor = user::Entity::find_by_id(actor_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", actor_id))?;
        if actor.role != UserRole::Admin || !actor.is_active {
            warn!(%actor_id, role = %actor.role, "non-admin attempted farm approval change");
            return Err(ServiceError::Forbidden(
                "only administrators can change farm approval".into(),
            ));
        }

        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        if status == ApprovalStatus::Rejected && reason.is_none() {
            return Err(ServiceError::ValidationError(
                "a rejection reason is required".into(),
            ));
        }

        let farm = self.get_farm(farm_id).await?;
        let now = Utc::now();
        let mut active = farm.into_active_model();
        active.approval_status = Set(status);
        match status {
            ApprovalStatus::Approved => {
                active.approved_by = Set(Some(actor_id));
                active.approved_at = Set(Some(now));
                active.rejection_reason = Set(None);
            }
            ApprovalStatus::Rejected | ApprovalStatus::Suspended => {
                active.rejection_reason = Set(reason);
            }
            ApprovalStatus::Pending => {}
        }
        active.updated_at = Set(now);
        let updated = active.update(&*self.db).await?;

        info!(%farm_id, %status, "farm approval changed");
        self.event_sender
            .emit(Event::FarmApprovalChanged { farm_id, status });
        Ok(updated)
    }

    pub async fn has_valid_organic_certification(&self, farm_id: Uuid) -> Result<bool, ServiceError> {
        Ok(self
            .get_farm(farm_id)
            .await?
            .has_valid_organic_certification(Utc::now()))
    }
}

async fn next_farm_code<C: ConnectionTrait>(conn: &C, year: i32) -> Result<String, ServiceError> {
    let prefix = format!("FARM-{}-", year);
    let existing = farm::Entity::find()
        .filter(farm::Column::FarmCode.starts_with(prefix.as_str()))
        .count(conn)
        .await? as u32;

    for sequence in (existing + 1)..=MAX_YEARLY_SEQUENCE {
        let candidate = farm_code(year, sequence);
        let taken = farm::Entity::find()
            .filter(farm::Column::FarmCode.eq(candidate.as_str()))
            .count(conn)
            .await?
            > 0;
        if !taken {
            return Ok(candidate);
        }
    }

    Err(ServiceError::Conflict(format!("no farm codes left for {}", year)))
}
