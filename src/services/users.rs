use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{farm, user};
use crate::errors::ServiceError;
use crate::models::UserRole;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUserInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    pub role: UserRole,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    /// Only farmers may reference a farm.
    pub farm_id: Option<Uuid>,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(format!("failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ServiceError::HashError(format!("stored hash is malformed: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

#[derive(Clone)]
pub struct UserService {
    db: Arc<DbPool>,
}

impl UserService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input), fields(role = %input.role))]
    pub async fn register_user(&self, input: RegisterUserInput) -> Result<user::Model, ServiceError> {
        input.validate()?;
        let email = normalize_email(&input.email);

        if input.farm_id.is_some() && input.role != UserRole::Farmer {
            return Err(ServiceError::ValidationError(
                "only farmers can be linked to a farm".into(),
            ));
        }
        if let Some(farm_id) = input.farm_id {
            farm::Entity::find_by_id(farm_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::not_found("Farm", farm_id))?;
        }

        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .count(&*self.db)
            .await?
            > 0;
        if taken {
            return Err(ServiceError::Conflict(format!("email {} is already registered", email)));
        }

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();
        let created = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(input.role),
            phone: Set(input.phone),
            farm_id: Set(input.farm_id),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict(format!("email {} is already registered", email))
            }
            _ => ServiceError::StoreUnavailable(e),
        })?;

        info!(user_id = %created.id, "user registered");
        Ok(created)
    }

    /// Checks credentials and records the login time. Unknown, inactive and
    /// mismatched accounts all yield `Ok(None)`.
    #[instrument(skip(self, password))]
    pub async fn verify_credentials(&self, email: &str, password: &str) -> Result<Option<user::Model>, ServiceError> {
        let email = normalize_email(email);
        let Some(user) = user::Entity::find()
            .filter(user::Column::Email.eq(email.as_str()))
            .one(&*self.db)
            .await?
        else {
            return Ok(None);
        };

        if !user.is_active || !verify_password(password, &user.password_hash)? {
            warn!(user_id = %user.id, "credential check failed");
            return Ok(None);
        }

        let mut active = user.into_active_model();
        active.last_login = Set(Some(Utc::now()));
        Ok(Some(active.update(&*self.db).await?))
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        user::Entity::find_by_id(user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))
    }

    pub async fn list_users(
        &self,
        role: Option<UserRole>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<user::Model>, u64), ServiceError> {
        let mut query = user::Entity::find();
        if let Some(role) = role {
            query = query.filter(user::Column::Role.eq(role));
        }
        let paginator = query
            .order_by_asc(user::Column::Email)
            .paginate(&*self.db, per_page.max(1));
        let total = paginator.num_items().await?;
        let users = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((users, total))
    }

    /// Changing away from Farmer drops the farm link.
    #[instrument(skip(self))]
    pub async fn change_role(&self, user_id: Uuid, role: UserRole) -> Result<user::Model, ServiceError> {
        let user = self.get_user(user_id).await?;
        let keep_farm = role == UserRole::Farmer;
        let farm_id = user.farm_id.filter(|_| keep_farm);

        let mut active = user.into_active_model();
        active.role = Set(role);
        active.farm_id = Set(farm_id);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, user_id: Uuid) -> Result<user::Model, ServiceError> {
        let user = self.get_user(user_id).await?;
        if !user.is_active {
            return Ok(user);
        }
        let mut active = user.into_active_model();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now());
        let updated = active.update(&*self.db).await?;
        info!(%user_id, "user deactivated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash_password("correct horse").unwrap();
        let second = hash_password("correct horse").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("correct horse", &first).unwrap());
        assert!(!verify_password("battery staple", &first).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert_matches!(verify_password("x", "plaintext"), Err(ServiceError::HashError(_)));
    }
}
