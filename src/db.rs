use crate::config::AppConfig;
use crate::errors::AppError;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

pub type DbPool = DatabaseConnection;

/// Pool options for the woolchain store, tuned from `AppConfig`.
pub fn connect_options(cfg: &AppConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.database_url.clone());
    opt.max_connections(cfg.db_max_connections)
        .min_connections(cfg.db_min_connections)
        .connect_timeout(Duration::from_secs(cfg.db_connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.db_acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.db_idle_timeout_secs))
        .sqlx_logging(false);
    opt
}

pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, AppError> {
    gauge!("woolchain_db.max_connections", cfg.db_max_connections as f64);
    debug!(
        max = cfg.db_max_connections,
        min = cfg.db_min_connections,
        "opening woolchain store pool"
    );

    let pool = Database::connect(connect_options(cfg)).await.map_err(|e| {
        counter!("woolchain_db.connection_failures", 1);
        error!(error = %e, "woolchain store unreachable");
        AppError::StoreUnavailable(e)
    })?;

    info!(environment = %cfg.environment, "woolchain store pool ready");
    Ok(pool)
}

/// Applies pending schema migrations from `crate::migrator`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    info!("applying woolchain schema migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(AppError::StoreUnavailable);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(?elapsed, "schema up to date"),
        Err(e) => error!(?elapsed, error = %e, "schema migration failed"),
    }

    result
}

/// Round-trips a ping; feeds the `/health` database check.
pub async fn check_connection(pool: &DbPool) -> Result<(), AppError> {
    let start = std::time::Instant::now();
    let result = pool.ping().await.map_err(AppError::StoreUnavailable);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!(?elapsed, "store ping ok");
            gauge!("woolchain_db.connection_latency", elapsed.as_millis() as f64);
        }
        Err(e) => {
            error!(?elapsed, error = %e, "store ping failed");
            counter!("woolchain_db.connection_failures", 1);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_config() -> AppConfig {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.db_acquire_timeout_secs = 3;
        cfg
    }

    #[test]
    fn pool_options_follow_config() {
        let opt = connect_options(&sqlite_config());
        assert_eq!(opt.get_url(), "sqlite::memory:");
        assert_eq!(opt.get_max_connections(), Some(1));
        assert_eq!(opt.get_min_connections(), Some(1));
        assert_eq!(opt.get_acquire_timeout(), Some(Duration::from_secs(3)));
    }

    #[tokio::test]
    async fn migrated_store_answers_pings() {
        let pool = establish_connection_from_app_config(&sqlite_config()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        assert!(check_connection(&pool).await.is_ok());
    }
}
