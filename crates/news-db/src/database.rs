use std::path::Path;

use news_core::AppError;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::category_repository::CategoryRepository;
use crate::config::DatabaseConfig;

/// Migrations compiled into the binary from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        MIGRATOR
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Bring the schema to `target` (latest when `None`).
    ///
    /// Migrations come from `dir` when given, otherwise from the embedded set.
    /// Applied versions above the target are reverted first, which requires
    /// reversible (`.up.sql` / `.down.sql`) migrations.
    pub async fn migrate_to(&self, dir: Option<&Path>, target: Option<i64>) -> Result<(), AppError> {
        let mut migrator = match dir {
            Some(dir) => Migrator::new(dir).await.map_err(|e| {
                AppError::ConfigError(format!(
                    "Failed to load migrations from {}: {e}",
                    dir.display()
                ))
            })?,
            None => Migrator {
                migrations: MIGRATOR.migrations.clone(),
                ..Migrator::DEFAULT
            },
        };

        let latest = migrator.iter().map(|m| m.version).max().unwrap_or(0);
        let target = match target {
            Some(version) if version <= 0 => {
                return Err(AppError::ConfigError(format!(
                    "Invalid migration version {version}: must be positive"
                )));
            }
            Some(version) if version > latest => {
                return Err(AppError::ConfigError(format!(
                    "Unknown migration version {version}: latest is {latest}"
                )));
            }
            Some(version) => version,
            None => latest,
        };

        tracing::info!(target_version = target, latest, "Applying migrations");

        migrator
            .undo(&self.pool, target)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration revert failed: {e}")))?;

        let pending: Vec<_> = migrator
            .iter()
            .filter(|m| m.version <= target)
            .cloned()
            .collect();
        migrator.migrations = pending.into();
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;

        Ok(())
    }

    /// Get a [`CategoryRepository`] backed by this pool.
    pub fn category_repo(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
