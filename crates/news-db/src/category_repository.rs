use news_core::error::AppError;
use news_core::models::{Category, Page};
use news_core::traits::{
    CategoryAsserter, CategoryDiscarder, CategoryGetter, CategoryLister, CategoryStorer,
    CategoryUpdater, HealthCheck,
};
use sqlx::{PgPool, Pool, Postgres, Transaction};
use uuid::Uuid;

/// Repository for category persistence in PostgreSQL.
///
/// Every operation runs inside its own transaction, committed on success and
/// rolled back on any error.
#[derive(Clone)]
pub struct CategoryRepository {
    pool: Pool<Postgres>,
}

impl CategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new category row.
    pub async fn store(&self, category: &Category) -> Result<(), AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO category (category_id, name, title)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(category.category_id)
        .bind(&category.name)
        .bind(&category.title)
        .execute(&mut *tx)
        .await
        .map(|_| ())
        .map_err(map_write_error);

        finish(tx, result).await
    }

    /// Load a category by identifier.
    pub async fn get_by_id(&self, id: Uuid) -> Result<Category, AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category_id, name, title
            FROM category
            WHERE category_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))
        .and_then(|row| row.map(Category::from).ok_or(AppError::CategoryNotFound(id)));

        finish(tx, result).await
    }

    /// Load one page of categories ordered by name, then identifier.
    pub async fn list(&self, page: Page) -> Result<Vec<Category>, AppError> {
        let (limit, offset) = page_bounds(page)?;
        let mut tx = self.begin().await?;
        let result = sqlx::query_as::<_, CategoryRow>(
            r#"
            SELECT category_id, name, title
            FROM category
            ORDER BY name, category_id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await
        .map(|rows| rows.into_iter().map(Category::from).collect::<Vec<_>>())
        .map_err(|e| AppError::DatabaseError(e.to_string()));

        finish(tx, result).await
    }

    /// Count every category row.
    pub async fn count(&self) -> Result<u64, AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM category")
            .fetch_one(&mut *tx)
            .await
            .map(|count| count.max(0) as u64)
            .map_err(|e| AppError::DatabaseError(e.to_string()));

        finish(tx, result).await
    }

    /// Overwrite `name` and `title` of an existing row.
    pub async fn update(&self, category: &Category) -> Result<(), AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE category
            SET name = $2, title = $3
            WHERE category_id = $1
            "#,
        )
        .bind(category.category_id)
        .bind(&category.name)
        .bind(&category.title)
        .execute(&mut *tx)
        .await
        .map_err(map_write_error)
        .and_then(|done| expect_row(done.rows_affected(), category.category_id));

        finish(tx, result).await
    }

    /// Hard-delete a row.
    pub async fn discard(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query("DELETE FROM category WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
            .and_then(|done| expect_row(done.rows_affected(), id));

        finish(tx, result).await
    }

    /// Check whether a row exists.
    pub async fn exists(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tx = self.begin().await?;
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM category WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()));

        finish(tx, result).await
    }

    /// Check database connectivity.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        self.pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {e}")))
    }
}

/// Commit on success, roll back on error.
///
/// A failed rollback leaves the connection in an unknown state and is
/// escalated as [`AppError::TransactionAborted`].
async fn finish<T>(
    tx: Transaction<'static, Postgres>,
    result: Result<T, AppError>,
) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            tx.commit()
                .await
                .map_err(|e| AppError::DatabaseError(format!("Failed to commit: {e}")))?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    error = %rollback_err,
                    cause = %err,
                    "Transaction rollback failed"
                );
                return Err(AppError::TransactionAborted(format!(
                    "rollback failed: {rollback_err} (after: {err})"
                )));
            }
            Err(err)
        }
    }
}

fn expect_row(rows_affected: u64, id: Uuid) -> Result<(), AppError> {
    if rows_affected == 0 {
        Err(AppError::CategoryNotFound(id))
    } else {
        Ok(())
    }
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => AppError::invalid_input(
            "category_id",
            "A category with this identifier already exists.",
        ),
        _ => AppError::DatabaseError(err.to_string()),
    }
}

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct CategoryRow {
    category_id: Uuid,
    name: String,
    title: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            category_id: row.category_id,
            name: row.name,
            title: row.title,
        }
    }
}

// -- Trait implementations --

impl CategoryGetter for CategoryRepository {
    async fn get_category_by_id(&self, id: Uuid) -> Result<Category, AppError> {
        CategoryRepository::get_by_id(self, id).await
    }
}

impl CategoryLister for CategoryRepository {
    async fn list_categories(&self, page: Page) -> Result<Vec<Category>, AppError> {
        CategoryRepository::list(self, page).await
    }

    async fn count_categories(&self) -> Result<u64, AppError> {
        CategoryRepository::count(self).await
    }
}

impl CategoryStorer for CategoryRepository {
    async fn store(&self, category: &Category) -> Result<(), AppError> {
        CategoryRepository::store(self, category).await
    }
}

impl CategoryUpdater for CategoryRepository {
    async fn update(&self, category: &Category) -> Result<(), AppError> {
        CategoryRepository::update(self, category).await
    }
}

impl CategoryDiscarder for CategoryRepository {
    async fn discard(&self, id: Uuid) -> Result<(), AppError> {
        CategoryRepository::discard(self, id).await
    }
}

impl CategoryAsserter for CategoryRepository {
    async fn assert_exists(&self, id: Uuid) -> Result<bool, AppError> {
        CategoryRepository::exists(self, id).await
    }
}

impl HealthCheck for CategoryRepository {
    async fn health_check(&self) -> Result<(), AppError> {
        CategoryRepository::health_check(self).await
    }
}

/// `LIMIT` and `OFFSET` as the BIGINTs Postgres expects.
fn page_bounds(page: Page) -> Result<(i64, i64), AppError> {
    let limit = i64::try_from(page.top)
        .map_err(|_| AppError::invalid_input("$top", "Invalid $top query parameter"))?;
    let offset = i64::try_from(page.skip)
        .map_err(|_| AppError::invalid_input("$skip", "Invalid $skip query parameter"))?;
    Ok((limit, offset))
}
