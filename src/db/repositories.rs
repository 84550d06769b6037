//! Repository: users, starthubs and their categories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{Role, StartHub, StartHubFields, User};

/// Storage operations used by the handlers.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fails with [`AppError::Conflict`] when the email is taken.
    async fn user_create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User>;

    async fn user_find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Newest first.
    async fn starthubs_list(&self) -> AppResult<Vec<StartHub>>;

    /// Case-insensitive substring match on name.
    async fn starthubs_search_by_name(&self, term: &str) -> AppResult<Vec<StartHub>>;

    async fn starthub_get_by_id(&self, id: Uuid) -> AppResult<Option<StartHub>>;

    /// Inserts the row and links every category in one transaction.
    async fn starthub_create(
        &self,
        owner_id: Uuid,
        fields: &StartHubFields,
        categories: &[String],
    ) -> AppResult<StartHub>;

    /// `None` when the row is missing or not owned by `owner_id`.
    async fn starthub_update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: &StartHubFields,
    ) -> AppResult<Option<StartHub>>;

    /// `false` when the row is missing or not owned by `owner_id`.
    async fn starthub_delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool>;
}

/// Escapes `LIKE` metacharacters so the term matches literally.
pub fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

const STARTHUB_SELECT: &str = r#"
    SELECT s.id, s.name, s.description, s.location, s.team_size, s.url, s.email,
           s.join_date, s.image_url, s.created_by,
           COALESCE(
               array_agg(c.name::text ORDER BY c.name) FILTER (WHERE c.name IS NOT NULL),
               '{}'
           )::text[] AS categories
    FROM starthubs s
    LEFT JOIN starthub_categories sc ON sc.starthub_id = s.id
    LEFT JOIN categories c ON c.id = sc.category_id
"#;

/// PostgreSQL-backed [`Repository`].
#[derive(Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn user_create(&self, email: &str, password_hash: &str, role: Role) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            e => AppError::Db(e),
        })
    }

    async fn user_find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn starthubs_list(&self) -> AppResult<Vec<StartHub>> {
        let sql = format!("{STARTHUB_SELECT} GROUP BY s.id ORDER BY s.join_date DESC");
        let rows = sqlx::query_as::<_, StartHub>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn starthubs_search_by_name(&self, term: &str) -> AppResult<Vec<StartHub>> {
        let sql = format!(
            "{STARTHUB_SELECT} WHERE s.name ILIKE $1 GROUP BY s.id ORDER BY s.join_date DESC"
        );
        let rows = sqlx::query_as::<_, StartHub>(&sql)
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await?;
        debug!(term = %term, found = rows.len(), "starthub search");
        Ok(rows)
    }

    async fn starthub_get_by_id(&self, id: Uuid) -> AppResult<Option<StartHub>> {
        let sql = format!("{STARTHUB_SELECT} WHERE s.id = $1 GROUP BY s.id");
        let row = sqlx::query_as::<_, StartHub>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn starthub_create(
        &self,
        owner_id: Uuid,
        fields: &StartHubFields,
        categories: &[String],
    ) -> AppResult<StartHub> {
        // Dropping `tx` without commit rolls everything back.
        let mut tx = self.pool.begin().await?;

        let (id, join_date): (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO starthubs (name, description, location, team_size, url, email, image_url, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, join_date
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.team_size)
        .bind(&fields.url)
        .bind(&fields.email)
        .bind(&fields.image_url)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        let mut linked: Vec<String> = Vec::with_capacity(categories.len());
        for name in categories.iter().filter(|n| !n.trim().is_empty()) {
            let (category_id,): (i32,) = sqlx::query_as(
                r#"
                INSERT INTO categories (name)
                VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO starthub_categories (starthub_id, category_id)
                VALUES ($1, $2)
                ON CONFLICT (starthub_id, category_id) DO NOTHING
                "#,
            )
            .bind(id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;

            if !linked.contains(name) {
                linked.push(name.clone());
            }
        }

        tx.commit().await?;
        info!(starthub_id = %id, owner_id = %owner_id, categories = linked.len(), "starthub created");

        Ok(StartHub {
            id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            location: fields.location.clone(),
            team_size: fields.team_size,
            url: fields.url.clone(),
            email: fields.email.clone(),
            join_date,
            image_url: fields.image_url.clone(),
            categories: linked,
            created_by: owner_id,
        })
    }

    async fn starthub_update(
        &self,
        id: Uuid,
        owner_id: Uuid,
        fields: &StartHubFields,
    ) -> AppResult<Option<StartHub>> {
        let r = sqlx::query(
            r#"
            UPDATE starthubs
            SET name = $1, description = $2, location = $3, team_size = $4, url = $5, email = $6
            WHERE id = $7 AND created_by = $8
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.location)
        .bind(fields.team_size)
        .bind(&fields.url)
        .bind(&fields.email)
        .bind(id)
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        if r.rows_affected() == 0 {
            return Ok(None);
        }
        self.starthub_get_by_id(id).await
    }

    async fn starthub_delete(&self, id: Uuid, owner_id: Uuid) -> AppResult<bool> {
        let r = sqlx::query("DELETE FROM starthubs WHERE id = $1 AND created_by = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(r.rows_affected() > 0)
    }
}
