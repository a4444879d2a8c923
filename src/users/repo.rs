use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::model::{User, STATUS_ACTIVE};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// The active user registered under exactly this email, if any.
    async fn find_active_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_active_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        // One connection per lookup, handed back to the pool on drop.
        let mut conn = self.pool.acquire().await.context("acquire connection")?;
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, email, password, phone, address, role, status, created_at
            FROM users
            WHERE email = $1 AND status = $2
            "#,
        )
        .bind(email)
        .bind(STATUS_ACTIVE)
        .fetch_optional(&mut *conn)
        .await
        .context("find active user by email")?;
        Ok(user)
    }
}
