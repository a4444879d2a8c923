use std::sync::RwLock;

use async_trait::async_trait;

use super::{model::User, repo::UserRepository};

/// Vec-backed repository with the same lookup rules as the Postgres one.
#[derive(Default)]
pub struct InMemoryUserRepository {
    rows: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row, assigning the next id. Rejects duplicate emails like the
    /// unique constraint does.
    pub fn insert(&self, mut user: User) -> anyhow::Result<User> {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        if rows.iter().any(|u| u.email == user.email) {
            anyhow::bail!("duplicate email {}", user.email);
        }
        user.id = rows.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        rows.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_active_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        Ok(rows
            .iter()
            .find(|u| u.email == email && u.is_active())
            .cloned())
    }
}

/// Repository whose every call fails, standing in for an unreachable database.
pub struct UnavailableUserRepository;

#[async_trait]
impl UserRepository for UnavailableUserRepository {
    async fn find_active_by_email(&self, _email: &str) -> anyhow::Result<Option<User>> {
        anyhow::bail!("database unavailable")
    }
}

pub(crate) fn user_row(email: &str, password_hash: &str, status: &str) -> User {
    User {
        id: 0,
        full_name: "Test Reader".into(),
        email: email.into(),
        password: password_hash.into(),
        phone: Some("0123456789".into()),
        address: Some("1 Library Lane".into()),
        role: Some("CUSTOMER".into()),
        status: Some(status.into()),
        created_at: Some(time::macros::datetime!(2024-01-01 0:00 UTC)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_active_user_by_exact_email() {
        let repo = InMemoryUserRepository::new();
        let stored = repo.insert(user_row("a@b.co", "h", "ACTIVE")).unwrap();

        let found = repo.find_active_by_email("a@b.co").await.unwrap();
        assert_eq!(found, Some(stored));
        assert!(repo.find_active_by_email("A@B.CO").await.unwrap().is_none());
        assert!(repo.find_active_by_email("nobody@b.co").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn skips_inactive_users() {
        let repo = InMemoryUserRepository::new();
        repo.insert(user_row("locked@b.co", "h", "LOCKED")).unwrap();
        assert!(repo.find_active_by_email("locked@b.co").await.unwrap().is_none());
    }

    #[test]
    fn insert_assigns_ids_and_rejects_duplicates() {
        let repo = InMemoryUserRepository::new();
        let first = repo.insert(user_row("one@b.co", "h", "ACTIVE")).unwrap();
        let second = repo.insert(user_row("two@b.co", "h", "ACTIVE")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(repo.insert(user_row("one@b.co", "h", "ACTIVE")).is_err());
    }

    #[tokio::test]
    async fn unavailable_repository_errors() {
        let err = UnavailableUserRepository
            .find_active_by_email("a@b.co")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unavailable"));
    }
}
