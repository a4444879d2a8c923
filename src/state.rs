use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::AppConfig;
use crate::session::SessionStore;
use crate::users::{PgUserRepository, UserRepository};
use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<SessionStore>,
    pub views: Arc<Views>,
}

impl AppState {
    /// Builds the state from an already opened pool.
    pub fn init(config: &AppConfig, pool: sqlx::PgPool) -> anyhow::Result<Self> {
        let users = Arc::new(PgUserRepository::new(pool)) as Arc<dyn UserRepository>;
        let sessions = Arc::new(SessionStore::new(config.session.clone()));
        let views = Arc::new(Views::new()?);
        Ok(Self::from_parts(users, sessions, views))
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        sessions: Arc<SessionStore>,
        views: Arc<Views>,
    ) -> Self {
        Self {
            users,
            sessions,
            views,
        }
    }

    #[cfg(test)]
    pub fn fake(users: Arc<dyn UserRepository>) -> Self {
        let sessions = Arc::new(SessionStore::new(crate::config::SessionConfig {
            cookie_name: "TEST_SESSION".into(),
            ttl_minutes: 5,
            secure_cookie: false,
        }));
        let views = Arc::new(Views::new().expect("templates compile"));
        Self::from_parts(users, sessions, views)
    }
}

impl FromRef<AppState> for Arc<SessionStore> {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}
