use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    config::{SessionConfig, MAX_SESSION_TTL_MINUTES},
    users::User,
};

/// Server-side state of one browser session.
#[derive(Debug, Clone)]
pub struct WebSession {
    pub id: Uuid,
    pub login_user: Option<User>,
    pub expires_at: OffsetDateTime,
}

impl WebSession {
    fn new(ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            login_user: None,
            expires_at: OffsetDateTime::now_utc().saturating_add(ttl),
        }
    }

    fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// In-memory session table. Expired sessions read as absent; they are
/// physically dropped on lookup, on `cleanup`, or once the table outgrows
/// `CLEANUP_THRESHOLD`.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, WebSession>>,
    ttl: Duration,
    cookie: SessionConfig,
}

impl SessionStore {
    const CLEANUP_THRESHOLD: usize = 10_000;

    pub fn new(cookie: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::minutes(cookie.ttl_minutes.clamp(1, MAX_SESSION_TTL_MINUTES)),
            cookie,
        }
    }

    fn insert(sessions: &mut HashMap<Uuid, WebSession>, session: WebSession) {
        if sessions.len() >= Self::CLEANUP_THRESHOLD {
            let now = OffsetDateTime::now_utc();
            sessions.retain(|_, s| s.is_live(now));
        }
        debug!(session_id = %session.id, "session created");
        sessions.insert(session.id, session);
    }

    pub fn get(&self, id: Uuid) -> Option<WebSession> {
        let now = OffsetDateTime::now_utc();
        {
            let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match sessions.get(&id) {
                Some(s) if s.is_live(now) => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        self.remove(id);
        debug!(session_id = %id, "session expired");
        None
    }

    /// Stores `user` as the login user of session `id` when that session is
    /// still live, otherwise of a freshly created one. The flag is true when a
    /// new session had to be created, i.e. the caller must send a cookie.
    ///
    /// The id is not rotated on login: a session id planted in the browser
    /// before login stays valid after it (session fixation).
    pub fn store_login_user(&self, id: Option<Uuid>, user: User) -> (WebSession, bool) {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = id
            .and_then(|id| sessions.get_mut(&id))
            .filter(|s| s.is_live(now))
        {
            session.login_user = Some(user);
            return (session.clone(), false);
        }

        let mut session = WebSession::new(self.ttl);
        session.login_user = Some(user);
        Self::insert(&mut sessions, session.clone());
        (session, true)
    }

    pub fn remove(&self, id: Uuid) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(&id);
    }

    pub fn cleanup(&self) {
        let now = OffsetDateTime::now_utc();
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|_, s| s.is_live(now));
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie.cookie_name
    }

    /// `Set-Cookie` value binding the browser to `session`.
    pub fn cookie_for(&self, session: &WebSession) -> String {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            self.cookie.cookie_name,
            session.id,
            self.ttl.whole_seconds()
        );
        if self.cookie.secure_cookie {
            cookie.push_str("; Secure");
        }
        cookie
    }

    #[cfg(test)]
    pub(crate) fn expire_now(&self, id: Uuid) {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        if let Some(s) = sessions.get_mut(&id) {
            s.expires_at = OffsetDateTime::now_utc() - Duration::seconds(1);
        }
    }
}

/// Finds the session id carried in the request's `Cookie` headers.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

/// The caller's live session, if the request carries one.
pub struct CurrentSession(pub Option<WebSession>);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    Arc<SessionStore>: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = Arc::<SessionStore>::from_ref(state);
        let session = session_id_from_headers(&parts.headers, store.cookie_name())
            .and_then(|id| store.get(id));
        Ok(CurrentSession(session))
    }
}
