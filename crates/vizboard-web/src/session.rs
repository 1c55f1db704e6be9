//! Cookie-keyed, in-memory browser sessions.
//!
//! A session holds the login flag, the raw bytes of the most recent uploads
//! and one-shot flash notices. Uploads are re-parsed on every request.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use vizboard_common::{Notice, UploadedFile};
use vizboard_security::SessionFlag;

use crate::state::SharedState;

pub const SESSION_COOKIE: &str = "vizboard_session";

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub flag: SessionFlag,
    pub static_upload: Option<Arc<UploadedFile>>,
    pub first_upload: Option<Arc<UploadedFile>>,
    pub second_upload: Option<Arc<UploadedFile>>,
    /// Shown once on the next dashboard render.
    pub flash: Vec<Notice>,
}

impl Session {
    pub fn is_logged_in(&self) -> bool {
        self.flag.is_logged_in()
    }
}

#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find the session named by the request cookie, or pick a fresh id and
    /// add its cookie to the returned jar. Nothing is stored until the first
    /// [`update`](Self::update), so anonymous reads leave the store untouched.
    pub async fn resolve(&self, jar: CookieJar) -> (Uuid, CookieJar) {
        let existing = jar
            .get(SESSION_COOKIE)
            .and_then(|c| Uuid::parse_str(c.value()).ok());

        if let Some(id) = existing {
            if self.inner.read().await.contains_key(&id) {
                return (id, jar);
            }
        }

        let id = Uuid::new_v4();
        debug!(%id, "Issued new session id");

        let cookie = Cookie::build((SESSION_COOKIE, id.to_string()))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/");
        (id, jar.add(cookie))
    }

    pub async fn snapshot(&self, id: Uuid) -> Session {
        self.inner.read().await.get(&id).cloned().unwrap_or_default()
    }

    /// Mutate one session in place, storing it on first write.
    pub async fn update<R>(&self, id: Uuid, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.inner.write().await;
        f(sessions.entry(id).or_default())
    }

    /// Number of stored sessions.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// The caller's session, resolved from (or issued as) a cookie.
///
/// Handlers must return `jar` in their response so a newly issued cookie
/// reaches the browser.
pub struct CurrentSession {
    pub id: Uuid,
    pub jar: CookieJar,
    pub session: Session,
}

impl FromRequestParts<SharedState> for CurrentSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let (id, jar) = state.sessions.resolve(jar).await;
        let session = state.sessions.snapshot(id).await;
        Ok(Self { id, jar, session })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderMap, HeaderValue};

    #[tokio::test]
    async fn test_resolve_issues_cookie_once() {
        let store = SessionStore::new();
        let (id, jar) = store.resolve(CookieJar::new()).await;
        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.value(), id.to_string());
        assert_eq!(cookie.http_only(), Some(true));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}")).unwrap(),
        );
        let (fresh, _) = store.resolve(CookieJar::from_headers(&headers)).await;
        assert_ne!(fresh, id, "an id is only honoured once stored");

        store.update(id, |s| s.flash.push(Notice::success("hi"))).await;
        let (again, jar) = store.resolve(CookieJar::from_headers(&headers)).await;
        assert_eq!(again, id);
        assert_eq!(jar.get(SESSION_COOKIE).map(|c| c.value().to_string()), Some(id.to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_anonymous_reads_store_nothing() {
        let store = SessionStore::new();
        for _ in 0..10_000 {
            let (id, _) = store.resolve(CookieJar::new()).await;
            assert!(!store.snapshot(id).await.is_logged_in());
        }
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_cookie_starts_new_session() {
        let store = SessionStore::new();
        let stale = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={stale}")).unwrap(),
        );
        let (id, _) = store.resolve(CookieJar::from_headers(&headers)).await;
        assert_ne!(id, stale);
    }

    #[tokio::test]
    async fn test_update_and_snapshot() {
        let store = SessionStore::new();
        let (id, _) = store.resolve(CookieJar::new()).await;
        assert!(!store.snapshot(id).await.is_logged_in());

        store
            .update(id, |s| {
                s.static_upload = Some(Arc::new(UploadedFile::new("a.csv", b"x\n1\n".to_vec())));
                s.flash.push(Notice::success("hi"));
            })
            .await;
        let taken = store.update(id, |s| std::mem::take(&mut s.flash)).await;
        assert_eq!(taken.len(), 1);

        let snap = store.snapshot(id).await;
        assert!(snap.flash.is_empty());
        assert_eq!(snap.static_upload.as_deref().map(|f| f.name.as_str()), Some("a.csv"));
    }
}
