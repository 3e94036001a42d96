//! Session authentication against a backend.
//!
//! Both backends use cookie-based sessions obtained from
//! `POST {endpoint}/users/login`. Sessions are cached on disk keyed by
//! [`Role`] so repeated invocations skip the login round-trip while the
//! cookies are still live.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, error, warn};

use crate::api::common::create_http_client;
use crate::config::{EndpointConfig, Role};
use crate::error::{Error, Result};

/// One session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Expiry as a Unix timestamp. `None` means the cookie never expires.
    pub expires: Option<i64>,
}

impl SessionCookie {
    /// Whether the cookie is expired at `now` (Unix seconds).
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires.is_some_and(|e| e <= now)
    }
}

/// An authenticated session's persisted state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    /// Cookies granted at login.
    pub cookies: Vec<SessionCookie>,
}

impl SessionState {
    /// Capture the cookies set by a login response.
    #[must_use]
    pub fn from_response(response: &reqwest::Response) -> Self {
        let now = now_unix();
        let cookies = response
            .cookies()
            .map(|c| SessionCookie {
                name: c.name().to_string(),
                value: c.value().to_string(),
                expires: c
                    .expires()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs() as i64)
                    .or_else(|| c.max_age().map(|d| now + d.as_secs() as i64)),
            })
            .collect();
        Self { cookies }
    }

    /// A session is expired when no cookie is still live at `now`.
    #[must_use]
    pub fn is_expired(&self, now: i64) -> bool {
        !self.cookies.iter().any(|c| !c.is_expired(now))
    }

    /// Value for a `Cookie:` request header, or `None` if the session
    /// holds no cookies.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Persistence for session state, keyed by backend role.
///
/// Injected into [`Authenticator`] so the login logic does not depend on a
/// filesystem path convention.
pub trait SessionStore: Send + Sync {
    /// Load the cached state for a role, if any. Unreadable or corrupt
    /// cache entries are treated as absent.
    fn load(&self, role: Role) -> Option<SessionState>;

    /// Persist the state for a role.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, role: Role, state: &SessionState) -> Result<()>;
}

/// File-backed [`SessionStore`] writing `{dir}/{role}.session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first
    /// save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, role: Role) -> PathBuf {
        self.dir.join(format!("{role}.session.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self, role: Role) -> Option<SessionState> {
        let content = std::fs::read_to_string(self.path_for(role)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn save(&self, role: Role, state: &SessionState) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let content = serde_json::to_string_pretty(state)?;
        std::fs::write(self.path_for(role), content)?;
        Ok(())
    }
}

/// Establishes and caches an authenticated session against one backend.
pub struct Authenticator {
    role: Role,
    config: EndpointConfig,
    client: reqwest::Client,
    store: Box<dyn SessionStore>,
    state: Option<SessionState>,
}

impl Authenticator {
    /// Create an authenticator for `role`.
    #[must_use]
    pub fn new(role: Role, config: EndpointConfig, store: Box<dyn SessionStore>) -> Self {
        Self {
            role,
            config,
            client: create_http_client(),
            store,
            state: None,
        }
    }

    /// Log in, reusing a cached session when one is still live.
    ///
    /// A cached, unexpired session is adopted without any network call.
    /// Otherwise a login request is issued and the resulting cookies are
    /// persisted for future runs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] if the login request fails; this
    /// is the only error that aborts a migration run.
    pub async fn login(&mut self) -> Result<()> {
        if let Some(state) = self.store.load(self.role) {
            if state.is_expired(now_unix()) {
                debug!("cached {} session expired, logging in again", self.role);
            } else {
                debug!("reusing cached {} session", self.role);
                self.state = Some(state);
                return Ok(());
            }
        }

        let url = format!(
            "{}/users/login",
            self.config.api_url.trim_end_matches('/')
        );
        let payload = serde_json::json!({
            "email": self.config.email,
            "password": self.config.password,
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("{} login request failed: {}", self.role, e);
                Error::Authentication(format!("{} login request failed: {e}", self.role))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            error!("{} login rejected with {}: {}", self.role, status, body);
            return Err(Error::Authentication(format!(
                "{} login rejected with {status}: {body}",
                self.role
            )));
        }

        let state = SessionState::from_response(&response);
        if let Err(e) = self.store.save(self.role, &state) {
            warn!("failed to persist {} session: {}", self.role, e);
        }
        self.state = Some(state);
        Ok(())
    }

    /// The backend's API base URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.config.api_url
    }

    /// The current session state, if logged in.
    #[must_use]
    pub fn session(&self) -> Option<&SessionState> {
        self.state.as_ref()
    }

    /// `Cookie:` header value for authenticated requests, if any.
    #[must_use]
    pub fn cookie_header(&self) -> Option<String> {
        self.state.as_ref().and_then(SessionState::cookie_header)
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cookie(name: &str, expires: Option<i64>) -> SessionCookie {
        SessionCookie {
            name: name.to_string(),
            value: "v".to_string(),
            expires,
        }
    }

    #[test]
    fn test_cookie_without_expiry_never_expires() {
        assert!(!cookie("payload-token", None).is_expired(i64::MAX - 1));
    }

    #[test]
    fn test_cookie_expiry() {
        let c = cookie("payload-token", Some(1000));
        assert!(!c.is_expired(999));
        assert!(c.is_expired(1000));
        assert!(c.is_expired(1001));
    }

    #[test]
    fn test_empty_state_is_expired() {
        assert!(SessionState::default().is_expired(0));
    }

    #[test]
    fn test_state_live_with_one_valid_cookie() {
        let state = SessionState {
            cookies: vec![cookie("a", Some(10)), cookie("b", Some(5000))],
        };
        assert!(!state.is_expired(100));
        assert!(state.is_expired(6000));
    }

    #[test]
    fn test_cookie_header_joins_pairs() {
        let state = SessionState {
            cookies: vec![
                SessionCookie {
                    name: "payload-token".to_string(),
                    value: "abc".to_string(),
                    expires: None,
                },
                SessionCookie {
                    name: "csrf".to_string(),
                    value: "xyz".to_string(),
                    expires: None,
                },
            ],
        };
        assert_eq!(
            state.cookie_header(),
            Some("payload-token=abc; csrf=xyz".to_string())
        );
    }

    #[test]
    fn test_cookie_header_empty_state() {
        assert_eq!(SessionState::default().cookie_header(), None);
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let state = SessionState {
            cookies: vec![cookie("payload-token", Some(99))],
        };
        store.save(Role::Source, &state).unwrap();

        let loaded = store.load(Role::Source).unwrap();
        assert_eq!(loaded.cookies, state.cookies);
        assert!(dir.path().join("source.session.json").is_file());
    }

    #[test]
    fn test_file_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load(Role::Sink).is_none());
    }

    #[test]
    fn test_file_store_corrupt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sink.session.json"), "{broken").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load(Role::Sink).is_none());
    }

    #[test]
    fn test_roles_cached_separately() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path());

        let state = SessionState {
            cookies: vec![cookie("payload-token", None)],
        };
        store.save(Role::Source, &state).unwrap();
        assert!(store.load(Role::Source).is_some());
        assert!(store.load(Role::Sink).is_none());
    }
}
