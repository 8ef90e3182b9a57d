//! Session state: bearer token, cached user profile and logout broadcast
//!
//! The session is loaded from a store on startup, replaced on login and
//! cleared on logout. Every logout, whether requested by the user or forced
//! by an unauthorized response, is announced to all subscribers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::model::UserProfile;

/// Errors that can occur when persisting the session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to access session file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse session file: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl Session {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: None,
        }
    }

    pub fn with_user(mut self, user: UserProfile) -> Self {
        self.user = Some(user);
        self
    }
}

/// Where the session survives between runs
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the session in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    UserInitiated,
    /// The backend rejected the token
    Unauthorized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoutEvent {
    pub reason: LogoutReason,
}

const LOGOUT_CHANNEL_CAPACITY: usize = 16;

/// Owner of the current session
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    current: RwLock<Option<Session>>,
    logout_tx: broadcast::Sender<LogoutEvent>,
}

impl SessionManager {
    /// Load whatever session the store holds
    ///
    /// An unreadable store starts the manager logged out.
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "stored session unreadable, starting logged out");
                None
            }
        };
        let (logout_tx, _) = broadcast::channel(LOGOUT_CHANNEL_CAPACITY);

        Self {
            store: Box::new(store),
            current: RwLock::new(current),
            logout_tx,
        }
    }

    pub fn get(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.get().map(|s| s.token)
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.get().and_then(|s| s.user)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> Option<String> {
        self.token().map(|t| format!("Bearer {}", t))
    }

    /// Persist and adopt a new session
    pub fn set(&self, session: Session) -> Result<(), SessionError> {
        self.store.save(&session)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        Ok(())
    }

    /// Drop the session and tell every subscriber
    ///
    /// The in-memory session is dropped even if the store fails to clear.
    pub fn clear(&self, reason: LogoutReason) -> Result<(), SessionError> {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        let stored = self.store.clear();

        match reason {
            LogoutReason::Unauthorized => tracing::warn!("session rejected by backend, logging out"),
            LogoutReason::UserInitiated => tracing::info!("logged out"),
        }
        // no subscribers is fine
        let _ = self.logout_tx.send(LogoutEvent { reason });

        stored
    }

    /// Receive every future logout
    pub fn subscribe(&self) -> broadcast::Receiver<LogoutEvent> {
        self.logout_tx.subscribe()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_from_store() {
        let manager = SessionManager::restore(MemoryStore::with_session(Session::new("abc")));
        assert!(manager.is_authenticated());
        assert_eq!(manager.bearer().as_deref(), Some("Bearer abc"));
    }

    #[test]
    fn test_empty_store_logged_out() {
        let manager = SessionManager::restore(MemoryStore::new());
        assert!(!manager.is_authenticated());
        assert_eq!(manager.token(), None);
    }

    #[test]
    fn test_set_then_clear() {
        let manager = SessionManager::restore(MemoryStore::new());
        let user = UserProfile {
            username: Some("hr.admin".to_string()),
            ..Default::default()
        };
        manager.set(Session::new("t1").with_user(user.clone())).unwrap();
        assert_eq!(manager.user(), Some(user));

        let mut rx = manager.subscribe();
        manager.clear(LogoutReason::UserInitiated).unwrap();
        assert!(!manager.is_authenticated());
        assert_eq!(
            rx.try_recv().unwrap(),
            LogoutEvent {
                reason: LogoutReason::UserInitiated
            }
        );
    }

    #[test]
    fn test_clear_without_subscribers() {
        let manager = SessionManager::restore(MemoryStore::with_session(Session::new("x")));
        assert!(manager.clear(LogoutReason::Unauthorized).is_ok());
    }
}
