pub mod token;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SessionSettings;
use crate::error::{ParcelasError, Result};

const SESSION_FILE: &str = "session.toml";

/// Stored login. Lives in `session.toml` next to config.toml.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    /// Unix seconds when the token was stored
    pub saved_at: i64,
}

/// Outcome of checking a stored session against both expiry rules
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Missing,
    /// Local lifetime (`session.ttl_secs`) ran out
    LocalExpired,
    /// Token `exp` claim elapsed, absent or unreadable
    TokenExpired,
    Active { expires_at: i64 },
}

impl Session {
    pub fn new(token: impl Into<String>, saved_at: i64) -> Self {
        Self {
            token: token.into(),
            saved_at,
        }
    }

    /// Apply the local lifetime and the token claim; the earlier one wins.
    pub fn state(&self, settings: &SessionSettings, now: i64) -> SessionState {
        let local_deadline = self.saved_at.saturating_add(settings.ttl_secs);
        if now >= local_deadline {
            return SessionState::LocalExpired;
        }

        match token::expiry(&self.token) {
            Some(exp) if exp > now => SessionState::Active {
                expires_at: exp.min(local_deadline),
            },
            _ => SessionState::TokenExpired,
        }
    }
}

fn session_path(cfg_dir: &Path) -> PathBuf {
    cfg_dir.join(SESSION_FILE)
}

/// Load the stored session, if any
pub fn load_session(cfg_dir: &Path) -> Result<Option<Session>> {
    let path = session_path(cfg_dir);
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let session =
        toml::from_str(&content).map_err(|e| ParcelasError::ConfigParse { path, source: e })?;
    Ok(Some(session))
}

/// Persist the session, replacing any previous one
pub fn save_session(cfg_dir: &Path, session: &Session) -> Result<()> {
    let path = session_path(cfg_dir);
    let content = toml::to_string_pretty(session).map_err(|e| ParcelasError::ConfigWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Remove the stored session. Returns whether one existed.
pub fn clear_session(cfg_dir: &Path) -> Result<bool> {
    let path = session_path(cfg_dir);
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path)?;
    Ok(true)
}

/// Inspect the stored session without modifying it
pub fn session_state(cfg_dir: &Path, settings: &SessionSettings, now: i64) -> Result<SessionState> {
    Ok(match load_session(cfg_dir)? {
        Some(session) => session.state(settings, now),
        None => SessionState::Missing,
    })
}

/// Guard for commands that talk to protected endpoints.
///
/// Returns the bearer token when the session is usable. Expired sessions are
/// deleted so the next command starts from a clean login.
pub fn require_session(cfg_dir: &Path, settings: &SessionSettings, now: i64) -> Result<String> {
    let Some(session) = load_session(cfg_dir).unwrap_or_else(|e| {
        log::warn!("ignoring unreadable session file: {e}");
        None
    }) else {
        return Err(ParcelasError::NotAuthenticated);
    };

    match session.state(settings, now) {
        SessionState::Active { .. } => Ok(session.token),
        state => {
            log::info!("discarding stored session ({state:?})");
            clear_session(cfg_dir)?;
            Err(ParcelasError::NotAuthenticated)
        }
    }
}
