use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::path::HOME_DIR;

const DEFAULT_HISTORY_LIMIT: usize = 100;
const DEFAULT_MAX_AGE_HOURS: i64 = 24;

/// Where each session's current directory lives. Commands only ever talk to
/// this trait; ordering between concurrent commands of one session is up to
/// the implementation.
pub trait SessionStore: Send + Sync {
    fn current_dir(&self, session_id: &str) -> String;
    fn set_current_dir(&self, session_id: &str, dir: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Entries kept per session; 0 falls back to 100.
    pub history_limit: usize,
    /// Current directory for sessions that never ran `cd`.
    pub default_dir: String,
    /// Idle sessions older than this are dropped by `cleanup_old_sessions`.
    pub max_age_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: 1000,
            default_dir: HOME_DIR.to_string(),
            max_age_hours: DEFAULT_MAX_AGE_HOURS,
        }
    }
}

/// One line of terminal scrollback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    pub output: String,
    pub success: bool,
    pub prompt: String,
    pub timestamp: DateTime<Local>,
}

/// Per-session state.
#[derive(Debug, Clone)]
pub struct TerminalContext {
    pub cwd: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub last_used: DateTime<Local>,
}

impl TerminalContext {
    pub fn new() -> Self {
        Self {
            cwd: None,
            history: Vec::new(),
            last_used: Local::now(),
        }
    }
}

impl Default for TerminalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory [`SessionStore`] that also keeps bounded history per session.
#[derive(Debug)]
pub struct SessionManager {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, TerminalContext>>,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionManager {
    pub fn new(mut config: SessionConfig) -> Self {
        if config.history_limit == 0 {
            config.history_limit = DEFAULT_HISTORY_LIMIT;
        }
        if config.max_age_hours < 0 {
            warn!(max_age_hours = config.max_age_hours, "negative session max age, using default");
            config.max_age_hours = DEFAULT_MAX_AGE_HOURS;
        }
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Touch the session, creating it if needed. An empty id gets a fresh
    /// uuid; the id actually used is returned.
    pub fn ensure_session(&self, session_id: &str) -> String {
        let id = if session_id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            session_id.to_string()
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(id.clone())
            .and_modify(|ctx| ctx.last_used = Local::now())
            .or_insert_with(|| {
                debug!(session = %id, "new session");
                TerminalContext::new()
            });
        id
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Append to history, dropping the oldest entries past the limit.
    pub fn add_entry(&self, session_id: &str, entry: HistoryEntry) {
        let limit = self.config.history_limit;
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let ctx = sessions.entry(session_id.to_string()).or_default();
        ctx.history.push(entry);
        if ctx.history.len() > limit {
            let excess = ctx.history.len() - limit;
            ctx.history.drain(..excess);
        }
        ctx.last_used = Local::now();
    }

    /// Copy of the session's history, oldest first.
    pub fn history(&self, session_id: &str) -> Vec<HistoryEntry> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(session_id)
            .map(|ctx| ctx.history.clone())
            .unwrap_or_default()
    }

    /// Just the typed commands, oldest first. Blank prompt-only entries are
    /// skipped.
    pub fn command_history(&self, session_id: &str) -> Vec<String> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(session_id)
            .map(|ctx| {
                ctx.history
                    .iter()
                    .filter(|entry| !entry.command.is_empty())
                    .map(|entry| entry.command.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn clear_history(&self, session_id: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(ctx) = sessions.get_mut(session_id) {
            ctx.history.clear();
        }
    }

    /// Drop every session idle for longer than `max_age`. Returns how many
    /// went away. A cutoff outside chrono's range keeps everything.
    pub fn cleanup_old_sessions(&self, max_age: Duration) -> usize {
        let Some(cutoff) = Local::now().checked_sub_signed(max_age) else {
            return 0;
        };
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, ctx| ctx.last_used >= cutoff);
        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "cleaned up idle sessions");
        }
        removed
    }

    /// Same as [`cleanup_old_sessions`](Self::cleanup_old_sessions) with the
    /// configured max age.
    pub fn cleanup_expired(&self) -> usize {
        match Duration::try_hours(self.config.max_age_hours) {
            Some(max_age) => self.cleanup_old_sessions(max_age),
            // too large to ever expire anything
            None => 0,
        }
    }
}

impl SessionStore for SessionManager {
    fn current_dir(&self, session_id: &str) -> String {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(session_id)
            .and_then(|ctx| ctx.cwd.clone())
            .unwrap_or_else(|| self.config.default_dir.clone())
    }

    fn set_current_dir(&self, session_id: &str, dir: &str) {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let ctx = sessions.entry(session_id.to_string()).or_default();
        ctx.cwd = Some(dir.to_string());
        ctx.last_used = Local::now();
    }
}
