//! Sessions — per-user state between form submissions.
//!
//! A session holds the last generated script and the last form inputs. It is created by the
//! user's first script submission and dropped when the user ends it. Each session sits behind its own async mutex, so one
//! interaction finishes before the next one for the same user starts.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoryboardError;
use crate::script_writer::{ScriptOutcome, ScriptRequest, ScriptWriter};
use crate::storyboard_artist::{Storyboard, StoryboardArtist, StoryboardFrame, StoryboardOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// State of one user session.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    generated_script: String,
    script_request: ScriptRequest,
    storyboard_options: StoryboardOptions,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored script; empty until the first script submission.
    pub fn generated_script(&self) -> &str {
        &self.generated_script
    }

    pub fn has_script(&self) -> bool {
        !self.generated_script.is_empty()
    }

    /// Inputs of the last script submission.
    pub fn script_request(&self) -> &ScriptRequest {
        &self.script_request
    }

    /// Options of the last storyboard request.
    pub fn storyboard_options(&self) -> &StoryboardOptions {
        &self.storyboard_options
    }

    /// Run the script writer and overwrite the stored script. A failed request stores the fallback text.
    pub async fn submit_script(&mut self, writer: &ScriptWriter, request: &ScriptRequest) -> ScriptOutcome {
        self.script_request = request.clone();
        let outcome = writer.generate(request).await;
        self.generated_script = outcome.text().to_string();
        outcome
    }

    /// Draw the stored script. With no stored script nothing is requested.
    pub async fn request_storyboard<F>(
        &mut self,
        artist: &StoryboardArtist,
        options: &StoryboardOptions,
        on_frame: F,
    ) -> Result<Storyboard, StoryboardError>
    where
        F: FnMut(&StoryboardFrame) + Send,
    {
        self.storyboard_options = *options;
        if !self.has_script() {
            tracing::warn!("Storyboard requested before any script was generated");
            return Err(StoryboardError::NoScript);
        }
        Ok(artist.generate(&self.generated_script, options, on_frame).await?)
    }
}

pub type SessionHandle = Arc<Mutex<SessionContext>>;

/// All live sessions, keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionHandle>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session.
    pub fn open(&self) -> (SessionId, SessionHandle) {
        let id = SessionId::new();
        let handle: SessionHandle = Arc::new(Mutex::new(SessionContext::new()));
        self.sessions.insert(id, Arc::clone(&handle));
        tracing::debug!(session = %id, "Session opened");
        (id, handle)
    }

    pub fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Existing session for `id`. Never creates one.
    pub fn resume(&self, id: Option<SessionId>) -> Option<SessionHandle> {
        id.and_then(|id| self.get(&id))
    }

    /// Existing session for `id`, or a fresh one. The flag is true when a session was created.
    pub fn resume_or_open(&self, id: Option<SessionId>) -> (SessionId, SessionHandle, bool) {
        if let Some(id) = id {
            if let Some(handle) = self.get(&id) {
                return (id, handle, false);
            }
        }
        let (id, handle) = self.open();
        (id, handle, true)
    }

    /// Drop a session. Returns false when it did not exist.
    pub fn end(&self, id: &SessionId) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::debug!(session = %id, "Session ended");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_round_trips_through_text() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }

    #[tokio::test]
    async fn store_lifecycle() {
        let store = SessionStore::new();
        assert!(store.is_empty());

        let (id, handle) = store.open();
        assert_eq!(store.len(), 1);
        assert!(!handle.lock().await.has_script());

        let (same, _, created) = store.resume_or_open(Some(id));
        assert_eq!(same, id);
        assert!(!created);

        assert!(store.end(&id));
        assert!(!store.end(&id));
        assert!(store.get(&id).is_none());

        let (fresh, _, created) = store.resume_or_open(Some(id));
        assert_ne!(fresh, id);
        assert!(created);
    }

    #[test]
    fn resume_never_opens() {
        let store = SessionStore::new();
        assert!(store.resume(None).is_none());
        assert!(store.resume(Some(SessionId::new())).is_none());
        assert!(store.is_empty());

        let (id, _) = store.open();
        assert!(store.resume(Some(id)).is_some());
        assert_eq!(store.len(), 1);
    }
}
