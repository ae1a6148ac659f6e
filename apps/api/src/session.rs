//! Per-user interaction state: one upload store and at most one confirmed prompt.
//!
//! Nothing here outlives a session. Isolation between users is by session id, and
//! sessions left idle are ended by a background sweeper.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::runbook::PromptText;
use crate::uploads::UploadStore;

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub uploads: UploadStore,
    /// The prompt the user last confirmed. Cleared whenever the inputs change.
    pub confirmed: Option<PromptText>,
    /// Bumped by every upload. A confirmation must match the value read before listing.
    pub generation: u64,
    pub created_at: DateTime<Utc>,
    last_seen: Instant,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionInfo {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            created_at: session.created_at,
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    upload_root: PathBuf,
    retain_uploads: bool,
    idle_ttl: Duration,
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new(upload_root: impl Into<PathBuf>, retain_uploads: bool, idle_ttl: Duration) -> Self {
        Self {
            upload_root: upload_root.into(),
            retain_uploads,
            idle_ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Starts a session with its own upload directory under the upload root.
    pub async fn create(&self) -> Result<SessionInfo, AppError> {
        let id = Uuid::new_v4();
        let uploads = UploadStore::open(self.upload_root.join(id.to_string())).await?;
        let session = Session {
            id,
            uploads,
            confirmed: None,
            generation: 0,
            created_at: Utc::now(),
            last_seen: Instant::now(),
        };
        let info = SessionInfo::from(&session);

        self.sessions.write().await.insert(id, session);
        info!("Session {id} started");
        Ok(info)
    }

    /// Snapshot of a session. Refreshes its idle clock; mutations go through the
    /// dedicated methods.
    pub async fn get(&self, id: Uuid) -> Result<Session, AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.last_seen = Instant::now();
        Ok(session.clone())
    }

    /// Stores `prompt` as confirmed, provided no upload happened since `generation` was read.
    pub async fn confirm(
        &self,
        id: Uuid,
        prompt: PromptText,
        generation: u64,
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        if session.generation != generation {
            return Err(AppError::UploadsChanged);
        }
        session.confirmed = Some(prompt);
        Ok(())
    }

    pub async fn clear_confirmation(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.confirmed = None;
        Ok(())
    }

    /// Marks the inventory as changed: bumps the generation and drops any confirmation.
    pub async fn record_uploads(&self, id: Uuid) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
        session.generation += 1;
        session.confirmed = None;
        Ok(())
    }

    /// Ends a session, deleting its uploads unless retention is configured.
    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(&id)
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        self.discard(&session).await?;
        info!("Session {id} ended");
        Ok(())
    }

    /// Ends every session idle for at least the TTL. Returns how many were ended.
    pub async fn sweep_idle(&self) -> Result<usize, AppError> {
        let expired: Vec<Session> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<Uuid> = sessions
                .values()
                .filter(|s| s.last_seen.elapsed() >= self.idle_ttl)
                .map(|s| s.id)
                .collect();
            ids.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for session in &expired {
            self.discard(session).await?;
            info!("Session {} expired after {}s idle", session.id, self.idle_ttl.as_secs());
        }
        Ok(expired.len())
    }

    /// Runs `sweep_idle` every `every` until the runtime shuts down.
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if let Err(e) = store.sweep_idle().await {
                    warn!("Idle session sweep failed: {e}");
                }
            }
        })
    }

    async fn discard(&self, session: &Session) -> Result<(), AppError> {
        if !self.retain_uploads {
            session.uploads.clear().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::runbook::PromptVariant;

    const TTL: Duration = Duration::from_secs(600);

    fn prompt() -> PromptText {
        PromptText {
            variant: PromptVariant::Weekend,
            text: "p".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_gives_isolated_upload_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);

        let a = store.create().await.unwrap();
        let b = store.create().await.unwrap();
        let a = store.get(a.session_id).await.unwrap();
        let b = store.get(b.session_id).await.unwrap();

        assert_ne!(a.uploads.root(), b.uploads.root());
        a.uploads.save("a.txt", b"a").await.unwrap();
        assert!(b.uploads.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_confirmation_set_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);
        let id = store.create().await.unwrap().session_id;

        let generation = store.get(id).await.unwrap().generation;
        store.confirm(id, prompt(), generation).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().confirmed, Some(prompt()));

        store.clear_confirmation(id).await.unwrap();
        assert_eq!(store.get(id).await.unwrap().confirmed, None);
    }

    #[tokio::test]
    async fn test_upload_between_listing_and_confirm_blocks_stale_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);
        let id = store.create().await.unwrap().session_id;

        // Prompt built from this snapshot's listing...
        let seen = store.get(id).await.unwrap().generation;
        // ...while another request saves a file.
        store.record_uploads(id).await.unwrap();

        let err = store.confirm(id, prompt(), seen).await.unwrap_err();
        assert!(matches!(err, AppError::UploadsChanged));
        assert_eq!(store.get(id).await.unwrap().confirmed, None);

        let fresh = store.get(id).await.unwrap().generation;
        store.confirm(id, prompt(), fresh).await.unwrap();
    }

    #[tokio::test]
    async fn test_record_uploads_clears_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);
        let id = store.create().await.unwrap().session_id;

        store.confirm(id, prompt(), 0).await.unwrap();
        store.record_uploads(id).await.unwrap();

        let session = store.get(id).await.unwrap();
        assert_eq!(session.confirmed, None);
        assert_eq!(session.generation, 1);
    }

    #[tokio::test]
    async fn test_remove_deletes_uploads_unless_retained() {
        let dir = tempfile::tempdir().unwrap();

        let store = SessionStore::new(dir.path().join("drop"), false, TTL);
        let id = store.create().await.unwrap().session_id;
        let root = store.get(id).await.unwrap().uploads.root().to_path_buf();
        store.remove(id).await.unwrap();
        assert!(!root.exists());
        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));

        let store = SessionStore::new(dir.path().join("keep"), true, TTL);
        let id = store.create().await.unwrap().session_id;
        let root = store.get(id).await.unwrap().uploads.root().to_path_buf();
        store.remove(id).await.unwrap();
        assert!(root.exists());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);
        let err = store.clear_confirmation(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_ends_only_idle_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), false, TTL);
        let idle = store.create().await.unwrap().session_id;
        let active = store.create().await.unwrap().session_id;
        let idle_root = store.get(idle).await.unwrap().uploads.root().to_path_buf();

        tokio::time::advance(TTL / 2).await;
        store.get(active).await.unwrap();
        tokio::time::advance(TTL / 2).await;

        assert_eq!(store.sweep_idle().await.unwrap(), 1);
        assert!(matches!(store.get(idle).await, Err(AppError::NotFound(_))));
        assert!(!idle_root.exists());
        assert!(store.get(active).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_task_expires_abandoned_session() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path(), true, Duration::from_secs(10));
        let id = store.create().await.unwrap().session_id;

        let sweeper = store.spawn_sweeper(Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(12)).await;

        assert!(matches!(store.get(id).await, Err(AppError::NotFound(_))));
        sweeper.abort();
    }
}
