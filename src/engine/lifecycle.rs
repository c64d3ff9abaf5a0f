// Session lifecycle: the user-facing operations, built on the store and expiry timers.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::SessionError;
use super::expiry::ExpiryScheduler;
use super::session::{Layout, Session};
use super::store::{AppendOutcome, Lookup, SessionStore};
use crate::storage::traits::{UploadProvisioner, UploadUrls};

#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub session_id: String,
    pub host_id: String,
    pub upload_urls: UploadUrls,
}

#[derive(Debug, Clone)]
pub struct JoinedSession {
    pub session_id: String,
    pub user_id: String,
    pub upload_urls: UploadUrls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub layout: Layout,
    pub host_id: String,
    pub users: Vec<String>,
}

pub struct SessionManager {
    store: Arc<SessionStore>,
    scheduler: ExpiryScheduler,
    provisioner: Arc<dyn UploadProvisioner>,
    ttl: Duration,
}

impl SessionManager {
    /// Build a manager over `store`. `ttl` bounds both the deferred expiry
    /// timer and the read-time staleness check.
    pub fn new(
        store: Arc<SessionStore>,
        provisioner: Arc<dyn UploadProvisioner>,
        ttl: Duration,
    ) -> Self {
        Self {
            scheduler: ExpiryScheduler::new(store.clone(), ttl),
            store,
            provisioner,
            ttl,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn scheduler(&self) -> &ExpiryScheduler {
        &self.scheduler
    }

    /// Create a session hosted by a fresh participant, start its expiry timer,
    /// and issue the host's upload URLs. If the URLs cannot be issued the
    /// session and its timer are torn down before the error is returned.
    pub async fn create_session(&self, layout: Layout) -> Result<CreatedSession, SessionError> {
        let session_id = Uuid::new_v4().to_string();
        let host_id = Uuid::new_v4().to_string();

        info!(
            "creating session {} with host {} and layout {}",
            session_id, host_id, layout
        );
        self.store
            .put(Session::new(session_id.clone(), layout, host_id.clone()))?;
        self.scheduler.schedule(&session_id);

        let upload_urls = match self.provisioner.upload_urls(&session_id, &host_id).await {
            Ok(urls) => urls,
            Err(e) => {
                warn!("rolling back session {}: {:#}", session_id, e);
                self.scheduler.cancel(&session_id);
                self.store.remove(&session_id);
                return Err(SessionError::Provisioning(e));
            }
        };
        debug!("generated upload URLs for session {}, host {}", session_id, host_id);

        Ok(CreatedSession {
            session_id,
            host_id,
            upload_urls,
        })
    }

    /// Add `user_id` to an existing session. Never creates a session; joining
    /// twice with the same id is accepted without duplicating the participant.
    pub fn join_session(&self, session_id: &str, user_id: &str) -> Result<(), SessionError> {
        self.ensure_fresh(session_id)?;
        match self.store.append_user(session_id, user_id) {
            AppendOutcome::Appended | AppendOutcome::AlreadyPresent => Ok(()),
            // Deleted between the freshness check and the append.
            AppendOutcome::Missing => Err(SessionError::NotFound(session_id.to_string())),
        }
    }

    /// Join with a newly generated participant id and issue that participant's
    /// upload URLs.
    pub async fn join_with_uploads(&self, session_id: &str) -> Result<JoinedSession, SessionError> {
        let user_id = Uuid::new_v4().to_string();
        self.join_session(session_id, &user_id)?;

        let upload_urls = self
            .provisioner
            .upload_urls(session_id, &user_id)
            .await
            .map_err(SessionError::Provisioning)?;

        Ok(JoinedSession {
            session_id: session_id.to_string(),
            user_id,
            upload_urls,
        })
    }

    /// Current layout and participants. A session past its TTL is deleted
    /// here and reported as expired rather than returned.
    pub fn get_session_status(&self, session_id: &str) -> Result<SessionStatus, SessionError> {
        debug!("checking status of session {}", session_id);
        let session = self.ensure_fresh(session_id)?;
        Ok(SessionStatus {
            layout: session.layout(),
            host_id: session.host_id().to_string(),
            users: session.users().to_vec(),
        })
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), SessionError> {
        if !self.store.remove(session_id) {
            warn!("session {} not found for deletion", session_id);
            return Err(SessionError::NotFound(session_id.to_string()));
        }
        self.scheduler.cancel(session_id);
        Ok(())
    }

    /// Stop all pending expiry timers.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    fn ensure_fresh(&self, session_id: &str) -> Result<Session, SessionError> {
        match self.store.get_fresh(session_id, Utc::now(), self.ttl) {
            Lookup::Fresh(session) => Ok(session),
            Lookup::Expired => {
                self.scheduler.cancel(session_id);
                Err(SessionError::Expired(session_id.to_string()))
            }
            Lookup::Missing => {
                warn!("session {} not found", session_id);
                Err(SessionError::NotFound(session_id.to_string()))
            }
        }
    }
}
