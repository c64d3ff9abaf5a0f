// Axum request handlers: translate booth HTTP requests into session lifecycle operations.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    routing::{delete, get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::schema::{
    CreateSessionRequest, CreateSessionResponse, DeleteSessionResponse, JoinSessionResponse,
    SessionStatusResponse,
};
use crate::engine::error::SessionError;
use crate::engine::lifecycle::SessionManager;

pub type SharedManager = Arc<SessionManager>;

/// Routes of the session API, all mounted under `/session`.
pub fn router(manager: SharedManager) -> Router {
    Router::new()
        .route("/session/create-session", post(create_session_handler))
        .route(
            "/session/join-session/{session_id}",
            post(join_session_handler),
        )
        .route(
            "/session/session-status/{session_id}",
            get(session_status_handler),
        )
        .route("/session/session/{session_id}", delete(delete_session_handler))
        .with_state(manager)
}

pub struct SessionServer {
    addr: SocketAddr,
    manager: SharedManager,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SessionServer {
    /// Bind `bind_addr` and serve the session API in the background.
    pub async fn start(manager: SharedManager, bind_addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(bind_addr)
            .await
            .with_context(|| format!("failed to bind {}", bind_addr))?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = router(manager.clone());

        let task = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
            {
                error!("session server error: {}", e);
            }
        });
        info!("session server listening on {}", addr);

        Ok(Self {
            addr,
            manager,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// Absolute URL for `path` on this server.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn manager(&self) -> &SharedManager {
        &self.manager
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            error!("session server task failed: {}", e);
        }
    }
}

/// POST /session/create-session: create a session and issue the host's upload URLs.
async fn create_session_handler(
    State(manager): State<SharedManager>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, SessionError> {
    debug!(
        "create request layout={} background={:?} frame={:?}",
        req.layout, req.background_color, req.frame_color
    );
    let created = manager.create_session(req.layout).await?;
    Ok(Json(CreateSessionResponse {
        session_id: created.session_id,
        host_id: created.host_id,
        upload_urls: created.upload_urls,
    }))
}

/// POST /session/join-session/{session_id}: add a participant and issue their upload URLs.
async fn join_session_handler(
    State(manager): State<SharedManager>,
    Path(session_id): Path<String>,
) -> Result<Json<JoinSessionResponse>, SessionError> {
    let joined = manager.join_with_uploads(&session_id).await?;
    Ok(Json(JoinSessionResponse {
        session_id: joined.session_id,
        user_id: joined.user_id,
        upload_urls: joined.upload_urls,
    }))
}

/// GET /session/session-status/{session_id}: layout and participants; 410 once expired.
async fn session_status_handler(
    State(manager): State<SharedManager>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, SessionError> {
    let status = manager.get_session_status(&session_id)?;
    Ok(Json(SessionStatusResponse {
        is_valid: true,
        layout: status.layout,
        users: status.users,
    }))
}

/// DELETE /session/session/{session_id}: end a session early.
async fn delete_session_handler(
    State(manager): State<SharedManager>,
    Path(session_id): Path<String>,
) -> Result<Json<DeleteSessionResponse>, SessionError> {
    info!("deleting session {}", session_id);
    manager.delete_session(&session_id)?;
    Ok(Json(DeleteSessionResponse::deleted()))
}
