use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use crate::engine::error::SessionError;

impl SessionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::Conflict(_) => StatusCode::CONFLICT,
            SessionError::Provisioning(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let detail = match &self {
            SessionError::NotFound(_) => "Session not found",
            SessionError::Expired(_) => "Session expired",
            SessionError::Conflict(_) => "Session already exists",
            SessionError::Provisioning(e) => {
                error!("upload provisioning failed: {:#}", e);
                "internal server error"
            }
        };
        (
            self.status_code(),
            Json(serde_json::json!({ "detail": detail })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let resp = SessionError::NotFound("abc".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await["detail"], "Session not found");
    }

    #[tokio::test]
    async fn expired_returns_410() {
        let resp = SessionError::Expired("abc".into()).into_response();
        assert_eq!(resp.status(), StatusCode::GONE);
        assert_eq!(body_json(resp).await["detail"], "Session expired");
    }

    #[tokio::test]
    async fn provisioning_failure_hides_details() {
        let err = SessionError::Provisioning(anyhow::anyhow!("signing key rejected"));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["detail"], "internal server error");
    }
}
