use serde::{Deserialize, Serialize};

use crate::engine::session::Layout;
use crate::storage::traits::UploadUrls;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    White,
    Gray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameColor {
    Black,
    White,
}

/// Body of `POST /session/create-session`. Colors are validated but only
/// matter to the client-side compositor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub layout: Layout,
    pub background_color: BackgroundColor,
    pub frame_color: FrameColor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub host_id: String,
    pub upload_urls: UploadUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinSessionResponse {
    pub session_id: String,
    pub user_id: String,
    pub upload_urls: UploadUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatusResponse {
    pub is_valid: bool,
    pub layout: Layout,
    pub users: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteSessionResponse {
    pub status: String,
}

impl DeleteSessionResponse {
    pub fn deleted() -> Self {
        Self {
            status: "deleted".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_accepts_documented_example() {
        let req: CreateSessionRequest = serde_json::from_str(
            r#"{"layout": "portrait", "background_color": "white", "frame_color": "black"}"#,
        )
        .unwrap();
        assert_eq!(req.layout, Layout::Portrait);
        assert_eq!(req.background_color, BackgroundColor::White);
        assert_eq!(req.frame_color, FrameColor::Black);
    }

    #[test]
    fn test_create_request_rejects_unknown_values() {
        let bad_layout = r#"{"layout": "panorama", "background_color": "white", "frame_color": "black"}"#;
        let bad_color = r#"{"layout": "story", "background_color": "blue", "frame_color": "black"}"#;
        let missing_frame = r#"{"layout": "story", "background_color": "gray"}"#;
        assert!(serde_json::from_str::<CreateSessionRequest>(bad_layout).is_err());
        assert!(serde_json::from_str::<CreateSessionRequest>(bad_color).is_err());
        assert!(serde_json::from_str::<CreateSessionRequest>(missing_frame).is_err());
    }

    #[test]
    fn test_status_response_shape() {
        let resp = SessionStatusResponse {
            is_valid: true,
            layout: Layout::Square,
            users: vec!["h".into(), "u2".into()],
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"is_valid": true, "layout": "square", "users": ["h", "u2"]})
        );
    }
}
