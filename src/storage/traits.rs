use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;

/// Upload URLs keyed by cut index (`"0"` to `"3"`).
pub type UploadUrls = BTreeMap<String, String>;

/// Issues write-capable, time-limited upload destinations for one participant
/// of a session.
#[async_trait]
pub trait UploadProvisioner: Send + Sync {
    /// Returns exactly one URL per cut, keyed by the cut index as a string.
    async fn upload_urls(&self, session_id: &str, user_id: &str) -> Result<UploadUrls>;
}
