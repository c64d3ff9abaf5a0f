// Blob storage SAS signer: write-only service SAS URLs for per-participant cut uploads.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

use super::traits::{UploadProvisioner, UploadUrls};
use crate::config::{BlobStorageConfig, CUTS_PER_PARTICIPANT, SAS_VERSION};

type HmacSha256 = Hmac<Sha256>;

/// Signs blob URLs with the storage account's shared key.
pub struct BlobSasProvisioner {
    account_name: String,
    container_name: String,
    account_key: Vec<u8>,
    expiration: TimeDelta,
    cut_extension: String,
}

impl BlobSasProvisioner {
    pub fn new(config: &BlobStorageConfig) -> Result<Self> {
        let account_key = STANDARD
            .decode(config.account_key.trim())
            .context("storage account key is not valid base64")?;
        if account_key.is_empty() {
            warn!("storage account key is empty; upload URLs will be rejected by the service");
        }

        Ok(Self {
            account_name: config.account_name.clone(),
            container_name: config.container_name.clone(),
            account_key,
            expiration: config.sas_expiration()?,
            cut_extension: config.cut_extension.clone(),
        })
    }

    pub fn base_url(&self) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}",
            self.account_name, self.container_name
        )
    }

    /// Blob name of one cut within the container.
    pub fn blob_path(&self, session_id: &str, user_id: &str, cut: usize) -> String {
        format!(
            "sessions/{}/cuts/{}_{}.{}",
            session_id, user_id, cut, self.cut_extension
        )
    }

    /// Full signed URL for `blob_path`, valid from `issued_at` for the configured expiration.
    pub fn signed_url(&self, blob_path: &str, issued_at: DateTime<Utc>) -> Result<String> {
        let expiry = issued_at
            .checked_add_signed(self.expiration)
            .ok_or_else(|| anyhow!("SAS expiry out of range for issue time {}", issued_at))?;
        let query = self.sas_query(blob_path, expiry)?;

        let encoded_path = blob_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!("{}/{}?{}", self.base_url(), encoded_path, query))
    }

    fn sas_query(&self, blob_path: &str, expiry: DateTime<Utc>) -> Result<String> {
        let signed_expiry = expiry.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let canonical_resource = format!(
            "/blob/{}/{}/{}",
            self.account_name, self.container_name, blob_path
        );

        // Field order is fixed by the service: sp, st, se, resource, si, sip,
        // spr, sv, sr, snapshot, ses, rscc, rscd, rsce, rscl, rsct.
        let string_to_sign = [
            "w",
            "",
            signed_expiry.as_str(),
            canonical_resource.as_str(),
            "",
            "",
            "",
            SAS_VERSION,
            "b",
            "",
            "",
            "",
            "",
            "",
            "",
            "",
        ]
        .join("\n");

        let mut mac = HmacSha256::new_from_slice(&self.account_key)
            .context("failed to initialise SAS signer")?;
        mac.update(string_to_sign.as_bytes());
        let signature = STANDARD.encode(mac.finalize().into_bytes());

        Ok(format!(
            "sv={}&se={}&sr=b&sp=w&sig={}",
            SAS_VERSION,
            urlencoding::encode(&signed_expiry),
            urlencoding::encode(&signature)
        ))
    }
}

#[async_trait]
impl UploadProvisioner for BlobSasProvisioner {
    async fn upload_urls(&self, session_id: &str, user_id: &str) -> Result<UploadUrls> {
        let issued_at = Utc::now();
        let mut urls = UploadUrls::new();
        for cut in 0..CUTS_PER_PARTICIPANT {
            let blob_path = self.blob_path(session_id, user_id, cut);
            urls.insert(cut.to_string(), self.signed_url(&blob_path, issued_at)?);
        }
        debug!(
            "issued {} upload URLs for session {} user {}",
            urls.len(),
            session_id,
            user_id
        );
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn provisioner() -> BlobSasProvisioner {
        let config = BlobStorageConfig {
            account_key: STANDARD.encode(b"fakekey"),
            ..BlobStorageConfig::default()
        };
        BlobSasProvisioner::new(&config).unwrap()
    }

    #[test]
    fn test_signed_url_known_answer() {
        let p = provisioner();
        let issued_at = Utc.with_ymd_and_hms(2025, 7, 12, 13, 0, 0).unwrap();
        let url = p
            .signed_url(&p.blob_path("abc", "host", 0), issued_at)
            .unwrap();
        assert_eq!(
            url,
            "https://photojeni.blob.core.windows.net/photojeni/sessions/abc/cuts/host_0.webp\
             ?sv=2023-11-03&se=2025-07-12T13%3A15%3A00Z&sr=b&sp=w\
             &sig=pS2%2ForeiAjC85ud6nPKszRfEOaAUyymhIXWmOTrxfls%3D"
        );
    }

    #[test]
    fn test_blob_path_uses_configured_extension() {
        let config = BlobStorageConfig {
            cut_extension: "png".into(),
            ..BlobStorageConfig::default()
        };
        let p = BlobSasProvisioner::new(&config).unwrap();
        assert_eq!(p.blob_path("s", "u", 3), "sessions/s/cuts/u_3.png");
    }

    #[test]
    fn test_out_of_range_expiration_rejected() {
        let config = BlobStorageConfig {
            sas_expiration_minutes: 140_000_000_000,
            ..BlobStorageConfig::default()
        };
        assert!(BlobSasProvisioner::new(&config).is_err());
    }

    #[test]
    fn test_expiry_past_calendar_end_is_an_error() {
        let p = provisioner();
        assert!(p.signed_url("sessions/s/cuts/u_0.webp", DateTime::<Utc>::MAX_UTC).is_err());
    }

    #[test]
    fn test_invalid_account_key_rejected() {
        let config = BlobStorageConfig {
            account_key: "not base64!".into(),
            ..BlobStorageConfig::default()
        };
        assert!(BlobSasProvisioner::new(&config).is_err());
    }
}
