use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{TimeDelta, Utc};

/// Lifetime of a session in seconds (10 minutes). Drives both the deferred
/// expiry timer and the read-time staleness check.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 600;

/// Validity window of an upload URL in minutes.
pub const DEFAULT_SAS_EXPIRATION_MINUTES: u64 = 15;

/// Number of photo cuts each participant uploads.
pub const CUTS_PER_PARTICIPANT: usize = 4;

/// Storage service version used to sign upload URLs.
pub const SAS_VERSION: &str = "2023-11-03";

/// Default address the HTTP server binds to.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Blob storage account used for upload destinations.
#[derive(Debug, Clone)]
pub struct BlobStorageConfig {
    pub account_name: String,
    /// Base64-encoded shared key of the storage account.
    pub account_key: String,
    pub container_name: String,
    pub sas_expiration_minutes: u64,
    /// File extension of uploaded cuts, without the dot.
    pub cut_extension: String,
}

impl BlobStorageConfig {
    /// Validity window of an upload URL. Fails when the window cannot be
    /// added to the current time.
    pub fn sas_expiration(&self) -> Result<TimeDelta> {
        let out_of_range = || {
            anyhow!(
                "SAS expiration of {} minutes is out of range",
                self.sas_expiration_minutes
            )
        };
        let secs = self
            .sas_expiration_minutes
            .checked_mul(60)
            .ok_or_else(out_of_range)?;
        let delta = TimeDelta::from_std(Duration::from_secs(secs)).map_err(|_| out_of_range())?;
        Utc::now()
            .checked_add_signed(delta)
            .ok_or_else(out_of_range)?;
        Ok(delta)
    }
}

impl Default for BlobStorageConfig {
    fn default() -> Self {
        Self {
            account_name: "photojeni".to_string(),
            account_key: String::new(),
            container_name: "photojeni".to_string(),
            sas_expiration_minutes: DEFAULT_SAS_EXPIRATION_MINUTES,
            cut_extension: "webp".to_string(),
        }
    }
}

/// Top-level configuration for the session service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Single TTL shared by both expiry mechanisms.
    pub session_ttl_secs: u64,
    pub blob: BlobStorageConfig,
}

impl ServiceConfig {
    /// Build the configuration from process environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(ttl) = parse_var(&lookup, "SESSION_TTL_SECS")? {
            config.session_ttl_secs = ttl;
        }
        if let Some(name) = lookup("BLOB_ACCOUNT_NAME") {
            config.blob.account_name = name;
        }
        if let Some(key) = lookup("BLOB_ACCOUNT_KEY") {
            config.blob.account_key = key;
        }
        if let Some(container) = lookup("BLOB_CONTAINER_NAME") {
            config.blob.container_name = container;
        }
        if let Some(minutes) = parse_var(&lookup, "SAS_EXPIRATION_MINUTES")? {
            config.blob.sas_expiration_minutes = minutes;
            config
                .blob
                .sas_expiration()
                .context("invalid value for SAS_EXPIRATION_MINUTES")?;
        }
        if let Some(ext) = lookup("CUT_EXTENSION") {
            config.blob.cut_extension = ext.trim_start_matches('.').to_string();
        }

        Ok(config)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            blob: BlobStorageConfig::default(),
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => {
            let value = raw
                .trim()
                .parse::<T>()
                .with_context(|| format!("invalid value for {key}: {raw:?}"))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}
