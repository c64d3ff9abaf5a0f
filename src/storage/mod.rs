// Upload destinations: short-lived, write-only URLs where participants upload their cuts.

pub mod blob_sas;
pub mod traits;
