// Photo booth session coordination: in-memory session lifecycle, expiry, and upload provisioning.

pub mod config;
pub mod engine;
pub mod server;
pub mod storage;
pub mod telemetry;
