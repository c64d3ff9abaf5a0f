// HTTP surface: axum routes translating JSON requests into session lifecycle operations.

pub mod error;
pub mod handler;
pub mod schema;
