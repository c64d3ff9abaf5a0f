// Session engine: in-memory registry, lifecycle operations and expiry.

pub mod error;
pub mod expiry;
pub mod lifecycle;
pub mod session;
pub mod store;
