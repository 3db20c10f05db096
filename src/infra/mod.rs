//! Infrastructure adapters: backend client, HTTP surface, telemetry.

pub mod error;
pub mod http;
pub mod telemetry;
pub mod wordpress;
