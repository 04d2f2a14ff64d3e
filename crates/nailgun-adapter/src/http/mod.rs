/*
[INPUT]:  HTTP client configuration and API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod cluster;
pub mod contrail;
pub mod error;
pub mod tasks;

pub use error::{NailgunError, Result};

pub use client::{ClientConfig, NailgunClient};
