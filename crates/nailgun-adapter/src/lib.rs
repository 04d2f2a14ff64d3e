/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Nailgun adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod api;
pub mod http;
pub mod types;

pub use api::ClusterApi;

// Re-export commonly used types from http
pub use http::{ClientConfig, NailgunClient, NailgunError, Result};

// Re-export all types
pub use types::*;
