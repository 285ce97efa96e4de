//! External API integrations

pub mod media_host;

pub use media_host::MediaHostClient;
