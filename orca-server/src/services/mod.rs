mod access_service;
mod auth_service;
mod credential_service;
mod ingest_service;
pub mod liveness;
mod mailer_service;
mod realtime_service;
pub mod signal_service;
mod status_service;
mod token_service;
mod virtual_device_service;

pub use access_service::*;
pub use auth_service::*;
pub use credential_service::*;
pub use ingest_service::*;
pub use mailer_service::*;
pub use realtime_service::*;
pub use status_service::*;
pub use token_service::*;
pub use virtual_device_service::*;
