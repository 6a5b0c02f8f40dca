mod device_auth_handle;
mod device_handle;
mod ingest_handle;
mod sensor_config_handle;
mod summary_handle;
mod virtual_device_handle;

pub use device_auth_handle::*;
pub use device_handle::*;
pub use ingest_handle::*;
pub use sensor_config_handle::*;
pub use summary_handle::*;
pub use virtual_device_handle::*;
