mod company;
mod device;
mod device_log;
mod grants;
mod sensor_config;
mod user;
mod virtual_device;

pub use company::CompanyRepository;
pub use device::DeviceRepository;
pub use device_log::DeviceLogRepository;
pub use grants::GrantRepository;
pub use sensor_config::SensorConfigRepository;
pub use user::UserRepository;
pub use virtual_device::VirtualDeviceRepository;
