pub mod company;
pub mod device;
pub mod device_log;
pub mod sensor_config;
pub mod user;
pub mod user_company;
pub mod user_device;
pub mod user_device_sensor;
pub mod user_virtual_device;
pub mod virtual_device;
pub mod virtual_device_sensor;

pub use company::{Company, CompanyTable};
pub use device::{Device, DeviceTable, DeviceWithCompany};
pub use device_log::{DeviceLog, DeviceLogTable, NewDeviceLog};
pub use sensor_config::{SensorConfig, SensorConfigTable};
pub use user::{User, UserTable};
pub use user_company::{UserCompany, UserCompanyTable};
pub use user_device::{UserDevice, UserDeviceTable};
pub use user_device_sensor::{UserDeviceSensor, UserDeviceSensorTable};
pub use user_virtual_device::{UserVirtualDevice, UserVirtualDeviceTable};
pub use virtual_device::{VirtualDevice, VirtualDeviceTable};
pub use virtual_device_sensor::{VirtualDeviceSensor, VirtualDeviceSensorTable};

pub trait Table {
    /// The name of the table
    fn name(&self) -> &'static str;

    /// The SQL statement to create the table
    fn create(&self) -> String;

    /// The SQL statement to dispose the table
    fn dispose(&self) -> String;

    /// The dependencies of the table
    fn dependencies(&self) -> Vec<&'static str>;
}
