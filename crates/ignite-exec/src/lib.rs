mod error;
pub use error::ExecError;

pub mod host;
pub use host::{HostFs, HostTunerFactory, register_host_checks};

mod topology;
pub use topology::SysfsTopology;

mod cloud;
pub use cloud::DmiVendorProbe;

mod iotable;
pub use iotable::BuiltinIoTable;

pub mod launcher;
pub use launcher::{DaemonLauncher, find_install_dir};
