//! Configuration of device scans

use std::path::PathBuf;

/// Where sysfs is normally mounted
pub const DEFAULT_SYSFS_ROOT: &str = "/sys";

/// Settings shared by all scanners
#[derive(Debug, Clone, PartialEq, Eq, derive_builder::Builder)]
#[non_exhaustive]
pub struct ScanConfiguration {
    /// Root of the sysfs tree. Point this elsewhere to scan a copy of sysfs
    /// (e.g. a host mount inside a container).
    #[builder(setter(into), default = "PathBuf::from(DEFAULT_SYSFS_ROOT)")]
    pub sysfs_root: PathBuf,
}

impl ScanConfiguration {
    pub fn builder() -> ScanConfigurationBuilder {
        ScanConfigurationBuilder::default()
    }

    /// Directory with one entry per PCI device
    #[must_use]
    pub fn pci_devices_dir(&self) -> PathBuf {
        self.sysfs_root.join("bus/pci/devices")
    }

    /// Directory with USB devices (and interfaces, hubs ports etc)
    #[must_use]
    pub fn usb_devices_dir(&self) -> PathBuf {
        self.sysfs_root.join("bus/usb/devices")
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
        }
    }
}
