//! Enumerate PCI devices from `/sys/bus/pci/devices`

use std::path::Path;
use std::path::PathBuf;

use crate::Bus;
use crate::DeviceRecord;
use crate::attribute::read_attribute;
use crate::bus::PCI_MANDATORY_ATTRIBUTES;
use crate::bus::PCI_OPTIONAL_ATTRIBUTES;
use crate::config::ScanConfiguration;
use crate::scan::DeviceScan;
use crate::scan::ScanError;
use crate::scan::Scanner;
use crate::scan::SkipReason;

/// Scanner for PCI devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PciScanner {
    devices_dir: PathBuf,
}

impl PciScanner {
    #[must_use]
    pub fn new(config: &ScanConfiguration) -> Self {
        Self::from_devices_dir(config.pci_devices_dir())
    }

    /// Scan a specific directory with one subdirectory per device
    #[must_use]
    pub fn from_devices_dir(devices_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices_dir: devices_dir.into(),
        }
    }

    /// Directory with one entry per device
    #[must_use]
    pub fn devices_dir(&self) -> &Path {
        &self.devices_dir
    }
}

impl Scanner for PciScanner {
    fn bus(&self) -> Bus {
        Bus::Pci
    }

    #[tracing::instrument(skip_all, fields(dir = %self.devices_dir.display()))]
    fn device_scans(&self) -> Result<Vec<DeviceScan>, ScanError> {
        let list_error = |source| ScanError::ListDevices {
            path: self.devices_dir.clone(),
            source,
        };
        let mut scans = vec![];
        for entry in std::fs::read_dir(&self.devices_dir).map_err(list_error)? {
            let path = entry.map_err(list_error)?.path();
            // Entries are normally symlinks into /sys/devices
            let outcome = match std::fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => read_device(&path).map(|record| vec![record]),
                Ok(_) => {
                    tracing::debug!("Ignoring non-directory {}", path.display());
                    continue;
                }
                Err(err) => Err(SkipReason::Inaccessible(err)),
            };
            scans.push(DeviceScan { path, outcome });
        }
        Ok(scans)
    }
}

/// Read one PCI device. Fails if any mandatory attribute can't be read.
fn read_device(path: &Path) -> Result<DeviceRecord, SkipReason> {
    let mut attributes = Vec::with_capacity(PCI_MANDATORY_ATTRIBUTES.len() + 1);
    for attribute in PCI_MANDATORY_ATTRIBUTES {
        let value =
            read_attribute(Bus::Pci, path, attribute).map_err(SkipReason::MandatoryAttribute)?;
        attributes.push((attribute, value));
    }
    for attribute in PCI_OPTIONAL_ATTRIBUTES {
        if let Ok(value) = read_attribute(Bus::Pci, path, attribute) {
            attributes.push((attribute, value));
        }
    }
    Ok(attributes.into_iter().collect())
}
