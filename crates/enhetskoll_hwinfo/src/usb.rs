//! Enumerate USB devices from `/sys/bus/usb/devices`
//!
//! Unlike PCI, the USB sysfs directory has entries for more than devices
//! (interfaces, for one). We work around that by only considering directories
//! that have a product ID.

use std::path::Path;
use std::path::PathBuf;

use itertools::Itertools;

use crate::Bus;
use crate::DeviceRecord;
use crate::attribute::read_attribute;
use crate::attribute::read_value;
use crate::bus::USB_ATTRIBUTES;
use crate::config::ScanConfiguration;
use crate::scan::DeviceScan;
use crate::scan::MATCH_OPTIONS;
use crate::scan::ScanError;
use crate::scan::Scanner;
use crate::scan::SkipReason;
use crate::scan::escaped_pattern;

/// File that only exists in directories for actual devices
const PROBE_FILE: &str = "idProduct";

/// Per interface class file, one level below the device
const INTERFACE_CLASS_FILE: &str = "bInterfaceClass";

/// Device class meaning "look at the interfaces instead"
const PER_INTERFACE_CLASS: &str = "00";

/// Scanner for USB devices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbScanner {
    devices_dir: PathBuf,
}

impl UsbScanner {
    #[must_use]
    pub fn new(config: &ScanConfiguration) -> Self {
        Self::from_devices_dir(config.usb_devices_dir())
    }

    #[must_use]
    pub fn from_devices_dir(devices_dir: impl Into<PathBuf>) -> Self {
        Self {
            devices_dir: devices_dir.into(),
        }
    }

    /// Directory the device directories are looked for in
    #[must_use]
    pub fn devices_dir(&self) -> &Path {
        &self.devices_dir
    }
}

impl Scanner for UsbScanner {
    fn bus(&self) -> Bus {
        Bus::Usb
    }

    #[tracing::instrument(skip_all, fields(dir = %self.devices_dir.display()))]
    fn device_scans(&self) -> Result<Vec<DeviceScan>, ScanError> {
        let base = escaped_pattern(&self.devices_dir).ok_or_else(|| ScanError::NonUtf8Path {
            path: self.devices_dir.clone(),
        })?;
        let pattern = format!("{base}/*/{PROBE_FILE}");
        let matches = glob::glob_with(&pattern, MATCH_OPTIONS)
            .map_err(|source| ScanError::ProbePattern { pattern, source })?;

        let mut scans = vec![];
        for probe in matches {
            let scan = match probe {
                Ok(probe) => {
                    let path = probe
                        .parent()
                        .map_or_else(|| probe.clone(), Path::to_path_buf);
                    let outcome = read_device(&path);
                    DeviceScan { path, outcome }
                }
                Err(err) => DeviceScan {
                    path: err.path().to_path_buf(),
                    outcome: Err(SkipReason::Unreadable(err)),
                },
            };
            scans.push(scan);
        }
        Ok(scans)
    }
}

/// Read one USB device, descending into its interfaces if the class is
/// declared per interface.
fn read_device(path: &Path) -> Result<Vec<DeviceRecord>, SkipReason> {
    let record: DeviceRecord = USB_ATTRIBUTES
        .into_iter()
        .filter_map(|attribute| {
            read_attribute(Bus::Usb, path, attribute)
                .ok()
                .filter(|value| !value.is_empty())
                .map(|value| (attribute, value))
        })
        .collect();

    if record.get("class") != Some(PER_INTERFACE_CLASS) {
        return Ok(vec![record]);
    }

    // A device may have several interfaces with mixed classes, give each
    // distinct class its own record.
    let classes = interface_classes(path)?;
    tracing::trace!(
        "Composite device {} has interface classes {classes:?}",
        path.display()
    );
    Ok(classes
        .into_iter()
        .map(|class| record.with_attribute("class", class))
        .collect())
}

fn interface_classes(path: &Path) -> Result<Vec<compact_str::CompactString>, SkipReason> {
    let base = escaped_pattern(path).ok_or_else(|| SkipReason::NonUtf8Path {
        path: path.to_path_buf(),
    })?;
    let pattern = format!("{base}/*/{INTERFACE_CLASS_FILE}");
    let interfaces = glob::glob_with(&pattern, MATCH_OPTIONS)
        .map_err(|source| SkipReason::InterfaceGlob { pattern, source })?;

    let mut classes = vec![];
    for interface in interfaces {
        let interface = interface.map_err(SkipReason::InterfacePath)?;
        let class =
            read_value(&interface, INTERFACE_CLASS_FILE).map_err(SkipReason::InterfaceClass)?;
        classes.push(class);
    }
    Ok(classes.into_iter().unique().collect())
}
