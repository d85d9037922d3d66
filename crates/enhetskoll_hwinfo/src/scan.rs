//! Machinery shared by the bus scanners

use std::path::Path;
use std::path::PathBuf;

use crate::Bus;
use crate::DeviceRecord;
use crate::attribute::AttributeReadError;

/// A scan could not enumerate devices at all
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ScanError {
    #[error("Failed to list devices in {}: {source}", .path.display())]
    ListDevices {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid device probe pattern {pattern}: {source}")]
    ProbePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },
}

/// Why a single device was left out of the scan results
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SkipReason {
    #[error("Missing mandatory attribute {attr}: {0}", attr = .0.attribute())]
    MandatoryAttribute(#[source] AttributeReadError),
    #[error("Failed to access device directory: {0}")]
    Inaccessible(#[source] std::io::Error),
    #[error("Invalid interface pattern {pattern}: {source}")]
    InterfaceGlob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("Failed to enumerate interfaces: {0}")]
    InterfacePath(#[source] glob::GlobError),
    #[error("Failed to read interface class: {0}")]
    InterfaceClass(#[source] AttributeReadError),
    #[error("Failed to inspect device: {0}")]
    Unreadable(#[source] glob::GlobError),
    #[error("Path is not valid UTF-8: {}", .path.display())]
    NonUtf8Path { path: PathBuf },
}

/// Result of processing one device directory
#[derive(Debug)]
pub struct DeviceScan {
    /// The device directory
    pub path: PathBuf,
    /// Records for this device (composite USB devices may give several, or
    /// none), or why it was skipped
    pub outcome: Result<Vec<DeviceRecord>, SkipReason>,
}

/// Gets told about devices that were skipped during a scan
pub trait ScanObserver {
    fn device_skipped(&self, bus: Bus, device: &Path, reason: &SkipReason);
}

/// Observer that logs skipped devices as errors
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ScanObserver for LogObserver {
    fn device_skipped(&self, bus: Bus, device: &Path, reason: &SkipReason) {
        tracing::error!("Skipping {bus} device {}: {reason}", device.display());
    }
}

impl<F> ScanObserver for F
where
    F: Fn(Bus, &Path, &SkipReason),
{
    fn device_skipped(&self, bus: Bus, device: &Path, reason: &SkipReason) {
        self(bus, device, reason);
    }
}

/// A scanner for one bus
pub trait Scanner: std::fmt::Debug {
    /// The bus this scanner enumerates
    fn bus(&self) -> Bus;

    /// Process every device directory, in enumeration order.
    ///
    /// Only a failure to enumerate is an error, problems with individual
    /// devices end up in [`DeviceScan::outcome`].
    fn device_scans(&self) -> Result<Vec<DeviceScan>, ScanError>;

    /// Collect the records of all devices, reporting skipped ones to `observer`
    fn scan(&self, observer: &dyn ScanObserver) -> Result<Vec<DeviceRecord>, ScanError> {
        let bus = self.bus();
        let mut records = vec![];
        let mut skipped = 0;
        for DeviceScan { path, outcome } in self.device_scans()? {
            match outcome {
                Ok(found) => records.extend(found),
                Err(reason) => {
                    skipped += 1;
                    observer.device_skipped(bus, &path, &reason);
                }
            }
        }
        tracing::debug!(
            "Found {} {bus} device records ({skipped} devices skipped)",
            records.len()
        );
        Ok(records)
    }
}

/// Convert a path to a glob pattern that matches exactly that path
pub(crate) fn escaped_pattern(path: &Path) -> Option<String> {
    path.to_str().map(glob::Pattern::escape)
}

/// Glob options matching what we expect of sysfs paths
pub(crate) const MATCH_OPTIONS: glob::MatchOptions = glob::MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};
