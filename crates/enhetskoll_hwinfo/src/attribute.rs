//! Reading single attribute files from sysfs device directories

use std::path::Path;
use std::path::PathBuf;

use compact_str::CompactString;

use crate::Bus;

/// Length of a PCI class code without the programming interface byte
const PCI_CLASS_LEN: usize = 4;

/// Failure to read one device attribute
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AttributeReadError {
    #[error("Failed to read device attribute {attribute} ({}): {source}", .path.display())]
    Io {
        attribute: CompactString,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unknown {bus} device attribute {attribute}")]
    Unknown { bus: Bus, attribute: CompactString },
}

impl AttributeReadError {
    /// The logical attribute name that failed
    #[must_use]
    pub fn attribute(&self) -> &str {
        match self {
            Self::Io { attribute, .. } | Self::Unknown { attribute, .. } => attribute.as_str(),
        }
    }
}

/// Read a single attribute of the device in `device_dir`.
///
/// The attribute name is the logical one (as used in [`crate::DeviceRecord`]),
/// it is mapped to the bus specific file name first.
pub fn read_attribute(
    bus: Bus,
    device_dir: &Path,
    attribute: &str,
) -> Result<CompactString, AttributeReadError> {
    let file = bus
        .sysfs_file(attribute)
        .ok_or_else(|| AttributeReadError::Unknown {
            bus,
            attribute: attribute.into(),
        })?;
    let path = device_dir.join(file);
    let data = std::fs::read_to_string(&path).map_err(|source| AttributeReadError::Io {
        attribute: attribute.into(),
        path,
        source,
    })?;

    match bus {
        Bus::Pci => {
            let value = data.strip_prefix("0x").unwrap_or(&data).trim();
            // Drop the programming interface from the raw class code
            if attribute == "class" {
                Ok(truncate(value, PCI_CLASS_LEN).into())
            } else {
                Ok(value.into())
            }
        }
        Bus::Usb => Ok(data.trim().into()),
    }
}

/// Read a raw sysfs file and strip surrounding whitespace.
///
/// `attribute` is only used for error reporting.
pub fn read_value(path: &Path, attribute: &str) -> Result<CompactString, AttributeReadError> {
    match std::fs::read_to_string(path) {
        Ok(data) => Ok(data.trim().into()),
        Err(source) => Err(AttributeReadError::Io {
            attribute: attribute.into(),
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
