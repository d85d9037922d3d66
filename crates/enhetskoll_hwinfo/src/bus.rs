//! The buses we know how to scan

/// A device bus exposed through sysfs
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Bus {
    /// PCI and PCIe devices (`/sys/bus/pci/devices`)
    #[strum(to_string = "pci")]
    Pci,
    /// USB devices (`/sys/bus/usb/devices`)
    #[strum(to_string = "usb")]
    Usb,
}

/// Attributes read for every PCI device. A device missing any of these is skipped.
pub const PCI_MANDATORY_ATTRIBUTES: [&str; 5] = [
    "class",
    "vendor",
    "device",
    "subsystem_vendor",
    "subsystem_device",
];

/// Attributes read for PCI devices when present
pub const PCI_OPTIONAL_ATTRIBUTES: [&str; 1] = ["sriov_totalvfs"];

/// Logical attributes read for USB devices, all of them optional
pub const USB_ATTRIBUTES: [&str; 4] = ["class", "vendor", "device", "serial"];

impl Bus {
    /// Map a logical attribute name to the file name in the device directory.
    ///
    /// The USB device files do not have terribly friendly names, so they are
    /// mapped to be consistent with PCI.
    #[must_use]
    pub fn sysfs_file(self, attribute: &str) -> Option<&'static str> {
        match self {
            Self::Pci => PCI_MANDATORY_ATTRIBUTES
                .iter()
                .chain(PCI_OPTIONAL_ATTRIBUTES.iter())
                .find(|known| **known == attribute)
                .copied(),
            Self::Usb => match attribute {
                "class" => Some("bDeviceClass"),
                "device" => Some("idProduct"),
                "vendor" => Some("idVendor"),
                "serial" => Some("serial"),
                _ => None,
            },
        }
    }
}
