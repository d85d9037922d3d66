//! Look up names in the `pci.ids` / `usb.ids` hardware databases
//!
//! Both files share the same basic layout: vendors with devices (and for PCI
//! subsystems), followed by a class hierarchy. `usb.ids` has a few extra
//! sections (HID usages, languages etc) that are skipped.

use std::path::Path;
use std::path::PathBuf;

use ahash::AHashMap;
use eyre::WrapErr;

use crate::Bus;
use crate::DeviceRecord;
use crate::readable::NameStrategy;

mod parser;

pub use parser::ParseIdsError;

/// A database of device IDs
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IdDb {
    pub classes: AHashMap<u8, Class>,
    pub vendors: AHashMap<u16, Vendor>,
}

impl IdDb {
    /// Create from a string in `pci.ids` or `usb.ids` format
    pub fn parse(s: &str) -> eyre::Result<Self> {
        parser::parse_database(s)
    }

    /// Create from a file. `usb.ids` has historically not been valid UTF-8,
    /// invalid sequences are replaced.
    pub fn parse_file(path: &Path) -> eyre::Result<Self> {
        let raw = std::fs::read(path)
            .wrap_err_with(|| format!("Failed to read ID database {}", path.display()))?;
        Self::parse(&String::from_utf8_lossy(&raw))
            .wrap_err_with(|| format!("Failed to parse ID database {}", path.display()))
    }

    /// Find the database for `bus` in the usual locations
    #[must_use]
    pub fn find(bus: Bus) -> Option<PathBuf> {
        default_locations(bus)
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Get the database names for the class, vendor and device of a record
    #[must_use]
    pub fn lookup<'db>(&'db self, record: &DeviceRecord) -> NameLookup<&'db str> {
        let vendor = record
            .get("vendor")
            .and_then(parse_hex::<u16>)
            .and_then(|id| self.vendors.get(&id));
        let device = vendor.and_then(|vendor| {
            record
                .get("device")
                .and_then(parse_hex::<u16>)
                .and_then(|id| vendor.devices.get(&id))
        });

        NameLookup {
            class: record.get("class").and_then(|code| self.class_name(code)),
            vendor: vendor.map(|v| v.name.as_str()),
            device: device.map(|d| d.name.as_str()),
        }
    }

    /// Like [`Self::lookup`] but with readable names.
    ///
    /// USB classes keep their numeric code, the class names in `usb.ids`
    /// are not useful as labels.
    #[must_use]
    pub fn readable(&self, bus: Bus, record: &DeviceRecord) -> NameLookup<String> {
        let names = self.lookup(record);
        let strategy = NameStrategy::for_bus(bus);
        NameLookup {
            class: match bus {
                Bus::Pci => names.class.map(|c| strategy.class(c)),
                Bus::Usb => record.get("class").map(ToOwned::to_owned),
            },
            vendor: names.vendor.map(|v| strategy.vendor(v)),
            device: names.device.map(|d| strategy.device(d)),
        }
    }

    /// Name of a class code. Four digits (PCI) is class and subclass, two
    /// digits (USB) is just the class.
    fn class_name(&self, code: &str) -> Option<&str> {
        let class = self.classes.get(&parse_hex::<u8>(code.get(..2)?)?)?;
        match code.len() {
            2 => Some(class.name.as_str()),
            4 => {
                let subclass = parse_hex::<u8>(code.get(2..)?)
                    .and_then(|id| class.subclasses.get(&id))
                    .map_or(class.name.as_str(), |s| s.name.as_str());
                Some(subclass)
            }
            _ => None,
        }
    }
}

/// Where distributions usually install the database for a bus
#[must_use]
pub const fn default_locations(bus: Bus) -> &'static [&'static str] {
    match bus {
        Bus::Pci => &["/usr/share/hwdata/pci.ids", "/usr/share/misc/pci.ids"],
        Bus::Usb => &["/usr/share/hwdata/usb.ids", "/usr/share/misc/usb.ids"],
    }
}

fn parse_hex<T: TryFrom<u32>>(s: &str) -> Option<T> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(s, 16)
        .ok()
        .and_then(|v| T::try_from(v).ok())
}

#[derive(Debug, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub subclasses: AHashMap<u8, Subclass>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Subclass {
    pub name: String,
    /// Called protocols in `usb.ids`
    pub program_interfaces: AHashMap<u8, ProgrammingInterface>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct ProgrammingInterface {
    pub name: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Vendor {
    pub name: String,
    pub devices: AHashMap<u16, Device>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Device {
    pub name: String,
    /// PCI only
    pub subsystems: AHashMap<(u16, u16), Subsystem>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Subsystem {
    pub name: String,
}

/// Result from [`IdDb::lookup`] and [`IdDb::readable`]
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NameLookup<S> {
    pub class: Option<S>,
    pub vendor: Option<S>,
    pub device: Option<S>,
}

impl NameLookup<&str> {
    #[must_use]
    pub fn into_owned(self) -> NameLookup<String> {
        NameLookup {
            class: self.class.map(str::to_owned),
            vendor: self.vendor.map(str::to_owned),
            device: self.device.map(str::to_owned),
        }
    }
}
