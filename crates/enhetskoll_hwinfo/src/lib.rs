//! Hardware enumeration for `EnhetsKoll`
//!
//! Walks the Linux sysfs device tree for PCI and USB devices and produces one
//! flat attribute record per device (per interface class for composite USB
//! devices). It also knows how to turn the long names from `pci.ids` and
//! `usb.ids` into short names suitable for labels.
//!
//! Everything here is Linux only and should work without root access.
//!
//! ```no_run
//! use enhetskoll_hwinfo::config::ScanConfiguration;
//! use enhetskoll_hwinfo::pci::PciScanner;
//! use enhetskoll_hwinfo::scan::LogObserver;
//! use enhetskoll_hwinfo::scan::Scanner;
//!
//! let config = ScanConfiguration::default();
//! for record in PciScanner::new(&config).scan(&LogObserver)? {
//!     println!("{record}");
//! }
//! # Ok::<(), enhetskoll_hwinfo::scan::ScanError>(())
//! ```

pub mod attribute;
pub mod bus;
pub mod config;
pub mod ids;
pub mod pci;
pub mod readable;
mod record;
pub mod scan;
pub mod usb;

pub use bus::Bus;
pub use record::DeviceRecord;

/// Create the scanner for a bus
#[must_use]
pub fn scanner_for(bus: Bus, config: &config::ScanConfiguration) -> Box<dyn scan::Scanner> {
    match bus {
        Bus::Pci => Box::new(pci::PciScanner::new(config)),
        Bus::Usb => Box::new(usb::UsbScanner::new(config)),
    }
}
