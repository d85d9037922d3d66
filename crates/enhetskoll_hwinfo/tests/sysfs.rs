//! Scan a fake sysfs tree

use std::cell::RefCell;
use std::path::Path;
use std::path::PathBuf;

use enhetskoll_hwinfo::Bus;
use enhetskoll_hwinfo::DeviceRecord;
use enhetskoll_hwinfo::config::ScanConfiguration;
use enhetskoll_hwinfo::ids::IdDb;
use enhetskoll_hwinfo::scan::ScanError;
use enhetskoll_hwinfo::scan::SkipReason;
use enhetskoll_hwinfo::scanner_for;
use pretty_assertions::assert_eq;

fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (file, contents) in files {
        let path = root.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

fn fake_sysfs() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_files(
        dir.path(),
        &[
            // Complete PCI device
            ("bus/pci/devices/0000:00:02.0/class", "0x030000\n"),
            ("bus/pci/devices/0000:00:02.0/vendor", "0x8086\n"),
            ("bus/pci/devices/0000:00:02.0/device", "0x9a49\n"),
            ("bus/pci/devices/0000:00:02.0/subsystem_vendor", "0x1028\n"),
            ("bus/pci/devices/0000:00:02.0/subsystem_device", "0x0a1f\n"),
            // Missing subsystem_device
            ("bus/pci/devices/0000:00:1f.3/class", "0x040300\n"),
            ("bus/pci/devices/0000:00:1f.3/vendor", "0x8086\n"),
            ("bus/pci/devices/0000:00:1f.3/device", "0xa0c8\n"),
            ("bus/pci/devices/0000:00:1f.3/subsystem_vendor", "0x1028\n"),
            // Root hub
            ("bus/usb/devices/usb1/bDeviceClass", "09\n"),
            ("bus/usb/devices/usb1/idVendor", "1d6b\n"),
            ("bus/usb/devices/usb1/idProduct", "0002\n"),
            ("bus/usb/devices/usb1/serial", "0000:00:14.0\n"),
            // Interface of the root hub, no product ID so not a device
            ("bus/usb/devices/1-0:1.0/bInterfaceClass", "09\n"),
            // Composite device
            ("bus/usb/devices/1-1/bDeviceClass", "00\n"),
            ("bus/usb/devices/1-1/idVendor", "046d\n"),
            ("bus/usb/devices/1-1/idProduct", "c52b\n"),
            ("bus/usb/devices/1-1/1-1:1.0/bInterfaceClass", "03\n"),
            ("bus/usb/devices/1-1/1-1:1.1/bInterfaceClass", "03\n"),
            ("bus/usb/devices/1-1/1-1:1.2/bInterfaceClass", "01\n"),
            // No class at all
            ("bus/usb/devices/1-2/idVendor", "0781\n"),
            ("bus/usb/devices/1-2/idProduct", "5581\n"),
        ],
    );
    dir
}

fn config(root: &Path) -> ScanConfiguration {
    ScanConfiguration::builder()
        .sysfs_root(root)
        .build()
        .unwrap()
}

#[test]
fn test_pci_partial_failure() {
    let sysfs = fake_sysfs();
    let skipped = RefCell::new(vec![]);
    let observer = |bus: Bus, path: &Path, reason: &SkipReason| {
        let attribute = match reason {
            SkipReason::MandatoryAttribute(err) => err.attribute().to_string(),
            other => panic!("Unexpected skip reason: {other}"),
        };
        skipped
            .borrow_mut()
            .push((bus, path.file_name().unwrap().to_owned(), attribute));
    };

    let records = scanner_for(Bus::Pci, &config(sysfs.path()))
        .scan(&observer)
        .unwrap();

    assert_eq!(
        records,
        vec![DeviceRecord::from_iter([
            ("class", "0300"),
            ("vendor", "8086"),
            ("device", "9a49"),
            ("subsystem_vendor", "1028"),
            ("subsystem_device", "0a1f"),
        ])]
    );
    assert_eq!(
        skipped.into_inner(),
        vec![(
            Bus::Pci,
            "0000:00:1f.3".into(),
            "subsystem_device".to_string()
        )]
    );
}

#[test]
fn test_usb_composite_and_order() {
    let sysfs = fake_sysfs();
    let skipped = RefCell::new(Vec::<PathBuf>::new());
    let observer = |_: Bus, path: &Path, _: &SkipReason| {
        skipped.borrow_mut().push(path.to_path_buf());
    };

    let records = scanner_for(Bus::Usb, &config(sysfs.path()))
        .scan(&observer)
        .unwrap();

    let composite = DeviceRecord::from_iter([("vendor", "046d"), ("device", "c52b")]);
    assert_eq!(
        records,
        vec![
            composite.with_attribute("class", "03"),
            composite.with_attribute("class", "01"),
            DeviceRecord::from_iter([("vendor", "0781"), ("device", "5581")]),
            DeviceRecord::from_iter([
                ("class", "09"),
                ("vendor", "1d6b"),
                ("device", "0002"),
                ("serial", "0000:00:14.0"),
            ]),
        ]
    );
    assert!(skipped.into_inner().is_empty());
}

#[test]
fn test_missing_bus_directories() {
    let sysfs = tempfile::tempdir().unwrap();
    let config = config(sysfs.path());
    let skipped = RefCell::new(Vec::<PathBuf>::new());
    let observer = |_: Bus, path: &Path, _: &SkipReason| {
        skipped.borrow_mut().push(path.to_path_buf());
    };

    assert!(matches!(
        scanner_for(Bus::Pci, &config).scan(&observer),
        Err(ScanError::ListDevices { .. })
    ));
    // Nothing matches the probe pattern, which is not an error
    assert_eq!(
        scanner_for(Bus::Usb, &config).scan(&observer).unwrap(),
        vec![]
    );
    assert!(skipped.into_inner().is_empty());
}

#[test]
fn test_readable_names_for_scan() {
    let sysfs = fake_sysfs();
    let db = IdDb::parse(
        "8086  Intel Corporation\n\
         \t9a49  TigerLake-LP GT2 [Iris Xe Graphics]\n\
         C 03  Display controller\n\
         \t00  VGA compatible controller\n",
    )
    .unwrap();
    let observer = |_: Bus, _: &Path, _: &SkipReason| {};

    let records = scanner_for(Bus::Pci, &config(sysfs.path()))
        .scan(&observer)
        .unwrap();
    let names = db.readable(Bus::Pci, &records[0]);

    assert_eq!(names.class.as_deref(), Some("VGA"));
    assert_eq!(names.vendor.as_deref(), Some("Intel"));
    assert_eq!(names.device.as_deref(), Some("Iris-Xe"));
}
