//! Derive short, label friendly names from human readable ID database names
//!
//! Database names such as `Advanced Micro Devices, Inc. [AMD/ATI]` are too
//! long and noisy to use as labels. The functions here turn them into things
//! like `AMD-ATI`, with a bounded length.
//!
//! PCI and USB use the same algorithm with different parameters, see
//! [`NameStrategy::PCI`] and [`NameStrategy::USB`].

pub mod suffixes;

use crate::Bus;
use suffixes::MembershipSet;

/// Returned for vendors the database marks as having a wrong ID
const WRONG_ID: &str = "Wrong-ID";

/// Selects one of the static word sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WordSet {
    PciVendorSuffixes,
    UsbVendorSuffixes,
    PciDeviceNoise,
}

impl WordSet {
    fn get(self) -> &'static MembershipSet {
        match self {
            Self::PciVendorSuffixes => &suffixes::PCI_VENDOR_SUFFIX_SET,
            Self::UsbVendorSuffixes => &suffixes::USB_VENDOR_SUFFIX_SET,
            Self::PciDeviceNoise => &suffixes::PCI_DEVICE_NOISE_SET,
        }
    }
}

/// Parameters of the readable name derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameStrategy {
    class_max_len: Option<usize>,
    vendor_max_len: usize,
    vendor_suffixes: WordSet,
    /// Trimmed from the first two words of a vendor name
    vendor_word_trim: &'static [char],
    /// Use `[Alias]` at the end of a vendor name
    vendor_bracket_alias: bool,
    vendor_cleanup_trim: &'static [char],
    vendor_strip_dots: bool,
    device_max_len: usize,
    /// Only use the first `[...]` part of a device name, if there is one
    device_bracket_extract: bool,
    device_noise: Option<WordSet>,
    device_word_trim: &'static [char],
    /// Removed before truncation
    device_removed: &'static [char],
    /// Replaced with `-` after truncation
    device_replaced: &'static [char],
}

impl NameStrategy {
    pub const PCI: Self = Self {
        class_max_len: Some(4),
        vendor_max_len: 10,
        vendor_suffixes: WordSet::PciVendorSuffixes,
        vendor_word_trim: &['.', ',', '?'],
        vendor_bracket_alias: true,
        vendor_cleanup_trim: &['-', '/', '&'],
        vendor_strip_dots: false,
        device_max_len: 35,
        device_bracket_extract: true,
        device_noise: Some(WordSet::PciDeviceNoise),
        device_word_trim: &['-', '/', '&', '(', ')'],
        device_removed: &['(', ')'],
        device_replaced: &['/', '&'],
    };

    pub const USB: Self = Self {
        class_max_len: None,
        vendor_max_len: 10,
        vendor_suffixes: WordSet::UsbVendorSuffixes,
        vendor_word_trim: &['.', ',', '?', '[', ']', '(', ')'],
        vendor_bracket_alias: false,
        vendor_cleanup_trim: &['-', '/', '&', '+'],
        vendor_strip_dots: true,
        device_max_len: 33,
        device_bracket_extract: false,
        device_noise: None,
        device_word_trim: &[
            '-', '/', '&', '*', '+', '[', ']', '(', ')', '~', '.', ',', '#', 'Â', '®', '"',
        ],
        device_removed: &[],
        device_replaced: &['/', '&', '*', '+', '^', '\\', '(', ')'],
    };

    #[must_use]
    pub const fn for_bus(bus: Bus) -> &'static Self {
        match bus {
            Bus::Pci => &Self::PCI,
            Bus::Usb => &Self::USB,
        }
    }

    /// Readable class name.
    ///
    /// For PCI this is the first word, cut to four characters. USB class
    /// names are used as is.
    #[must_use]
    pub fn class(&self, name: &str) -> String {
        match self.class_max_len {
            Some(max) => name
                .split_whitespace()
                .next()
                .map(|word| truncate(word, max))
                .unwrap_or_default()
                .to_string(),
            None => name.to_string(),
        }
    }

    /// Readable vendor name: usually the first word, or the first two if the
    /// second one isn't a legal suffix like `Inc.`
    #[must_use]
    pub fn vendor(&self, name: &str) -> String {
        let words: Vec<&str> = name.split_whitespace().collect();
        let (Some(first), Some(last)) = (words.first(), words.last()) else {
            return String::new();
        };
        if *last == "ID)" {
            return WRONG_ID.to_string();
        }

        let max = self.vendor_max_len;
        let first = first.trim_matches(self.vendor_word_trim);
        let result = if self.vendor_bracket_alias && last.starts_with('[') {
            bracket_alias(last).to_string()
        } else if first.len() > max {
            truncate(first, max).to_string()
        } else {
            match words.get(1) {
                Some(second) if !self.vendor_suffixes.get().contains(second) => {
                    let joined = format!("{first}-{}", second.trim_matches(self.vendor_word_trim));
                    truncate(&joined, max).to_string()
                }
                _ => first.to_string(),
            }
        };

        let result = result
            .trim_matches(self.vendor_cleanup_trim)
            .replace('/', "-");
        if self.vendor_strip_dots {
            result.replace('.', "")
        } else {
            result
        }
    }

    /// Readable device name: the words of the name joined with `-`, without
    /// noise words and punctuation.
    #[must_use]
    pub fn device(&self, name: &str) -> String {
        let name = if self.device_bracket_extract {
            bracketed(name).unwrap_or(name)
        } else {
            name
        };
        let noise = self.device_noise.map(WordSet::get);

        let mut result = String::with_capacity(name.len() + 1);
        for word in name.split_whitespace() {
            if noise.is_some_and(|noise| noise.contains(word)) {
                continue;
            }
            let word = word.trim_matches(self.device_word_trim);
            if !word.is_empty() {
                result.push_str(word);
                result.push('-');
            }
        }

        result.retain(|c| !self.device_removed.contains(&c));
        if result.len() > self.device_max_len {
            let end = truncate(&result, self.device_max_len - 1).len();
            result.truncate(end);
        }
        let result: String = result
            .chars()
            .map(|c| {
                if self.device_replaced.contains(&c) {
                    '-'
                } else {
                    c
                }
            })
            .collect();
        result.trim_matches('-').to_string()
    }
}

/// Readable class name for the given bus
#[must_use]
pub fn readable_class(bus: Bus, name: &str) -> String {
    NameStrategy::for_bus(bus).class(name)
}

/// Readable vendor name for the given bus
#[must_use]
pub fn readable_vendor(bus: Bus, name: &str) -> String {
    NameStrategy::for_bus(bus).vendor(name)
}

/// Readable device name for the given bus
#[must_use]
pub fn readable_device(bus: Bus, name: &str) -> String {
    NameStrategy::for_bus(bus).device(name)
}

/// Cut `s` to at most `max` bytes, without splitting a character
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// `[AMD/ATI]` -> `AMD/ATI`. Drops the last character even if it isn't `]`.
fn bracket_alias(word: &str) -> &str {
    let inner = &word[1..];
    inner
        .char_indices()
        .next_back()
        .map_or("", |(idx, _)| &inner[..idx])
}

/// Text after the first `[`, up to the following `]` (or the end)
fn bracketed(name: &str) -> Option<&str> {
    let (_, rest) = name.split_once('[')?;
    Some(rest.split_once(']').map_or(rest, |(inside, _)| inside))
}
