//! Words that carry no information in vendor and device names

use std::sync::LazyLock;

/// An immutable set of words, sorted once at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSet {
    words: Box<[&'static str]>,
}

impl MembershipSet {
    #[must_use]
    pub fn new(words: &[&'static str]) -> Self {
        let mut words = words.to_vec();
        words.sort_unstable();
        words.dedup();
        Self {
            words: words.into_boxed_slice(),
        }
    }

    /// Check if `word` is in the set (exact, case sensitive match)
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words
            .binary_search_by(|probe| (*probe).cmp(word))
            .is_ok()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Legal entity and similar suffixes of vendor names
const VENDOR_SUFFIXES: &[&str] = &[
    "Corporation",
    "Corp.",
    "Corp.,",
    "Corp",
    "corp.",
    "Co.",
    "Co",
    "co.",
    "co.,",
    "CO.,",
    "Co.,",
    "Co.,Ltd",
    "Co.,LTD.",
    "Co.,Ltd.",
    "INC.",
    "INC",
    "Inc.",
    "Inc",
    "Inc,",
    "inc.",
    "Ltd.",
    "Ltd",
    "LTD.",
    "ltd.",
    "Technologies",
    "Technologies,",
    "Technology",
    "Technology,",
    "Information",
    "Company",
    "Group",
    "LLC",
    "LLC.",
];

/// The USB ID database has a lot of these
const USB_EXTRA_VENDOR_SUFFIXES: &[&str] = &["Electronics", "ELECTRONICS", "Electric", "ELECTRIC"];

/// Generic words in PCI device names
const PCI_DEVICE_NOISE: &[&str] = &[
    "Processor",
    "Controller",
    "Adapter",
    "Integrated",
    "Technology",
    "Graphics",
    "Display",
    "PCI",
    "PCIe",
    "PCI-e",
    "PCI-to-PCI",
];

pub(crate) static PCI_VENDOR_SUFFIX_SET: LazyLock<MembershipSet> =
    LazyLock::new(|| MembershipSet::new(VENDOR_SUFFIXES));

pub(crate) static USB_VENDOR_SUFFIX_SET: LazyLock<MembershipSet> =
    LazyLock::new(|| MembershipSet::new(&[VENDOR_SUFFIXES, USB_EXTRA_VENDOR_SUFFIXES].concat()));

pub(crate) static PCI_DEVICE_NOISE_SET: LazyLock<MembershipSet> =
    LazyLock::new(|| MembershipSet::new(PCI_DEVICE_NOISE));

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_contains() {
        let set = MembershipSet::new(&[
            "Corp.",
            "Corp",
            "Corporation",
            "Co",
            "Inc.",
            "Inc",
            "Co,.Ltd",
            "Ltd.",
            "Ltd",
            "Technologies",
            "Technology",
            "Information",
            "Company",
            "Group",
            "LLC",
        ]);
        let tests = [
            ("Corp", true),
            ("Corporation", true),
            ("Co", true),
            ("Inc", true),
            ("Technologies", true),
            ("LLC", true),
            ("Scoop", false),
            ("corp", false),
            ("", false),
        ];
        for (input, wanted) in tests {
            assert_eq!(set.contains(input), wanted, "{input}");
        }
    }

    #[test]
    fn test_usb_vendor_suffixes() {
        let tests = [
            ("Corp", true),
            ("Corporation", true),
            ("Co.,Ltd", true),
            ("Inc", true),
            ("Technologies", true),
            ("LLC", true),
            ("Electronics", true),
            ("ELECTRIC", true),
            ("Scoop", false),
        ];
        for (input, wanted) in tests {
            assert_eq!(USB_VENDOR_SUFFIX_SET.contains(input), wanted, "{input}");
        }
        assert!(!PCI_VENDOR_SUFFIX_SET.contains("Electronics"));
    }

    #[test]
    fn test_query_order_does_not_matter() {
        let words = ["Group", "Scoop", "Co.,", "Graphics", "Inc", "Zeta", "Co.,"];
        let forward: Vec<_> = words
            .iter()
            .map(|w| PCI_VENDOR_SUFFIX_SET.contains(w))
            .collect();
        let mut backward: Vec<_> = words
            .iter()
            .rev()
            .map(|w| PCI_VENDOR_SUFFIX_SET.contains(w))
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            vec![true, false, true, false, true, false, true]
        );
    }

    #[test]
    fn test_dedup() {
        let set = MembershipSet::new(&["b", "a", "b", "c", "a"]);
        assert_eq!(set.len(), 3);
        assert!(set.contains("a") && set.contains("b") && set.contains("c"));
        assert!(MembershipSet::new(&[]).is_empty());
    }

    #[test]
    fn test_device_noise() {
        assert!(PCI_DEVICE_NOISE_SET.contains("PCI-to-PCI"));
        assert!(PCI_DEVICE_NOISE_SET.contains("Graphics"));
        assert!(!PCI_DEVICE_NOISE_SET.contains("graphics"));
    }
}
