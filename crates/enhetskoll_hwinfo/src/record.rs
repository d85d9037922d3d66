//! The attribute record produced for each discovered device

use std::collections::BTreeMap;

use compact_str::CompactString;

/// Attributes of one device, keyed by logical attribute name.
///
/// Records are immutable once built. The scanners hand them to the caller by
/// value and never look at them again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DeviceRecord {
    attributes: BTreeMap<CompactString, CompactString>,
}

impl DeviceRecord {
    /// Get the value of an attribute
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(CompactString::as_str)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterate over `(name, value)` pairs, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy of this record with one attribute set to a new value
    #[must_use]
    pub fn with_attribute(&self, name: &str, value: impl Into<CompactString>) -> Self {
        let mut attributes = self.attributes.clone();
        attributes.insert(name.into(), value.into());
        Self { attributes }
    }
}

impl<K, V> FromIterator<(K, V)> for DeviceRecord
where
    K: Into<CompactString>,
    V: Into<CompactString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            attributes: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl std::fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}
