//! Extension fields support for OpenAPI objects.
//!
//! Every object in the document graph keeps the fields the static model does
//! not know about, so that a decode/encode round trip reproduces them
//! unchanged. Specification extensions (`x-*` keys) are the common case, but
//! any unrecognised key is retained.

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// An ordered map of fields not recognised by the object that holds them.
///
/// Insertion order is kept so re-encoding a decoded document reproduces the
/// fields in the order they were read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Extensions(IndexMap<String, Value>);

impl Extensions {
    /// Create a new empty extensions map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Remove a field, keeping the order of the remaining ones
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Only the `x-*` specification extensions
    pub fn specification_extensions(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(key, _)| is_extension_key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Merge another extensions map into this one
    pub fn merge(&mut self, other: Extensions) {
        self.0.extend(other.0);
    }

    /// Builder pattern for adding extensions
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
}

impl From<IndexMap<String, Value>> for Extensions {
    fn from(map: IndexMap<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Extensions {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Extensions {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Extensions {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Whether `key` is an OpenAPI specification extension (`x-` followed by a name)
pub fn is_extension_key(key: &str) -> bool {
    key.len() > 2 && key.starts_with("x-")
}

/// Capability shared by every node type: access to its unrecognised fields.
pub trait Extensible {
    fn extensions(&self) -> &Extensions;

    fn extensions_mut(&mut self) -> &mut Extensions;

    /// Look up a single unrecognised field
    fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions().get(key)
    }
}

macro_rules! impl_extensible {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Extensible for $ty {
                fn extensions(&self) -> &$crate::Extensions {
                    &self.extensions
                }

                fn extensions_mut(&mut self) -> &mut $crate::Extensions {
                    &mut self.extensions
                }
            }
        )+
    };
}

pub(crate) use impl_extensible;

/// Deserialize a patterned map whose `x-*` keys are extensions rather than
/// entries (used by `Paths` and `Responses`).
pub(crate) fn deserialize_patterned<'de, D, T>(
    deserializer: D,
) -> Result<(IndexMap<String, T>, Extensions), D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
    let mut entries = IndexMap::with_capacity(raw.len());
    let mut extensions = Extensions::new();

    for (key, value) in raw {
        if key.starts_with("x-") {
            extensions.insert(key, value);
        } else {
            let entry = serde_json::from_value(value)
                .map_err(|e| D::Error::custom(format!("{key}: {e}")))?;
            entries.insert(key, entry);
        }
    }

    Ok((entries, extensions))
}

/// Counterpart of [`deserialize_patterned`]: entries first, then extensions.
pub(crate) fn serialize_patterned<S, T>(
    entries: &IndexMap<String, T>,
    extensions: &Extensions,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let mut map = serializer.serialize_map(Some(entries.len() + extensions.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    for (key, value) in extensions {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

/// Helper macro for creating extensions
#[macro_export]
macro_rules! extensions {
    () => {
        $crate::Extensions::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut ext = $crate::Extensions::new();
        $(
            ext.insert($key, $value);
        )+
        ext
    }};
}
