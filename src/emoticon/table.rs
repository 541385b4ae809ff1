use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The built-in emoticons, in alternation order.
const DEFAULT_EMOTICONS: [(&str, &str); 15] = [
    (":angry:", "angry"),
    (":blink:", "blink"),
    (":D", "grin"),
    (":huh:", "huh"),
    (":lol:", "lol"),
    (":o", "ohmy"),
    (":ph34r:", "ph34r"),
    (":rolleyes:", "rolleyes"),
    (":(", "sad"),
    (":)", "smile"),
    (":p", "tongue"),
    (":unsure:", "unsure"),
    (":wacko:", "wacko"),
    (";)", "wink"),
    (":wub:", "wub"),
];

/// An ordered mapping from emoticon symbols to image names.
///
/// Order matters: it is the alternation order of the matching pattern, so when one symbol is a
/// prefix of another, whichever comes first wins. Inserting an existing symbol replaces its
/// image name in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmoticonTable(Vec<(String, String)>);

impl Default for EmoticonTable {
    fn default() -> Self {
        DEFAULT_EMOTICONS.into_iter().collect()
    }
}

impl EmoticonTable {
    /// Creates an empty table. See [`EmoticonTable::default`] for the built-in one.
    pub fn new() -> Self {
        EmoticonTable(Vec::new())
    }

    /// Inserts or replaces a symbol, returning the image name it previously mapped to.
    pub fn insert(&mut self, symbol: impl Into<String>, image: impl Into<String>) -> Option<String> {
        let symbol = symbol.into();
        let image = image.into();

        match self.0.iter_mut().find(|(s, _)| *s == symbol) {
            Some((_, existing)) => Some(std::mem::replace(existing, image)),
            None => {
                self.0.push((symbol, image));
                None
            }
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|(_, image)| image.as_str())
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(s, i)| (s.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S, I> FromIterator<(S, I)> for EmoticonTable
where
    S: Into<String>,
    I: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (S, I)>>(iter: T) -> Self {
        let mut table = EmoticonTable::new();
        for (symbol, image) in iter {
            table.insert(symbol, image);
        }
        table
    }
}

impl Serialize for EmoticonTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (symbol, image) in &self.0 {
            map.serialize_entry(symbol, image)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EmoticonTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}

/// Deserializes a map in document order.
struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = EmoticonTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of emoticon symbols to image names")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut table = EmoticonTable::new();
        while let Some((symbol, image)) = access.next_entry::<String, String>()? {
            table.insert(symbol, image);
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let table = EmoticonTable::default();

        assert_eq!(table.len(), 15);
        assert_eq!(table.get(":p"), Some("tongue"));
        assert_eq!(table.get(";)"), Some("wink"));
        assert_eq!(table.symbols().next(), Some(":angry:"));
        assert_eq!(table.get(":-)"), None);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut table: EmoticonTable = [("a", "1"), ("b", "2")].into_iter().collect();

        assert_eq!(table.insert("a", "3"), Some("1".to_owned()));
        assert_eq!(table.insert("c", "4"), None);
        assert_eq!(
            table.iter().collect::<Vec<_>>(),
            vec![("a", "3"), ("b", "2"), ("c", "4")]
        );
    }

    #[test]
    fn deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            table: EmoticonTable,
        }

        let wrapper: Wrapper = toml::from_str(
            r#"
            [table]
            ":)" = "happy"
            "<3" = "heart"
            "#,
        )
        .unwrap();

        assert_eq!(wrapper.table.len(), 2);
        assert_eq!(wrapper.table.get(":)"), Some("happy"));
        assert_eq!(wrapper.table.get("<3"), Some("heart"));
    }
}
