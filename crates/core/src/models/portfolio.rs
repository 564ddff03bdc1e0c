use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A user portfolio exactly as the frontend sends it.
///
/// The object is opaque: no key is required or typed, so ids may be strings
/// or numbers, names may be null, and records round-trip byte-for-byte
/// through storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioRecord(Map<String, Value>);

impl PortfolioRecord {
    /// Record with the usual frontend keys and no holdings.
    pub fn new(id: impl Into<String>, name: impl Into<String>, color: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::String(id.into()));
        fields.insert("name".into(), Value::String(name.into()));
        fields.insert("color".into(), Value::String(color.into()));
        fields.insert("holdings".into(), Value::Array(Vec::new()));
        Self(fields)
    }

    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }

    pub fn holdings(&self) -> Option<&Value> {
        self.0.get("holdings")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a key, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for PortfolioRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
