use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

/// Claim names understood by the token service and the evaluator.
pub mod names {
    pub const SUBJECT: &str = "sub";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const GROUPS: &str = "groups";
    pub const SCOPE: &str = "scope";
    pub const ADMIN: &str = "admin";
    pub const TOKEN_ID: &str = "jti";

    /// Registered JWT claims that are token metadata, not principal claims.
    pub(crate) const REGISTERED: &[&str] = &["iss", "aud", "exp", "iat", "nbf"];
}

/// A multimap of claim name to claim value.
///
/// Stored as an ordered list of pairs: a name may repeat (one `groups` claim
/// per membership) and values under the same name keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    entries: Vec<(String, String)>,
}

impl ClaimSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value recorded under `name`.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value recorded under `name`, in insertion order.
    pub fn all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.all(name).any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct claim names in order of first appearance.
    fn distinct_names(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for (name, _) in &self.entries {
            if !seen.contains(&name.as_str()) {
                seen.push(name);
            }
        }
        seen
    }

    /// Rebuild a claim set from a decoded JWT payload object.
    ///
    /// Strings map to one claim, arrays to one claim per element. Registered
    /// claims are skipped; nulls are dropped.
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        let mut claims = ClaimSet::new();
        for (name, value) in object {
            if names::REGISTERED.contains(&name.as_str()) {
                continue;
            }
            match value {
                Value::Array(items) => {
                    for item in items {
                        if let Some(text) = json_text(item) {
                            claims.push(name.clone(), text);
                        }
                    }
                }
                other => {
                    if let Some(text) = json_text(other) {
                        claims.push(name, text);
                    }
                }
            }
        }
        claims
    }
}

fn json_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for ClaimSet {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

// Single-valued names serialize as a string, repeated names as an array.
impl Serialize for ClaimSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let names = self.distinct_names();
        let mut map = serializer.serialize_map(Some(names.len()))?;
        for name in names {
            let values: Vec<&str> = self.all(name).collect();
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClaimSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_json_object(object))
    }
}
