//! Insertion-ordered set of participant names

use serde::{Deserialize, Deserializer, Serialize};

/// Participants of a point, unique by name, in first-response order
///
/// Serializes as a plain JSON array so snapshots list participants in a
/// stable order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParticipantSet(Vec<String>);

impl ParticipantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a participant. Returns `false` if already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.0.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|p| p == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for ParticipantSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.into_iter().collect())
    }
}

impl FromIterator<String> for ParticipantSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        let mut set = ParticipantSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}
