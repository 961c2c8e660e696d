//! Presentation records as supplied by the submission store.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a submitted presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub Uuid);

impl SubmissionId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of the event (submission thread) a presentation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub Uuid);

impl EventId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Laboratory a presenter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaboratoryId(pub i64);

impl LaboratoryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LaboratoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key presentations are sorted and tie-broken by.
///
/// Compared as text: `"10"` sorts before `"2"`. Student numbers are stored
/// as strings and legacy programs were ordered byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderingKey(String);

impl OrderingKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Integer reading of the key, `0` when it is not numeric.
    pub fn numeric_or_zero(&self) -> i64 {
        self.0.trim().parse().unwrap_or(0)
    }
}

impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OrderingKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for OrderingKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A presentation waiting to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: SubmissionId,
    pub laboratory_id: LaboratoryId,
    /// Display name of the laboratory.
    #[serde(default)]
    pub laboratory: String,
    pub ordering_key: OrderingKey,
    /// Presenter's name as printed in the program.
    pub display_name: String,
    /// Title of the talk.
    pub theme: String,
}

impl Presentation {
    pub fn new(
        laboratory_id: LaboratoryId,
        ordering_key: impl Into<OrderingKey>,
        display_name: impl Into<String>,
        theme: impl Into<String>,
    ) -> Self {
        Self {
            id: SubmissionId::generate(),
            laboratory_id,
            laboratory: String::new(),
            ordering_key: ordering_key.into(),
            display_name: display_name.into(),
            theme: theme.into(),
        }
    }

    pub fn with_id(mut self, id: SubmissionId) -> Self {
        self.id = id;
        self
    }

    pub fn with_laboratory(mut self, laboratory: impl Into<String>) -> Self {
        self.laboratory = laboratory.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_key_is_lexicographic() {
        let ten = OrderingKey::new("10");
        let two = OrderingKey::new("2");
        assert!(ten < two);
    }

    #[test]
    fn test_ordering_key_sort() {
        let mut keys: Vec<OrderingKey> =
            ["3", "10", "2", "1"].iter().map(|k| (*k).into()).collect();
        keys.sort();
        let sorted: Vec<&str> = keys.iter().map(OrderingKey::as_str).collect();
        assert_eq!(sorted, vec!["1", "10", "2", "3"]);
    }

    #[test]
    fn test_numeric_or_zero() {
        assert_eq!(OrderingKey::new("20231042").numeric_or_zero(), 20231042);
        assert_eq!(OrderingKey::new("B1234").numeric_or_zero(), 0);
        assert_eq!(OrderingKey::new("").numeric_or_zero(), 0);
    }

    #[test]
    fn test_laboratory_id_display() {
        assert_eq!(LaboratoryId::new(3).to_string(), "3");
    }

    #[test]
    fn test_presentation_builder() {
        let id = SubmissionId::generate();
        let p = Presentation::new(LaboratoryId::new(1), "42", "Aoki", "Graph coloring")
            .with_id(id)
            .with_laboratory("Kuroki Lab");
        assert_eq!(p.id, id);
        assert_eq!(p.laboratory, "Kuroki Lab");
        assert_eq!(p.ordering_key.as_str(), "42");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&LaboratoryId::new(2)).unwrap();
        assert_eq!(json, "2");
    }
}
