use serde::{Deserialize, Serialize};

/// Internal identifier of a citizen, assigned by the citizen store.
///
/// Distinct from the national id (the business key). Dependents reference
/// their owner through this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenId(i64);

impl CitizenId {
    /// Wraps a raw store id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw store id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for CitizenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CitizenId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<CitizenId> for i64 {
    fn from(id: CitizenId) -> Self {
        id.0
    }
}

impl std::str::FromStr for CitizenId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// The three entity kinds owned by separate stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Citizen,
    Credential,
    Address,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Citizen => "citizen",
            EntityKind::Credential => "credential",
            EntityKind::Address => "address",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citizen_id_serializes_as_plain_number() {
        let id = CitizenId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: CitizenId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_citizen_id_parses_from_path_segment() {
        assert_eq!("17".parse::<CitizenId>().unwrap(), CitizenId::new(17));
        assert!("abc".parse::<CitizenId>().is_err());
    }

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Citizen.to_string(), "citizen");
        assert_eq!(EntityKind::Credential.to_string(), "credential");
        assert_eq!(EntityKind::Address.to_string(), "address");
    }
}
