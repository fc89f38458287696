//! Request-side composite shape.

use domain::{AddressInput, CitizenInput, CredentialInput};
use serde::{Deserialize, Serialize};

/// A composite request body: citizen fields at the top level, with optional
/// nested `credential` and `domicile` objects.
///
/// `address` is accepted as an alias for `domicile`. Whether the dependents
/// are required is up to the workflow (registration needs both, updates
/// treat them as optional).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositePayload {
    #[serde(flatten)]
    pub citizen: CitizenInput,
    #[serde(default)]
    pub credential: Option<CredentialInput>,
    #[serde(default, alias = "address")]
    pub domicile: Option<AddressInput>,
}

impl CompositePayload {
    /// Replaces the business key, e.g. with the one taken from a request path.
    pub fn with_national_id(mut self, national_id: impl Into<String>) -> Self {
        self.citizen.national_id = Some(national_id.into());
        self
    }

    /// Splits the payload into the per-entity inputs.
    pub fn split(self) -> (CitizenInput, Option<CredentialInput>, Option<AddressInput>) {
        (self.citizen, self.credential, self.domicile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserializes_full_registration_body() {
        let payload: CompositePayload = serde_json::from_value(json!({
            "nationalId": "RUAA900101MDFZNN09",
            "firstName": "Ana",
            "paternalSurname": "Ruiz",
            "birthDate": "1990-01-01",
            "credential": { "folio": "F-001", "kind": "NEW", "issueDate": "2024-01-01" },
            "domicile": { "street": "Av. Reforma 1", "municipality": "CDMX", "state": "CDMX" }
        }))
        .unwrap();

        let (citizen, credential, domicile) = payload.split();
        assert_eq!(citizen.first_name.as_deref(), Some("Ana"));
        assert_eq!(credential.unwrap().kind.as_deref(), Some("NEW"));
        assert_eq!(domicile.unwrap().street.as_deref(), Some("Av. Reforma 1"));
    }

    #[test]
    fn test_address_alias_fills_domicile() {
        let payload: CompositePayload = serde_json::from_value(json!({
            "nationalId": "RUAA900101MDFZNN09",
            "address": { "street": "Calle 5" }
        }))
        .unwrap();

        assert_eq!(
            payload.domicile.and_then(|d| d.street).as_deref(),
            Some("Calle 5")
        );
    }

    #[test]
    fn test_dependents_are_optional_and_null_tolerant() {
        let payload: CompositePayload = serde_json::from_value(json!({
            "firstName": "Ana",
            "credential": null
        }))
        .unwrap();

        assert!(payload.credential.is_none());
        assert!(payload.domicile.is_none());
        assert!(payload.citizen.national_id.is_none());
    }

    #[test]
    fn test_path_key_overrides_body_key() {
        let payload: CompositePayload = serde_json::from_value(json!({
            "nationalId": "XXXXXXXXXXXXXXXXXX",
            "firstName": "Ana"
        }))
        .unwrap();

        let payload = payload.with_national_id("RUAA900101MDFZNN09");
        assert_eq!(
            payload.citizen.national_id.as_deref(),
            Some("RUAA900101MDFZNN09")
        );
    }
}
