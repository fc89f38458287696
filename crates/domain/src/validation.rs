//! Validation gate for incoming payloads.
//!
//! Each function checks one entity kind and stops at the first violated rule.
//! Success yields the typed record the stores accept, so nothing downstream
//! has to re-check the raw strings.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;
use crate::registry::{
    CredentialKind, NationalId, NewAddress, NewCitizen, NewCredential, parse_date,
};

/// Raw citizen fields as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenInput {
    #[serde(default, deserialize_with = "text")]
    pub national_id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub paternal_surname: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub birth_date: Option<String>,
}

/// Raw credential fields as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInput {
    #[serde(default, deserialize_with = "text")]
    pub folio: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub issue_date: Option<String>,
}

/// Raw address fields as received on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    #[serde(default, deserialize_with = "text")]
    pub street: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub municipality: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub state: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireValue {
    Text(String),
    Other(IgnoredAny),
}

/// Reads a string field. Any other JSON value counts as missing, so the
/// validation gate reports it instead of the body parser.
fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<WireValue>::deserialize(deserializer)? {
        Some(WireValue::Text(value)) => Some(value),
        Some(WireValue::Other(_)) | None => None,
    })
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Checks the citizen fields.
pub fn validate_citizen(input: &CitizenInput) -> Result<NewCitizen, ValidationError> {
    let national_id = match input.national_id.as_deref() {
        Some(raw) => NationalId::parse(raw)?,
        None => {
            return Err(ValidationError::new(
                "nationalId",
                format!(
                    "nationalId is invalid, it must be a string of {} characters.",
                    NationalId::LENGTH
                ),
            ));
        }
    };

    let first_name = non_blank(input.first_name.as_ref())
        .ok_or_else(|| ValidationError::new("firstName", "firstName is required."))?;

    let paternal_surname = non_blank(input.paternal_surname.as_ref()).ok_or_else(|| {
        ValidationError::new("paternalSurname", "paternalSurname is required.")
    })?;

    let birth_date = input
        .birth_date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| ValidationError::new("birthDate", "birthDate is invalid."))?;

    Ok(NewCitizen {
        national_id,
        first_name: first_name.to_string(),
        paternal_surname: paternal_surname.to_string(),
        birth_date,
    })
}

/// Checks the credential object. `None` means the object was absent.
pub fn validate_credential(
    input: Option<&CredentialInput>,
) -> Result<NewCredential, ValidationError> {
    let input = input.ok_or_else(|| ValidationError::new("credential", "credential is required."))?;

    let folio = non_blank(input.folio.as_ref()).ok_or_else(|| {
        ValidationError::new(
            "folio",
            "folio is required and must be a non-empty string.",
        )
    })?;

    let kind = match input.kind.as_deref() {
        Some(raw) => raw.parse::<CredentialKind>()?,
        None => {
            return Err(ValidationError::new(
                "kind",
                format!(
                    "kind is required and must be one of: {}.",
                    CredentialKind::allowed_values()
                ),
            ));
        }
    };

    let issue_date = input
        .issue_date
        .as_deref()
        .and_then(parse_date)
        .ok_or_else(|| {
            ValidationError::new(
                "issueDate",
                "issueDate is required and must be a valid date.",
            )
        })?;

    Ok(NewCredential {
        folio: folio.to_string(),
        kind,
        issue_date,
    })
}

/// Checks the address object. `None` means the object was absent.
///
/// Municipality and state are passed through unchecked.
pub fn validate_address(input: Option<&AddressInput>) -> Result<NewAddress, ValidationError> {
    let input = input.ok_or_else(|| ValidationError::new("domicile", "domicile is required."))?;

    let street = input
        .street
        .as_deref()
        .filter(|street| !street.is_empty())
        .ok_or_else(|| ValidationError::new("street", "street is required in domicile."))?;

    Ok(NewAddress {
        street: street.to_string(),
        municipality: input.municipality.clone(),
        state: input.state.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citizen_input() -> CitizenInput {
        CitizenInput {
            national_id: Some("RUAA900101MDFZNN09".to_string()),
            first_name: Some("Ana".to_string()),
            paternal_surname: Some("Ruiz".to_string()),
            birth_date: Some("1990-01-01".to_string()),
        }
    }

    fn credential_input() -> CredentialInput {
        CredentialInput {
            folio: Some("F-001".to_string()),
            kind: Some("NEW".to_string()),
            issue_date: Some("2024-01-01".to_string()),
        }
    }

    #[test]
    fn test_valid_citizen_passes() {
        let citizen = validate_citizen(&citizen_input()).unwrap();
        assert_eq!(citizen.national_id.as_str(), "RUAA900101MDFZNN09");
        assert_eq!(citizen.first_name, "Ana");
        assert_eq!(citizen.birth_date.to_string(), "1990-01-01");
    }

    #[test]
    fn test_missing_national_id_is_rejected_first() {
        let input = CitizenInput {
            national_id: None,
            first_name: None,
            ..citizen_input()
        };
        let err = validate_citizen(&input).unwrap_err();
        assert_eq!(err.field, "nationalId");
    }

    #[test]
    fn test_short_national_id_is_rejected() {
        let input = CitizenInput {
            national_id: Some("SHORT".to_string()),
            ..citizen_input()
        };
        let err = validate_citizen(&input).unwrap_err();
        assert_eq!(err.field, "nationalId");
        assert!(err.message.contains("18"));
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let input = CitizenInput {
            first_name: Some("   ".to_string()),
            ..citizen_input()
        };
        assert_eq!(validate_citizen(&input).unwrap_err().field, "firstName");

        let input = CitizenInput {
            paternal_surname: None,
            ..citizen_input()
        };
        assert_eq!(
            validate_citizen(&input).unwrap_err().field,
            "paternalSurname"
        );
    }

    #[test]
    fn test_invalid_birth_date_is_rejected() {
        let input = CitizenInput {
            birth_date: Some("1990-13-01".to_string()),
            ..citizen_input()
        };
        let err = validate_citizen(&input).unwrap_err();
        assert_eq!(err.message, "birthDate is invalid.");
    }

    #[test]
    fn test_absent_credential_is_rejected() {
        let err = validate_credential(None).unwrap_err();
        assert_eq!(err.message, "credential is required.");
    }

    #[test]
    fn test_credential_rules_short_circuit_in_field_order() {
        let input = CredentialInput {
            folio: Some(" ".to_string()),
            kind: Some("INVALID".to_string()),
            issue_date: None,
        };
        assert_eq!(validate_credential(Some(&input)).unwrap_err().field, "folio");

        let input = CredentialInput {
            kind: Some("INVALID".to_string()),
            issue_date: None,
            ..credential_input()
        };
        let err = validate_credential(Some(&input)).unwrap_err();
        assert_eq!(err.field, "kind");
        assert_eq!(
            err.message,
            "kind is required and must be one of: NEW, REPLACEMENT, MODIFICATION."
        );

        let input = CredentialInput {
            issue_date: Some("yesterday".to_string()),
            ..credential_input()
        };
        assert_eq!(
            validate_credential(Some(&input)).unwrap_err().field,
            "issueDate"
        );
    }

    #[test]
    fn test_valid_credential_passes() {
        let credential = validate_credential(Some(&credential_input())).unwrap();
        assert_eq!(credential.folio, "F-001");
        assert_eq!(credential.kind, CredentialKind::New);
    }

    #[test]
    fn test_address_requires_street_only() {
        assert_eq!(
            validate_address(None).unwrap_err().message,
            "domicile is required."
        );

        let err = validate_address(Some(&AddressInput::default())).unwrap_err();
        assert_eq!(err.field, "street");

        let address = validate_address(Some(&AddressInput {
            street: Some("Av. Reforma 1".to_string()),
            municipality: None,
            state: None,
        }))
        .unwrap();
        assert_eq!(address.street, "Av. Reforma 1");
        assert!(address.municipality.is_none());
    }

    #[test]
    fn test_inputs_deserialize_from_camel_case() {
        let input: CitizenInput = serde_json::from_value(serde_json::json!({
            "nationalId": "RUAA900101MDFZNN09",
            "firstName": "Ana",
            "paternalSurname": "Ruiz",
            "birthDate": "1990-01-01"
        }))
        .unwrap();
        assert_eq!(input, citizen_input());
    }

    #[test]
    fn test_non_string_fields_fail_validation_not_parsing() {
        let input: CitizenInput = serde_json::from_value(serde_json::json!({
            "nationalId": 123,
            "firstName": ["Ana"],
            "paternalSurname": "Ruiz",
            "birthDate": null
        }))
        .unwrap();
        assert_eq!(input.national_id, None);
        assert_eq!(input.first_name, None);
        assert_eq!(input.paternal_surname.as_deref(), Some("Ruiz"));
        assert_eq!(validate_citizen(&input).unwrap_err().field, "nationalId");

        let input: CredentialInput = serde_json::from_value(serde_json::json!({
            "folio": 7,
            "kind": "NEW"
        }))
        .unwrap();
        assert_eq!(validate_credential(Some(&input)).unwrap_err().field, "folio");
    }
}
