//! Integration tests for the validation gate.
//!
//! These tests feed JSON bodies, shaped as clients send them, through the
//! public validation functions.

use domain::{
    AddressInput, CitizenInput, CredentialInput, CredentialKind, validate_address,
    validate_citizen, validate_credential,
};
use serde_json::json;

fn citizen_from(body: serde_json::Value) -> CitizenInput {
    serde_json::from_value(body).unwrap()
}

mod citizen_rules {
    use super::*;

    #[test]
    fn test_accepts_complete_citizen() {
        let input = citizen_from(json!({
            "nationalId": "RUAA900101MDFZNN09",
            "firstName": "  Ana ",
            "paternalSurname": "Ruiz",
            "birthDate": "1990-01-01"
        }));

        let citizen = validate_citizen(&input).unwrap();
        assert_eq!(citizen.first_name, "Ana");
        assert_eq!(citizen.paternal_surname, "Ruiz");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let input = citizen_from(json!({
            "nationalId": "RUAA900101MDFZNN09",
            "firstName": "Ana",
            "paternalSurname": "Ruiz",
            "birthDate": "1990-01-01",
            "maternalSurname": "Lopez"
        }));

        assert!(validate_citizen(&input).is_ok());
    }

    #[test]
    fn test_empty_body_fails_on_national_id() {
        let err = validate_citizen(&citizen_from(json!({}))).unwrap_err();
        assert_eq!(err.field, "nationalId");
    }
}

mod dependent_rules {
    use super::*;

    #[test]
    fn test_every_kind_is_accepted() {
        for kind in CredentialKind::ALL {
            let input: CredentialInput = serde_json::from_value(json!({
                "folio": "F-9",
                "kind": kind.as_str(),
                "issueDate": "2024-03-01"
            }))
            .unwrap();
            assert_eq!(validate_credential(Some(&input)).unwrap().kind, kind);
        }
    }

    #[test]
    fn test_missing_kind_names_allowed_values() {
        let input: CredentialInput =
            serde_json::from_value(json!({ "folio": "F-9", "issueDate": "2024-03-01" })).unwrap();
        let err = validate_credential(Some(&input)).unwrap_err();
        assert!(err.message.contains("NEW, REPLACEMENT, MODIFICATION"));
    }

    #[test]
    fn test_address_without_municipality_or_state_passes() {
        let input: AddressInput =
            serde_json::from_value(json!({ "street": "Av. Reforma 1" })).unwrap();
        let address = validate_address(Some(&input)).unwrap();
        assert_eq!(address.municipality, None);
        assert_eq!(address.state, None);
    }

    #[test]
    fn test_empty_street_is_rejected() {
        let input: AddressInput = serde_json::from_value(json!({ "street": "" })).unwrap();
        assert_eq!(validate_address(Some(&input)).unwrap_err().field, "street");
    }
}
