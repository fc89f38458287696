//! Credential records, one per citizen.

use chrono::NaiveDate;
use common::CitizenId;
use serde::{Deserialize, Serialize};

use super::CredentialKind;

/// A stored credential, owned by a citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub citizen_id: CitizenId,
    pub folio: String,
    pub kind: CredentialKind,
    pub issue_date: NaiveDate,
}

/// Validated credential fields, not yet attached to an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCredential {
    pub folio: String,
    pub kind: CredentialKind,
    pub issue_date: NaiveDate,
}

impl NewCredential {
    pub fn for_citizen(&self, citizen_id: CitizenId) -> Credential {
        Credential {
            citizen_id,
            folio: self.folio.clone(),
            kind: self.kind,
            issue_date: self.issue_date,
        }
    }
}
