//! The composite citizen record returned by read workflows.

use common::{CitizenId, EntityKind};
use domain::{Address, Citizen, Credential};
use serde::Serialize;

use crate::{ProjectionError, Result};

/// A citizen together with its optional credential and domicile.
///
/// Serializes flat: the citizen fields sit at the top level next to the
/// nested `credential` and `domicile` objects, either of which may be `null`.
/// Every present dependent is owned by the citizen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeRecord {
    #[serde(flatten)]
    citizen: Citizen,
    credential: Option<Credential>,
    domicile: Option<Address>,
}

impl CompositeRecord {
    /// Assembles a record, rejecting dependents owned by another citizen.
    pub fn assemble(
        citizen: Citizen,
        credential: Option<Credential>,
        domicile: Option<Address>,
    ) -> Result<Self> {
        if let Some(credential) = &credential {
            check_owner(EntityKind::Credential, citizen.id, credential.citizen_id)?;
        }
        if let Some(domicile) = &domicile {
            check_owner(EntityKind::Address, citizen.id, domicile.citizen_id)?;
        }

        Ok(Self {
            citizen,
            credential,
            domicile,
        })
    }

    /// A record with both dependents absent.
    pub fn citizen_only(citizen: Citizen) -> Self {
        Self {
            citizen,
            credential: None,
            domicile: None,
        }
    }

    pub fn citizen_id(&self) -> CitizenId {
        self.citizen.id
    }

    pub fn citizen(&self) -> &Citizen {
        &self.citizen
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn domicile(&self) -> Option<&Address> {
        self.domicile.as_ref()
    }

    /// Splits the record back into its per-entity parts.
    pub fn into_parts(self) -> (Citizen, Option<Credential>, Option<Address>) {
        (self.citizen, self.credential, self.domicile)
    }
}

fn check_owner(entity: EntityKind, expected: CitizenId, actual: CitizenId) -> Result<()> {
    if expected != actual {
        return Err(ProjectionError::OwnerMismatch {
            entity,
            expected,
            actual,
        });
    }
    Ok(())
}
