use std::sync::Arc;

use async_trait::async_trait;
use common::CitizenId;
use domain::{
    Address, Citizen, CitizenChanges, Credential, NationalId, NewAddress, NewCitizen,
    NewCredential,
};

use crate::Result;

/// Keyed storage for citizens.
///
/// Each store is independently owned; nothing here spans more than one
/// store. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CitizenStore: Send + Sync {
    /// Inserts a citizen. The assigned id is not returned; callers that need
    /// it read the record back by national id.
    ///
    /// Fails with `Duplicate` when the national id is taken.
    async fn create(&self, citizen: &NewCitizen) -> Result<()>;

    /// Returns every citizen ordered by id.
    async fn list(&self) -> Result<Vec<Citizen>>;

    /// Looks a citizen up by business key.
    async fn get_by_national_id(&self, national_id: &NationalId) -> Result<Citizen>;

    /// Looks a citizen up by store-assigned id.
    async fn get_by_id(&self, id: CitizenId) -> Result<Citizen>;

    /// Overwrites the mutable fields of an existing citizen.
    async fn update(&self, national_id: &NationalId, changes: &CitizenChanges) -> Result<()>;

    /// Removes a citizen. Fails with `NotFound` when absent.
    async fn delete_by_national_id(&self, national_id: &NationalId) -> Result<()>;
}

/// Keyed storage for credentials, at most one per citizen.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Attaches a credential to a citizen. Fails with `Duplicate` when the
    /// citizen already has one or the folio is taken.
    async fn create(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()>;

    /// Returns every credential ordered by owner.
    async fn list(&self) -> Result<Vec<Credential>>;

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Credential>;

    async fn update(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()>;

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()>;
}

/// Keyed storage for addresses, at most one per citizen.
#[async_trait]
pub trait AddressStore: Send + Sync {
    /// Attaches an address to a citizen. Fails with `Duplicate` when the
    /// citizen already has one.
    async fn create(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()>;

    /// Returns every address ordered by owner.
    async fn list(&self) -> Result<Vec<Address>>;

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Address>;

    async fn update(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()>;

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()>;
}

#[async_trait]
impl<T: CitizenStore + ?Sized> CitizenStore for Arc<T> {
    async fn create(&self, citizen: &NewCitizen) -> Result<()> {
        (**self).create(citizen).await
    }

    async fn list(&self) -> Result<Vec<Citizen>> {
        (**self).list().await
    }

    async fn get_by_national_id(&self, national_id: &NationalId) -> Result<Citizen> {
        (**self).get_by_national_id(national_id).await
    }

    async fn get_by_id(&self, id: CitizenId) -> Result<Citizen> {
        (**self).get_by_id(id).await
    }

    async fn update(&self, national_id: &NationalId, changes: &CitizenChanges) -> Result<()> {
        (**self).update(national_id, changes).await
    }

    async fn delete_by_national_id(&self, national_id: &NationalId) -> Result<()> {
        (**self).delete_by_national_id(national_id).await
    }
}

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn create(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        (**self).create(citizen_id, credential).await
    }

    async fn list(&self) -> Result<Vec<Credential>> {
        (**self).list().await
    }

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Credential> {
        (**self).get_by_citizen(citizen_id).await
    }

    async fn update(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        (**self).update(citizen_id, credential).await
    }

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        (**self).delete_by_citizen(citizen_id).await
    }
}

#[async_trait]
impl<T: AddressStore + ?Sized> AddressStore for Arc<T> {
    async fn create(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        (**self).create(citizen_id, address).await
    }

    async fn list(&self) -> Result<Vec<Address>> {
        (**self).list().await
    }

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Address> {
        (**self).get_by_citizen(citizen_id).await
    }

    async fn update(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        (**self).update(citizen_id, address).await
    }

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        (**self).delete_by_citizen(citizen_id).await
    }
}
