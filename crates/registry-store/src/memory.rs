use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CitizenId, EntityKind};
use domain::{
    Address, Citizen, CitizenChanges, Credential, NationalId, NewAddress, NewCitizen,
    NewCredential,
};
use tokio::sync::RwLock;

use crate::store::{AddressStore, CitizenStore, CredentialStore};
use crate::{Result, StoreError};

/// Store operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Read,
    Update,
    Delete,
}

impl Operation {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

/// Per-operation failure switches shared by clones of a store.
#[derive(Debug, Default)]
struct Faults {
    flags: [AtomicBool; Operation::COUNT],
}

impl Faults {
    fn set(&self, operation: Operation, fail: bool) {
        self.flags[operation.index()].store(fail, Ordering::SeqCst);
    }

    fn check(&self, entity: EntityKind, operation: Operation) -> Result<()> {
        if self.flags[operation.index()].load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                entity,
                operation: operation.as_str(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct CitizenTable {
    rows: BTreeMap<CitizenId, Citizen>,
    next_id: i64,
}

impl CitizenTable {
    fn find(&self, national_id: &NationalId) -> Option<&Citizen> {
        self.rows.values().find(|c| &c.national_id == national_id)
    }
}

/// In-memory citizen store.
///
/// Clones share the same rows, so a test can keep a handle for assertions
/// while the orchestrator owns another.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCitizenStore {
    table: Arc<RwLock<CitizenTable>>,
    faults: Arc<Faults>,
}

impl InMemoryCitizenStore {
    /// Creates a new empty in-memory citizen store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the given kind fail until cleared.
    pub fn set_fail_on(&self, operation: Operation, fail: bool) {
        self.faults.set(operation, fail);
    }

    /// Returns the number of stored citizens.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if a citizen with the given national id exists.
    pub async fn contains(&self, national_id: &str) -> bool {
        self.table
            .read()
            .await
            .rows
            .values()
            .any(|c| c.national_id.as_str() == national_id)
    }
}

#[async_trait]
impl CitizenStore for InMemoryCitizenStore {
    async fn create(&self, citizen: &NewCitizen) -> Result<()> {
        self.faults.check(EntityKind::Citizen, Operation::Create)?;
        let mut table = self.table.write().await;

        if table.find(&citizen.national_id).is_some() {
            return Err(StoreError::duplicate(
                EntityKind::Citizen,
                &citizen.national_id,
            ));
        }

        table.next_id += 1;
        let id = CitizenId::new(table.next_id);
        table.rows.insert(id, citizen.clone().into_citizen(id));
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Citizen>> {
        self.faults.check(EntityKind::Citizen, Operation::List)?;
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_national_id(&self, national_id: &NationalId) -> Result<Citizen> {
        self.faults.check(EntityKind::Citizen, Operation::Read)?;
        self.table
            .read()
            .await
            .find(national_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, national_id))
    }

    async fn get_by_id(&self, id: CitizenId) -> Result<Citizen> {
        self.faults.check(EntityKind::Citizen, Operation::Read)?;
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, id))
    }

    async fn update(&self, national_id: &NationalId, changes: &CitizenChanges) -> Result<()> {
        self.faults.check(EntityKind::Citizen, Operation::Update)?;
        let mut table = self.table.write().await;
        let citizen = table
            .rows
            .values_mut()
            .find(|c| &c.national_id == national_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, national_id))?;
        citizen.apply(changes);
        Ok(())
    }

    async fn delete_by_national_id(&self, national_id: &NationalId) -> Result<()> {
        self.faults.check(EntityKind::Citizen, Operation::Delete)?;
        let mut table = self.table.write().await;
        let id = table
            .find(national_id)
            .map(|c| c.id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, national_id))?;
        table.rows.remove(&id);
        Ok(())
    }
}

/// Rows keyed by owning citizen, shared by the two dependent stores.
#[derive(Debug)]
struct DependentTable<T> {
    entity: EntityKind,
    rows: BTreeMap<CitizenId, T>,
}

impl<T: Clone> DependentTable<T> {
    fn new(entity: EntityKind) -> Self {
        Self {
            entity,
            rows: BTreeMap::new(),
        }
    }

    fn insert(&mut self, citizen_id: CitizenId, row: T) -> Result<()> {
        if self.rows.contains_key(&citizen_id) {
            return Err(StoreError::duplicate(self.entity, citizen_id));
        }
        self.rows.insert(citizen_id, row);
        Ok(())
    }

    fn get(&self, citizen_id: CitizenId) -> Result<T> {
        self.rows
            .get(&citizen_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(self.entity, citizen_id))
    }

    fn replace(&mut self, citizen_id: CitizenId, row: T) -> Result<()> {
        match self.rows.get_mut(&citizen_id) {
            Some(existing) => {
                *existing = row;
                Ok(())
            }
            None => Err(StoreError::not_found(self.entity, citizen_id)),
        }
    }

    fn remove(&mut self, citizen_id: CitizenId) -> Result<()> {
        self.rows
            .remove(&citizen_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(self.entity, citizen_id))
    }
}

/// In-memory credential store.
#[derive(Debug, Clone)]
pub struct InMemoryCredentialStore {
    table: Arc<RwLock<DependentTable<Credential>>>,
    faults: Arc<Faults>,
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self {
            table: Arc::new(RwLock::new(DependentTable::new(EntityKind::Credential))),
            faults: Arc::default(),
        }
    }
}

impl InMemoryCredentialStore {
    /// Creates a new empty in-memory credential store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the given kind fail until cleared.
    pub fn set_fail_on(&self, operation: Operation, fail: bool) {
        self.faults.set(operation, fail);
    }

    /// Returns the number of stored credentials.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if the citizen owns a credential.
    pub async fn contains(&self, citizen_id: CitizenId) -> bool {
        self.table.read().await.rows.contains_key(&citizen_id)
    }

    fn folio_taken(
        table: &DependentTable<Credential>,
        folio: &str,
        owner: CitizenId,
    ) -> bool {
        table
            .rows
            .values()
            .any(|c| c.folio == folio && c.citizen_id != owner)
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn create(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        self.faults.check(EntityKind::Credential, Operation::Create)?;
        let mut table = self.table.write().await;
        if Self::folio_taken(&table, &credential.folio, citizen_id) {
            return Err(StoreError::duplicate(
                EntityKind::Credential,
                &credential.folio,
            ));
        }
        table.insert(citizen_id, credential.for_citizen(citizen_id))
    }

    async fn list(&self) -> Result<Vec<Credential>> {
        self.faults.check(EntityKind::Credential, Operation::List)?;
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Credential> {
        self.faults.check(EntityKind::Credential, Operation::Read)?;
        self.table.read().await.get(citizen_id)
    }

    async fn update(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        self.faults.check(EntityKind::Credential, Operation::Update)?;
        let mut table = self.table.write().await;
        if Self::folio_taken(&table, &credential.folio, citizen_id) {
            return Err(StoreError::duplicate(
                EntityKind::Credential,
                &credential.folio,
            ));
        }
        table.replace(citizen_id, credential.for_citizen(citizen_id))
    }

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        self.faults.check(EntityKind::Credential, Operation::Delete)?;
        self.table.write().await.remove(citizen_id)
    }
}

/// In-memory address store.
#[derive(Debug, Clone)]
pub struct InMemoryAddressStore {
    table: Arc<RwLock<DependentTable<Address>>>,
    faults: Arc<Faults>,
}

impl Default for InMemoryAddressStore {
    fn default() -> Self {
        Self {
            table: Arc::new(RwLock::new(DependentTable::new(EntityKind::Address))),
            faults: Arc::default(),
        }
    }
}

impl InMemoryAddressStore {
    /// Creates a new empty in-memory address store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the given kind fail until cleared.
    pub fn set_fail_on(&self, operation: Operation, fail: bool) {
        self.faults.set(operation, fail);
    }

    /// Returns the number of stored addresses.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if the citizen owns an address.
    pub async fn contains(&self, citizen_id: CitizenId) -> bool {
        self.table.read().await.rows.contains_key(&citizen_id)
    }
}

#[async_trait]
impl AddressStore for InMemoryAddressStore {
    async fn create(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        self.faults.check(EntityKind::Address, Operation::Create)?;
        self.table
            .write()
            .await
            .insert(citizen_id, address.for_citizen(citizen_id))
    }

    async fn list(&self) -> Result<Vec<Address>> {
        self.faults.check(EntityKind::Address, Operation::List)?;
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Address> {
        self.faults.check(EntityKind::Address, Operation::Read)?;
        self.table.read().await.get(citizen_id)
    }

    async fn update(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        self.faults.check(EntityKind::Address, Operation::Update)?;
        self.table
            .write()
            .await
            .replace(citizen_id, address.for_citizen(citizen_id))
    }

    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        self.faults.check(EntityKind::Address, Operation::Delete)?;
        self.table.write().await.remove(citizen_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use domain::CredentialKind;

    fn new_citizen(key: &str) -> NewCitizen {
        NewCitizen {
            national_id: NationalId::parse(key).unwrap(),
            first_name: "Ana".to_string(),
            paternal_surname: "Ruiz".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        }
    }

    fn new_credential(folio: &str) -> NewCredential {
        NewCredential {
            folio: folio.to_string(),
            kind: CredentialKind::New,
            issue_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        }
    }

    fn new_address() -> NewAddress {
        NewAddress {
            street: "Av. Reforma 1".to_string(),
            municipality: Some("CDMX".to_string()),
            state: Some("CDMX".to_string()),
        }
    }

    #[tokio::test]
    async fn test_citizen_ids_are_sequential() {
        let store = InMemoryCitizenStore::new();
        store.create(&new_citizen("RUAA900101MDFZNN09")).await.unwrap();
        store.create(&new_citizen("LOPJ850505HDFPRN01")).await.unwrap();

        let first = store
            .get_by_national_id(&NationalId::parse("RUAA900101MDFZNN09").unwrap())
            .await
            .unwrap();
        let second = store
            .get_by_national_id(&NationalId::parse("LOPJ850505HDFPRN01").unwrap())
            .await
            .unwrap();

        assert_eq!(first.id, CitizenId::new(1));
        assert_eq!(second.id, CitizenId::new(2));
        assert_eq!(store.get_by_id(second.id).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_duplicate_national_id_is_rejected() {
        let store = InMemoryCitizenStore::new();
        store.create(&new_citizen("RUAA900101MDFZNN09")).await.unwrap();

        let err = store
            .create(&new_citizen("RUAA900101MDFZNN09"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { entity: EntityKind::Citizen, .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_citizen_update_and_delete() {
        let store = InMemoryCitizenStore::new();
        let citizen = new_citizen("RUAA900101MDFZNN09");
        store.create(&citizen).await.unwrap();

        let mut changes = citizen.changes();
        changes.first_name = "Ana Maria".to_string();
        store.update(&citizen.national_id, &changes).await.unwrap();

        let stored = store.get_by_national_id(&citizen.national_id).await.unwrap();
        assert_eq!(stored.first_name, "Ana Maria");

        store.delete_by_national_id(&citizen.national_id).await.unwrap();
        assert!(store.is_empty().await);

        let err = store
            .delete_by_national_id(&citizen.national_id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_one_credential_per_citizen() {
        let store = InMemoryCredentialStore::new();
        let owner = CitizenId::new(1);
        store.create(owner, &new_credential("F-001")).await.unwrap();

        let err = store.create(owner, &new_credential("F-002")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn test_folio_is_unique_across_citizens() {
        let store = InMemoryCredentialStore::new();
        store
            .create(CitizenId::new(1), &new_credential("F-001"))
            .await
            .unwrap();

        let err = store
            .create(CitizenId::new(2), &new_credential("F-001"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));

        // Re-saving the owner's own folio is fine.
        store
            .update(CitizenId::new(1), &new_credential("F-001"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dependent_update_requires_existing_row() {
        let store = InMemoryAddressStore::new();
        let err = store
            .update(CitizenId::new(9), &new_address())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        store.create(CitizenId::new(9), &new_address()).await.unwrap();
        let mut moved = new_address();
        moved.street = "Calle 5".to_string();
        store.update(CitizenId::new(9), &moved).await.unwrap();

        let stored = store.get_by_citizen(CitizenId::new(9)).await.unwrap();
        assert_eq!(stored.street, "Calle 5");
        assert_eq!(stored.citizen_id, CitizenId::new(9));
    }

    #[tokio::test]
    async fn test_fault_injection_is_per_operation() {
        let store = InMemoryAddressStore::new();
        store.set_fail_on(Operation::Create, true);

        let err = store
            .create(CitizenId::new(1), &new_address())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Unavailable {
                entity: EntityKind::Address,
                operation: "create"
            }
        ));

        // Other operations keep working.
        assert!(store.list().await.unwrap().is_empty());

        store.set_fail_on(Operation::Create, false);
        store.create(CitizenId::new(1), &new_address()).await.unwrap();
        assert!(store.contains(CitizenId::new(1)).await);
    }

    #[tokio::test]
    async fn test_clones_share_rows() {
        let store = InMemoryCredentialStore::new();
        let handle = store.clone();
        store
            .create(CitizenId::new(3), &new_credential("F-003"))
            .await
            .unwrap();

        assert_eq!(handle.len().await, 1);
        handle.delete_by_citizen(CitizenId::new(3)).await.unwrap();
        assert!(store.is_empty().await);
    }
}
