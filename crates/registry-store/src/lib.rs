pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use common::{CitizenId, EntityKind};
pub use error::{Result, StoreError};
pub use memory::{InMemoryAddressStore, InMemoryCitizenStore, InMemoryCredentialStore, Operation};
pub use postgres::{
    PostgresAddressStore, PostgresCitizenStore, PostgresCredentialStore, run_migrations,
};
pub use store::{AddressStore, CitizenStore, CredentialStore};
