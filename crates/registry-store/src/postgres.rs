use async_trait::async_trait;
use chrono::NaiveDate;
use common::{CitizenId, EntityKind};
use domain::{
    Address, Citizen, CitizenChanges, Credential, CredentialKind, NationalId, NewAddress,
    NewCitizen, NewCredential,
};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::store::{AddressStore, CitizenStore, CredentialStore};
use crate::{Result, StoreError};

/// Runs the embedded registry migrations against the pool.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}

/// Maps insert/update failures, turning unique violations into `Duplicate`.
fn write_error(entity: EntityKind, key: impl ToString, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err
        && db_err.is_unique_violation()
    {
        return StoreError::duplicate(entity, key);
    }
    metrics::counter!("store_errors_total", "entity" => entity.as_str()).increment(1);
    StoreError::Database(err)
}

fn read_error(entity: EntityKind, err: sqlx::Error) -> StoreError {
    metrics::counter!("store_errors_total", "entity" => entity.as_str()).increment(1);
    StoreError::Database(err)
}

/// PostgreSQL-backed citizen store.
#[derive(Clone)]
pub struct PostgresCitizenStore {
    pool: PgPool,
}

impl PostgresCitizenStore {
    /// Creates a new PostgreSQL citizen store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_citizen(row: PgRow) -> Result<Citizen> {
        let national_id: String = row.try_get("national_id")?;
        let national_id =
            NationalId::parse(&national_id).map_err(|e| StoreError::InvalidRecord {
                entity: EntityKind::Citizen,
                reason: e.message,
            })?;

        Ok(Citizen {
            id: CitizenId::new(row.try_get("citizen_id")?),
            national_id,
            first_name: row.try_get("first_name")?,
            paternal_surname: row.try_get("paternal_surname")?,
            birth_date: row.try_get::<NaiveDate, _>("birth_date")?,
        })
    }
}

#[async_trait]
impl CitizenStore for PostgresCitizenStore {
    #[tracing::instrument(skip(self, citizen), fields(national_id = %citizen.national_id))]
    async fn create(&self, citizen: &NewCitizen) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO citizens (national_id, first_name, paternal_surname, birth_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(citizen.national_id.as_str())
        .bind(&citizen.first_name)
        .bind(&citizen.paternal_surname)
        .bind(citizen.birth_date)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Citizen, &citizen.national_id, e))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Citizen>> {
        let rows = sqlx::query(
            r#"
            SELECT citizen_id, national_id, first_name, paternal_surname, birth_date
            FROM citizens
            ORDER BY citizen_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Citizen, e))?;

        rows.into_iter().map(Self::row_to_citizen).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_national_id(&self, national_id: &NationalId) -> Result<Citizen> {
        let row = sqlx::query(
            r#"
            SELECT citizen_id, national_id, first_name, paternal_surname, birth_date
            FROM citizens
            WHERE national_id = $1
            "#,
        )
        .bind(national_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Citizen, e))?
        .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, national_id))?;

        Self::row_to_citizen(row)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: CitizenId) -> Result<Citizen> {
        let row = sqlx::query(
            r#"
            SELECT citizen_id, national_id, first_name, paternal_surname, birth_date
            FROM citizens
            WHERE citizen_id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Citizen, e))?
        .ok_or_else(|| StoreError::not_found(EntityKind::Citizen, id))?;

        Self::row_to_citizen(row)
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update(&self, national_id: &NationalId, changes: &CitizenChanges) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE citizens
            SET first_name = $1, paternal_surname = $2, birth_date = $3
            WHERE national_id = $4
            "#,
        )
        .bind(&changes.first_name)
        .bind(&changes.paternal_surname)
        .bind(changes.birth_date)
        .bind(national_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Citizen, national_id, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Citizen, national_id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_national_id(&self, national_id: &NationalId) -> Result<()> {
        let result = sqlx::query("DELETE FROM citizens WHERE national_id = $1")
            .bind(national_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(EntityKind::Citizen, national_id, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Citizen, national_id));
        }
        Ok(())
    }
}

/// PostgreSQL-backed credential store.
#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    /// Creates a new PostgreSQL credential store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_credential(row: PgRow) -> Result<Credential> {
        let kind: String = row.try_get("kind")?;
        let kind = kind
            .parse::<CredentialKind>()
            .map_err(|e| StoreError::InvalidRecord {
                entity: EntityKind::Credential,
                reason: e.message,
            })?;

        Ok(Credential {
            citizen_id: CitizenId::new(row.try_get("citizen_id")?),
            folio: row.try_get("folio")?,
            kind,
            issue_date: row.try_get::<NaiveDate, _>("issue_date")?,
        })
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    #[tracing::instrument(skip(self, credential))]
    async fn create(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO credentials (citizen_id, folio, kind, issue_date)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(citizen_id.as_i64())
        .bind(&credential.folio)
        .bind(credential.kind.as_str())
        .bind(credential.issue_date)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Credential, citizen_id, e))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Credential>> {
        let rows = sqlx::query(
            "SELECT citizen_id, folio, kind, issue_date FROM credentials ORDER BY citizen_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Credential, e))?;

        rows.into_iter().map(Self::row_to_credential).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Credential> {
        let row = sqlx::query(
            "SELECT citizen_id, folio, kind, issue_date FROM credentials WHERE citizen_id = $1",
        )
        .bind(citizen_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Credential, e))?
        .ok_or_else(|| StoreError::not_found(EntityKind::Credential, citizen_id))?;

        Self::row_to_credential(row)
    }

    #[tracing::instrument(skip(self, credential))]
    async fn update(&self, citizen_id: CitizenId, credential: &NewCredential) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET folio = $1, kind = $2, issue_date = $3
            WHERE citizen_id = $4
            "#,
        )
        .bind(&credential.folio)
        .bind(credential.kind.as_str())
        .bind(credential.issue_date)
        .bind(citizen_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Credential, &credential.folio, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Credential, citizen_id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE citizen_id = $1")
            .bind(citizen_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(EntityKind::Credential, citizen_id, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Credential, citizen_id));
        }
        Ok(())
    }
}

/// PostgreSQL-backed address store.
#[derive(Clone)]
pub struct PostgresAddressStore {
    pool: PgPool,
}

impl PostgresAddressStore {
    /// Creates a new PostgreSQL address store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_address(row: PgRow) -> Result<Address> {
        Ok(Address {
            citizen_id: CitizenId::new(row.try_get("citizen_id")?),
            street: row.try_get("street")?,
            municipality: row.try_get("municipality")?,
            state: row.try_get("state")?,
        })
    }
}

#[async_trait]
impl AddressStore for PostgresAddressStore {
    #[tracing::instrument(skip(self, address))]
    async fn create(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (citizen_id, street, municipality, state)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(citizen_id.as_i64())
        .bind(&address.street)
        .bind(address.municipality.as_deref())
        .bind(address.state.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Address, citizen_id, e))?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Address>> {
        let rows = sqlx::query(
            "SELECT citizen_id, street, municipality, state FROM addresses ORDER BY citizen_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Address, e))?;

        rows.into_iter().map(Self::row_to_address).collect()
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_citizen(&self, citizen_id: CitizenId) -> Result<Address> {
        let row = sqlx::query(
            "SELECT citizen_id, street, municipality, state FROM addresses WHERE citizen_id = $1",
        )
        .bind(citizen_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| read_error(EntityKind::Address, e))?
        .ok_or_else(|| StoreError::not_found(EntityKind::Address, citizen_id))?;

        Self::row_to_address(row)
    }

    #[tracing::instrument(skip(self, address))]
    async fn update(&self, citizen_id: CitizenId, address: &NewAddress) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE addresses
            SET street = $1, municipality = $2, state = $3
            WHERE citizen_id = $4
            "#,
        )
        .bind(&address.street)
        .bind(address.municipality.as_deref())
        .bind(address.state.as_deref())
        .bind(citizen_id.as_i64())
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(EntityKind::Address, citizen_id, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Address, citizen_id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete_by_citizen(&self, citizen_id: CitizenId) -> Result<()> {
        let result = sqlx::query("DELETE FROM addresses WHERE citizen_id = $1")
            .bind(citizen_id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(EntityKind::Address, citizen_id, e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(EntityKind::Address, citizen_id));
        }
        Ok(())
    }
}
