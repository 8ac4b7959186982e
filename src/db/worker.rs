use std::{collections::HashMap, error::Error as StdError};

use serde::{Deserialize, Serialize};
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Error,
};
use uuid::Uuid;

use super::Client;

/// Hourly rate assigned to a freshly registered worker.
pub const DEFAULT_HOURLY_RATE: f64 = 10.0;

#[derive(Clone, Debug)]
pub struct Worker {
    pub id: Id,
    pub name: String,
    pub login: String,
    pub password_hash: PasswordHash,
    pub hourly_rate: f64,
}

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize,
)]
pub struct Id(Uuid);

impl Id {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<u128> for Id {
    fn from(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }
}

impl FromSql<'_> for Id {
    accepts!(UUID);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        Uuid::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for Id {
    accepts!(UUID);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(secret: &str) -> Self {
        // TODO: Use real hash function.
        Self(secret.to_string())
    }
}

impl FromSql<'_> for PasswordHash {
    accepts!(TEXT);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        String::from_sql(ty, raw).map(Self)
    }
}

impl ToSql for PasswordHash {
    accepts!(TEXT);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, out)
    }
}

impl Client {
    pub async fn get_worker_by_login(
        &self,
        login: &str,
    ) -> Result<Option<Worker>, Error> {
        const SQL: &str = "SELECT id, name, login, password_hash, hourly_rate \
                           FROM workers \
                           WHERE login = $1 \
                           LIMIT 1";
        Ok(self.0.query_opt(SQL, &[&login]).await?.map(|row| Worker {
            id: row.get("id"),
            name: row.get("name"),
            login: row.get("login"),
            password_hash: row.get("password_hash"),
            hourly_rate: row.get("hourly_rate"),
        }))
    }

    pub async fn get_worker_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Worker>, Error> {
        const SQL: &str = "SELECT id, name, login, password_hash, hourly_rate \
                           FROM workers \
                           WHERE id = $1 \
                           LIMIT 1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(|row| Worker {
            id: row.get("id"),
            name: row.get("name"),
            login: row.get("login"),
            password_hash: row.get("password_hash"),
            hourly_rate: row.get("hourly_rate"),
        }))
    }

    pub async fn get_workers_by_ids(
        &self,
        ids: &[Id],
    ) -> Result<HashMap<Id, Worker>, Error> {
        const SQL: &str = "SELECT id, name, login, password_hash, hourly_rate \
                           FROM workers \
                           WHERE id IN (SELECT unnest($1::UUID[])) \
                           LIMIT $2";

        let limit = i64::try_from(ids.len()).unwrap();

        Ok(self
            .0
            .query(SQL, &[&ids, &limit])
            .await?
            .into_iter()
            .map(|row| {
                let id = row.get("id");
                let worker = Worker {
                    id,
                    name: row.get("name"),
                    login: row.get("login"),
                    password_hash: row.get("password_hash"),
                    hourly_rate: row.get("hourly_rate"),
                };
                (id, worker)
            })
            .collect())
    }

    pub async fn write_worker(&self, worker: &Worker) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO workers (id, name, login, password_hash, hourly_rate) \
            VALUES ($1, $2, $3, $4, $5) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                login = EXCLUDED.login, \
                password_hash = EXCLUDED.password_hash, \
                hourly_rate = EXCLUDED.hourly_rate";

        self.0
            .execute(
                SQL,
                &[
                    &worker.id,
                    &worker.name,
                    &worker.login,
                    &worker.password_hash,
                    &worker.hourly_rate,
                ],
            )
            .await
            .map(drop)
    }
}
