use std::error::Error as StdError;

use derive_more::Display;
use enum_utils::TryFromRepr;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Error,
};
use uuid::Uuid;

use super::{worker, Client};

#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: Id,
    pub brand: String,
    pub model: String,
    pub registration_id: String,
    pub description: String,
    pub status: Status,
    pub total_price: f64,
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Serialize)]
pub struct Id(Uuid);

impl Id {
    pub fn new() -> Self {
        Id(Uuid::new_v4())
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

#[derive(
    Clone, Copy, Debug, Deserialize, TryFromRepr, PartialEq, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Status {
    /// Vehicle is registered, no work has started yet.
    Created = 1,

    /// Workers are booked and repairs are underway.
    InProgress = 2,

    /// Repairs are finished and the ticket is closed.
    Done = 3,
}

impl FromSql<'_> for Status {
    accepts!(INT2);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from_sql(ty, raw)?;
        let repr = u8::try_from(repr)?;
        let status = Self::try_from(repr).map_err(|_| "invalid status")?;
        Ok(status)
    }
}

impl ToSql for Status {
    accepts!(INT2);

    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        let repr = i16::from((*self) as u8);
        repr.to_sql(ty, out)
    }
}

impl Client {
    pub async fn get_ticket_by_id(
        &self,
        id: Id,
    ) -> Result<Option<Ticket>, Error> {
        const SQL: &str = "\
            SELECT id, brand, model, registration_id, description, \
                   status, total_price, created_at \
            FROM tickets \
            WHERE id = $1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(|row| Ticket {
            id: row.get("id"),
            brand: row.get("brand"),
            model: row.get("model"),
            registration_id: row.get("registration_id"),
            description: row.get("description"),
            status: row.get("status"),
            total_price: row.get("total_price"),
            created_at: row.get("created_at"),
        }))
    }

    pub async fn write_ticket(&self, ticket: &Ticket) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO tickets (id, brand, model, registration_id, \
                                 description, status, total_price, \
                                 created_at) \
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
            ON CONFLICT (id) DO UPDATE \
            SET brand = EXCLUDED.brand, \
                model = EXCLUDED.model, \
                registration_id = EXCLUDED.registration_id, \
                description = EXCLUDED.description, \
                status = EXCLUDED.status, \
                total_price = EXCLUDED.total_price, \
                created_at = EXCLUDED.created_at";

        self.0
            .execute(
                SQL,
                &[
                    &ticket.id,
                    &ticket.brand,
                    &ticket.model,
                    &ticket.registration_id,
                    &ticket.description,
                    &ticket.status,
                    &ticket.total_price,
                    &ticket.created_at,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn set_ticket_total_price(
        &self,
        id: Id,
        total_price: f64,
    ) -> Result<(), Error> {
        const SQL: &str = "UPDATE tickets SET total_price = $2 WHERE id = $1";
        self.0.execute(SQL, &[&id, &total_price]).await.map(drop)
    }

    pub async fn get_tickets_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Ticket>, Error> {
        let offset = i64::try_from(offset).unwrap();
        let limit = i64::try_from(limit).unwrap();

        const SQL: &str = "\
            SELECT id, brand, model, registration_id, description, \
                   status, total_price, created_at \
            FROM tickets \
            ORDER BY created_at DESC, \
                     id DESC \
            OFFSET $1 LIMIT $2";
        Ok(self
            .0
            .query(SQL, &[&offset, &limit])
            .await?
            .into_iter()
            .map(|row| Ticket {
                id: row.get("id"),
                brand: row.get("brand"),
                model: row.get("model"),
                registration_id: row.get("registration_id"),
                description: row.get("description"),
                status: row.get("status"),
                total_price: row.get("total_price"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    pub async fn get_tickets_count(&self) -> Result<usize, Error> {
        const SQL: &str = "SELECT COUNT(*) FROM tickets";
        Ok(self
            .0
            .query_one(SQL, &[])
            .await?
            .get::<_, i64>(0)
            .try_into()
            .unwrap())
    }

    /// Removes the ticket together with everything it owns: parts,
    /// time slots and worker membership rows.
    pub async fn delete_ticket(&self, id: Id) -> Result<(), Error> {
        const DELETE_PARTS: &str = "DELETE FROM parts WHERE ticket_id = $1";
        const DELETE_SLOTS: &str =
            "DELETE FROM time_slots WHERE ticket_id = $1";
        const DELETE_MEMBERS: &str =
            "DELETE FROM ticket_workers WHERE ticket_id = $1";
        const DELETE_TICKET: &str = "DELETE FROM tickets WHERE id = $1";

        self.0.execute(DELETE_PARTS, &[&id]).await?;
        self.0.execute(DELETE_SLOTS, &[&id]).await?;
        self.0.execute(DELETE_MEMBERS, &[&id]).await?;
        self.0.execute(DELETE_TICKET, &[&id]).await.map(drop)
    }

    pub async fn get_ticket_workers(
        &self,
        id: Id,
    ) -> Result<Vec<worker::Id>, Error> {
        const SQL: &str = "SELECT worker_id \
                           FROM ticket_workers \
                           WHERE ticket_id = $1";
        Ok(self
            .0
            .query(SQL, &[&id])
            .await?
            .into_iter()
            .map(|row| row.get("worker_id"))
            .collect())
    }

    /// Rewrites the ticket's worker membership from its current time
    /// slots: a worker belongs to a ticket exactly while they have at
    /// least one slot on it.
    pub async fn sync_ticket_workers(&self, id: Id) -> Result<(), Error> {
        const CLEAR: &str = "DELETE FROM ticket_workers WHERE ticket_id = $1";
        const FILL: &str = "\
            INSERT INTO ticket_workers (ticket_id, worker_id) \
            SELECT DISTINCT ticket_id, worker_id \
            FROM time_slots \
            WHERE ticket_id = $1";

        self.0.execute(CLEAR, &[&id]).await?;
        self.0.execute(FILL, &[&id]).await.map(drop)
    }

    pub async fn get_tickets_by_worker(
        &self,
        worker_id: worker::Id,
    ) -> Result<Vec<Ticket>, Error> {
        const SQL: &str = "\
            SELECT t.id, t.brand, t.model, t.registration_id, t.description, \
                   t.status, t.total_price, t.created_at \
            FROM tickets AS t \
            JOIN ticket_workers AS tw ON tw.ticket_id = t.id \
            WHERE tw.worker_id = $1 \
            ORDER BY t.created_at DESC, \
                     t.id DESC";
        Ok(self
            .0
            .query(SQL, &[&worker_id])
            .await?
            .into_iter()
            .map(|row| Ticket {
                id: row.get("id"),
                brand: row.get("brand"),
                model: row.get("model"),
                registration_id: row.get("registration_id"),
                description: row.get("description"),
                status: row.get("status"),
                total_price: row.get("total_price"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
