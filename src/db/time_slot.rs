use std::error::Error as StdError;

use derive_more::Display;
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

use super::{ticket, worker, Client};

#[derive(Clone, Debug)]
pub struct TimeSlot {
    pub id: Id,
    pub start_time: OffsetDateTime,
    pub end_time: OffsetDateTime,
    pub ticket_id: ticket::Id,
    pub worker_id: worker::Id,
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

impl Client {
    pub async fn get_time_slot_by_id(
        &self,
        id: Id,
    ) -> Result<Option<TimeSlot>, Error> {
        const SQL: &str = "\
            SELECT id, start_time, end_time, ticket_id, worker_id \
            FROM time_slots \
            WHERE id = $1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(|row| TimeSlot {
            id: row.get("id"),
            start_time: row.get("start_time"),
            end_time: row.get("end_time"),
            ticket_id: row.get("ticket_id"),
            worker_id: row.get("worker_id"),
        }))
    }

    pub async fn get_time_slots_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<TimeSlot>, Error> {
        const SQL: &str = "\
            SELECT id, start_time, end_time, ticket_id, worker_id \
            FROM time_slots \
            WHERE ticket_id = $1 \
            ORDER BY start_time";
        Ok(self
            .0
            .query(SQL, &[&ticket_id])
            .await?
            .into_iter()
            .map(|row| TimeSlot {
                id: row.get("id"),
                start_time: row.get("start_time"),
                end_time: row.get("end_time"),
                ticket_id: row.get("ticket_id"),
                worker_id: row.get("worker_id"),
            })
            .collect())
    }

    /// Returns the worker's time slots across all tickets.
    pub async fn get_time_slots_by_worker(
        &self,
        worker_id: worker::Id,
    ) -> Result<Vec<TimeSlot>, Error> {
        const SQL: &str = "\
            SELECT id, start_time, end_time, ticket_id, worker_id \
            FROM time_slots \
            WHERE worker_id = $1 \
            ORDER BY start_time";
        Ok(self
            .0
            .query(SQL, &[&worker_id])
            .await?
            .into_iter()
            .map(|row| TimeSlot {
                id: row.get("id"),
                start_time: row.get("start_time"),
                end_time: row.get("end_time"),
                ticket_id: row.get("ticket_id"),
                worker_id: row.get("worker_id"),
            })
            .collect())
    }

    pub async fn write_time_slot(&self, slot: &TimeSlot) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO time_slots (id, start_time, end_time, ticket_id, \
                                    worker_id) \
            VALUES ($1, $2, $3, $4, $5) \
            ON CONFLICT (id) DO UPDATE \
            SET start_time = EXCLUDED.start_time, \
                end_time = EXCLUDED.end_time, \
                ticket_id = EXCLUDED.ticket_id, \
                worker_id = EXCLUDED.worker_id";

        self.0
            .execute(
                SQL,
                &[
                    &slot.id,
                    &slot.start_time,
                    &slot.end_time,
                    &slot.ticket_id,
                    &slot.worker_id,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn delete_time_slot(&self, id: Id) -> Result<(), Error> {
        const SQL: &str = "DELETE FROM time_slots WHERE id = $1";
        self.0.execute(SQL, &[&id]).await.map(drop)
    }
}
