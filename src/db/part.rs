use std::error::Error as StdError;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tokio_postgres::{
    types::{
        accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql,
        Type,
    },
    Error,
};
use uuid::Uuid;

use super::{ticket, Client};

#[derive(Clone, Debug)]
pub struct Part {
    pub id: Id,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    /// Always `price * quantity`, recomputed on every write.
    pub total_price: f64,
    pub ticket_id: ticket::Id,
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
    pub async fn get_part_by_id(&self, id: Id) -> Result<Option<Part>, Error> {
        const SQL: &str = "\
            SELECT id, name, price, quantity, total_price, ticket_id \
            FROM parts \
            WHERE id = $1";
        Ok(self.0.query_opt(SQL, &[&id]).await?.map(|row| Part {
            id: row.get("id"),
            name: row.get("name"),
            price: row.get("price"),
            quantity: row.get("quantity"),
            total_price: row.get("total_price"),
            ticket_id: row.get("ticket_id"),
        }))
    }

    pub async fn get_parts_by_ticket(
        &self,
        ticket_id: ticket::Id,
    ) -> Result<Vec<Part>, Error> {
        const SQL: &str = "\
            SELECT id, name, price, quantity, total_price, ticket_id \
            FROM parts \
            WHERE ticket_id = $1";
        Ok(self
            .0
            .query(SQL, &[&ticket_id])
            .await?
            .into_iter()
            .map(|row| Part {
                id: row.get("id"),
                name: row.get("name"),
                price: row.get("price"),
                quantity: row.get("quantity"),
                total_price: row.get("total_price"),
                ticket_id: row.get("ticket_id"),
            })
            .collect())
    }

    pub async fn write_part(&self, part: &Part) -> Result<(), Error> {
        const SQL: &str = "\
            INSERT INTO parts (id, name, price, quantity, total_price, \
                               ticket_id) \
            VALUES ($1, $2, $3, $4, $5, $6) \
            ON CONFLICT (id) DO UPDATE \
            SET name = EXCLUDED.name, \
                price = EXCLUDED.price, \
                quantity = EXCLUDED.quantity, \
                total_price = EXCLUDED.total_price, \
                ticket_id = EXCLUDED.ticket_id";

        self.0
            .execute(
                SQL,
                &[
                    &part.id,
                    &part.name,
                    &part.price,
                    &part.quantity,
                    &part.total_price,
                    &part.ticket_id,
                ],
            )
            .await
            .map(drop)
    }

    pub async fn delete_part(&self, id: Id) -> Result<(), Error> {
        const SQL: &str = "DELETE FROM parts WHERE id = $1";
        self.0.execute(SQL, &[&id]).await.map(drop)
    }
}
