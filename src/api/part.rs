use serde::{Deserialize, Serialize};

use crate::api;

pub use crate::db::part::Id;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub id: Id,
    pub name: String,
    pub price: f64,
    pub quantity: f64,
    pub total_price: f64,
    pub ticket_id: api::ticket::Id,
}
