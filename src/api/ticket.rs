use serde::{Deserialize, Serialize};

use crate::api;

pub use crate::db::ticket::{Id, Status};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: Id,
    pub brand: String,
    pub model: String,
    pub registration_id: String,
    pub description: String,
    pub status: Status,
    pub total_price: f64,
    pub workers: Vec<api::Worker>,
    pub parts: Vec<api::Part>,
    pub time_slots: Vec<api::TimeSlot>,
}

/// Listing shape: the ticket row without its owned collections.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub id: Id,
    pub brand: String,
    pub model: String,
    pub registration_id: String,
    pub description: String,
    pub status: Status,
    pub total_price: f64,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    pub tickets: Vec<Summary>,
    pub total_count: usize,
}
