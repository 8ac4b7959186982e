use serde::{Deserialize, Serialize};

use crate::api;

pub use crate::db::worker::{Id, PasswordHash};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Id,
    pub name: String,
    pub hourly_rate: f64,
}

/// Current worker's own view: profile fields plus their booked time slots
/// across all tickets.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Id,
    pub name: String,
    pub hourly_rate: f64,
    pub time_slots: Vec<api::TimeSlot>,
}
