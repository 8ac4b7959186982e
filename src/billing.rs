use std::collections::HashMap;

use derive_more::From;
use itertools::Itertools as _;
use time::OffsetDateTime;

use crate::db;

/// Checks a proposed labor interval against the worker's existing slots.
/// The caller guarantees `end > start`.
///
/// Boundaries are inclusive: a proposal touching an existing slot's
/// endpoint conflicts with it. A proposal that strictly contains an
/// existing slot, with both endpoints outside of it, is not reported.
pub fn find_conflict<'a>(
    start: OffsetDateTime,
    end: OffsetDateTime,
    existing: &'a [db::TimeSlot],
) -> Option<&'a db::TimeSlot> {
    existing.iter().find(|slot| {
        (start >= slot.start_time && start <= slot.end_time)
            || (end >= slot.start_time && end <= slot.end_time)
    })
}

/// Whole hours of the slot, fractions below an hour are not billed.
pub fn billable_hours(slot: &db::TimeSlot) -> i64 {
    (slot.end_time - slot.start_time).whole_hours()
}

/// Sums the parts' totals and every slot's `rate * whole hours`.
///
/// A slot whose worker is missing from `rates` contributes zero.
pub fn total_price(
    parts: &[db::Part],
    slots: &[db::TimeSlot],
    rates: &HashMap<db::worker::Id, f64>,
) -> f64 {
    let parts_total: f64 = parts.iter().map(|part| part.total_price).sum();
    let labor_total: f64 = slots
        .iter()
        .filter_map(|slot| {
            rates
                .get(&slot.worker_id)
                .map(|rate| rate * billable_hours(slot) as f64)
        })
        .sum();
    parts_total + labor_total
}

/// Recomputes the ticket's total price from its current parts and time
/// slots and persists it. Invoked as the final step of every mutation
/// that can change the total.
pub async fn recalculate(
    db: &db::Client,
    ticket_id: db::ticket::Id,
) -> Result<f64, Error> {
    let ticket = db
        .get_ticket_by_id(ticket_id)
        .await?
        .ok_or(Error::TicketNotFound)?;
    let parts = db.get_parts_by_ticket(ticket_id).await?;
    let slots = db.get_time_slots_by_ticket(ticket_id).await?;

    let worker_ids = slots
        .iter()
        .map(|slot| slot.worker_id)
        .unique()
        .collect::<Vec<_>>();
    let workers = db.get_workers_by_ids(&worker_ids).await?;
    for slot in &slots {
        if !workers.contains_key(&slot.worker_id) {
            tracing::warn!(
                "time slot {} of ticket {ticket_id} refers to \
                 missing worker {:?}, billing it as zero",
                slot.id,
                slot.worker_id,
            );
        }
    }
    let rates = workers
        .into_iter()
        .map(|(id, worker)| (id, worker.hourly_rate))
        .collect();

    let total = total_price(&parts, &slots, &rates);
    db.set_ticket_total_price(ticket.id, total).await?;

    Ok(total)
}

#[derive(Debug, From)]
pub enum Error {
    #[from]
    DbError(db::Error),
    TicketNotFound,
}
