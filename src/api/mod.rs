pub mod part;
pub mod ticket;
pub mod time_slot;
pub mod worker;

pub use self::{
    part::Part, ticket::Ticket, time_slot::TimeSlot, worker::Worker,
};
