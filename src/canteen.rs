//! The canteen model: entities, events and the state that drives one run.
//!
//! Groups of customers enter the canteen, each member grabs food for a while and then joins the shortest checkout
//! queue. Every queue is bound to one or more servers. Customers leave the canteen when they leave the till, and a
//! group leaves with its last member.

mod customer;
mod event;
mod group;
mod model;
mod queue;
mod server;

pub use customer::{Customer, CustomerId};
pub use event::CanteenEvent;
pub use group::{Group, GroupId};
pub use model::{Canteen, CanteenSetup};
pub use queue::{Queue, QueueId};
pub use server::{Server, ServerId};

use ordered_float::OrderedFloat;

/// Simulation clock of the canteen, in seconds since the start of service.
pub type Clock = OrderedFloat<f64>;
