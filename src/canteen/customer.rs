use super::{GroupId, QueueId};
use crate::Error;

use std::fmt::{Display, Formatter};

/// Identity of one customer: the group it arrived with and its position within that group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerId {
    pub group: GroupId,
    pub member: usize,
}

impl Display for CustomerId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "customer {}.{}", self.group.0, self.member)
    }
}

/// One visitor of the canteen.
///
/// A customer enters with its group, spends some time grabbing food and then joins a checkout queue. The queue it
/// joins and the time it leaves are unknown until the engine decides them.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    arrival_time: f64,
    food_grab_done_time: f64,
    uses_cash: bool,
    queue: Option<QueueId>,
    departure_time: Option<f64>,
}

impl Customer {
    /// # Errors
    ///
    /// Returns [`Error::InvalidCustomer`] unless `food_grab_done_time` is strictly after `arrival_time`.
    pub fn new(arrival_time: f64, food_grab_done_time: f64, uses_cash: bool) -> crate::Result<Self> {
        // also rejects NaN
        if !(food_grab_done_time > arrival_time) {
            return Err(Error::InvalidCustomer {
                arrival_time,
                food_grab_done_time,
            });
        }

        Ok(Self {
            arrival_time,
            food_grab_done_time,
            uses_cash,
            queue: None,
            departure_time: None,
        })
    }

    /// Time the customer's group entered the canteen.
    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    /// Time the customer reaches the checkout queues.
    pub fn food_grab_done_time(&self) -> f64 {
        self.food_grab_done_time
    }

    pub fn uses_cash(&self) -> bool {
        self.uses_cash
    }

    pub fn queue(&self) -> Option<QueueId> {
        self.queue
    }

    pub fn assign_queue(&mut self, queue: QueueId) {
        self.queue = Some(queue);
    }

    pub fn departure_time(&self) -> Option<f64> {
        self.departure_time
    }

    /// Fix the time this customer leaves the till.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if the customer would leave before reaching the queues.
    pub fn set_departure_time(&mut self, time: f64) -> crate::Result {
        if time < self.food_grab_done_time {
            return Err(Error::Internal(format!(
                "departure at {time} precedes queue arrival at {}",
                self.food_grab_done_time
            )));
        }
        self.departure_time = Some(time);
        Ok(())
    }

    /// Time from entering the canteen until leaving the till, once the departure time is known.
    pub fn sojourn_time(&self) -> Option<f64> {
        self.departure_time.map(|departure| departure - self.arrival_time)
    }
}

impl Display for Customer {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Customer arrived at {:.3}, queueing at {:.3}, paying by {}",
            self.arrival_time,
            self.food_grab_done_time,
            if self.uses_cash { "cash" } else { "card" }
        )
    }
}
