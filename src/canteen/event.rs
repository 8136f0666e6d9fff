use super::{CustomerId, GroupId, ServerId};

use std::fmt::{Display, Formatter};

/// Things that can happen in the canteen. The execution time is kept next to the event by the event set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanteenEvent {
    /// A group enters the canteen.
    GroupArrival(GroupId),
    /// A customer is done grabbing food and reaches the checkout queues.
    CustomerArrival(CustomerId),
    /// A customer leaves the till of `server`.
    Departure { customer: CustomerId, server: ServerId },
}

impl Display for CanteenEvent {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::GroupArrival(group) => write!(f, "arrival of group {}", group.0),
            Self::CustomerArrival(customer) => write!(f, "queue arrival of {customer}"),
            Self::Departure { customer, server } => write!(f, "departure of {customer} from {server}"),
        }
    }
}
