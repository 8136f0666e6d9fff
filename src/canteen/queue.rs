use super::{CustomerId, ServerId};
use crate::Error;

use std::collections::VecDeque;
use std::fmt::{Display, Formatter};

/// Index of a checkout queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueueId(pub usize);

/// A FIFO checkout line bound to one or more servers.
///
/// The line holds both the customers being served and the ones waiting. Service starts in arrival order, so the
/// customers in service always form the front of the line: with `s` servers, positions `0..min(len, s)` are at a till
/// and everything behind them waits.
///
/// Each bound server has an occupancy slot naming the customer it serves. Departures must name both the customer and
/// the server, and the pair is checked against the slot before the customer leaves the line.
#[derive(Debug, Clone)]
pub struct Queue {
    id: QueueId,
    line: VecDeque<CustomerId>,
    servers: Vec<ServerId>,
    serving: Vec<Option<CustomerId>>,
}

impl Queue {
    pub fn new(id: QueueId) -> Self {
        Self {
            id,
            line: VecDeque::new(),
            servers: Vec::new(),
            serving: Vec::new(),
        }
    }

    pub fn id(&self) -> QueueId {
        self.id
    }

    pub fn add_server(&mut self, server: ServerId) {
        self.servers.push(server);
        self.serving.push(None);
    }

    pub fn servers(&self) -> &[ServerId] {
        &self.servers
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    /// Customers in the line, in service or waiting.
    pub fn length(&self) -> usize {
        self.line.len()
    }

    /// Customers in the line that are not yet at a till.
    pub fn waiting(&self) -> usize {
        self.line.len().saturating_sub(self.busy_servers())
    }

    pub fn busy_servers(&self) -> usize {
        self.serving.iter().filter(|slot| slot.is_some()).count()
    }

    /// Append `customer` to the tail and return the new length.
    pub fn enqueue(&mut self, customer: CustomerId) -> usize {
        self.line.push_back(customer);
        self.line.len()
    }

    /// The first customer behind the tills, provided a server is free to take them.
    pub fn next_waiting(&self) -> Option<CustomerId> {
        let busy = self.busy_servers();
        if busy >= self.servers.len() {
            return None;
        }
        self.line.get(busy).copied()
    }

    /// Put `customer` at the first free server of this queue and return that server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::QueueConsistency`] when every server is busy or when `customer` is not the first one behind
    /// the tills.
    pub fn start_service(&mut self, customer: CustomerId) -> crate::Result<ServerId> {
        let slot = self
            .serving
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| self.inconsistency(format!("a free server for {customer}"), "all servers busy".into()))?;

        let busy = self.busy_servers();
        match self.line.iter().position(|&c| c == customer) {
            Some(position) if position == busy => {},
            Some(position) => {
                return Err(self.inconsistency(
                    format!("{customer} at position {busy}"),
                    format!("it at position {position}"),
                ))
            },
            None => return Err(self.inconsistency(customer.to_string(), "it missing from the line".into())),
        }

        self.serving[slot] = Some(customer);
        Ok(self.servers[slot])
    }

    /// Remove `customer`, who has finished service at `server`.
    ///
    /// With a single server the customer must be at the head of the line. With several servers the customer must be
    /// among the ones in service and must occupy `server`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] on an empty line and [`Error::QueueConsistency`] for any mismatch, without
    /// modifying the queue.
    pub fn dequeue_matching(&mut self, customer: CustomerId, server: ServerId) -> crate::Result {
        let head = *self
            .line
            .front()
            .ok_or_else(|| Error::Internal(format!("departure of {customer} from empty queue {}", self.id.0)))?;

        let position = if self.servers.len() == 1 {
            if head != customer {
                return Err(self.inconsistency(customer.to_string(), head.to_string()));
            }
            0
        } else {
            self.line
                .iter()
                .take(self.servers.len())
                .position(|&c| c == customer)
                .ok_or_else(|| self.inconsistency(format!("{customer} in service"), "it not at a till".into()))?
        };

        let slot = self
            .servers
            .iter()
            .position(|&s| s == server)
            .ok_or_else(|| self.inconsistency(format!("{server} bound to this queue"), "an unbound server".into()))?;
        match self.serving[slot] {
            Some(occupant) if occupant == customer => {},
            Some(occupant) => {
                return Err(self.inconsistency(format!("{customer} at {server}"), occupant.to_string()));
            },
            None => return Err(self.inconsistency(format!("{customer} at {server}"), "an idle server".into())),
        }

        self.serving[slot] = None;
        self.line.remove(position);
        Ok(())
    }

    fn inconsistency(&self, expected: String, found: String) -> Error {
        Error::QueueConsistency {
            queue: self.id.0,
            expected,
            found,
        }
    }
}

impl Display for Queue {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Queue {} length: {} ({} of {} servers busy)",
            self.id.0,
            self.line.len(),
            self.busy_servers(),
            self.servers.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canteen::GroupId;

    fn customer(group: usize, member: usize) -> CustomerId {
        CustomerId {
            group: GroupId(group),
            member,
        }
    }

    fn queue_with_servers(count: usize) -> Queue {
        let mut queue = Queue::new(QueueId(0));
        for id in 0..count {
            queue.add_server(ServerId(id));
        }
        queue
    }

    #[test]
    fn single_server_serves_in_order() {
        let mut queue = queue_with_servers(1);
        let (a, b) = (customer(0, 0), customer(0, 1));

        assert_eq!(1, queue.enqueue(a));
        assert_eq!(Ok(ServerId(0)), queue.start_service(a));
        assert_eq!(2, queue.enqueue(b));
        assert_eq!(1, queue.waiting());
        assert_eq!(None, queue.next_waiting(), "the only server is busy");

        queue.dequeue_matching(a, ServerId(0)).unwrap();
        assert_eq!(Some(b), queue.next_waiting());
        assert_eq!(Ok(ServerId(0)), queue.start_service(b));
        queue.dequeue_matching(b, ServerId(0)).unwrap();
        assert_eq!(0, queue.length());
    }

    #[test]
    fn single_server_rejects_wrong_customer() {
        let mut queue = queue_with_servers(1);
        let (a, b) = (customer(0, 0), customer(1, 0));
        queue.enqueue(a);
        queue.start_service(a).unwrap();
        queue.enqueue(b);

        let result = queue.dequeue_matching(b, ServerId(0));
        assert!(matches!(result, Err(Error::QueueConsistency { queue: 0, .. })));
        assert_eq!(2, queue.length(), "failed dequeue should leave the queue untouched");
    }

    #[test]
    fn empty_queue_dequeue_is_internal_error() {
        let mut queue = queue_with_servers(1);
        assert!(matches!(
            queue.dequeue_matching(customer(0, 0), ServerId(0)),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn multiple_servers_track_occupancy() {
        let mut queue = queue_with_servers(2);
        let (a, b, c) = (customer(0, 0), customer(1, 0), customer(2, 0));

        queue.enqueue(a);
        assert_eq!(Ok(ServerId(0)), queue.start_service(a));
        queue.enqueue(b);
        assert_eq!(Ok(ServerId(1)), queue.start_service(b));
        queue.enqueue(c);
        assert_eq!(1, queue.waiting());
        assert!(queue.start_service(c).is_err(), "no free server and c is behind the tills");

        // b finishes before a
        assert!(
            queue.dequeue_matching(b, ServerId(0)).is_err(),
            "b is not at server 0"
        );
        queue.dequeue_matching(b, ServerId(1)).unwrap();
        assert_eq!(Some(c), queue.next_waiting());
        assert_eq!(Ok(ServerId(1)), queue.start_service(c));
        assert_eq!(2, queue.busy_servers());
    }

    #[test]
    fn waiting_customer_cannot_depart() {
        let mut queue = queue_with_servers(2);
        let (a, b, c) = (customer(0, 0), customer(0, 1), customer(0, 2));
        for id in [a, b, c] {
            queue.enqueue(id);
        }
        queue.start_service(a).unwrap();
        queue.start_service(b).unwrap();

        assert!(matches!(
            queue.dequeue_matching(c, ServerId(0)),
            Err(Error::QueueConsistency { .. })
        ));
    }

    #[test]
    fn next_waiting_is_first_behind_the_tills() {
        let mut queue = queue_with_servers(3);
        let (a, b, c) = (customer(0, 0), customer(0, 1), customer(0, 2));
        for id in [a, b, c] {
            queue.enqueue(id);
        }
        assert_eq!(Some(a), queue.next_waiting());
        queue.start_service(a).unwrap();
        assert_eq!(Some(b), queue.next_waiting());
        assert!(queue.start_service(c).is_err(), "c may not overtake b");
    }
}
