use super::{Customer, CustomerId};
use crate::Error;

use std::fmt::{Display, Formatter};

/// Index of a group within one run's group arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// Customers that enter the canteen together.
///
/// The group owns its members for the whole run. It stays in the canteen until its last member leaves the till; the
/// departure time of that member becomes the group's departure time.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    arrival_time: f64,
    customers: Vec<Customer>,
    present: Vec<bool>,
    departure_time: Option<f64>,
}

impl Group {
    /// # Errors
    ///
    /// Returns [`Error::InvalidGroup`] for an empty group or for members whose arrival time differs from the group's.
    pub fn new(arrival_time: f64, customers: Vec<Customer>) -> crate::Result<Self> {
        if customers.is_empty() {
            return Err(Error::InvalidGroup("a group needs at least one customer".into()));
        }
        if let Some(stray) = customers.iter().find(|c| c.arrival_time() != arrival_time) {
            return Err(Error::InvalidGroup(format!(
                "member arrived at {} but the group arrived at {arrival_time}",
                stray.arrival_time()
            )));
        }

        Ok(Self {
            arrival_time,
            present: vec![true; customers.len()],
            customers,
            departure_time: None,
        })
    }

    pub fn arrival_time(&self) -> f64 {
        self.arrival_time
    }

    pub fn size(&self) -> usize {
        self.customers.len()
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn customer(&self, member: usize) -> Option<&Customer> {
        self.customers.get(member)
    }

    pub fn customer_mut(&mut self, member: usize) -> Option<&mut Customer> {
        self.customers.get_mut(member)
    }

    /// Identities of all members, given this group's id.
    pub fn member_ids(&self, group: GroupId) -> impl Iterator<Item = CustomerId> {
        (0..self.customers.len()).map(move |member| CustomerId { group, member })
    }

    /// Whether any member is still inside.
    pub fn in_canteen(&self) -> bool {
        self.present.iter().any(|&here| here)
    }

    pub fn members_present(&self) -> usize {
        self.present.iter().filter(|&&here| here).count()
    }

    /// Record that `member` left at `time`. Returns `true` when this was the last member, in which case the group's
    /// departure time is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] for an unknown member or one that already left.
    pub fn mark_departed(&mut self, member: usize, time: f64) -> crate::Result<bool> {
        match self.present.get_mut(member) {
            Some(here) if *here => *here = false,
            Some(_) => return Err(Error::Internal(format!("group member {member} departed twice"))),
            None => {
                return Err(Error::Internal(format!(
                    "group of {} has no member {member}",
                    self.customers.len()
                )))
            },
        }

        if self.in_canteen() {
            return Ok(false);
        }
        let last_departure = self
            .customers
            .iter()
            .filter_map(Customer::departure_time)
            .fold(time, f64::max);
        self.departure_time = Some(last_departure);
        Ok(true)
    }

    pub fn departure_time(&self) -> Option<f64> {
        self.departure_time
    }

    /// Time from entering the canteen until the last member left, once the group has left.
    pub fn sojourn_time(&self) -> Option<f64> {
        self.departure_time.map(|departure| departure - self.arrival_time)
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Group of {} arrived at {:.3} ({} still inside)",
            self.size(),
            self.arrival_time,
            self.members_present()
        )
    }
}
