use super::{CanteenEvent, Clock, Customer, CustomerId, Group, GroupId, Queue, QueueId, Server, ServerId};
use crate::{Error, FutureEventSet, Sampler, ServiceParams, SimResults, SimState, SimulationConfig, MAX_GROUP_SIZE};

use log::{debug, trace};
use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

/// Validated, immutable description of one scenario: the layout of the canteen and the distributions it draws from.
///
/// A setup is shared by every run of its scenario; each run builds its own [`Canteen`] from it.
#[derive(Debug, Clone)]
pub struct CanteenSetup {
    arrival_rate: f64,
    horizon: f64,
    num_queues: usize,
    servers_per_queue: usize,
    service: ServiceParams,
    inter_arrival: Sampler,
    group_size: Sampler,
    grab_food: Sampler,
    payment: Sampler,
}

impl CanteenSetup {
    /// Build the setup for `arrival_rate` groups per second, with everything else taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for any parameter that would make the model meaningless: a non-positive rate,
    /// mean or horizon, a probability outside its range, servers that cannot be split evenly over the queues, or a
    /// group-size parameter whose mean group exceeds [`MAX_GROUP_SIZE`].
    pub fn new(config: &SimulationConfig, arrival_rate: f64) -> crate::Result<Self> {
        if !(arrival_rate.is_finite() && arrival_rate > 0.0) {
            return Err(Error::Configuration(format!("arrival rate must be positive, got {arrival_rate}")));
        }
        if config.num_queues == 0 || config.num_servers % config.num_queues != 0 || config.num_servers == 0 {
            return Err(Error::Configuration(format!(
                "cannot bind {} servers evenly to {} queues",
                config.num_servers, config.num_queues
            )));
        }
        if !(config.horizon_seconds.is_finite() && config.horizon_seconds > 0.0) {
            return Err(Error::Configuration(format!(
                "horizon must be positive, got {}",
                config.horizon_seconds
            )));
        }
        if config.group_size_param < 1.0 / MAX_GROUP_SIZE as f64 {
            return Err(Error::Configuration(format!(
                "group size parameter {} implies a mean group larger than {MAX_GROUP_SIZE}",
                config.group_size_param
            )));
        }
        // the servers build their samplers per run; fail here instead of in every run
        Server::new(ServerId(0), &config.service)?;

        Ok(Self {
            arrival_rate,
            horizon: config.horizon_seconds,
            num_queues: config.num_queues,
            servers_per_queue: config.servers_per_queue(),
            service: config.service,
            inter_arrival: Sampler::exponential(1.0 / arrival_rate)?,
            group_size: Sampler::geometric(config.group_size_param)?,
            grab_food: Sampler::exponential(config.grab_food_mean_time)?,
            payment: Sampler::bernoulli(config.payment_probability)?,
        })
    }

    /// Group arrival rate, in groups per second.
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn num_queues(&self) -> usize {
        self.num_queues
    }

    pub fn servers_per_queue(&self) -> usize {
        self.servers_per_queue
    }
}

/// State of one canteen run.
///
/// Groups are stored in an arena indexed by [`GroupId`] and own their customers, so events refer to customers by
/// [`CustomerId`]. Queues refer to servers by [`ServerId`], which indexes `servers`.
///
/// The run is complete once the clock has passed the horizon and the canteen is empty. Groups are generated one ahead:
/// each group arrival draws the gap to the next one, and no group is created at or after the horizon.
#[derive(Debug)]
pub struct Canteen {
    horizon: f64,
    inter_arrival: Sampler,
    group_size: Sampler,
    grab_food: Sampler,
    payment: Sampler,
    queues: Vec<Queue>,
    servers: Vec<Server>,
    groups: Vec<Group>,
    /// Customers inside, from group arrival until their own departure.
    occupancy: usize,
    rng: Pcg64,
    results: SimResults,
}

impl Canteen {
    /// Fresh canteen for one run, drawing all randomness from a generator seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if a server cannot be built from the setup's service parameters.
    pub fn new(setup: &CanteenSetup, seed: u64) -> crate::Result<Self> {
        let mut queues = Vec::with_capacity(setup.num_queues);
        let mut servers = Vec::with_capacity(setup.num_queues * setup.servers_per_queue);
        for q in 0..setup.num_queues {
            let mut queue = Queue::new(QueueId(q));
            for _ in 0..setup.servers_per_queue {
                let id = ServerId(servers.len());
                servers.push(Server::new(id, &setup.service)?);
                queue.add_server(id);
            }
            queues.push(queue);
        }

        Ok(Self {
            horizon: setup.horizon,
            inter_arrival: setup.inter_arrival,
            group_size: setup.group_size,
            grab_food: setup.grab_food,
            payment: setup.payment,
            results: SimResults::new(queues.len(), 0.0),
            queues,
            servers,
            groups: Vec::new(),
            occupancy: 0,
            rng: Pcg64::seed_from_u64(seed),
        })
    }

    /// Create the first group one inter-arrival gap after the current time of `event_set`. Returns false if that gap
    /// already reaches past the horizon, leaving the canteen empty for the whole run.
    ///
    /// # Errors
    ///
    /// Passes on any error raised while creating the group.
    pub fn schedule_first_group(&mut self, event_set: &mut FutureEventSet<CanteenEvent, Clock>) -> crate::Result<bool> {
        let arrival_time = event_set.current_time().0 + self.inter_arrival.sample1(&mut self.rng);
        if arrival_time >= self.horizon {
            return Ok(false);
        }
        self.create_group(arrival_time, event_set)?;
        Ok(true)
    }

    /// Draw a group arriving at `arrival_time` and schedule its arrival along with each member's arrival at the
    /// queues.
    fn create_group(
        &mut self,
        arrival_time: f64,
        event_set: &mut FutureEventSet<CanteenEvent, Clock>,
    ) -> crate::Result<GroupId> {
        let drawn = self.group_size.sample1(&mut self.rng);
        if drawn > MAX_GROUP_SIZE as f64 {
            return Err(Error::InvalidGroup(format!(
                "drawn group size {drawn} exceeds {MAX_GROUP_SIZE}"
            )));
        }
        // geometric samples count trials, so this is at least 1
        let size = drawn.max(1.0) as usize;
        let mut customers = Vec::with_capacity(size);
        for _ in 0..size {
            let grab = self.grab_food.sample1(&mut self.rng);
            let uses_cash = self.payment.sample1(&mut self.rng) == 1.0;
            let customer = Customer::new(arrival_time, arrival_time + grab, uses_cash)
                .map_err(|e| Error::InvalidGroup(format!("member could not be created: {e}")))?;
            customers.push(customer);
        }

        let group = Group::new(arrival_time, customers)?;
        let id = GroupId(self.groups.len());
        event_set.add(CanteenEvent::GroupArrival(id), OrderedFloat(arrival_time))?;
        for (member, customer) in group.member_ids(id).zip(group.customers()) {
            event_set.add(
                CanteenEvent::CustomerArrival(member),
                OrderedFloat(customer.food_grab_done_time()),
            )?;
        }
        debug!("created group {} of {} arriving at {arrival_time:.3}", id.0, group.size());
        self.groups.push(group);
        Ok(id)
    }

    fn group_arrival(
        &mut self,
        id: GroupId,
        now: f64,
        event_set: &mut FutureEventSet<CanteenEvent, Clock>,
    ) -> crate::Result {
        let size = self.group(id)?.size();
        self.occupancy += size;
        self.results.register_group_arrival();
        self.results.register_canteen_occupancy(now, self.occupancy)?;

        let next_arrival = now + self.inter_arrival.sample1(&mut self.rng);
        if next_arrival < self.horizon {
            self.create_group(next_arrival, event_set)?;
        }
        Ok(())
    }

    fn customer_arrival(
        &mut self,
        id: CustomerId,
        now: f64,
        event_set: &mut FutureEventSet<CanteenEvent, Clock>,
    ) -> crate::Result {
        let q = self.shortest_queue()?;
        let length = self.queues[q].enqueue(id);
        self.customer_mut(id)?.assign_queue(QueueId(q));
        self.results.register_customer_arrival();

        if length <= self.queues[q].server_count() {
            self.start_service(id, q, now, event_set)?;
        }
        Ok(())
    }

    fn departure(
        &mut self,
        id: CustomerId,
        server: ServerId,
        now: f64,
        event_set: &mut FutureEventSet<CanteenEvent, Clock>,
    ) -> crate::Result {
        let q = self
            .customer(id)?
            .queue()
            .ok_or_else(|| Error::Internal(format!("{id} departed without joining a queue")))?
            .0;
        self.queues
            .get_mut(q)
            .ok_or_else(|| Error::Internal(format!("{id} assigned to unknown queue {q}")))?
            .dequeue_matching(id, server)?;

        self.occupancy = self
            .occupancy
            .checked_sub(1)
            .ok_or_else(|| Error::Internal(format!("{id} departed from an empty canteen")))?;
        self.results.register_departure();
        self.results.register_canteen_occupancy(now, self.occupancy)?;

        let group = self
            .groups
            .get_mut(id.group.0)
            .ok_or_else(|| Error::Internal(format!("unknown group {}", id.group.0)))?;
        if group.mark_departed(id.member, now)? {
            debug!("group {} left after {:?}", id.group.0, group.sojourn_time());
            self.results.register_group(group)?;
        }

        if let Some(next) = self.queues[q].next_waiting() {
            self.start_service(next, q, now, event_set)?;
        }
        Ok(())
    }

    /// Put `id` at a free server of queue `q`, draw its service time and schedule its departure.
    fn start_service(
        &mut self,
        id: CustomerId,
        q: usize,
        now: f64,
        event_set: &mut FutureEventSet<CanteenEvent, Clock>,
    ) -> crate::Result {
        let server_id = self.queues[q].start_service(id)?;
        let uses_cash = self.customer(id)?.uses_cash();
        let server = self
            .servers
            .get(server_id.0)
            .ok_or_else(|| Error::Internal(format!("queue {q} is bound to unknown {server_id}")))?;
        let service = server.service_time(uses_cash, &mut self.rng);
        let departure_time = now + service;

        let customer = self
            .groups
            .get_mut(id.group.0)
            .and_then(|group| group.customer_mut(id.member))
            .ok_or_else(|| Error::Internal(format!("unknown {id}")))?;
        customer.set_departure_time(departure_time)?;
        let waiting = now - customer.food_grab_done_time();
        self.results.register_sojourn_time(customer)?;
        self.results.register_waiting_time(waiting, q)?;
        self.results.register_service_time(service, q)?;

        event_set.add(
            CanteenEvent::Departure {
                customer: id,
                server: server_id,
            },
            OrderedFloat(departure_time),
        )?;
        debug!("{id} served by {server_id} after waiting {waiting:.3}, leaves at {departure_time:.3}");
        Ok(())
    }

    /// Index of a shortest queue, ties broken uniformly at random.
    fn shortest_queue(&mut self) -> crate::Result<usize> {
        let shortest = self
            .queues
            .iter()
            .map(Queue::length)
            .min()
            .ok_or_else(|| Error::Internal("canteen has no queues".into()))?;
        let candidates: Vec<usize> = self
            .queues
            .iter()
            .enumerate()
            .filter(|(_, queue)| queue.length() == shortest)
            .map(|(q, _)| q)
            .collect();

        Ok(match candidates.len() {
            1 => candidates[0],
            n => candidates[self.rng.random_range(0..n)],
        })
    }

    fn group(&self, id: GroupId) -> crate::Result<&Group> {
        self.groups
            .get(id.0)
            .ok_or_else(|| Error::Internal(format!("unknown group {}", id.0)))
    }

    fn customer(&self, id: CustomerId) -> crate::Result<&Customer> {
        self.group(id.group)?
            .customer(id.member)
            .ok_or_else(|| Error::Internal(format!("unknown {id}")))
    }

    fn customer_mut(&mut self, id: CustomerId) -> crate::Result<&mut Customer> {
        self.groups
            .get_mut(id.group.0)
            .and_then(|group| group.customer_mut(id.member))
            .ok_or_else(|| Error::Internal(format!("unknown {id}")))
    }

    /// Current length of every queue, in queue order.
    pub fn queue_lengths(&self) -> Vec<usize> {
        self.queues.iter().map(Queue::length).collect()
    }

    pub fn queues(&self) -> &[Queue] {
        &self.queues
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Customers currently inside the canteen.
    pub fn occupancy(&self) -> usize {
        self.occupancy
    }

    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    pub fn results(&self) -> &SimResults {
        &self.results
    }

    /// End the run and hand over its measurements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if customers are still inside, which means the event set ran dry before the
    /// canteen drained.
    pub fn into_results(self) -> crate::Result<SimResults> {
        if self.occupancy != 0 {
            return Err(Error::Internal(format!(
                "run ended with {} customers still inside",
                self.occupancy
            )));
        }
        Ok(self.results)
    }
}

impl SimState<Clock> for Canteen {
    type Event = CanteenEvent;

    fn execute(&mut self, event: CanteenEvent, event_set: &mut FutureEventSet<CanteenEvent, Clock>) -> crate::Result {
        let now = event_set.current_time().0;
        trace!("{now:.3}: {event}");
        match event {
            CanteenEvent::GroupArrival(group) => self.group_arrival(group, now, event_set),
            CanteenEvent::CustomerArrival(customer) => self.customer_arrival(customer, now, event_set),
            CanteenEvent::Departure { customer, server } => self.departure(customer, server, now, event_set),
        }
    }

    fn observe(&mut self, next_time: &Clock) -> crate::Result {
        let lengths = self.queue_lengths();
        self.results.register_queue_length(next_time.0, &lengths)
    }

    fn is_complete(&self, current_time: &Clock) -> bool {
        current_time.0 >= self.horizon && self.occupancy == 0
    }
}
