//! Measurements collected during one simulation run.

use crate::canteen::{Customer, Group};
use crate::Error;

use std::fmt::{Display, Formatter};

/// Accumulators for one run.
///
/// Queue lengths are integrated over time: each call to [`register_queue_length()`] closes the interval since the
/// previous call and weights the lengths passed in by its duration. The caller must therefore pass the lengths that
/// held during that interval, i.e. the state before the event at `time` is applied. Canteen occupancy is integrated
/// the same way, except that the value passed is the one that holds from `time` onwards.
///
/// Waiting, service and sojourn times are plain samples.
///
/// Only numbers are stored here; entities passed to the `register_*` methods are read and not retained.
///
/// [`register_queue_length()`]: SimResults::register_queue_length
#[derive(Debug, Clone)]
pub struct SimResults {
    queue_count: usize,
    start_time: f64,
    last_time: f64,
    sum_ql: Vec<f64>,
    sum_ql2: Vec<f64>,
    /// `time_at_length[q][k]` is the time queue `q` spent with exactly `k` customers.
    time_at_length: Vec<Vec<f64>>,
    waiting_times: Vec<Vec<f64>>,
    sum_w: Vec<f64>,
    sum_w2: Vec<f64>,
    service_times: Vec<Vec<f64>>,
    occupancy_times: Vec<f64>,
    occupancy_values: Vec<usize>,
    occupancy_area: f64,
    customer_sojourns: Vec<f64>,
    group_sojourns: Vec<f64>,
    groups_arrived: usize,
    customer_arrivals: usize,
    departures: usize,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl SimResults {
    pub fn new(queue_count: usize, start_time: f64) -> Self {
        Self {
            queue_count,
            start_time,
            last_time: start_time,
            sum_ql: vec![0.0; queue_count],
            sum_ql2: vec![0.0; queue_count],
            time_at_length: vec![Vec::new(); queue_count],
            waiting_times: vec![Vec::new(); queue_count],
            sum_w: vec![0.0; queue_count],
            sum_w2: vec![0.0; queue_count],
            service_times: vec![Vec::new(); queue_count],
            occupancy_times: vec![start_time],
            occupancy_values: vec![0],
            occupancy_area: 0.0,
            customer_sojourns: Vec::new(),
            group_sojourns: Vec::new(),
            groups_arrived: 0,
            customer_arrivals: 0,
            departures: 0,
        }
    }

    /// Close the interval `[last registration, time)` with the queue lengths that held on it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfOrder`] if `time` precedes the previous registration, [`Error::Internal`] if `lengths` does not
    /// have one entry per queue. Nothing is recorded in either case.
    pub fn register_queue_length(&mut self, time: f64, lengths: &[usize]) -> crate::Result {
        if lengths.len() != self.queue_count {
            return Err(Error::Internal(format!(
                "got {} queue lengths for {} queues",
                lengths.len(),
                self.queue_count
            )));
        }
        // also rejects NaN
        if !(time >= self.last_time) {
            return Err(Error::OutOfOrder {
                last: self.last_time,
                time,
            });
        }

        let dt = time - self.last_time;
        for (q, &length) in lengths.iter().enumerate() {
            let ql = length as f64;
            self.sum_ql[q] += ql * dt;
            self.sum_ql2[q] += ql * ql * dt;

            let histogram = &mut self.time_at_length[q];
            if histogram.len() <= length {
                histogram.resize(length + 1, 0.0);
            }
            histogram[length] += dt;
        }
        self.last_time = time;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::Internal`] for a negative waiting time or an unknown queue.
    pub fn register_waiting_time(&mut self, value: f64, queue: usize) -> crate::Result {
        if !(value >= 0.0) {
            return Err(Error::Internal(format!("negative waiting time {value} in queue {queue}")));
        }
        self.check_queue(queue)?;
        self.waiting_times[queue].push(value);
        self.sum_w[queue] += value;
        self.sum_w2[queue] += value * value;
        Ok(())
    }

    /// # Errors
    ///
    /// [`Error::Internal`] for an unknown queue.
    pub fn register_service_time(&mut self, value: f64, queue: usize) -> crate::Result {
        self.check_queue(queue)?;
        self.service_times[queue].push(value);
        Ok(())
    }

    /// Record that `n` customers are in the canteen from `time` onwards.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfOrder`] if `time` precedes the previous occupancy registration.
    pub fn register_canteen_occupancy(&mut self, time: f64, n: usize) -> crate::Result {
        let (last_time, last_n) = self.last_occupancy();
        if !(time >= last_time) {
            return Err(Error::OutOfOrder { last: last_time, time });
        }
        self.occupancy_area += last_n as f64 * (time - last_time);
        self.occupancy_times.push(time);
        self.occupancy_values.push(n);
        Ok(())
    }

    fn last_occupancy(&self) -> (f64, usize) {
        match (self.occupancy_times.last(), self.occupancy_values.last()) {
            (Some(&time), Some(&n)) => (time, n),
            _ => (self.start_time, 0),
        }
    }

    pub fn register_group_arrival(&mut self) {
        self.groups_arrived += 1;
    }

    /// Count a customer that has reached the queues.
    pub fn register_customer_arrival(&mut self) {
        self.customer_arrivals += 1;
    }

    /// Count a customer that has left the till.
    pub fn register_departure(&mut self) {
        self.departures += 1;
    }

    /// Record a customer's time in the system.
    ///
    /// # Errors
    ///
    /// [`Error::Internal`] if the customer's departure time is not known yet.
    pub fn register_sojourn_time(&mut self, customer: &Customer) -> crate::Result {
        let sojourn = customer
            .sojourn_time()
            .ok_or_else(|| Error::Internal("sojourn time of a customer without departure time".into()))?;
        self.customer_sojourns.push(sojourn);
        Ok(())
    }

    /// Record a group's time in the system.
    ///
    /// # Errors
    ///
    /// [`Error::Internal`] if members of the group are still inside.
    pub fn register_group(&mut self, group: &Group) -> crate::Result {
        let sojourn = group
            .sojourn_time()
            .ok_or_else(|| Error::Internal(format!("sojourn time of a group still in the canteen: {group}")))?;
        self.group_sojourns.push(sojourn);
        Ok(())
    }

    fn check_queue(&self, queue: usize) -> crate::Result {
        if queue < self.queue_count {
            Ok(())
        } else {
            Err(Error::Internal(format!("queue {queue} out of {} queues", self.queue_count)))
        }
    }

    pub fn queue_count(&self) -> usize {
        self.queue_count
    }

    /// Simulated time covered by the queue-length registrations.
    pub fn elapsed(&self) -> f64 {
        self.last_time - self.start_time
    }

    /// Time-weighted mean length of each queue.
    pub fn mean_queue_length(&self) -> Vec<f64> {
        let elapsed = self.elapsed();
        if elapsed <= 0.0 {
            // nothing has been observed yet, and every queue starts empty
            return vec![0.0; self.queue_count];
        }
        self.sum_ql.iter().map(|sum| sum / elapsed).collect()
    }

    /// Time-weighted variance of each queue's length.
    pub fn variance_queue_length(&self) -> Vec<f64> {
        let elapsed = self.elapsed();
        if elapsed <= 0.0 {
            return vec![0.0; self.queue_count];
        }
        self.sum_ql2
            .iter()
            .zip(self.mean_queue_length())
            .map(|(sum2, mean)| (sum2 / elapsed - mean * mean).max(0.0))
            .collect()
    }

    /// Fraction of the observed time queue `queue` held exactly `k` customers, indexed by `k`.
    pub fn queue_length_distribution(&self, queue: usize) -> Vec<f64> {
        let elapsed = self.elapsed();
        match self.time_at_length.get(queue) {
            Some(histogram) if elapsed > 0.0 => histogram.iter().map(|t| t / elapsed).collect(),
            _ => Vec::new(),
        }
    }

    /// Queue-length distribution averaged over all queues.
    pub fn pooled_queue_length_distribution(&self) -> Vec<f64> {
        let mut pooled: Vec<f64> = Vec::new();
        for queue in 0..self.queue_count {
            let distribution = self.queue_length_distribution(queue);
            if pooled.len() < distribution.len() {
                pooled.resize(distribution.len(), 0.0);
            }
            for (k, p) in distribution.into_iter().enumerate() {
                pooled[k] += p / self.queue_count as f64;
            }
        }
        pooled
    }

    /// Mean waiting time of the customers served by `queue`, if it served anyone.
    pub fn mean_waiting_time(&self, queue: usize) -> Option<f64> {
        let count = self.waiting_times.get(queue)?.len();
        if count == 0 {
            return None;
        }
        Some(self.sum_w[queue] / count as f64)
    }

    pub fn variance_waiting_time(&self, queue: usize) -> Option<f64> {
        let mean = self.mean_waiting_time(queue)?;
        let count = self.waiting_times[queue].len() as f64;
        Some((self.sum_w2[queue] / count - mean * mean).max(0.0))
    }

    /// Mean waiting time over every customer served, regardless of queue.
    pub fn mean_waiting_time_all(&self) -> Option<f64> {
        let count: usize = self.waiting_times.iter().map(Vec::len).sum();
        if count == 0 {
            return None;
        }
        Some(self.sum_w.iter().sum::<f64>() / count as f64)
    }

    pub fn mean_service_time(&self, queue: usize) -> Option<f64> {
        mean(self.service_times.get(queue)?)
    }

    /// Time-weighted mean number of customers in the canteen.
    pub fn mean_canteen_occupancy(&self) -> f64 {
        let (last_time, _) = self.last_occupancy();
        let span = last_time - self.start_time;
        if span > 0.0 {
            self.occupancy_area / span
        } else {
            0.0
        }
    }

    pub fn mean_sojourn_customer(&self) -> Option<f64> {
        mean(&self.customer_sojourns)
    }

    pub fn mean_sojourn_group(&self) -> Option<f64> {
        mean(&self.group_sojourns)
    }

    pub fn waiting_times(&self, queue: usize) -> &[f64] {
        self.waiting_times.get(queue).map_or(&[], Vec::as_slice)
    }

    pub fn all_waiting_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.waiting_times.iter().flatten().copied()
    }

    pub fn service_times(&self, queue: usize) -> &[f64] {
        self.service_times.get(queue).map_or(&[], Vec::as_slice)
    }

    /// Canteen occupancy as `(time, customers inside from then on)` steps.
    pub fn canteen_series(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.occupancy_times
            .iter()
            .copied()
            .zip(self.occupancy_values.iter().copied())
    }

    pub fn customer_sojourn_times(&self) -> &[f64] {
        &self.customer_sojourns
    }

    pub fn group_sojourn_times(&self) -> &[f64] {
        &self.group_sojourns
    }

    pub fn groups_arrived(&self) -> usize {
        self.groups_arrived
    }

    pub fn customer_arrivals(&self) -> usize {
        self.customer_arrivals
    }

    pub fn departures(&self) -> usize {
        self.departures
    }
}

impl Display for SimResults {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let means = self.mean_queue_length();
        let variances = self.variance_queue_length();
        for q in 0..self.queue_count {
            writeln!(f, "Mean queue {} length: {:.3}", q + 1, means[q])?;
            writeln!(f, "Std queue {} length: {:.3}", q + 1, variances[q].sqrt())?;
            match (self.mean_waiting_time(q), self.variance_waiting_time(q)) {
                (Some(mean), Some(variance)) => {
                    writeln!(f, "Mean waiting time of queue {}: {:.3}", q + 1, mean)?;
                    writeln!(f, "Std waiting time of queue {}: {:.3}", q + 1, variance.sqrt())?;
                },
                _ => writeln!(f, "Queue {} served no customers", q + 1)?,
            }
        }
        write!(
            f,
            "{} groups, {} customers arrived, {} departed, mean occupancy {:.3}",
            self.groups_arrived,
            self.customer_arrivals,
            self.departures,
            self.mean_canteen_occupancy()
        )
    }
}
