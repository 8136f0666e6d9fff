mod event_holder;

use crate::{Error, SimTime};
use event_holder::EventHolder;

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt::Debug;

/// Priority queue of scheduled events, the future event set (FES) of a simulation.
///
/// Events pop in ascending order of execution time, with ties broken by the order in which they were added. This
/// tiebreaker is in addition to any built into the implementation of [`SimTime`] used for the clock, and it is what
/// makes two runs with the same seed produce the same trajectory.
///
/// The set also keeps the simulation clock: popping an event moves the clock to that event's execution time. Adding an
/// event for a time before the clock fails with [`Error::BackInTime`] and leaves the set unchanged, so popped times
/// are guaranteed to be non-decreasing.
#[derive(Debug, Default)]
pub struct FutureEventSet<Event, Time>
where
    Time: SimTime,
{
    events: BinaryHeap<Reverse<EventHolder<Event, Time>>>,
    last_execution_time: Time,
    events_added: usize,
}

impl<Event, Time> FutureEventSet<Event, Time>
where
    Event: Debug,
    Time: SimTime,
{
    /// Construct a new [`FutureEventSet`] with no scheduled events and a clock initialized to the provided time.
    pub fn new(start_time: Time) -> Self {
        Self {
            events: BinaryHeap::default(),
            last_execution_time: start_time,
            events_added: 0,
        }
    }

    /// Schedule the provided event at the specified time. O(log n) in the number of pending events.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time, returns an [`Error::BackInTime`] to indicate the likely
    /// presence of a logical bug at the call site, with no modifications to the set.
    pub fn add(&mut self, event: Event, time: Time) -> crate::Result {
        if time < self.last_execution_time {
            return Err(Error::BackInTime);
        }

        let insertion_sequence = self.increment_event_count();
        self.events.push(Reverse(EventHolder {
            execution_time: time,
            event,
            insertion_sequence,
        }));
        Ok(())
    }

    fn increment_event_count(&mut self) -> usize {
        let count = self.events_added;
        self.events_added += 1;
        count
    }

    /// Remove the earliest event and return it together with its execution time. Updates the clock to match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySet`] when no events remain.
    pub fn next(&mut self) -> crate::Result<(Time, Event)>
    where
        Time: Clone,
    {
        let Reverse(holder) = self.events.pop().ok_or(Error::EmptySet)?;
        self.last_execution_time = holder.execution_time.clone();
        Ok((holder.execution_time, holder.event))
    }

    /// Execution time of the earliest pending event, if any.
    pub fn peek_time(&self) -> Option<&Time> {
        self.events.peek().map(|Reverse(holder)| &holder.execution_time)
    }

    /// Get a shared reference to the simulation's current clock time.
    pub fn current_time(&self) -> &Time {
        &self.last_execution_time
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Total number of events ever added, popped or not.
    pub fn events_added(&self) -> usize {
        self.events_added
    }
}

impl<Event, Time> std::fmt::Display for FutureEventSet<Event, Time>
where
    Time: SimTime,
{
    fn fmt(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            formatter,
            "FutureEventSet with {} scheduled events at current time {:?}",
            self.events.len(),
            self.last_execution_time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordered_float::OrderedFloat;

    #[derive(Debug, PartialEq)]
    struct Tag(u32);

    #[test]
    fn events_pop_in_time_order() {
        let mut fes = FutureEventSet::new(0u32);
        for (tag, time) in [(1, 7), (2, 3), (3, 9), (4, 1), (5, 3)] {
            fes.add(Tag(tag), time).unwrap();
        }

        let mut popped = Vec::new();
        while let Ok((time, _)) = fes.next() {
            popped.push(time);
        }
        assert_eq!(vec![1, 3, 3, 7, 9], popped, "times did not pop in non-decreasing order");
    }

    #[test]
    fn simultaneous_events_keep_insertion_order() {
        let mut fes = FutureEventSet::new(OrderedFloat(0.0));
        for tag in 0..5 {
            fes.add(Tag(tag), OrderedFloat(2.5)).unwrap();
        }
        fes.add(Tag(99), OrderedFloat(1.0)).unwrap();

        assert_eq!(Tag(99), fes.next().unwrap().1);
        for expected in 0..5 {
            assert_eq!(Tag(expected), fes.next().unwrap().1, "tie was not broken by insertion order");
        }
    }

    #[test]
    fn next_advances_clock() {
        let mut fes = FutureEventSet::new(0i64);
        fes.add(Tag(0), 4).unwrap();
        assert_eq!(Some(&4), fes.peek_time());
        assert_eq!(0, *fes.current_time());

        fes.next().unwrap();
        assert_eq!(4, *fes.current_time());
        assert_eq!(None, fes.peek_time());
    }

    #[test]
    fn empty_set_reports_error() {
        let mut fes: FutureEventSet<Tag, u32> = FutureEventSet::new(0);
        assert!(fes.is_empty());
        assert_eq!(Err(Error::EmptySet), fes.next().map(|_| ()));
    }

    #[test]
    fn adding_in_the_past_is_rejected() {
        let mut fes = FutureEventSet::new(0u32);
        fes.add(Tag(0), 5).unwrap();
        fes.next().unwrap();

        assert_eq!(Err(Error::BackInTime), fes.add(Tag(1), 4));
        assert_eq!(0, fes.len(), "rejected event should not be queued");
        assert_eq!(Ok(()), fes.add(Tag(2), 5), "events at the current time are allowed");
        assert_eq!(2, fes.events_added());
    }
}
