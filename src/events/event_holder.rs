use crate::SimTime;
use std::cmp::Ordering;

/// Helper struct for the future event set. Holds the event itself alongside the data necessary to sort it within the
/// priority queue, namely the execution time and a record of the event's insertion sequence.
///
/// The implementation of [`Ord`] on this struct cares first about the execution time, comparing the insertion
/// sequences only to break ties. The event payload never takes part in comparisons.
#[derive(Debug)]
pub(super) struct EventHolder<Event, Time>
where
    Time: SimTime,
{
    pub execution_time: Time,
    pub event: Event,
    pub insertion_sequence: usize,
}

impl<Event, Time> PartialEq<Self> for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn eq(&self, other: &Self) -> bool {
        self.insertion_sequence == other.insertion_sequence && self.execution_time == other.execution_time
    }
}

impl<Event, Time> Eq for EventHolder<Event, Time> where Time: SimTime {}

impl<Event, Time> PartialOrd<Self> for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Event, Time> Ord for EventHolder<Event, Time>
where
    Time: SimTime,
{
    fn cmp(&self, other: &Self) -> Ordering {
        self.execution_time
            .cmp(&other.execution_time)
            .then_with(|| self.insertion_sequence.cmp(&other.insertion_sequence))
    }
}
