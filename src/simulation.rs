use crate::{Error, FutureEventSet, SimState, SimTime};

use std::fmt::Formatter;

/// Lifecycle of a [`Simulation`]. A simulation runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Constructed, initial events may still be scheduled.
    #[default]
    Idle,
    /// Inside [`Simulation::run()`].
    Running,
    /// [`Simulation::run()`] has returned, successfully or not.
    Finished,
}

/// Contains the future event set and the model state belonging to one replication.
///
/// A [`Simulation`] owns both its state and its event set, providing shared and mutable access to each so clients can
/// set up and tear down instances as needed - for example, scheduling initial events or reading the final results.
///
/// The expected workflow for a Simulation is:
///
/// 1. Initialize a struct that implements [`SimState`].
/// 2. Pass this struct and the start time to [`new()`].
/// 3. Schedule at least one initial event.
/// 4. Call [`run()`]. Handle any error it might return.
/// 5. Use [`state()`] or [`into_state()`] to finish processing the results.
///
/// [`new()`]: Simulation::new
/// [`run()`]: Simulation::run
/// [`state()`]: Simulation::state
/// [`into_state()`]: Simulation::into_state
#[derive(Debug)]
pub struct Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    /// Pending events, ordered ascending by execution time.
    event_set: FutureEventSet<State::Event, Time>,
    /// Exclusive access will be granted to each event that executes.
    state: State,
    phase: Phase,
    events_executed: usize,
}

impl<State, Time> Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime + Clone,
{
    /// Initialize a Simulation instance with the provided starting state and an event set with clock set to the
    /// provided starting time.
    pub fn new(initial_state: State, start_time: Time) -> Self {
        Self {
            event_set: FutureEventSet::new(start_time),
            state: initial_state,
            phase: Phase::Idle,
            events_executed: 0,
        }
    }

    /// Execute events from the future event set, one at a time, in ascending order by execution time.
    ///
    /// Follows this loop:
    ///
    /// 1. Does [`state.is_complete()`] return true, or is the event set empty? If so, return `Ok(())`.
    /// 2. Pass the next event's execution time to [`state.observe()`] while the state still describes the interval
    ///    leading up to it.
    /// 3. Pop the event, advancing the clock, and pass it to [`state.execute()`].
    /// 4. Go back to step 1.
    ///
    /// The phase moves to [`Phase::Running`] on entry and to [`Phase::Finished`] on exit, whether or not an error
    /// occurred.
    ///
    /// # Errors
    ///
    /// Calling this method on a simulation that is not [`Phase::Idle`] returns an [`Error::Internal`]. Errors raised
    /// by [`state.observe()`], [`state.execute()`] or the event set are passed back unchanged and end the run.
    ///
    /// [`state.is_complete()`]: SimState::is_complete
    /// [`state.observe()`]: SimState::observe
    /// [`state.execute()`]: SimState::execute
    pub fn run(&mut self) -> crate::Result {
        if self.phase != Phase::Idle {
            return Err(Error::Internal(format!("cannot run a simulation in phase {:?}", self.phase)));
        }

        self.phase = Phase::Running;
        let outcome = self.run_loop();
        self.phase = Phase::Finished;
        outcome
    }

    fn run_loop(&mut self) -> crate::Result {
        loop {
            if self.state.is_complete(self.event_set.current_time()) {
                return Ok(());
            }

            match self.event_set.peek_time() {
                Some(next_time) => self.state.observe(next_time)?,
                None => return Ok(()),
            }

            let (_, event) = self.event_set.next()?;
            self.state.execute(event, &mut self.event_set)?;
            self.events_executed += 1;
        }
    }

    /// Schedule the provided event at the specified time.
    ///
    /// # Errors
    ///
    /// If `time` is less than the current clock time, returns an [`Error::BackInTime`] with no modifications to the
    /// event set.
    pub fn schedule(&mut self, event: State::Event, time: Time) -> crate::Result {
        self.event_set.add(event, time)
    }

    /// Get a shared reference to the simulation state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get an exclusive reference to the simulation state.
    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    /// Consume the simulation, keeping only its state.
    pub fn into_state(self) -> State {
        self.state
    }

    /// Get a shared reference to the event set.
    pub fn event_set(&self) -> &FutureEventSet<State::Event, Time> {
        &self.event_set
    }

    /// Get an exclusive reference to the event set.
    pub fn event_set_mut(&mut self) -> &mut FutureEventSet<State::Event, Time> {
        &mut self.event_set
    }

    /// Split borrow of state and event set, for setup code that needs both at once.
    pub fn parts_mut(&mut self) -> (&mut State, &mut FutureEventSet<State::Event, Time>) {
        (&mut self.state, &mut self.event_set)
    }

    pub fn current_time(&self) -> &Time {
        self.event_set.current_time()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Number of events executed so far.
    pub fn events_executed(&self) -> usize {
        self.events_executed
    }
}

impl<State, Time> std::fmt::Display for Simulation<State, Time>
where
    State: SimState<Time>,
    Time: SimTime,
{
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Simulation at time {:?} ({:?})", self.event_set.current_time(), self.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum TestEvent {
        Record(u32),
        Complete,
        Fail,
    }

    #[derive(Debug, Default)]
    struct State {
        executed_event_values: Vec<u32>,
        observed_times: Vec<u32>,
        complete: bool,
    }

    impl SimState<u32> for State {
        type Event = TestEvent;

        fn execute(&mut self, event: TestEvent, _: &mut FutureEventSet<TestEvent, u32>) -> crate::Result {
            match event {
                TestEvent::Record(value) => self.executed_event_values.push(value),
                TestEvent::Complete => self.complete = true,
                TestEvent::Fail => return Err(Error::Internal("failing event".into())),
            }
            Ok(())
        }

        fn observe(&mut self, next_time: &u32) -> crate::Result {
            self.observed_times.push(*next_time);
            Ok(())
        }

        fn is_complete(&self, _: &u32) -> bool {
            self.complete
        }
    }

    fn setup() -> Simulation<State, u32> {
        let mut sim = Simulation::new(State::default(), 0);
        for (i, value) in [1, 3, 2].into_iter().enumerate() {
            sim.schedule(TestEvent::Record(value), 2 * i as u32).unwrap();
        }
        sim
    }

    #[test]
    fn simulation_executes_events() {
        let mut sim = setup();
        sim.run().unwrap();

        assert_eq!(
            vec![1, 3, 2],
            sim.state().executed_event_values,
            "events did not execute in correct order"
        );
        assert_eq!(vec![0, 2, 4], sim.state().observed_times, "observe should see each upcoming time");
        assert_eq!(3, sim.events_executed());
        assert_eq!(Phase::Finished, sim.phase());
    }

    #[test]
    fn simulation_stops_with_events_still_in_queue() {
        let mut sim = setup();
        sim.schedule(TestEvent::Complete, 3).unwrap();
        sim.run().unwrap();

        assert_eq!(
            vec![1, 3],
            sim.state().executed_event_values,
            "simulation did not terminate with completion event"
        );
        assert_eq!(1, sim.event_set().len());
        assert_eq!(3, *sim.current_time());
    }

    #[test]
    fn failing_event_aborts_run() {
        let mut sim = setup();
        sim.schedule(TestEvent::Fail, 1).unwrap();

        assert_eq!(Err(Error::Internal("failing event".into())), sim.run());
        assert_eq!(vec![1], sim.state().executed_event_values);
        assert_eq!(Phase::Finished, sim.phase());
    }

    #[test]
    fn simulation_runs_only_once() {
        let mut sim = setup();
        sim.run().unwrap();
        assert!(matches!(sim.run(), Err(Error::Internal(_))));
    }
}
