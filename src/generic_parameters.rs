use crate::FutureEventSet;
use std::fmt::Debug;

/// The generic type used for a simulation's clock.
///
/// Kept generic so the engine can run on integral clocks (handy for tests and for models measured in whole ticks) as
/// well as on the floating-point clock the canteen model uses. This trait is a superset of [`Ord`] and [`Debug`] with
/// no additional requirements or functionality.
///
/// Events execute in ascending order of execution time, i.e. if `A.cmp(&B) == std::cmp::Ordering::Less` then event A
/// will execute before event B. Ties that your implementation of [`Ord`] does not break are resolved by the order in
/// which events were added to the [`FutureEventSet`], which keeps seeded runs reproducible.
///
/// Floating-point builtins do not implement [`Ord`], so [`f64`] itself cannot be a [`SimTime`]. Use the
/// [`OrderedFloat`] or [`NotNan`] wrappers from the [`ordered-float`] crate instead; the canteen model uses
/// [`OrderedFloat<f64>`] through the [`Clock`] alias.
///
/// [`ordered-float`]: https://docs.rs/ordered-float/4
/// [`OrderedFloat`]: ordered_float::OrderedFloat
/// [`OrderedFloat<f64>`]: ordered_float::OrderedFloat
/// [`NotNan`]: ordered_float::NotNan
/// [`Clock`]: crate::canteen::Clock
pub trait SimTime: Ord + Debug {}

impl SimTime for u8 {}
impl SimTime for u16 {}
impl SimTime for u32 {}
impl SimTime for u64 {}
impl SimTime for u128 {}
impl SimTime for usize {}
impl SimTime for i8 {}
impl SimTime for i16 {}
impl SimTime for i32 {}
impl SimTime for i64 {}
impl SimTime for i128 {}
impl SimTime for isize {}

impl<Float> SimTime for ordered_float::OrderedFloat<Float> where Float: ordered_float::FloatCore + Debug {}

impl<Float> SimTime for ordered_float::NotNan<Float> where Float: ordered_float::FloatCore + Debug {}

/// The generic type used for a simulation's overall state.
///
/// This type owns everything a single replication needs: entities, random-number generator, accumulated measurements.
/// The engine hands it exclusive access to itself and to the [`FutureEventSet`] for each event it executes, so no
/// interior mutability or shared state is required.
///
/// Events are a plain associated type rather than trait objects. Models are expected to use a small enum of event
/// kinds and dispatch on it inside [`execute()`].
///
/// [`execute()`]: SimState::execute
pub trait SimState<Time>
where
    Time: SimTime,
{
    /// The kinds of events this model schedules.
    type Event: Debug;

    /// Apply one event to the state. The event set's clock has already been advanced to the event's execution time,
    /// and new events may be added to it.
    ///
    /// # Errors
    ///
    /// Any error aborts [`Simulation::run()`] and is handed back to its caller unchanged.
    ///
    /// [`Simulation::run()`]: crate::Simulation::run
    fn execute(&mut self, event: Self::Event, event_set: &mut FutureEventSet<Self::Event, Time>) -> crate::Result;

    /// Invoked with the execution time of the next event just before that event is popped, while the state still
    /// reflects the interval that is about to close. Time-weighted measurements belong here.
    ///
    /// The default implementation records nothing.
    ///
    /// # Errors
    ///
    /// Any error aborts [`Simulation::run()`] and is handed back to its caller unchanged.
    ///
    /// [`Simulation::run()`]: crate::Simulation::run
    // expect that other implementations will make use of the
    // argument even though this one doesn't
    #[allow(unused_variables)]
    fn observe(&mut self, next_time: &Time) -> crate::Result {
        Ok(())
    }

    /// Reports whether the simulation has run to completion. This method will be invoked in [`Simulation::run()`]
    /// before popping each event off the queue: `true` indicates that the simulation is finished and that `run()`
    /// should break out of its loop, whereas `false` means that `run()` should continue with the next scheduled event.
    ///
    /// The default implementation always returns false, which results in the simulation continuing until the event
    /// set empties out.
    ///
    /// [`Simulation::run()`]: crate::Simulation::run
    #[allow(unused_variables)]
    fn is_complete(&self, current_time: &Time) -> bool {
        false
    }
}
