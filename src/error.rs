/// Errors that may be encountered while configuring or executing
/// a canteen simulation.
///
/// The variants split into two groups. [`Configuration`] is raised
/// while validating a [`SimulationConfig`] or building a
/// [`CanteenSetup`], before any run starts, and should be treated as
/// fatal for the whole batch. Every other variant originates inside a
/// single run and indicates that the run's state can no longer be
/// trusted: the runner aborts that run and leaves it out of the
/// aggregated statistics, while the remaining runs carry on.
///
/// The [`BackInTime`] and [`EmptySet`] variants come from the
/// [`FutureEventSet`] itself. Both point at a logical bug in the
/// event handlers rather than at bad input.
///
/// [`Configuration`]: Error::Configuration
/// [`BackInTime`]: Error::BackInTime
/// [`EmptySet`]: Error::EmptySet
/// [`SimulationConfig`]: crate::SimulationConfig
/// [`CanteenSetup`]: crate::canteen::CanteenSetup
/// [`FutureEventSet`]: crate::FutureEventSet
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A distribution parameter or a queue/server layout was rejected.
    Configuration(String),
    /// A customer would reach the queues no later than its group
    /// entered the canteen.
    InvalidCustomer {
        arrival_time: f64,
        food_grab_done_time: f64,
    },
    /// A group could not be assembled from its sampled members.
    InvalidGroup(String),
    /// A queue was asked to release a customer that it is not serving
    /// at the expected position or server.
    QueueConsistency {
        queue: usize,
        expected: String,
        found: String,
    },
    /// An engine invariant was violated.
    Internal(String),
    /// A measurement was registered with a time earlier than the
    /// previous registration.
    OutOfOrder { last: f64, time: f64 },
    /// The future event set was asked for an event while empty.
    EmptySet,
    /// The future event set rejected an event that would
    /// have been scheduled for a time that has
    /// already passed.
    BackInTime,
}

impl Error {
    /// Whether this error was raised before any run started. Such errors
    /// abort a whole batch instead of excluding a single run.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Configuration(reason) => write!(f, "invalid configuration: {reason}"),
            Self::InvalidCustomer {
                arrival_time,
                food_grab_done_time,
            } => write!(
                f,
                "customer finished grabbing food at {food_grab_done_time} but its group arrived at {arrival_time}"
            ),
            Self::InvalidGroup(reason) => write!(f, "invalid group: {reason}"),
            Self::QueueConsistency { queue, expected, found } => write!(
                f,
                "queue {queue} is inconsistent: expected {expected}, found {found}"
            ),
            Self::Internal(reason) => write!(f, "internal simulation error: {reason}"),
            Self::OutOfOrder { last, time } => write!(
                f,
                "measurement at time {time} registered after a measurement at time {last}"
            ),
            Self::EmptySet => write!(f, "no events remain in the future event set"),
            Self::BackInTime => write!(f, "event execution time is less than current simulation time"),
        }
    }
}

impl std::error::Error for Error {}

/// [`std::result::Result`]`<T, `[`canteen_des::Error`]`>`
///
/// A type alias that simplifies the signatures of
/// fallible functions in this crate. The success type
/// defaults to `()`, which is what most event handlers
/// return.
///
/// [`canteen_des::Error`]: Error
pub type Result<T = ()> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_batch_fatal() {
        assert!(Error::Configuration("bad".into()).is_configuration());
        assert!(!Error::EmptySet.is_configuration());
        assert!(!Error::OutOfOrder { last: 2.0, time: 1.0 }.is_configuration());
    }

    #[test]
    fn display_names_the_offending_queue() {
        let error = Error::QueueConsistency {
            queue: 2,
            expected: "customer 0.1".into(),
            found: "customer 3.0".into(),
        };
        assert_eq!(
            "queue 2 is inconsistent: expected customer 0.1, found customer 3.0",
            error.to_string()
        );
    }
}
