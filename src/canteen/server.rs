use crate::{Sampler, ServiceParams};

use rand::Rng;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerId(pub usize);

impl Display for ServerId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "server {}", self.0)
    }
}

/// A cashier. Knows how long it takes to serve each payment method and nothing else; which customer it is serving is
/// tracked by the queue it is bound to.
#[derive(Debug, Clone)]
pub struct Server {
    id: ServerId,
    cash: Sampler,
    card: Sampler,
}

impl Server {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] for non-positive service means.
    ///
    /// [`Error::Configuration`]: crate::Error::Configuration
    pub fn new(id: ServerId, service: &ServiceParams) -> crate::Result<Self> {
        Ok(Self {
            id,
            cash: Sampler::exponential(service.cash_mean)?,
            card: Sampler::exponential(service.card_mean)?,
        })
    }

    pub fn id(&self) -> ServerId {
        self.id
    }

    /// Draw a service duration for a customer paying by cash or by card.
    pub fn service_time<R: Rng + ?Sized>(&self, uses_cash: bool, rng: &mut R) -> f64 {
        if uses_cash {
            self.cash.sample1(rng)
        } else {
            self.card.sample1(rng)
        }
    }
}
