//! Validated wrappers around the few distribution families the canteen model draws from.

use crate::Error;

use rand::distr::Bernoulli;
use rand::Rng;
use rand_distr::{Distribution, Exp, Geometric};

/// A parameterized random distribution.
///
/// Construction validates the parameter and reports a [`Error::Configuration`] instead of panicking later. Samples are
/// always returned as `f64` so every family can be drawn through the same interface:
///
/// * exponential samples are durations in seconds,
/// * geometric samples count trials up to and including the first success, so they start at `1.0`,
/// * Bernoulli samples are `1.0` for success and `0.0` otherwise.
///
/// A sampler holds no random-number generator of its own. Each call borrows the caller's generator, which keeps one
/// seeded generator per run the only source of randomness.
#[derive(Debug, Clone, Copy)]
pub enum Sampler {
    Exponential { mean: f64, distribution: Exp<f64> },
    Geometric { p: f64, distribution: Geometric },
    Bernoulli { p: f64, distribution: Bernoulli },
}

impl Sampler {
    /// Exponential distribution with the given mean.
    ///
    /// # Errors
    ///
    /// The mean must be finite and strictly positive.
    pub fn exponential(mean: f64) -> crate::Result<Self> {
        if !(mean.is_finite() && mean > 0.0) {
            return Err(Error::Configuration(format!(
                "exponential mean must be positive and finite, got {mean}"
            )));
        }
        let distribution = Exp::new(1.0 / mean)
            .map_err(|e| Error::Configuration(format!("exponential mean {mean}: {e}")))?;
        Ok(Self::Exponential { mean, distribution })
    }

    /// Geometric distribution over the number of trials needed for one success of probability `p`.
    ///
    /// # Errors
    ///
    /// `p` must lie in `(0, 1]` and be large enough that `1 - p` is distinguishable from 1, otherwise sampling
    /// would never terminate.
    pub fn geometric(p: f64) -> crate::Result<Self> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(Error::Configuration(format!(
                "geometric success probability must lie in (0, 1], got {p}"
            )));
        }
        if 1.0 - p == 1.0 {
            return Err(Error::Configuration(format!(
                "geometric success probability {p} is too small to sample"
            )));
        }
        let distribution =
            Geometric::new(p).map_err(|e| Error::Configuration(format!("geometric probability {p}: {e}")))?;
        Ok(Self::Geometric { p, distribution })
    }

    /// Bernoulli distribution with success probability `p`.
    ///
    /// # Errors
    ///
    /// `p` must lie in `[0, 1]`.
    pub fn bernoulli(p: f64) -> crate::Result<Self> {
        if !(0.0..=1.0).contains(&p) {
            return Err(Error::Configuration(format!(
                "bernoulli probability must lie in [0, 1], got {p}"
            )));
        }
        let distribution =
            Bernoulli::new(p).map_err(|e| Error::Configuration(format!("bernoulli probability {p}: {e}")))?;
        Ok(Self::Bernoulli { p, distribution })
    }

    /// Expected value of a single sample.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Exponential { mean, .. } => *mean,
            Self::Geometric { p, .. } => 1.0 / p,
            Self::Bernoulli { p, .. } => *p,
        }
    }

    /// Draw one value.
    pub fn sample1<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Exponential { distribution, .. } => distribution.sample(rng),
            // rand_distr counts failures before the first success
            Self::Geometric { distribution, .. } => distribution.sample(rng).saturating_add(1) as f64,
            Self::Bernoulli { distribution, .. } => {
                if distribution.sample(rng) {
                    1.0
                } else {
                    0.0
                }
            },
        }
    }

    /// Draw `n` values.
    pub fn sample<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample1(rng)).collect()
    }
}

impl Distribution<f64> for Sampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sample1(rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    #[test]
    fn rejects_bad_parameters() {
        assert!(Sampler::exponential(0.0).is_err());
        assert!(Sampler::exponential(-3.0).is_err());
        assert!(Sampler::exponential(f64::NAN).is_err());
        assert!(Sampler::exponential(f64::INFINITY).is_err());
        assert!(Sampler::geometric(0.0).is_err());
        assert!(Sampler::geometric(1.5).is_err());
        assert!(Sampler::geometric(1e-19).is_err(), "1 - p rounds to 1");
        assert!(Sampler::bernoulli(-0.1).is_err());
        assert!(Sampler::bernoulli(1.1).is_err());
        assert!(matches!(Sampler::bernoulli(2.0), Err(Error::Configuration(_))));
    }

    #[test]
    fn accepts_boundary_probabilities() {
        assert!(Sampler::geometric(1.0).is_ok());
        assert!(Sampler::bernoulli(0.0).is_ok());
        assert!(Sampler::bernoulli(1.0).is_ok());
    }

    #[test]
    fn geometric_counts_trials_from_one() {
        let mut rng = Pcg64::seed_from_u64(7);
        let sampler = Sampler::geometric(1.0 / 3.0).unwrap();
        let draws = sampler.sample(2_000, &mut rng);

        assert!(draws.iter().all(|&x| x >= 1.0 && x.fract() == 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 3.0).abs() < 0.3, "sample mean {mean} too far from 3");
    }

    #[test]
    fn certain_geometric_always_yields_one() {
        let mut rng = Pcg64::seed_from_u64(1);
        let sampler = Sampler::geometric(1.0).unwrap();
        assert!(sampler.sample(50, &mut rng).into_iter().all(|x| x == 1.0));
    }

    #[test]
    fn exponential_mean_is_respected() {
        let mut rng = Pcg64::seed_from_u64(42);
        let sampler = Sampler::exponential(20.0).unwrap();
        let draws = sampler.sample(5_000, &mut rng);

        assert!(draws.iter().all(|&x| x >= 0.0));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 20.0).abs() < 1.5, "sample mean {mean} too far from 20");
        assert_eq!(20.0, sampler.mean());
    }

    #[test]
    fn bernoulli_extremes_are_deterministic() {
        let mut rng = Pcg64::seed_from_u64(3);
        let never = Sampler::bernoulli(0.0).unwrap();
        let always = Sampler::bernoulli(1.0).unwrap();
        assert!(never.sample(20, &mut rng).into_iter().all(|x| x == 0.0));
        assert!(always.sample(20, &mut rng).into_iter().all(|x| x == 1.0));
    }

    #[test]
    fn same_seed_same_draws() {
        let sampler = Sampler::exponential(80.0).unwrap();
        let first = sampler.sample(10, &mut Pcg64::seed_from_u64(9));
        let second = sampler.sample(10, &mut Pcg64::seed_from_u64(9));
        assert_eq!(first, second);
    }
}
